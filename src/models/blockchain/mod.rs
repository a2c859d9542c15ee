//! Blockchain-specific model implementations.
//!
//! - `evm`: transaction intents, gas policy and signed transactions
//! - `solana`: typed RPC results

pub mod evm;
pub mod solana;
