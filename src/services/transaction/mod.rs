//! Transaction signing and assembly for EVM endpoints.
//!
//! - `signer`: configured private keys, looked up by address
//! - `assembler`: nonce, gas and chain id derivation, EIP-155 signing and submission

mod assembler;
mod signer;

pub use assembler::TransactionAssembler;
pub use signer::SignerStore;
