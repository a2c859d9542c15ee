//! Blockchain client implementations.
//!
//! Contains specific implementations for different blockchain types:
//! - EVM client for Ethereum-compatible chains, with ERC-20 helpers
//! - Solana client

mod evm {
	pub mod client;
	pub mod erc20;
}
mod solana {
	pub mod client;
}

pub use evm::client::{EvmClient, EvmClientTrait};
pub use evm::erc20::{encode_call, selector, Erc20};
pub use solana::client::{is_valid_pubkey, SolanaClient, SolanaClientTrait};
