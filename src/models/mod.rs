//! Domain models and data structures for the gateway.
//!
//! - `blockchain`: chain-family models (EVM transactions and gas policy, Solana RPC results)
//! - `config`: Configuration loading and validation
//! - `core`: Gateway topology, endpoint identity and the JSON-RPC envelope
//! - `security`: Security models (Secret)

mod blockchain;
mod config;
mod core;
mod security;

// Re-export blockchain types
pub use blockchain::evm::{
	AssembledFields, BlockNumberOrTag, BlockRef, BlockTag, CallRequest, GasPolicy,
	SignedTransaction, TransactionIntent, DEFAULT_GAS_FEE_RATE, DEFAULT_GAS_LIMIT_MAX,
	DEFAULT_GAS_LIMIT_RATE,
};

pub use blockchain::solana::{
	AccountInfo, AccountInfoReply, BalanceReply, BlockRequestConfig, ClusterNode, RpcContext,
	TokenAccountBalanceReply, TokenAmount, VersionReply, LAMPORTS_PER_SOL,
};

// Re-export core types
pub use core::{
	ChainKey, CircuitBreakerConfig, EndpointDescriptor, EndpointId, ErrReply, EvmChainConfig,
	EvmClientConfig, GatewayConfig, RpcReply, RpcRequest, SelectionPolicy, SolanaClientConfig,
	TransportSchema,
};

// Re-export config types
pub use config::{ConfigError, ConfigLoader, DEFAULT_CONFIG_PATH};

// Re-export security types
pub use security::{SecretString, SecretValue, SecurityError, SecurityResult};
