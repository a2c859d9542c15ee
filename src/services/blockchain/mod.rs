//! Blockchain client interfaces and implementations.
//!
//! - Transports: single-URL JSON-RPC over HTTPS with retries
//! - Endpoints: a transport plus its call envelope and circuit breaker
//! - Typed EVM and Solana clients on top of an endpoint
//! - The client pool that registers endpoints and selects among them
//! - Error handling for blockchain operations

mod breaker;
mod clients;
mod endpoint;
mod envelope;
mod error;
mod pool;
mod transports;

pub use breaker::{BreakerState, CircuitBreaker};
pub use clients::{
	encode_call, is_valid_pubkey, selector, Erc20, EvmClient, EvmClientTrait, SolanaClient,
	SolanaClientTrait,
};
pub use endpoint::Endpoint;
pub use envelope::CallEnvelope;
pub use error::{BlockChainError, RPC_ERROR_CODE_KEY, STEP_KEY, TRANSPORT_URL_KEY};
pub use pool::{ClientPool, ClientPoolTrait, PoolSettings, PooledClient};
pub use transports::{
	redact_url, BlockchainTransport, EvmTransportClient, HttpTransportClient,
	SolanaTransportClient, TransientErrorRetryStrategy, TransportError,
};
