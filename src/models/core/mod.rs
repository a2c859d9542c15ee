//! Core gateway models: configuration topology, endpoint identity and the
//! JSON-RPC envelope exchanged with callers.

mod endpoint;
mod gateway;
mod rpc;

pub use endpoint::{ChainKey, EndpointDescriptor, EndpointId, TransportSchema};
pub use gateway::{
	CircuitBreakerConfig, EvmChainConfig, EvmClientConfig, GatewayConfig, SelectionPolicy,
	SolanaClientConfig,
};
pub use rpc::{ErrReply, RpcReply, RpcRequest};
