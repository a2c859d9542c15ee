//! Generic JSON-RPC dispatch.
//!
//! A request is decoded into a typed call first, so malformed requests never
//! consume an endpoint selection. The decoded call then runs against the
//! endpoint the pool selects, and the result is re-encoded for the caller.

mod error;
mod evm;
mod params;
mod solana;

pub use error::{
	DispatchError, ALL_PROVIDERS_UNAVAILABLE, INTERNAL_ERR, NO_CLIENT_AVAILABLE, PARAMS_ERR,
	SIGNER_NOT_FOUND, UPSTREAM_ERR, UPSTREAM_TIMEOUT,
};
pub use evm::{EvmCall, EVM_METHODS};
pub use params::Params;
pub use solana::{SolanaCall, SOLANA_METHODS};

use std::sync::Arc;
use tracing::{debug, instrument};

use crate::{
	models::{RpcReply, RpcRequest},
	services::blockchain::{ClientPoolTrait, PooledClient},
};

/// Routes generic requests to typed operations on pooled endpoints.
pub struct Dispatcher<P> {
	pool: Arc<P>,
}

impl<P> Clone for Dispatcher<P> {
	fn clone(&self) -> Self {
		Self {
			pool: self.pool.clone(),
		}
	}
}

impl<P: ClientPoolTrait> Dispatcher<P> {
	pub fn new(pool: Arc<P>) -> Self {
		Self { pool }
	}

	pub fn pool(&self) -> &Arc<P> {
		&self.pool
	}

	/// Dispatches using the selector carried in the request body.
	pub async fn dispatch(&self, request: &RpcRequest) -> Result<RpcReply, DispatchError> {
		match (request.chain_id, request.chain_env.as_deref()) {
			(Some(chain_id), _) => self.dispatch_evm(chain_id, request).await,
			(None, Some(chain_env)) => self.dispatch_solana(chain_env, request).await,
			(None, None) => Err(DispatchError::missing_selector(&request.method)),
		}
	}

	#[instrument(skip(self, request), fields(method = %request.method))]
	pub async fn dispatch_evm(
		&self,
		chain_id: u64,
		request: &RpcRequest,
	) -> Result<RpcReply, DispatchError> {
		let call = EvmCall::decode(&request.method, &request.params)?;
		let client = self.pool.select_evm(chain_id).await?;
		debug!(provider = %client.descriptor().provider, "Dispatching EVM call");
		let result = call.execute(client.as_ref()).await?;
		Ok(reply(request, result))
	}

	#[instrument(skip(self, request), fields(method = %request.method))]
	pub async fn dispatch_solana(
		&self,
		chain_env: &str,
		request: &RpcRequest,
	) -> Result<RpcReply, DispatchError> {
		let call = SolanaCall::decode(&request.method, &request.params)?;
		let client = self.pool.select_solana(chain_env).await?;
		debug!(provider = %client.descriptor().provider, "Dispatching Solana call");
		let result = call.execute(client.as_ref()).await?;
		Ok(reply(request, result))
	}
}

fn reply(request: &RpcRequest, result: serde_json::Value) -> RpcReply {
	RpcReply {
		id: request.id.clone(),
		jsonrpc: request.jsonrpc.clone(),
		result,
	}
}
