//! Solana blockchain client implementation.

use async_trait::async_trait;
use serde_json::{json, Value};
use std::{sync::Arc, time::Duration};
use tracing::instrument;

use crate::{
	models::{
		AccountInfoReply, BalanceReply, BlockRequestConfig, ClusterNode, EndpointDescriptor,
		TokenAccountBalanceReply, VersionReply,
	},
	services::blockchain::{
		breaker::CircuitBreaker, endpoint::Endpoint, error::BlockChainError, pool::PooledClient,
		transports::BlockchainTransport,
	},
};

/// Whether `value` is a base58 string decoding to 32 bytes.
pub fn is_valid_pubkey(value: &str) -> bool {
	matches!(bs58::decode(value).into_vec(), Ok(bytes) if bytes.len() == 32)
}

/// Client implementation for one Solana RPC endpoint
pub struct SolanaClient<T> {
	endpoint: Arc<Endpoint<T>>,
	timeout: Duration,
}

impl<T> Clone for SolanaClient<T> {
	fn clone(&self) -> Self {
		Self {
			endpoint: self.endpoint.clone(),
			timeout: self.timeout,
		}
	}
}

impl<T> SolanaClient<T> {
	pub fn new_with_transport(endpoint: Endpoint<T>) -> Self {
		let timeout = endpoint.envelope().timeout();
		Self {
			endpoint: Arc::new(endpoint),
			timeout,
		}
	}

	pub fn endpoint(&self) -> &Endpoint<T> {
		&self.endpoint
	}

	/// A view of this client whose calls use at most `timeout`.
	pub fn with_timeout(&self, timeout: Duration) -> Self {
		Self {
			endpoint: self.endpoint.clone(),
			timeout: self.timeout.min(timeout),
		}
	}
}

impl<T> PooledClient for SolanaClient<T> {
	fn descriptor(&self) -> &EndpointDescriptor {
		self.endpoint.descriptor()
	}

	fn breaker(&self) -> &CircuitBreaker {
		self.endpoint.breaker()
	}
}

/// Typed Solana node operations
#[async_trait]
pub trait SolanaClientTrait: Send + Sync {
	/// `getBalance`, in lamports
	async fn get_balance(&self, pubkey: &str) -> Result<BalanceReply, BlockChainError>;

	/// `getAccountInfo` with base64 account data
	async fn get_account_info(&self, pubkey: &str) -> Result<AccountInfoReply, BlockChainError>;

	/// `getTokenAccountBalance`
	async fn get_token_account_balance(
		&self,
		pubkey: &str,
	) -> Result<TokenAccountBalanceReply, BlockChainError>;

	/// `getBlockHeight`
	async fn get_block_height(&self) -> Result<u64, BlockChainError>;

	/// `getBlockTime`; `None` when the node has no timestamp for the slot
	async fn get_block_time(&self, slot: u64) -> Result<Option<i64>, BlockChainError>;

	/// `getBlock`; the block is returned as the node's JSON
	async fn get_block(
		&self,
		slot: u64,
		config: &BlockRequestConfig,
	) -> Result<Value, BlockChainError>;

	/// `getClusterNodes`
	async fn get_cluster_nodes(&self) -> Result<Vec<ClusterNode>, BlockChainError>;

	/// `getVersion`
	async fn get_version(&self) -> Result<VersionReply, BlockChainError>;
}

#[async_trait]
impl<T: BlockchainTransport + 'static> SolanaClientTrait for SolanaClient<T> {
	#[instrument(skip(self))]
	async fn get_balance(&self, pubkey: &str) -> Result<BalanceReply, BlockChainError> {
		self.endpoint
			.call_as("getBalance", vec![json!(pubkey)], self.timeout)
			.await
	}

	#[instrument(skip(self))]
	async fn get_account_info(&self, pubkey: &str) -> Result<AccountInfoReply, BlockChainError> {
		self.endpoint
			.call_as(
				"getAccountInfo",
				vec![json!(pubkey), json!({ "encoding": "base64" })],
				self.timeout,
			)
			.await
	}

	#[instrument(skip(self))]
	async fn get_token_account_balance(
		&self,
		pubkey: &str,
	) -> Result<TokenAccountBalanceReply, BlockChainError> {
		self.endpoint
			.call_as("getTokenAccountBalance", vec![json!(pubkey)], self.timeout)
			.await
	}

	#[instrument(skip(self))]
	async fn get_block_height(&self) -> Result<u64, BlockChainError> {
		self.endpoint
			.call_as("getBlockHeight", vec![], self.timeout)
			.await
	}

	#[instrument(skip(self))]
	async fn get_block_time(&self, slot: u64) -> Result<Option<i64>, BlockChainError> {
		self.endpoint
			.call_as("getBlockTime", vec![json!(slot)], self.timeout)
			.await
	}

	#[instrument(skip(self, config))]
	async fn get_block(
		&self,
		slot: u64,
		config: &BlockRequestConfig,
	) -> Result<Value, BlockChainError> {
		let config = serde_json::to_value(config).map_err(|e| {
			BlockChainError::internal_error(
				format!("Failed to encode getBlock options: {}", e),
				Some(Box::new(e)),
				None,
			)
		})?;
		self.endpoint
			.call("getBlock", vec![json!(slot), config], self.timeout)
			.await
	}

	#[instrument(skip(self))]
	async fn get_cluster_nodes(&self) -> Result<Vec<ClusterNode>, BlockChainError> {
		self.endpoint
			.call_as("getClusterNodes", vec![], self.timeout)
			.await
	}

	#[instrument(skip(self))]
	async fn get_version(&self) -> Result<VersionReply, BlockChainError> {
		self.endpoint.call_as("getVersion", vec![], self.timeout).await
	}
}
