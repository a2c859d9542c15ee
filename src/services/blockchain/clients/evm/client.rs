//! EVM-compatible blockchain client implementation.
//!
//! Typed operations over one EVM endpoint. Every method goes through the
//! endpoint's call envelope, so each one is timed, counted and fed to the
//! circuit breaker.

use alloy::primitives::{Address, Bytes, B256, U256};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::{str::FromStr, sync::Arc, time::Duration};
use tracing::instrument;

use crate::{
	models::{
		BlockNumberOrTag, BlockRef, CallRequest, EndpointDescriptor, GasPolicy, TransactionIntent,
	},
	services::{
		blockchain::{
			breaker::CircuitBreaker, endpoint::Endpoint, error::BlockChainError,
			pool::PooledClient, transports::BlockchainTransport,
		},
		transaction::{SignerStore, TransactionAssembler},
	},
	utils::quantity::{format_u64_quantity, hex_to_u128, hex_to_u256, hex_to_u64},
};

/// Client implementation for Ethereum Virtual Machine (EVM) compatible blockchains
pub struct EvmClient<T> {
	endpoint: Arc<Endpoint<T>>,
	gas_policy: GasPolicy,
	signers: Arc<SignerStore>,
	timeout: Duration,
}

impl<T> Clone for EvmClient<T> {
	fn clone(&self) -> Self {
		Self {
			endpoint: self.endpoint.clone(),
			gas_policy: self.gas_policy,
			signers: self.signers.clone(),
			timeout: self.timeout,
		}
	}
}

impl<T> EvmClient<T> {
	/// Creates a new EVM client instance over an endpoint
	pub fn new_with_transport(
		endpoint: Endpoint<T>,
		gas_policy: GasPolicy,
		signers: SignerStore,
	) -> Self {
		let timeout = endpoint.envelope().timeout();
		Self {
			endpoint: Arc::new(endpoint),
			gas_policy,
			signers: Arc::new(signers),
			timeout,
		}
	}

	pub fn endpoint(&self) -> &Endpoint<T> {
		&self.endpoint
	}

	pub fn gas_policy(&self) -> GasPolicy {
		self.gas_policy
	}

	pub fn signers(&self) -> &SignerStore {
		&self.signers
	}

	/// A view of this client whose calls use at most `timeout`.
	pub fn with_timeout(&self, timeout: Duration) -> Self {
		Self {
			timeout: self.timeout.min(timeout),
			..self.clone()
		}
	}

	pub fn timeout(&self) -> Duration {
		self.timeout
	}
}

impl<T> PooledClient for EvmClient<T> {
	fn descriptor(&self) -> &EndpointDescriptor {
		self.endpoint.descriptor()
	}

	fn breaker(&self) -> &CircuitBreaker {
		self.endpoint.breaker()
	}
}

/// Typed EVM node operations
#[async_trait]
pub trait EvmClientTrait: Send + Sync {
	/// `web3_clientVersion`
	async fn client_version(&self) -> Result<String, BlockChainError>;

	/// `net_version`
	async fn net_version(&self) -> Result<String, BlockChainError>;

	/// `eth_chainId`
	async fn chain_id(&self) -> Result<u64, BlockChainError>;

	/// `eth_blockNumber`
	async fn block_number(&self) -> Result<u64, BlockChainError>;

	/// `eth_gasPrice`, in wei
	async fn gas_price(&self) -> Result<u128, BlockChainError>;

	/// `eth_maxPriorityFeePerGas`, in wei
	async fn max_priority_fee_per_gas(&self) -> Result<u128, BlockChainError>;

	/// `eth_syncing`: `false` or the node's progress object
	async fn syncing(&self) -> Result<Value, BlockChainError>;

	/// `eth_getBalance`, in wei
	async fn balance(&self, address: Address, block: BlockRef) -> Result<U256, BlockChainError>;

	/// `eth_getTransactionCount`
	async fn transaction_count(
		&self,
		address: Address,
		block: BlockRef,
	) -> Result<u64, BlockChainError>;

	/// Nonce counting transactions still in the mempool.
	async fn pending_nonce(&self, address: Address) -> Result<u64, BlockChainError> {
		self.transaction_count(address, BlockRef::pending()).await
	}

	/// `eth_getCode`
	async fn code(&self, address: Address, block: BlockRef) -> Result<Bytes, BlockChainError>;

	/// `eth_getStorageAt`
	async fn storage_at(
		&self,
		address: Address,
		slot: U256,
		block: BlockRef,
	) -> Result<B256, BlockChainError>;

	/// `eth_call`
	async fn call(&self, request: &CallRequest, block: BlockRef) -> Result<Bytes, BlockChainError>;

	/// `eth_estimateGas`
	async fn estimate_gas(&self, request: &CallRequest) -> Result<u64, BlockChainError>;

	/// `eth_getBlockByNumber`; `null` when the block is unknown
	async fn block_by_number(
		&self,
		block: BlockNumberOrTag,
		full_transactions: bool,
	) -> Result<Value, BlockChainError>;

	/// `eth_getBlockByHash`; `null` when the block is unknown
	async fn block_by_hash(
		&self,
		hash: B256,
		full_transactions: bool,
	) -> Result<Value, BlockChainError>;

	/// `eth_getBlockTransactionCountByHash`
	async fn block_transaction_count_by_hash(
		&self,
		hash: B256,
	) -> Result<Option<u64>, BlockChainError>;

	/// `eth_getBlockTransactionCountByNumber`
	async fn block_transaction_count_by_number(
		&self,
		block: BlockNumberOrTag,
	) -> Result<Option<u64>, BlockChainError>;

	/// `eth_getUncleCountByBlockHash`
	async fn uncle_count_by_block_hash(&self, hash: B256)
		-> Result<Option<u64>, BlockChainError>;

	/// `eth_getUncleCountByBlockNumber`
	async fn uncle_count_by_block_number(
		&self,
		block: BlockNumberOrTag,
	) -> Result<Option<u64>, BlockChainError>;

	/// `eth_getTransactionByHash`; `null` when unknown
	async fn transaction_by_hash(&self, hash: B256) -> Result<Value, BlockChainError>;

	/// `eth_getTransactionByBlockHashAndIndex`; `null` past the block's last transaction
	async fn transaction_by_block_hash_and_index(
		&self,
		hash: B256,
		index: u64,
	) -> Result<Value, BlockChainError>;

	/// `eth_getTransactionByBlockNumberAndIndex`
	async fn transaction_by_block_number_and_index(
		&self,
		block: BlockNumberOrTag,
		index: u64,
	) -> Result<Value, BlockChainError>;

	/// `eth_getTransactionReceipt`; `null` while pending or unknown
	async fn transaction_receipt(&self, hash: B256) -> Result<Value, BlockChainError>;

	/// `eth_getLogs` with an already validated filter object
	async fn logs(&self, filter: Value) -> Result<Value, BlockChainError>;

	/// `eth_feeHistory`
	async fn fee_history(
		&self,
		block_count: u64,
		newest_block: BlockNumberOrTag,
		reward_percentiles: Vec<f64>,
	) -> Result<Value, BlockChainError>;

	/// `eth_sendRawTransaction`; only fed by the transaction assembler
	async fn send_raw_transaction(&self, raw: &Bytes) -> Result<B256, BlockChainError>;

	/// Addresses this endpoint can sign for
	fn signer_addresses(&self) -> Vec<Address>;

	/// Assembles, signs and submits `intent`, returning the transaction hash.
	async fn send_transaction(&self, intent: TransactionIntent) -> Result<B256, BlockChainError>;

	/// Plain value transfer from one of the configured signers.
	async fn send_transaction_simple(
		&self,
		from: Address,
		to: Address,
		value: U256,
	) -> Result<B256, BlockChainError> {
		self.send_transaction(TransactionIntent::transfer(from, to, value))
			.await
	}
}

fn quantity_u64(value: &Value) -> Result<u64, String> {
	value
		.as_str()
		.ok_or_else(|| format!("expected a hex quantity, got {}", value))
		.and_then(hex_to_u64)
}

fn quantity_u128(value: &Value) -> Result<u128, String> {
	value
		.as_str()
		.ok_or_else(|| format!("expected a hex quantity, got {}", value))
		.and_then(hex_to_u128)
}

fn quantity_u256(value: &Value) -> Result<U256, String> {
	value
		.as_str()
		.ok_or_else(|| format!("expected a hex quantity, got {}", value))
		.and_then(hex_to_u256)
}

fn optional_quantity(value: &Value) -> Result<Option<u64>, String> {
	if value.is_null() {
		Ok(None)
	} else {
		quantity_u64(value).map(Some)
	}
}

fn bytes(value: &Value) -> Result<Bytes, String> {
	let raw = value
		.as_str()
		.ok_or_else(|| format!("expected hex data, got {}", value))?;
	Bytes::from_str(raw).map_err(|e| format!("invalid hex data: {}", e))
}

fn hash(value: &Value) -> Result<B256, String> {
	let raw = value
		.as_str()
		.ok_or_else(|| format!("expected a 32-byte hash, got {}", value))?;
	B256::from_str(raw).map_err(|e| format!("invalid hash: {}", e))
}

fn hex_address(address: &Address) -> Value {
	Value::from(format!("0x{:x}", address))
}

fn hex_hash(hash: &B256) -> Value {
	Value::from(format!("0x{:x}", hash))
}

#[async_trait]
impl<T: BlockchainTransport + 'static> EvmClientTrait for EvmClient<T> {
	#[instrument(skip(self))]
	async fn client_version(&self) -> Result<String, BlockChainError> {
		self.endpoint
			.call_as("web3_clientVersion", vec![], self.timeout)
			.await
	}

	#[instrument(skip(self))]
	async fn net_version(&self) -> Result<String, BlockChainError> {
		self.endpoint.call_as("net_version", vec![], self.timeout).await
	}

	#[instrument(skip(self))]
	async fn chain_id(&self) -> Result<u64, BlockChainError> {
		self.endpoint
			.call_with("eth_chainId", vec![], self.timeout, quantity_u64)
			.await
	}

	#[instrument(skip(self))]
	async fn block_number(&self) -> Result<u64, BlockChainError> {
		self.endpoint
			.call_with("eth_blockNumber", vec![], self.timeout, quantity_u64)
			.await
	}

	#[instrument(skip(self))]
	async fn gas_price(&self) -> Result<u128, BlockChainError> {
		self.endpoint
			.call_with("eth_gasPrice", vec![], self.timeout, quantity_u128)
			.await
	}

	#[instrument(skip(self))]
	async fn max_priority_fee_per_gas(&self) -> Result<u128, BlockChainError> {
		self.endpoint
			.call_with(
				"eth_maxPriorityFeePerGas",
				vec![],
				self.timeout,
				quantity_u128,
			)
			.await
	}

	#[instrument(skip(self))]
	async fn syncing(&self) -> Result<Value, BlockChainError> {
		self.endpoint.call("eth_syncing", vec![], self.timeout).await
	}

	#[instrument(skip(self), fields(address = %address))]
	async fn balance(&self, address: Address, block: BlockRef) -> Result<U256, BlockChainError> {
		self.endpoint
			.call_with(
				"eth_getBalance",
				vec![hex_address(&address), block.to_param()],
				self.timeout,
				quantity_u256,
			)
			.await
	}

	#[instrument(skip(self), fields(address = %address))]
	async fn transaction_count(
		&self,
		address: Address,
		block: BlockRef,
	) -> Result<u64, BlockChainError> {
		self.endpoint
			.call_with(
				"eth_getTransactionCount",
				vec![hex_address(&address), block.to_param()],
				self.timeout,
				quantity_u64,
			)
			.await
	}

	#[instrument(skip(self), fields(address = %address))]
	async fn code(&self, address: Address, block: BlockRef) -> Result<Bytes, BlockChainError> {
		self.endpoint
			.call_with(
				"eth_getCode",
				vec![hex_address(&address), block.to_param()],
				self.timeout,
				bytes,
			)
			.await
	}

	#[instrument(skip(self), fields(address = %address))]
	async fn storage_at(
		&self,
		address: Address,
		slot: U256,
		block: BlockRef,
	) -> Result<B256, BlockChainError> {
		self.endpoint
			.call_with(
				"eth_getStorageAt",
				vec![
					hex_address(&address),
					Value::from(format!("0x{:x}", slot)),
					block.to_param(),
				],
				self.timeout,
				hash,
			)
			.await
	}

	#[instrument(skip(self, request))]
	async fn call(&self, request: &CallRequest, block: BlockRef) -> Result<Bytes, BlockChainError> {
		self.endpoint
			.call_with(
				"eth_call",
				vec![request.to_param(), block.to_param()],
				self.timeout,
				bytes,
			)
			.await
	}

	#[instrument(skip(self, request))]
	async fn estimate_gas(&self, request: &CallRequest) -> Result<u64, BlockChainError> {
		self.endpoint
			.call_with(
				"eth_estimateGas",
				vec![request.to_param()],
				self.timeout,
				quantity_u64,
			)
			.await
	}

	#[instrument(skip(self), fields(block = %block))]
	async fn block_by_number(
		&self,
		block: BlockNumberOrTag,
		full_transactions: bool,
	) -> Result<Value, BlockChainError> {
		self.endpoint
			.call(
				"eth_getBlockByNumber",
				vec![block.to_param(), Value::from(full_transactions)],
				self.timeout,
			)
			.await
	}

	#[instrument(skip(self), fields(hash = %hash))]
	async fn block_by_hash(
		&self,
		hash: B256,
		full_transactions: bool,
	) -> Result<Value, BlockChainError> {
		self.endpoint
			.call(
				"eth_getBlockByHash",
				vec![hex_hash(&hash), Value::from(full_transactions)],
				self.timeout,
			)
			.await
	}

	#[instrument(skip(self), fields(hash = %hash))]
	async fn block_transaction_count_by_hash(
		&self,
		hash: B256,
	) -> Result<Option<u64>, BlockChainError> {
		self.endpoint
			.call_with(
				"eth_getBlockTransactionCountByHash",
				vec![hex_hash(&hash)],
				self.timeout,
				optional_quantity,
			)
			.await
	}

	#[instrument(skip(self), fields(block = %block))]
	async fn block_transaction_count_by_number(
		&self,
		block: BlockNumberOrTag,
	) -> Result<Option<u64>, BlockChainError> {
		self.endpoint
			.call_with(
				"eth_getBlockTransactionCountByNumber",
				vec![block.to_param()],
				self.timeout,
				optional_quantity,
			)
			.await
	}

	#[instrument(skip(self), fields(hash = %hash))]
	async fn uncle_count_by_block_hash(
		&self,
		hash: B256,
	) -> Result<Option<u64>, BlockChainError> {
		self.endpoint
			.call_with(
				"eth_getUncleCountByBlockHash",
				vec![hex_hash(&hash)],
				self.timeout,
				optional_quantity,
			)
			.await
	}

	#[instrument(skip(self), fields(block = %block))]
	async fn uncle_count_by_block_number(
		&self,
		block: BlockNumberOrTag,
	) -> Result<Option<u64>, BlockChainError> {
		self.endpoint
			.call_with(
				"eth_getUncleCountByBlockNumber",
				vec![block.to_param()],
				self.timeout,
				optional_quantity,
			)
			.await
	}

	#[instrument(skip(self), fields(hash = %hash))]
	async fn transaction_by_hash(&self, hash: B256) -> Result<Value, BlockChainError> {
		self.endpoint
			.call(
				"eth_getTransactionByHash",
				vec![hex_hash(&hash)],
				self.timeout,
			)
			.await
	}

	#[instrument(skip(self), fields(hash = %hash))]
	async fn transaction_by_block_hash_and_index(
		&self,
		hash: B256,
		index: u64,
	) -> Result<Value, BlockChainError> {
		self.endpoint
			.call(
				"eth_getTransactionByBlockHashAndIndex",
				vec![hex_hash(&hash), Value::from(format_u64_quantity(index))],
				self.timeout,
			)
			.await
	}

	#[instrument(skip(self), fields(block = %block))]
	async fn transaction_by_block_number_and_index(
		&self,
		block: BlockNumberOrTag,
		index: u64,
	) -> Result<Value, BlockChainError> {
		self.endpoint
			.call(
				"eth_getTransactionByBlockNumberAndIndex",
				vec![block.to_param(), Value::from(format_u64_quantity(index))],
				self.timeout,
			)
			.await
	}

	#[instrument(skip(self), fields(hash = %hash))]
	async fn transaction_receipt(&self, hash: B256) -> Result<Value, BlockChainError> {
		self.endpoint
			.call(
				"eth_getTransactionReceipt",
				vec![hex_hash(&hash)],
				self.timeout,
			)
			.await
	}

	#[instrument(skip(self, filter))]
	async fn logs(&self, filter: Value) -> Result<Value, BlockChainError> {
		self.endpoint
			.call("eth_getLogs", vec![filter], self.timeout)
			.await
	}

	#[instrument(skip(self, reward_percentiles), fields(newest_block = %newest_block))]
	async fn fee_history(
		&self,
		block_count: u64,
		newest_block: BlockNumberOrTag,
		reward_percentiles: Vec<f64>,
	) -> Result<Value, BlockChainError> {
		self.endpoint
			.call(
				"eth_feeHistory",
				vec![
					Value::from(format_u64_quantity(block_count)),
					newest_block.to_param(),
					json!(reward_percentiles),
				],
				self.timeout,
			)
			.await
	}

	#[instrument(skip(self, raw))]
	async fn send_raw_transaction(&self, raw: &Bytes) -> Result<B256, BlockChainError> {
		self.endpoint
			.call_with(
				"eth_sendRawTransaction",
				vec![Value::from(format!("0x{}", hex::encode(raw)))],
				self.timeout,
				hash,
			)
			.await
	}

	fn signer_addresses(&self) -> Vec<Address> {
		self.signers.addresses()
	}

	#[instrument(skip(self, intent), fields(from = %intent.from, to = %intent.to))]
	async fn send_transaction(&self, intent: TransactionIntent) -> Result<B256, BlockChainError> {
		TransactionAssembler::new(self, &self.signers, self.gas_policy)
			.send(&intent)
			.await
	}
}
