//! Mock implementations of blockchain clients.
//!
//! - [`MockEvmClientTrait`] - Mock implementation of the typed EVM client
//!
//! These mocks allow testing the transaction assembler and the EVM method
//! table without any transport at all.

use alloy::primitives::{Address, Bytes, B256, U256};
use async_trait::async_trait;
use mockall::mock;
use serde_json::Value;

use web3_gateway::{
	models::{BlockNumberOrTag, BlockRef, CallRequest, TransactionIntent},
	services::blockchain::{BlockChainError, EvmClientTrait},
};

mock! {
	/// Mock implementation of the EVM client trait.
	///
	/// `pending_nonce` and `send_transaction_simple` keep their default
	/// implementations and go through the mocked methods.
	pub EvmClientTrait {}

	#[async_trait]
	impl EvmClientTrait for EvmClientTrait {
		async fn client_version(&self) -> Result<String, BlockChainError>;
		async fn net_version(&self) -> Result<String, BlockChainError>;
		async fn chain_id(&self) -> Result<u64, BlockChainError>;
		async fn block_number(&self) -> Result<u64, BlockChainError>;
		async fn gas_price(&self) -> Result<u128, BlockChainError>;
		async fn max_priority_fee_per_gas(&self) -> Result<u128, BlockChainError>;
		async fn syncing(&self) -> Result<Value, BlockChainError>;
		async fn balance(&self, address: Address, block: BlockRef) -> Result<U256, BlockChainError>;
		async fn transaction_count(&self, address: Address, block: BlockRef) -> Result<u64, BlockChainError>;
		async fn code(&self, address: Address, block: BlockRef) -> Result<Bytes, BlockChainError>;
		async fn storage_at(&self, address: Address, slot: U256, block: BlockRef) -> Result<B256, BlockChainError>;
		async fn call(&self, request: &CallRequest, block: BlockRef) -> Result<Bytes, BlockChainError>;
		async fn estimate_gas(&self, request: &CallRequest) -> Result<u64, BlockChainError>;
		async fn block_by_number(&self, block: BlockNumberOrTag, full_transactions: bool) -> Result<Value, BlockChainError>;
		async fn block_by_hash(&self, hash: B256, full_transactions: bool) -> Result<Value, BlockChainError>;
		async fn block_transaction_count_by_hash(&self, hash: B256) -> Result<Option<u64>, BlockChainError>;
		async fn block_transaction_count_by_number(&self, block: BlockNumberOrTag) -> Result<Option<u64>, BlockChainError>;
		async fn uncle_count_by_block_hash(&self, hash: B256) -> Result<Option<u64>, BlockChainError>;
		async fn uncle_count_by_block_number(&self, block: BlockNumberOrTag) -> Result<Option<u64>, BlockChainError>;
		async fn transaction_by_hash(&self, hash: B256) -> Result<Value, BlockChainError>;
		async fn transaction_by_block_hash_and_index(&self, hash: B256, index: u64) -> Result<Value, BlockChainError>;
		async fn transaction_by_block_number_and_index(&self, block: BlockNumberOrTag, index: u64) -> Result<Value, BlockChainError>;
		async fn transaction_receipt(&self, hash: B256) -> Result<Value, BlockChainError>;
		async fn logs(&self, filter: Value) -> Result<Value, BlockChainError>;
		async fn fee_history(&self, block_count: u64, newest_block: BlockNumberOrTag, reward_percentiles: Vec<f64>) -> Result<Value, BlockChainError>;
		async fn send_raw_transaction(&self, raw: &Bytes) -> Result<B256, BlockChainError>;
		fn signer_addresses(&self) -> Vec<Address>;
		async fn send_transaction(&self, intent: TransactionIntent) -> Result<B256, BlockChainError>;
	}
}
