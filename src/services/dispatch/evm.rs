//! EVM method table: JSON-RPC method name to typed client operation.

use alloy::primitives::{Address, Bytes, B256, U256};
use serde_json::Value;

use crate::{
	models::{BlockNumberOrTag, BlockRef, CallRequest, TransactionIntent},
	services::{
		blockchain::EvmClientTrait,
		dispatch::{error::DispatchError, params::Params},
	},
	utils::quantity::{format_quantity, format_u64_quantity},
};

/// A decoded EVM request, ready to run against any endpoint of the chain.
#[derive(Debug, Clone, PartialEq)]
pub enum EvmCall {
	ClientVersion,
	NetVersion,
	ChainId,
	BlockNumber,
	GasPrice,
	MaxPriorityFeePerGas,
	Syncing,
	GetBalance(Address, BlockRef),
	GetTransactionCount(Address, BlockRef),
	GetCode(Address, BlockRef),
	GetStorageAt(Address, U256, BlockRef),
	Call(CallRequest, BlockRef),
	EstimateGas(CallRequest),
	GetBlockByNumber(BlockNumberOrTag, bool),
	GetBlockByHash(B256, bool),
	GetBlockTransactionCountByHash(B256),
	GetBlockTransactionCountByNumber(BlockNumberOrTag),
	GetTransactionByHash(B256),
	GetTransactionByBlockHashAndIndex(B256, u64),
	GetTransactionByBlockNumberAndIndex(BlockNumberOrTag, u64),
	GetTransactionReceipt(B256),
	GetLogs(Value),
	FeeHistory {
		block_count: u64,
		newest_block: BlockNumberOrTag,
		reward_percentiles: Vec<f64>,
	},
	GetUncleCountByBlockHash(B256),
	GetUncleCountByBlockNumber(BlockNumberOrTag),
	Accounts,
	SendTransaction(TransactionIntent),
}

/// Every EVM method the router accepts.
pub const EVM_METHODS: [&str; 27] = [
	"web3_clientVersion",
	"net_version",
	"eth_chainId",
	"eth_blockNumber",
	"eth_gasPrice",
	"eth_maxPriorityFeePerGas",
	"eth_syncing",
	"eth_getBalance",
	"eth_getTransactionCount",
	"eth_getCode",
	"eth_getStorageAt",
	"eth_call",
	"eth_estimateGas",
	"eth_getBlockByNumber",
	"eth_getBlockByHash",
	"eth_getBlockTransactionCountByHash",
	"eth_getBlockTransactionCountByNumber",
	"eth_getTransactionByHash",
	"eth_getTransactionByBlockHashAndIndex",
	"eth_getTransactionByBlockNumberAndIndex",
	"eth_getTransactionReceipt",
	"eth_getLogs",
	"eth_feeHistory",
	"eth_getUncleCountByBlockHash",
	"eth_getUncleCountByBlockNumber",
	"eth_accounts",
	"eth_sendTransaction",
];

impl EvmCall {
	/// Matches `method` against the supported set and decodes its params.
	pub fn decode(method: &str, values: &[Value]) -> Result<Self, DispatchError> {
		let p = Params::new(method, values);
		let call = match method {
			"web3_clientVersion" => p.arity(0, 0).map(|_| Self::ClientVersion)?,
			"net_version" => p.arity(0, 0).map(|_| Self::NetVersion)?,
			"eth_chainId" => p.arity(0, 0).map(|_| Self::ChainId)?,
			"eth_blockNumber" => p.arity(0, 0).map(|_| Self::BlockNumber)?,
			"eth_gasPrice" => p.arity(0, 0).map(|_| Self::GasPrice)?,
			"eth_maxPriorityFeePerGas" => p.arity(0, 0).map(|_| Self::MaxPriorityFeePerGas)?,
			"eth_syncing" => p.arity(0, 0).map(|_| Self::Syncing)?,
			"eth_accounts" => p.arity(0, 0).map(|_| Self::Accounts)?,
			"eth_getBalance" => {
				p.arity(1, 2)?;
				Self::GetBalance(p.address(0)?, p.block_ref(1)?)
			}
			"eth_getTransactionCount" => {
				p.arity(1, 2)?;
				Self::GetTransactionCount(p.address(0)?, p.block_ref(1)?)
			}
			"eth_getCode" => {
				p.arity(1, 2)?;
				Self::GetCode(p.address(0)?, p.block_ref(1)?)
			}
			"eth_getStorageAt" => {
				p.arity(2, 3)?;
				Self::GetStorageAt(p.address(0)?, p.quantity(1)?, p.block_ref(2)?)
			}
			"eth_call" => {
				p.arity(1, 2)?;
				Self::Call(p.call_request(0)?, p.block_ref(1)?)
			}
			"eth_estimateGas" => {
				p.arity(1, 1)?;
				Self::EstimateGas(p.call_request(0)?)
			}
			"eth_getBlockByNumber" => {
				p.arity(1, 2)?;
				Self::GetBlockByNumber(p.block_number(0)?, p.flag(1)?)
			}
			"eth_getBlockByHash" => {
				p.arity(1, 2)?;
				Self::GetBlockByHash(p.hash(0)?, p.flag(1)?)
			}
			"eth_getBlockTransactionCountByHash" => {
				p.arity(1, 1)?;
				Self::GetBlockTransactionCountByHash(p.hash(0)?)
			}
			"eth_getBlockTransactionCountByNumber" => {
				p.arity(1, 1)?;
				Self::GetBlockTransactionCountByNumber(p.block_number(0)?)
			}
			"eth_getTransactionByHash" => {
				p.arity(1, 1)?;
				Self::GetTransactionByHash(p.hash(0)?)
			}
			"eth_getTransactionByBlockHashAndIndex" => {
				p.arity(2, 2)?;
				Self::GetTransactionByBlockHashAndIndex(p.hash(0)?, p.count(1)?)
			}
			"eth_getTransactionByBlockNumberAndIndex" => {
				p.arity(2, 2)?;
				Self::GetTransactionByBlockNumberAndIndex(p.block_number(0)?, p.count(1)?)
			}
			"eth_getTransactionReceipt" => {
				p.arity(1, 1)?;
				Self::GetTransactionReceipt(p.hash(0)?)
			}
			"eth_getLogs" => {
				p.arity(1, 1)?;
				Self::GetLogs(p.log_filter(0)?)
			}
			"eth_feeHistory" => {
				p.arity(2, 3)?;
				Self::FeeHistory {
					block_count: p.count(0)?,
					newest_block: p.block_number(1)?,
					reward_percentiles: p.percentiles(2)?,
				}
			}
			"eth_getUncleCountByBlockHash" => {
				p.arity(1, 1)?;
				Self::GetUncleCountByBlockHash(p.hash(0)?)
			}
			"eth_getUncleCountByBlockNumber" => {
				p.arity(1, 1)?;
				Self::GetUncleCountByBlockNumber(p.block_number(0)?)
			}
			"eth_sendTransaction" => {
				p.arity(1, 1)?;
				Self::SendTransaction(p.transaction_intent(0)?)
			}
			other => return Err(DispatchError::method_not_supported(other)),
		};
		Ok(call)
	}

	/// Runs the call and encodes the result in Ethereum wire conventions.
	pub async fn execute<C: EvmClientTrait + ?Sized>(
		self,
		client: &C,
	) -> Result<Value, DispatchError> {
		let result = match self {
			Self::ClientVersion => Value::from(client.client_version().await?),
			Self::NetVersion => Value::from(client.net_version().await?),
			Self::ChainId => u64_quantity(client.chain_id().await?),
			Self::BlockNumber => u64_quantity(client.block_number().await?),
			Self::GasPrice => u128_quantity(client.gas_price().await?),
			Self::MaxPriorityFeePerGas => u128_quantity(client.max_priority_fee_per_gas().await?),
			Self::Syncing => client.syncing().await?,
			Self::GetBalance(address, block) => {
				Value::from(format_quantity(client.balance(address, block).await?))
			}
			Self::GetTransactionCount(address, block) => {
				u64_quantity(client.transaction_count(address, block).await?)
			}
			Self::GetCode(address, block) => data(&client.code(address, block).await?),
			Self::GetStorageAt(address, slot, block) => {
				hash(&client.storage_at(address, slot, block).await?)
			}
			Self::Call(request, block) => data(&client.call(&request, block).await?),
			Self::EstimateGas(request) => u64_quantity(client.estimate_gas(&request).await?),
			Self::GetBlockByNumber(block, full) => client.block_by_number(block, full).await?,
			Self::GetBlockByHash(block_hash, full) => client.block_by_hash(block_hash, full).await?,
			Self::GetBlockTransactionCountByHash(block_hash) => {
				optional_quantity(client.block_transaction_count_by_hash(block_hash).await?)
			}
			Self::GetBlockTransactionCountByNumber(block) => {
				optional_quantity(client.block_transaction_count_by_number(block).await?)
			}
			Self::GetTransactionByHash(tx_hash) => client.transaction_by_hash(tx_hash).await?,
			Self::GetTransactionByBlockHashAndIndex(block_hash, index) => {
				client
					.transaction_by_block_hash_and_index(block_hash, index)
					.await?
			}
			Self::GetTransactionByBlockNumberAndIndex(block, index) => {
				client
					.transaction_by_block_number_and_index(block, index)
					.await?
			}
			Self::GetTransactionReceipt(tx_hash) => client.transaction_receipt(tx_hash).await?,
			Self::GetLogs(filter) => client.logs(filter).await?,
			Self::FeeHistory {
				block_count,
				newest_block,
				reward_percentiles,
			} => {
				client
					.fee_history(block_count, newest_block, reward_percentiles)
					.await?
			}
			Self::GetUncleCountByBlockHash(block_hash) => {
				optional_quantity(client.uncle_count_by_block_hash(block_hash).await?)
			}
			Self::GetUncleCountByBlockNumber(block) => {
				optional_quantity(client.uncle_count_by_block_number(block).await?)
			}
			Self::Accounts => Value::Array(
				client
					.signer_addresses()
					.iter()
					.map(|address| Value::from(format!("0x{:x}", address)))
					.collect(),
			),
			Self::SendTransaction(intent) => hash(&client.send_transaction(intent).await?),
		};
		Ok(result)
	}
}

fn u64_quantity(value: u64) -> Value {
	Value::from(format_u64_quantity(value))
}

fn u128_quantity(value: u128) -> Value {
	Value::from(format_quantity(U256::from(value)))
}

fn optional_quantity(value: Option<u64>) -> Value {
	value.map(u64_quantity).unwrap_or(Value::Null)
}

fn data(bytes: &Bytes) -> Value {
	Value::from(format!("0x{}", hex::encode(bytes)))
}

fn hash(value: &B256) -> Value {
	Value::from(format!("0x{:x}", value))
}
