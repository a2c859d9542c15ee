//! Solana method table.
//!
//! Results keep the node's JSON shape; amounts stay plain JSON numbers.

use serde::Serialize;
use serde_json::Value;

use crate::{
	models::BlockRequestConfig,
	services::{
		blockchain::{BlockChainError, SolanaClientTrait},
		dispatch::{error::DispatchError, params::Params},
	},
};

#[derive(Debug, Clone, PartialEq)]
pub enum SolanaCall {
	GetBalance(String),
	GetAccountInfo(String),
	GetTokenAccountBalance(String),
	GetBlockHeight,
	GetBlockTime(u64),
	GetBlock(u64, BlockRequestConfig),
	GetClusterNodes,
	GetVersion,
}

pub const SOLANA_METHODS: [&str; 8] = [
	"getBalance",
	"getAccountInfo",
	"getTokenAccountBalance",
	"getBlockHeight",
	"getBlockTime",
	"getBlock",
	"getClusterNodes",
	"getVersion",
];

impl SolanaCall {
	pub fn decode(method: &str, values: &[Value]) -> Result<Self, DispatchError> {
		let p = Params::new(method, values);
		let call = match method {
			"getBalance" => {
				p.arity(1, 1)?;
				Self::GetBalance(p.pubkey(0)?.to_string())
			}
			"getAccountInfo" => {
				p.arity(1, 1)?;
				Self::GetAccountInfo(p.pubkey(0)?.to_string())
			}
			"getTokenAccountBalance" => {
				p.arity(1, 1)?;
				Self::GetTokenAccountBalance(p.pubkey(0)?.to_string())
			}
			"getBlockHeight" => p.arity(0, 0).map(|_| Self::GetBlockHeight)?,
			"getBlockTime" => {
				p.arity(1, 1)?;
				Self::GetBlockTime(p.slot(0)?)
			}
			"getBlock" => {
				p.arity(1, 2)?;
				let slot = p.slot(0)?;
				let config = match p.options(1)? {
					None => BlockRequestConfig::default(),
					Some(options) => block_config(options).map_err(|e| {
						DispatchError::params_error(method, 1, "getBlock options", e)
					})?,
				};
				Self::GetBlock(slot, config)
			}
			"getClusterNodes" => p.arity(0, 0).map(|_| Self::GetClusterNodes)?,
			"getVersion" => p.arity(0, 0).map(|_| Self::GetVersion)?,
			other => return Err(DispatchError::method_not_supported(other)),
		};
		Ok(call)
	}

	pub async fn execute<C: SolanaClientTrait + ?Sized>(
		self,
		client: &C,
	) -> Result<Value, DispatchError> {
		let result = match self {
			Self::GetBalance(pubkey) => to_json(client.get_balance(&pubkey).await?)?,
			Self::GetAccountInfo(pubkey) => to_json(client.get_account_info(&pubkey).await?)?,
			Self::GetTokenAccountBalance(pubkey) => {
				to_json(client.get_token_account_balance(&pubkey).await?)?
			}
			Self::GetBlockHeight => Value::from(client.get_block_height().await?),
			Self::GetBlockTime(slot) => to_json(client.get_block_time(slot).await?)?,
			Self::GetBlock(slot, config) => client.get_block(slot, &config).await?,
			Self::GetClusterNodes => to_json(client.get_cluster_nodes().await?)?,
			Self::GetVersion => to_json(client.get_version().await?)?,
		};
		Ok(result)
	}
}

/// Overlays caller options on the default `getBlock` options.
fn block_config(options: &serde_json::Map<String, Value>) -> Result<BlockRequestConfig, String> {
	let mut merged = match serde_json::to_value(BlockRequestConfig::default()) {
		Ok(Value::Object(defaults)) => defaults,
		_ => serde_json::Map::new(),
	};
	for (key, value) in options {
		merged.insert(key.clone(), value.clone());
	}
	serde_json::from_value(Value::Object(merged)).map_err(|e| e.to_string())
}

fn to_json<T: Serialize>(value: T) -> Result<Value, DispatchError> {
	serde_json::to_value(value).map_err(|e| {
		DispatchError::from(BlockChainError::internal_error(
			format!("Failed to encode result: {}", e),
			Some(Box::new(e)),
			None,
		))
	})
}
