//! Typed Solana JSON-RPC results.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Lamports per SOL.
pub const LAMPORTS_PER_SOL: u64 = 1_000_000_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RpcContext {
	pub slot: u64,
}

/// `getBalance` result, in lamports
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceReply {
	pub context: RpcContext,
	pub value: u64,
}

impl BalanceReply {
	/// Balance converted to SOL.
	pub fn sol(&self) -> Decimal {
		Decimal::from(self.value) / Decimal::from(LAMPORTS_PER_SOL)
	}
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenAmount {
	pub amount: String,
	pub decimals: u8,
	#[serde(default)]
	pub ui_amount: Option<f64>,
	pub ui_amount_string: String,
}

/// `getTokenAccountBalance` result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenAccountBalanceReply {
	pub context: RpcContext,
	pub value: TokenAmount,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountInfo {
	pub lamports: u64,
	pub owner: String,
	pub data: Value,
	pub executable: bool,
	pub rent_epoch: u64,
	#[serde(default)]
	pub space: Option<u64>,
}

/// `getAccountInfo` result; `value` is null for unknown accounts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountInfoReply {
	pub context: RpcContext,
	pub value: Option<AccountInfo>,
}

/// `getVersion` result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionReply {
	#[serde(rename = "solana-core")]
	pub solana_core: String,
	#[serde(rename = "feature-set", default)]
	pub feature_set: Option<u64>,
}

/// Entry of `getClusterNodes`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterNode {
	pub pubkey: String,
	#[serde(default)]
	pub gossip: Option<String>,
	#[serde(default)]
	pub tpu: Option<String>,
	#[serde(default)]
	pub rpc: Option<String>,
	#[serde(default)]
	pub version: Option<String>,
	#[serde(default)]
	pub feature_set: Option<u64>,
	#[serde(default)]
	pub shred_version: Option<u16>,
}

/// Options forwarded with `getBlock`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockRequestConfig {
	pub encoding: String,
	pub transaction_details: String,
	pub rewards: bool,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub max_supported_transaction_version: Option<u8>,
}

impl Default for BlockRequestConfig {
	fn default() -> Self {
		Self {
			encoding: "json".to_string(),
			transaction_details: "full".to_string(),
			rewards: false,
			max_supported_transaction_version: Some(0),
		}
	}
}
