//! Block selectors and call requests in their JSON-RPC parameter form.

use alloy::primitives::{Address, Bytes, B256, U256};
use serde_json::{json, Map, Value};
use std::fmt;

use crate::utils::quantity::{format_quantity, format_u64_quantity};

/// Named block tags accepted by EVM nodes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockTag {
	Latest,
	Earliest,
	Pending,
	Safe,
	Finalized,
}

impl BlockTag {
	pub fn as_str(&self) -> &'static str {
		match self {
			BlockTag::Latest => "latest",
			BlockTag::Earliest => "earliest",
			BlockTag::Pending => "pending",
			BlockTag::Safe => "safe",
			BlockTag::Finalized => "finalized",
		}
	}

	pub fn parse(value: &str) -> Option<Self> {
		match value {
			"latest" => Some(BlockTag::Latest),
			"earliest" => Some(BlockTag::Earliest),
			"pending" => Some(BlockTag::Pending),
			"safe" => Some(BlockTag::Safe),
			"finalized" => Some(BlockTag::Finalized),
			_ => None,
		}
	}
}

/// A block by tag or number
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockNumberOrTag {
	Tag(BlockTag),
	Number(u64),
}

impl BlockNumberOrTag {
	pub fn to_param(&self) -> Value {
		match self {
			BlockNumberOrTag::Tag(tag) => Value::from(tag.as_str()),
			BlockNumberOrTag::Number(number) => Value::from(format_u64_quantity(*number)),
		}
	}
}

impl Default for BlockNumberOrTag {
	fn default() -> Self {
		BlockNumberOrTag::Tag(BlockTag::Latest)
	}
}

impl fmt::Display for BlockNumberOrTag {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			BlockNumberOrTag::Tag(tag) => f.write_str(tag.as_str()),
			BlockNumberOrTag::Number(number) => write!(f, "{}", number),
		}
	}
}

/// State-query block selector (EIP-1898): a tag, a number or a block hash.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockRef {
	Number(BlockNumberOrTag),
	Hash {
		hash: B256,
		require_canonical: Option<bool>,
	},
}

impl BlockRef {
	pub fn latest() -> Self {
		BlockRef::Number(BlockNumberOrTag::Tag(BlockTag::Latest))
	}

	pub fn pending() -> Self {
		BlockRef::Number(BlockNumberOrTag::Tag(BlockTag::Pending))
	}

	pub fn to_param(&self) -> Value {
		match self {
			BlockRef::Number(number) => number.to_param(),
			BlockRef::Hash {
				hash,
				require_canonical,
			} => {
				let mut object = Map::new();
				object.insert("blockHash".into(), Value::from(format!("0x{:x}", hash)));
				if let Some(require_canonical) = require_canonical {
					object.insert("requireCanonical".into(), Value::from(*require_canonical));
				}
				Value::Object(object)
			}
		}
	}
}

impl Default for BlockRef {
	fn default() -> Self {
		Self::latest()
	}
}

/// Message call description for `eth_call` and `eth_estimateGas`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallRequest {
	pub from: Option<Address>,
	pub to: Option<Address>,
	pub gas: Option<u64>,
	pub gas_price: Option<u128>,
	pub value: Option<U256>,
	pub data: Option<Bytes>,
}

impl CallRequest {
	/// Encodes the request with hex quantities, omitting unset fields.
	pub fn to_param(&self) -> Value {
		let mut object = Map::new();
		if let Some(from) = &self.from {
			object.insert("from".into(), json!(format!("0x{:x}", from)));
		}
		if let Some(to) = &self.to {
			object.insert("to".into(), json!(format!("0x{:x}", to)));
		}
		if let Some(gas) = self.gas {
			object.insert("gas".into(), json!(format_u64_quantity(gas)));
		}
		if let Some(gas_price) = self.gas_price {
			object.insert(
				"gasPrice".into(),
				json!(format_quantity(U256::from(gas_price))),
			);
		}
		if let Some(value) = self.value {
			object.insert("value".into(), json!(format_quantity(value)));
		}
		if let Some(data) = &self.data {
			object.insert("data".into(), json!(format!("0x{}", hex::encode(data))));
		}
		Value::Object(object)
	}
}
