//! Positional parameter decoding.
//!
//! Every failure names the method, the parameter index and the expected kind.

use alloy::primitives::{Address, Bytes, B256, U256};
use serde_json::{Map, Value};
use std::str::FromStr;

use crate::{
	models::{BlockNumberOrTag, BlockRef, BlockTag, CallRequest, TransactionIntent},
	services::{blockchain::is_valid_pubkey, dispatch::error::DispatchError},
	utils::quantity::{hex_to_u128, hex_to_u256, hex_to_u64},
};

/// Fields `eth_sendTransaction` derives itself and refuses from callers.
const DERIVED_TX_FIELDS: [&str; 5] = [
	"gas",
	"gasPrice",
	"nonce",
	"maxFeePerGas",
	"maxPriorityFeePerGas",
];

pub struct Params<'a> {
	method: &'a str,
	values: &'a [Value],
}

impl<'a> Params<'a> {
	pub fn new(method: &'a str, values: &'a [Value]) -> Self {
		Self { method, values }
	}

	/// Checks `min <= len <= max`.
	pub fn arity(&self, min: usize, max: usize) -> Result<(), DispatchError> {
		let len = self.values.len();
		if len < min {
			return Err(self.error(len, "present", format!("expected at least {} params", min)));
		}
		if len > max {
			return Err(self.error(
				max,
				"absent",
				format!("expected at most {} params, got {}", max, len),
			));
		}
		Ok(())
	}

	fn error(&self, index: usize, expected: &str, detail: impl Into<String>) -> DispatchError {
		DispatchError::params_error(self.method, index, expected, detail)
	}

	fn required(&self, index: usize, expected: &str) -> Result<&'a Value, DispatchError> {
		self.values
			.get(index)
			.ok_or_else(|| self.error(index, expected, "missing"))
	}

	/// `None` when the position is absent or `null`.
	fn optional(&self, index: usize) -> Option<&'a Value> {
		self.values.get(index).filter(|v| !v.is_null())
	}

	fn str_at(&self, index: usize, expected: &str) -> Result<&'a str, DispatchError> {
		let value = self.required(index, expected)?;
		value
			.as_str()
			.ok_or_else(|| self.error(index, expected, format!("got {}", value)))
	}

	pub fn address(&self, index: usize) -> Result<Address, DispatchError> {
		let raw = self.str_at(index, "an address")?;
		parse_address(raw).map_err(|e| self.error(index, "an address", e))
	}

	pub fn hash(&self, index: usize) -> Result<B256, DispatchError> {
		let raw = self.str_at(index, "a 32-byte hash")?;
		parse_hash(raw).map_err(|e| self.error(index, "a 32-byte hash", e))
	}

	pub fn quantity(&self, index: usize) -> Result<U256, DispatchError> {
		let raw = self.str_at(index, "a hex quantity")?;
		hex_to_u256(raw).map_err(|e| self.error(index, "a hex quantity", e))
	}

	/// Accepts a hex quantity or a plain JSON integer.
	pub fn count(&self, index: usize) -> Result<u64, DispatchError> {
		let value = self.required(index, "a count")?;
		match value {
			Value::String(raw) => hex_to_u64(raw).map_err(|e| self.error(index, "a count", e)),
			Value::Number(n) => n
				.as_u64()
				.ok_or_else(|| self.error(index, "a count", format!("got {}", n))),
			other => Err(self.error(index, "a count", format!("got {}", other))),
		}
	}

	pub fn boolean(&self, index: usize) -> Result<bool, DispatchError> {
		let value = self.required(index, "a boolean")?;
		value
			.as_bool()
			.ok_or_else(|| self.error(index, "a boolean", format!("got {}", value)))
	}

	/// Optional boolean, `false` when absent.
	pub fn flag(&self, index: usize) -> Result<bool, DispatchError> {
		match self.optional(index) {
			None => Ok(false),
			Some(_) => self.boolean(index),
		}
	}

	pub fn block_number(&self, index: usize) -> Result<BlockNumberOrTag, DispatchError> {
		let raw = self.str_at(index, "a block number or tag")?;
		parse_block_number(raw).map_err(|e| self.error(index, "a block number or tag", e))
	}

	/// State-query block selector; `latest` when absent.
	pub fn block_ref(&self, index: usize) -> Result<BlockRef, DispatchError> {
		const EXPECTED: &str = "a block number, tag or block hash object";
		let Some(value) = self.optional(index) else {
			return Ok(BlockRef::latest());
		};

		match value {
			Value::String(raw) => parse_block_number(raw)
				.map(BlockRef::Number)
				.map_err(|e| self.error(index, EXPECTED, e)),
			Value::Object(object) => {
				if let Some(hash) = object.get("blockHash") {
					let hash = hash
						.as_str()
						.ok_or_else(|| "blockHash must be a string".to_string())
						.and_then(parse_hash)
						.map_err(|e| self.error(index, EXPECTED, e))?;
					let require_canonical = match object.get("requireCanonical") {
						None | Some(Value::Null) => None,
						Some(Value::Bool(b)) => Some(*b),
						Some(other) => {
							return Err(self.error(
								index,
								EXPECTED,
								format!("requireCanonical must be a boolean, got {}", other),
							))
						}
					};
					Ok(BlockRef::Hash {
						hash,
						require_canonical,
					})
				} else if let Some(number) = object.get("blockNumber") {
					number
						.as_str()
						.ok_or_else(|| "blockNumber must be a string".to_string())
						.and_then(parse_block_number)
						.map(BlockRef::Number)
						.map_err(|e| self.error(index, EXPECTED, e))
				} else {
					Err(self.error(index, EXPECTED, "object has neither blockHash nor blockNumber"))
				}
			}
			other => Err(self.error(index, EXPECTED, format!("got {}", other))),
		}
	}

	/// Call object for `eth_call` / `eth_estimateGas`.
	pub fn call_request(&self, index: usize) -> Result<CallRequest, DispatchError> {
		const EXPECTED: &str = "a call object";
		let object = self.object_at(index, EXPECTED)?;
		let field = |name: &str| object.get(name).filter(|v| !v.is_null());
		let text = |name: &str| {
			match field(name) {
				None => Ok(None),
				Some(Value::String(s)) => Ok(Some(s.as_str())),
				Some(other) => Err(self.error(
					index,
					EXPECTED,
					format!("{} must be a string, got {}", name, other),
				)),
			}
		};
		let wrap = |name: &str, e: String| self.error(index, EXPECTED, format!("{}: {}", name, e));

		let data = match (text("data")?, text("input")?) {
			(Some(data), _) | (None, Some(data)) => {
				Some(parse_bytes(data).map_err(|e| wrap("data", e))?)
			}
			(None, None) => None,
		};

		Ok(CallRequest {
			from: text("from")?
				.map(parse_address)
				.transpose()
				.map_err(|e| wrap("from", e))?,
			to: text("to")?
				.map(parse_address)
				.transpose()
				.map_err(|e| wrap("to", e))?,
			gas: text("gas")?
				.map(hex_to_u64)
				.transpose()
				.map_err(|e| wrap("gas", e))?,
			gas_price: text("gasPrice")?
				.map(hex_to_u128)
				.transpose()
				.map_err(|e| wrap("gasPrice", e))?,
			value: text("value")?
				.map(hex_to_u256)
				.transpose()
				.map_err(|e| wrap("value", e))?,
			data,
		})
	}

	/// Transaction object for `eth_sendTransaction`: only `from`, `to`,
	/// `value` and `data`/`input` are accepted.
	pub fn transaction_intent(&self, index: usize) -> Result<TransactionIntent, DispatchError> {
		const EXPECTED: &str = "a transaction object";
		let object = self.object_at(index, EXPECTED)?;
		if let Some(field) = DERIVED_TX_FIELDS.iter().find(|f| object.contains_key(**f)) {
			return Err(self.error(
				index,
				EXPECTED,
				format!("'{}' is derived by the gateway and must not be supplied", field),
			));
		}

		let request = self.call_request(index)?;
		let from = request
			.from
			.ok_or_else(|| self.error(index, EXPECTED, "'from' is required"))?;
		let to = request
			.to
			.ok_or_else(|| self.error(index, EXPECTED, "'to' is required"))?;
		Ok(TransactionIntent {
			from,
			to,
			value: request.value.unwrap_or(U256::ZERO),
			data: request.data.unwrap_or_default(),
		})
	}

	/// Filter object for `eth_getLogs`, forwarded once its shape is checked.
	pub fn log_filter(&self, index: usize) -> Result<Value, DispatchError> {
		const EXPECTED: &str = "a filter object";
		let object = self.object_at(index, EXPECTED)?;
		if object.contains_key("blockHash")
			&& (object.contains_key("fromBlock") || object.contains_key("toBlock"))
		{
			return Err(self.error(
				index,
				EXPECTED,
				"blockHash cannot be combined with fromBlock/toBlock",
			));
		}
		for key in ["fromBlock", "toBlock"] {
			if let Some(value) = object.get(key).filter(|v| !v.is_null()) {
				value
					.as_str()
					.ok_or_else(|| format!("{} must be a string", key))
					.and_then(parse_block_number)
					.map_err(|e| self.error(index, EXPECTED, e))?;
			}
		}
		Ok(Value::Object(object.clone()))
	}

	pub fn percentiles(&self, index: usize) -> Result<Vec<f64>, DispatchError> {
		const EXPECTED: &str = "an ascending list of percentiles";
		let Some(value) = self.optional(index) else {
			return Ok(Vec::new());
		};
		let list = value
			.as_array()
			.ok_or_else(|| self.error(index, EXPECTED, format!("got {}", value)))?;
		let mut percentiles = Vec::with_capacity(list.len());
		for item in list {
			let p = item
				.as_f64()
				.filter(|p| (0.0..=100.0).contains(p))
				.ok_or_else(|| self.error(index, EXPECTED, format!("got {}", item)))?;
			if percentiles.last().is_some_and(|last| *last > p) {
				return Err(self.error(index, EXPECTED, "values must not decrease"));
			}
			percentiles.push(p);
		}
		Ok(percentiles)
	}

	/// Base58 Solana public key.
	pub fn pubkey(&self, index: usize) -> Result<&'a str, DispatchError> {
		let raw = self.str_at(index, "a base58 public key")?;
		if is_valid_pubkey(raw) {
			Ok(raw)
		} else {
			Err(self.error(index, "a base58 public key", format!("got '{}'", raw)))
		}
	}

	/// Plain JSON unsigned integer (Solana slots).
	pub fn slot(&self, index: usize) -> Result<u64, DispatchError> {
		let value = self.required(index, "a slot number")?;
		value
			.as_u64()
			.ok_or_else(|| self.error(index, "a slot number", format!("got {}", value)))
	}

	/// The optional trailing options object, if any.
	pub fn options(&self, index: usize) -> Result<Option<&'a Map<String, Value>>, DispatchError> {
		match self.optional(index) {
			None => Ok(None),
			Some(Value::Object(object)) => Ok(Some(object)),
			Some(other) => Err(self.error(index, "an options object", format!("got {}", other))),
		}
	}

	fn object_at(
		&self,
		index: usize,
		expected: &str,
	) -> Result<&'a Map<String, Value>, DispatchError> {
		let value = self.required(index, expected)?;
		value
			.as_object()
			.ok_or_else(|| self.error(index, expected, format!("got {}", value)))
	}
}

fn parse_address(raw: &str) -> Result<Address, String> {
	if !raw.starts_with("0x") || raw.len() != 42 {
		return Err(format!("'{}' is not a 0x-prefixed 20-byte address", raw));
	}
	Address::from_str(raw).map_err(|e| format!("'{}': {}", raw, e))
}

fn parse_hash(raw: &str) -> Result<B256, String> {
	if !raw.starts_with("0x") || raw.len() != 66 {
		return Err(format!("'{}' is not a 0x-prefixed 32-byte hash", raw));
	}
	B256::from_str(raw).map_err(|e| format!("'{}': {}", raw, e))
}

fn parse_bytes(raw: &str) -> Result<Bytes, String> {
	if !raw.starts_with("0x") {
		return Err(format!("'{}' is missing the 0x prefix", raw));
	}
	Bytes::from_str(raw).map_err(|e| format!("'{}': {}", raw, e))
}

fn parse_block_number(raw: &str) -> Result<BlockNumberOrTag, String> {
	match BlockTag::parse(raw) {
		Some(tag) => Ok(BlockNumberOrTag::Tag(tag)),
		None => hex_to_u64(raw)
			.map(BlockNumberOrTag::Number)
			.map_err(|_| format!("'{}' is neither a block tag nor a hex block number", raw)),
	}
}
