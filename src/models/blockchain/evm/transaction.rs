//! Transaction models used by the assembler.

use alloy::primitives::{Address, Bytes, B256, U256};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Default multiplier applied to the node's suggested gas price.
pub const DEFAULT_GAS_FEE_RATE: Decimal = Decimal::from_parts(11, 0, 0, false, 1);
/// Default multiplier applied to the node's gas estimate.
pub const DEFAULT_GAS_LIMIT_RATE: Decimal = Decimal::from_parts(2, 0, 0, false, 0);
/// Default ceiling for the computed gas limit.
pub const DEFAULT_GAS_LIMIT_MAX: u64 = 30_000_000;

/// Per-endpoint gas pricing policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GasPolicy {
	pub gas_fee_rate: Decimal,
	pub gas_limit_rate: Decimal,
	pub gas_limit_max: u64,
}

impl Default for GasPolicy {
	fn default() -> Self {
		Self {
			gas_fee_rate: DEFAULT_GAS_FEE_RATE,
			gas_limit_rate: DEFAULT_GAS_LIMIT_RATE,
			gas_limit_max: DEFAULT_GAS_LIMIT_MAX,
		}
	}
}

impl GasPolicy {
	/// Builds a policy from optional overrides, falling back to the defaults.
	pub fn from_overrides(
		gas_fee_rate: Option<Decimal>,
		gas_limit_rate: Option<Decimal>,
		gas_limit_max: Option<u64>,
	) -> Self {
		let defaults = Self::default();
		Self {
			gas_fee_rate: gas_fee_rate.unwrap_or(defaults.gas_fee_rate),
			gas_limit_rate: gas_limit_rate.unwrap_or(defaults.gas_limit_rate),
			gas_limit_max: gas_limit_max.unwrap_or(defaults.gas_limit_max),
		}
	}

	pub fn validate(&self) -> Result<(), String> {
		if self.gas_fee_rate <= Decimal::ZERO {
			return Err(format!(
				"gas_fee_rate must be positive, got {}",
				self.gas_fee_rate
			));
		}
		if self.gas_limit_rate < Decimal::ONE {
			return Err(format!(
				"gas_limit_rate must be at least 1, got {}",
				self.gas_limit_rate
			));
		}
		if self.gas_limit_max == 0 {
			return Err("gas_limit_max must be greater than zero".to_string());
		}
		Ok(())
	}

	/// `floor(gas_price * gas_fee_rate)`; errors if the result exceeds `u128`.
	pub fn apply_fee_rate(&self, gas_price: u128) -> Result<u128, String> {
		let (numerator, denominator) = rate_parts(self.gas_fee_rate)?;
		let scaled = U256::from(gas_price) * U256::from(numerator) / U256::from(denominator);
		if scaled > U256::from(u128::MAX) {
			return Err(format!(
				"gas price {} scaled by {} overflows",
				gas_price, self.gas_fee_rate
			));
		}
		Ok(scaled.to::<u128>())
	}

	/// `min(floor(estimate * gas_limit_rate), gas_limit_max)`.
	///
	/// The ceiling only ever lowers the value.
	pub fn gas_limit(&self, estimate: u64) -> u64 {
		let Ok((numerator, denominator)) = rate_parts(self.gas_limit_rate) else {
			return self.gas_limit_max.min(estimate);
		};
		match (estimate as u128).checked_mul(numerator) {
			Some(product) => {
				let scaled = product / denominator;
				if scaled >= self.gas_limit_max as u128 {
					self.gas_limit_max
				} else {
					scaled as u64
				}
			}
			None => self.gas_limit_max,
		}
	}
}

/// Splits a non-negative decimal into `mantissa / 10^scale`.
fn rate_parts(rate: Decimal) -> Result<(u128, u128), String> {
	if rate.is_sign_negative() {
		return Err(format!("rate {} is negative", rate));
	}
	let numerator = rate.mantissa().unsigned_abs();
	let denominator = 10u128.pow(rate.scale());
	Ok((numerator, denominator))
}

/// Caller-supplied transfer or contract call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionIntent {
	pub from: Address,
	pub to: Address,
	pub value: U256,
	pub data: Bytes,
}

impl TransactionIntent {
	/// Plain value transfer.
	pub fn transfer(from: Address, to: Address, value: U256) -> Self {
		Self {
			from,
			to,
			value,
			data: Bytes::new(),
		}
	}

	pub fn with_data(mut self, data: Bytes) -> Self {
		self.data = data;
		self
	}
}

/// Every field the assembler derived before signing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AssembledFields {
	pub nonce: u64,
	pub gas_price: u128,
	pub gas_limit: u64,
	pub chain_id: u64,
}

/// Signed, encoded transaction. Immutable once produced; consumed by submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedTransaction {
	hash: B256,
	raw: Bytes,
	from: Address,
	fields: AssembledFields,
}

impl SignedTransaction {
	pub fn new(hash: B256, raw: Bytes, from: Address, fields: AssembledFields) -> Self {
		Self {
			hash,
			raw,
			from,
			fields,
		}
	}

	pub fn hash(&self) -> B256 {
		self.hash
	}

	/// EIP-2718 encoding, ready for `eth_sendRawTransaction`.
	pub fn raw(&self) -> &Bytes {
		&self.raw
	}

	pub fn from(&self) -> Address {
		self.from
	}

	pub fn fields(&self) -> AssembledFields {
		self.fields
	}
}
