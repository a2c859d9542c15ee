//! Quantity helpers for the Ethereum JSON-RPC wire format.
//!
//! Quantities are `0x`-prefixed, lowercase, and carry no leading zeros
//! (`0x0` for zero).

use alloy::primitives::U256;

/// Formats a quantity as `0x` + lowercase hex without leading zeros.
pub fn format_quantity(value: U256) -> String {
	format!("0x{:x}", value)
}

/// Same as [`format_quantity`] for values that fit in a `u64`.
pub fn format_u64_quantity(value: u64) -> String {
	format!("0x{:x}", value)
}

fn strip_prefix(value: &str) -> Result<&str, String> {
	let digits = value
		.strip_prefix("0x")
		.or_else(|| value.strip_prefix("0X"))
		.ok_or_else(|| format!("quantity '{}' is missing the 0x prefix", value))?;
	if digits.is_empty() {
		return Err(format!("quantity '{}' has no digits", value));
	}
	Ok(digits)
}

/// Parses a `0x` hex quantity into a `U256`.
pub fn hex_to_u256(value: &str) -> Result<U256, String> {
	let digits = strip_prefix(value)?;
	U256::from_str_radix(digits, 16).map_err(|e| format!("invalid quantity '{}': {}", value, e))
}

/// Parses a `0x` hex quantity into a `u64`.
pub fn hex_to_u64(value: &str) -> Result<u64, String> {
	let digits = strip_prefix(value)?;
	u64::from_str_radix(digits, 16).map_err(|e| format!("invalid quantity '{}': {}", value, e))
}

/// Parses a `0x` hex quantity into a `u128`.
pub fn hex_to_u128(value: &str) -> Result<u128, String> {
	let digits = strip_prefix(value)?;
	u128::from_str_radix(digits, 16).map_err(|e| format!("invalid quantity '{}': {}", value, e))
}
