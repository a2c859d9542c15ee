//! Property-based tests for gas price and gas limit derivation.

use proptest::prelude::*;
use web3_gateway::models::GasPolicy;

use crate::properties::strategies::{gas_policy_strategy, rate_at_most_one};

proptest! {
	#[test]
	fn test_gas_limit_never_exceeds_ceiling(
		policy in gas_policy_strategy(),
		estimate in any::<u64>(),
	) {
		prop_assert!(policy.gas_limit(estimate) <= policy.gas_limit_max);
	}

	#[test]
	fn test_gas_limit_is_monotonic(
		policy in gas_policy_strategy(),
		a in 0u64..100_000_000,
		b in 0u64..100_000_000,
	) {
		let (low, high) = if a <= b { (a, b) } else { (b, a) };
		prop_assert!(policy.gas_limit(low) <= policy.gas_limit(high));
	}

	#[test]
	fn test_gas_limit_covers_estimate_below_ceiling(
		policy in gas_policy_strategy(),
		estimate in 0u64..21_000,
	) {
		prop_assert!(policy.gas_limit(estimate) >= estimate);
	}

	#[test]
	fn test_fee_rate_at_least_one_never_lowers_price(
		policy in gas_policy_strategy(),
		gas_price in any::<u64>(),
	) {
		let scaled = policy.apply_fee_rate(gas_price as u128).unwrap();
		prop_assert!(scaled >= gas_price as u128);
	}

	#[test]
	fn test_fee_rate_below_one_never_raises_price(
		rate in rate_at_most_one(),
		gas_price in any::<u64>(),
	) {
		let policy = GasPolicy { gas_fee_rate: rate, ..GasPolicy::default() };
		let scaled = policy.apply_fee_rate(gas_price as u128).unwrap();
		prop_assert!(scaled <= gas_price as u128);
	}

	#[test]
	fn test_fee_rate_overflow_is_an_error(rate in 2i64..100) {
		let policy = GasPolicy {
			gas_fee_rate: rust_decimal::Decimal::new(rate, 0),
			..GasPolicy::default()
		};
		prop_assert!(policy.apply_fee_rate(u128::MAX).is_err());
	}
}
