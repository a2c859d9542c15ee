use proptest::prelude::*;
use rust_decimal::Decimal;
use web3_gateway::models::{CircuitBreakerConfig, GasPolicy};

/// Multipliers between 1.0 and 5.0 with one decimal place.
pub fn rate_at_least_one() -> impl Strategy<Value = Decimal> {
	(10i64..=50).prop_map(|mantissa| Decimal::new(mantissa, 1))
}

/// Multipliers between 0.01 and 1.00.
pub fn rate_at_most_one() -> impl Strategy<Value = Decimal> {
	(1i64..=100).prop_map(|mantissa| Decimal::new(mantissa, 2))
}

prop_compose! {
	pub fn gas_policy_strategy()(
		gas_fee_rate in rate_at_least_one(),
		gas_limit_rate in rate_at_least_one(),
		gas_limit_max in 21_000u64..=60_000_000,
	) -> GasPolicy {
		GasPolicy { gas_fee_rate, gas_limit_rate, gas_limit_max }
	}
}

prop_compose! {
	pub fn breaker_config_strategy()(
		minimum_requests in 1u32..=20,
		failure_ratio in 0.1f64..=1.0,
		open_duration_ms in 100u64..=60_000,
	) -> CircuitBreakerConfig {
		CircuitBreakerConfig {
			window_ms: 10_000,
			buckets: 10,
			minimum_requests,
			failure_ratio,
			open_duration_ms,
		}
	}
}

prop_compose! {
	pub fn host_strategy()(
		labels in prop::collection::vec("[a-z][a-z0-9-]{0,10}[a-z0-9]", 1..4),
		tld in prop_oneof![Just("com"), Just("org"), Just("io"), Just("network")],
	) -> String {
		format!("{}.{}", labels.join("."), tld)
	}
}
