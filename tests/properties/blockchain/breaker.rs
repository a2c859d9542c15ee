//! Property-based tests for circuit breaker transitions.

use proptest::prelude::*;
use std::time::{Duration, Instant};
use web3_gateway::services::blockchain::{BreakerState, CircuitBreaker};

use crate::properties::strategies::breaker_config_strategy;

proptest! {
	#[test]
	fn test_opens_once_failures_reach_minimum(
		config in breaker_config_strategy(),
		failures in 1u32..40,
	) {
		let breaker = CircuitBreaker::new(&config);
		let now = Instant::now();
		for _ in 0..failures {
			breaker.record_failure_at(now, now);
		}

		let expected = if failures >= config.minimum_requests {
			BreakerState::Open
		} else {
			BreakerState::Closed
		};
		prop_assert_eq!(breaker.state_at(now), expected);
	}

	#[test]
	fn test_open_breaker_admits_nothing_before_cooldown(
		config in breaker_config_strategy(),
		attempts in prop::collection::vec(0u64..60_000, 1..20),
	) {
		let breaker = CircuitBreaker::new(&config);
		let opened = Instant::now();
		for _ in 0..config.minimum_requests {
			breaker.record_failure_at(opened, opened);
		}

		for offset in attempts {
			let at = opened + Duration::from_millis(offset % config.open_duration_ms);
			prop_assert!(!breaker.try_acquire_at(at));
		}
	}

	#[test]
	fn test_single_probe_after_cooldown(
		config in breaker_config_strategy(),
		callers in 2usize..10,
		probe_succeeds in any::<bool>(),
	) {
		let breaker = CircuitBreaker::new(&config);
		let opened = Instant::now();
		for _ in 0..config.minimum_requests {
			breaker.record_failure_at(opened, opened);
		}

		let cooled = opened + Duration::from_millis(config.open_duration_ms);
		let admitted = (0..callers).filter(|_| breaker.try_acquire_at(cooled)).count();
		prop_assert_eq!(admitted, 1);

		if probe_succeeds {
			breaker.record_success_at(cooled, cooled);
			prop_assert_eq!(breaker.state_at(cooled), BreakerState::Closed);
			prop_assert!(breaker.try_acquire_at(cooled));
		} else {
			breaker.record_failure_at(cooled, cooled);
			prop_assert_eq!(breaker.state_at(cooled), BreakerState::Open);
			prop_assert!(!breaker.try_acquire_at(cooled));
		}
	}

	#[test]
	fn test_outcomes_started_before_opening_never_decide(
		config in breaker_config_strategy(),
		lead_ms in 1u64..1_000,
		outcomes in prop::collection::vec(any::<bool>(), 1..20),
	) {
		let breaker = CircuitBreaker::new(&config);
		let started = Instant::now();
		let opened = started + Duration::from_millis(lead_ms);
		for _ in 0..config.minimum_requests {
			breaker.record_failure_at(opened, opened);
		}

		let cooled = opened + Duration::from_millis(config.open_duration_ms);
		prop_assert!(breaker.try_acquire_at(cooled));
		for success in outcomes {
			if success {
				breaker.record_success_at(started, cooled);
			} else {
				breaker.record_failure_at(started, cooled);
			}
			prop_assert_eq!(breaker.state_at(cooled), BreakerState::HalfOpen);
		}
		prop_assert!(!breaker.try_acquire_at(cooled));
	}

	#[test]
	fn test_successes_alone_never_open(
		config in breaker_config_strategy(),
		successes in 0u32..100,
	) {
		let breaker = CircuitBreaker::new(&config);
		let now = Instant::now();
		for _ in 0..successes {
			breaker.record_success_at(now, now);
		}
		prop_assert_eq!(breaker.state_at(now), BreakerState::Closed);
		prop_assert!(breaker.try_acquire_at(now));
	}
}
