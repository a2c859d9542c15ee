//! Per-endpoint circuit breaker.
//!
//! Outcomes are counted in a rolling window split into fixed-width buckets.
//! Once the window holds at least `minimum_requests` outcomes and the failure
//! share reaches `failure_ratio`, the breaker opens and rejects selection for
//! `open_duration`. It then half-opens and admits exactly one probe call:
//! success closes it, failure opens it again.
//!
//! Every outcome carries the instant its call started. Outcomes of calls
//! started before the current state was entered are stale and ignored, so a
//! slow call admitted before the breaker opened can neither close it nor
//! count against it once it has closed again.
//!
//! All state sits behind one mutex; critical sections are a few integer
//! updates and never span an await point.

use serde::Serialize;
use std::{
	sync::Mutex,
	time::{Duration, Instant},
};

use crate::models::CircuitBreakerConfig;

/// Externally visible breaker state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BreakerState {
	Closed,
	Open,
	HalfOpen,
}

#[derive(Debug, Clone, Copy, Default)]
struct Bucket {
	epoch: u64,
	successes: u32,
	failures: u32,
}

#[derive(Debug)]
enum State {
	Closed { since: Instant },
	Open { until: Instant },
	HalfOpen { probe_started: Instant },
}

#[derive(Debug)]
struct Inner {
	state: State,
	buckets: Vec<Bucket>,
}

#[derive(Debug)]
pub struct CircuitBreaker {
	origin: Instant,
	bucket_width: Duration,
	minimum_requests: u32,
	failure_ratio: f64,
	open_duration: Duration,
	inner: Mutex<Inner>,
}

impl CircuitBreaker {
	pub fn new(config: &CircuitBreakerConfig) -> Self {
		let buckets = config.buckets.max(1);
		let window = Duration::from_millis(config.window_ms.max(buckets as u64));
		let origin = Instant::now();
		Self {
			origin,
			bucket_width: window / buckets,
			minimum_requests: config.minimum_requests.max(1),
			failure_ratio: config.failure_ratio,
			open_duration: Duration::from_millis(config.open_duration_ms),
			inner: Mutex::new(Inner {
				state: State::Closed { since: origin },
				buckets: vec![Bucket::default(); buckets as usize],
			}),
		}
	}

	pub fn state(&self) -> BreakerState {
		self.state_at(Instant::now())
	}

	/// Current state; an open breaker whose cooldown elapsed reports `HalfOpen`.
	pub fn state_at(&self, now: Instant) -> BreakerState {
		let inner = self.lock();
		match inner.state {
			State::Closed { .. } => BreakerState::Closed,
			State::Open { until } if now >= until => BreakerState::HalfOpen,
			State::Open { .. } => BreakerState::Open,
			State::HalfOpen { .. } => BreakerState::HalfOpen,
		}
	}

	pub fn try_acquire(&self) -> bool {
		self.try_acquire_at(Instant::now())
	}

	/// Asks whether a call may be routed to the endpoint.
	///
	/// A closed breaker always admits. An open breaker admits nothing until
	/// its cooldown elapses; the first caller after that becomes the probe.
	/// A probe that never reports back is replaced after another cooldown.
	pub fn try_acquire_at(&self, now: Instant) -> bool {
		let mut inner = self.lock();
		match inner.state {
			State::Closed { .. } => true,
			State::Open { until } => {
				if now >= until {
					inner.state = State::HalfOpen { probe_started: now };
					true
				} else {
					false
				}
			}
			State::HalfOpen { probe_started } => {
				if now.saturating_duration_since(probe_started) >= self.open_duration {
					inner.state = State::HalfOpen { probe_started: now };
					true
				} else {
					false
				}
			}
		}
	}

	/// Records a healthy answer from a call that started at `started`.
	pub fn record_success(&self, started: Instant) {
		self.record_success_at(started, Instant::now())
	}

	pub fn record_success_at(&self, started: Instant, now: Instant) {
		let mut inner = self.lock();
		match inner.state {
			State::HalfOpen { probe_started } if started >= probe_started => {
				tracing::info!("Circuit breaker probe succeeded, closing");
				inner.state = State::Closed { since: now };
				reset(&mut inner.buckets);
			}
			State::Closed { since } if started >= since => {
				let epoch = self.epoch(now);
				bucket_for(&mut inner.buckets, epoch).successes += 1;
			}
			_ => tracing::debug!("Ignoring stale circuit breaker success"),
		}
	}

	/// Records a provider fault from a call that started at `started`.
	pub fn record_failure(&self, started: Instant) {
		self.record_failure_at(started, Instant::now())
	}

	pub fn record_failure_at(&self, started: Instant, now: Instant) {
		let mut inner = self.lock();
		match inner.state {
			State::HalfOpen { probe_started } if started >= probe_started => {
				tracing::warn!("Circuit breaker probe failed, reopening");
				inner.state = State::Open {
					until: now + self.open_duration,
				};
			}
			State::Closed { since } if started >= since => {
				let epoch = self.epoch(now);
				bucket_for(&mut inner.buckets, epoch).failures += 1;

				let (successes, failures) = totals(&inner.buckets, epoch);
				let total = successes + failures;
				if total >= self.minimum_requests as u64
					&& failures as f64 / total as f64 >= self.failure_ratio
				{
					tracing::warn!(
						failures,
						total,
						"Circuit breaker opened for {:?}",
						self.open_duration
					);
					inner.state = State::Open {
						until: now + self.open_duration,
					};
					reset(&mut inner.buckets);
				}
			}
			_ => tracing::debug!("Ignoring stale circuit breaker failure"),
		}
	}

	/// `(successes, failures)` currently inside the window.
	pub fn window_totals(&self) -> (u64, u64) {
		let epoch = self.epoch(Instant::now());
		totals(&self.lock().buckets, epoch)
	}

	fn epoch(&self, now: Instant) -> u64 {
		let elapsed = now.saturating_duration_since(self.origin);
		(elapsed.as_nanos() / self.bucket_width.as_nanos().max(1)) as u64
	}

	fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
		// Counters stay consistent even if a holder panicked mid-update.
		self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
	}
}

fn bucket_for(buckets: &mut [Bucket], epoch: u64) -> &mut Bucket {
	let len = buckets.len() as u64;
	let bucket = &mut buckets[(epoch % len) as usize];
	if bucket.epoch != epoch {
		*bucket = Bucket {
			epoch,
			successes: 0,
			failures: 0,
		};
	}
	bucket
}

fn totals(buckets: &[Bucket], epoch: u64) -> (u64, u64) {
	let len = buckets.len() as u64;
	buckets
		.iter()
		.filter(|b| b.epoch <= epoch && epoch - b.epoch < len)
		.fold((0, 0), |(s, f), b| (s + b.successes as u64, f + b.failures as u64))
}

fn reset(buckets: &mut [Bucket]) {
	for bucket in buckets.iter_mut() {
		*bucket = Bucket::default();
	}
}
