//! Instrumented call envelope.
//!
//! Every outbound provider call runs through [`CallEnvelope::invoke`], which
//! bounds it with a deadline, reports one metric record (counter and latency)
//! and feeds the endpoint's circuit breaker.

use std::{
	collections::HashMap,
	future::Future,
	sync::Arc,
	time::{Duration, Instant},
};

use crate::{
	services::blockchain::{
		breaker::CircuitBreaker,
		error::{BlockChainError, TRANSPORT_URL_KEY},
	},
	utils::metrics::{CallLabels, CallStatus, MetricsSink},
};

/// Per-call record. Lives for exactly one `invoke`.
struct CallMetadata<'a> {
	method: &'a str,
	started: Instant,
	status: CallStatus,
}

impl<'a> CallMetadata<'a> {
	fn start(method: &'a str) -> Self {
		Self {
			method,
			started: Instant::now(),
			status: CallStatus::Success,
		}
	}

	fn fail(&mut self) {
		self.status = CallStatus::Failure;
	}
}

pub struct CallEnvelope {
	labels: CallLabels,
	transport_url: String,
	timeout: Duration,
	breaker: Arc<CircuitBreaker>,
	sink: Arc<dyn MetricsSink>,
}

impl CallEnvelope {
	pub fn new(
		labels: CallLabels,
		transport_url: String,
		timeout: Duration,
		breaker: Arc<CircuitBreaker>,
		sink: Arc<dyn MetricsSink>,
	) -> Self {
		Self {
			labels,
			transport_url,
			timeout,
			breaker,
			sink,
		}
	}

	/// Default deadline applied by [`Self::invoke`].
	pub fn timeout(&self) -> Duration {
		self.timeout
	}

	pub fn breaker(&self) -> &Arc<CircuitBreaker> {
		&self.breaker
	}

	pub async fn invoke<R, Fut>(&self, method: &str, operation: Fut) -> Result<R, BlockChainError>
	where
		Fut: Future<Output = Result<R, BlockChainError>>,
	{
		self.invoke_with_timeout(method, self.timeout, operation)
			.await
	}

	/// Runs `operation` under `timeout`.
	///
	/// On expiry the operation future is dropped, which aborts the in-flight
	/// request, and a [`BlockChainError::Timeout`] is returned. Provider
	/// faults (timeouts, transport failures) count against the breaker; a
	/// node-level JSON-RPC error counts as a healthy answer.
	pub async fn invoke_with_timeout<R, Fut>(
		&self,
		method: &str,
		timeout: Duration,
		operation: Fut,
	) -> Result<R, BlockChainError>
	where
		Fut: Future<Output = Result<R, BlockChainError>>,
	{
		let mut metadata = CallMetadata::start(method);

		let result = match tokio::time::timeout(timeout, operation).await {
			Ok(result) => result,
			Err(_) => Err(BlockChainError::timeout(
				format!("{} did not complete within {:?}", method, timeout),
				None,
				Some(HashMap::from([
					(TRANSPORT_URL_KEY.to_string(), self.transport_url.clone()),
					("method".to_string(), method.to_string()),
				])),
			)),
		};

		let result = match result {
			Ok(value) => {
				self.breaker.record_success(metadata.started);
				Ok(value)
			}
			Err(error) => {
				metadata.fail();
				if error.is_provider_fault() {
					self.breaker.record_failure(metadata.started);
				} else {
					self.breaker.record_success(metadata.started);
				}
				Err(error.with_metadata(TRANSPORT_URL_KEY, self.transport_url.clone()))
			}
		};

		self.sink.record_call(
			&self.labels,
			metadata.method,
			metadata.status,
			metadata.started.elapsed(),
		);

		result
	}
}
