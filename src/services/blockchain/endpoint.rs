//! A configured provider endpoint: descriptor, live transport and the call
//! envelope (breaker and metrics) every request goes through.

use serde::de::DeserializeOwned;
use serde_json::Value;
use std::{collections::HashMap, sync::Arc, time::Duration};

use crate::{
	models::{CircuitBreakerConfig, EndpointDescriptor, EndpointId},
	services::blockchain::{
		breaker::CircuitBreaker,
		envelope::CallEnvelope,
		error::{BlockChainError, TRANSPORT_URL_KEY},
		transports::BlockchainTransport,
	},
	utils::metrics::MetricsSink,
};

pub struct Endpoint<T> {
	descriptor: EndpointDescriptor,
	transport: T,
	envelope: CallEnvelope,
}

impl<T> Endpoint<T> {
	pub fn new(
		descriptor: EndpointDescriptor,
		transport: T,
		timeout: Duration,
		breaker: &CircuitBreakerConfig,
		sink: Arc<dyn MetricsSink>,
	) -> Self {
		let envelope = CallEnvelope::new(
			descriptor.labels(),
			descriptor.transport_url.clone(),
			timeout,
			Arc::new(CircuitBreaker::new(breaker)),
			sink,
		);
		Self {
			descriptor,
			transport,
			envelope,
		}
	}

	pub fn descriptor(&self) -> &EndpointDescriptor {
		&self.descriptor
	}

	pub fn id(&self) -> &EndpointId {
		&self.descriptor.id
	}

	pub fn transport(&self) -> &T {
		&self.transport
	}

	pub fn envelope(&self) -> &CallEnvelope {
		&self.envelope
	}

	pub fn breaker(&self) -> &CircuitBreaker {
		self.envelope.breaker()
	}
}

impl<T: BlockchainTransport> Endpoint<T> {
	/// Calls `method` and returns the JSON-RPC `result` member.
	pub async fn call(
		&self,
		method: &str,
		params: Vec<Value>,
		timeout: Duration,
	) -> Result<Value, BlockChainError> {
		self.envelope
			.invoke_with_timeout(method, timeout, self.request(method, params))
			.await
	}

	/// Calls `method` and decodes the `result` member into `R`.
	///
	/// Decoding happens inside the envelope, so a provider answering with a
	/// malformed result is recorded as a failed call.
	pub async fn call_as<R: DeserializeOwned>(
		&self,
		method: &str,
		params: Vec<Value>,
		timeout: Duration,
	) -> Result<R, BlockChainError> {
		self.envelope
			.invoke_with_timeout(method, timeout, async {
				let result = self.request(method, params).await?;
				serde_json::from_value(result).map_err(|e| {
					BlockChainError::upstream_rpc(
						format!("{} returned an unexpected result: {}", method, e),
						Some(Box::new(e)),
						Some(self.metadata(method)),
					)
				})
			})
			.await
	}

	/// Runs a custom decoder over the `result` member inside the envelope.
	pub async fn call_with<R, F>(
		&self,
		method: &str,
		params: Vec<Value>,
		timeout: Duration,
		decode: F,
	) -> Result<R, BlockChainError>
	where
		F: FnOnce(&Value) -> Result<R, String> + Send,
	{
		self.envelope
			.invoke_with_timeout(method, timeout, async {
				let result = self.request(method, params).await?;
				decode(&result).map_err(|e| {
					BlockChainError::upstream_rpc(
						format!("{} returned an unexpected result: {}", method, e),
						None,
						Some(self.metadata(method)),
					)
				})
			})
			.await
	}

	async fn request(&self, method: &str, params: Vec<Value>) -> Result<Value, BlockChainError> {
		let response = self
			.transport
			.send_raw_request(method, Some(params))
			.await
			.map_err(|e| BlockChainError::from_transport(method, &self.descriptor.transport_url, e))?;

		match response {
			Value::Object(mut object) => object.remove("result").ok_or_else(|| {
				BlockChainError::upstream_rpc(
					format!("{} response is missing the 'result' field", method),
					None,
					Some(self.metadata(method)),
				)
			}),
			_ => Err(BlockChainError::upstream_rpc(
				format!("{} response is not a JSON object", method),
				None,
				Some(self.metadata(method)),
			)),
		}
	}

	fn metadata(&self, method: &str) -> HashMap<String, String> {
		HashMap::from([
			(
				TRANSPORT_URL_KEY.to_string(),
				self.descriptor.transport_url.clone(),
			),
			("method".to_string(), method.to_string()),
		])
	}
}
