//! Test helper utilities for endpoints and call metrics
//!
//! - `RecordingMetricsSink`: Sink that keeps every call record in memory
//! - `DescriptorBuilder`: Builder for creating test EndpointDescriptor instances

use std::{
	sync::{Arc, Mutex},
	time::Duration,
};

use crate::{
	models::{ChainKey, CircuitBreakerConfig, EndpointDescriptor, EndpointId, TransportSchema},
	services::blockchain::Endpoint,
	utils::metrics::{CallLabels, CallStatus, MetricsSink},
};

/// One call as seen by [`RecordingMetricsSink`]
#[derive(Debug, Clone, PartialEq)]
pub struct CallRecord {
	pub labels: CallLabels,
	pub method: String,
	pub status: CallStatus,
	pub elapsed: Duration,
}

/// Metrics sink that records calls for later assertions
#[derive(Debug, Default)]
pub struct RecordingMetricsSink {
	records: Mutex<Vec<CallRecord>>,
}

impl RecordingMetricsSink {
	pub fn records(&self) -> Vec<CallRecord> {
		self.records
			.lock()
			.map(|records| records.clone())
			.unwrap_or_default()
	}

	pub fn count(&self, method: &str, status: CallStatus) -> usize {
		self.records()
			.iter()
			.filter(|r| r.method == method && r.status == status)
			.count()
	}
}

impl MetricsSink for RecordingMetricsSink {
	fn record_call(&self, labels: &CallLabels, method: &str, status: CallStatus, elapsed: Duration) {
		if let Ok(mut records) = self.records.lock() {
			records.push(CallRecord {
				labels: labels.clone(),
				method: method.to_string(),
				status,
				elapsed,
			});
		}
	}
}

/// Builder for creating test EndpointDescriptor instances
pub struct DescriptorBuilder {
	id: Option<String>,
	chain: ChainKey,
	provider: String,
	transport_schema: TransportSchema,
	transport_url: String,
	chain_name: String,
	chain_env: String,
}

impl Default for DescriptorBuilder {
	fn default() -> Self {
		Self {
			id: None,
			chain: ChainKey::Evm(1),
			provider: "Test Provider".to_string(),
			transport_schema: TransportSchema::Https,
			transport_url: "https://rpc.test.network".to_string(),
			chain_name: "Ethereum Mainnet".to_string(),
			chain_env: "mainnet".to_string(),
		}
	}
}

impl DescriptorBuilder {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn id(mut self, id: &str) -> Self {
		self.id = Some(id.to_string());
		self
	}

	pub fn evm(mut self, chain_id: u64) -> Self {
		self.chain = ChainKey::Evm(chain_id);
		self
	}

	pub fn solana(mut self, chain_env: &str) -> Self {
		self.chain = ChainKey::Solana(chain_env.to_string());
		self.chain_name = "Solana".to_string();
		self.chain_env = chain_env.to_string();
		self
	}

	pub fn provider(mut self, provider: &str) -> Self {
		self.provider = provider.to_string();
		self
	}

	pub fn url(mut self, url: &str) -> Self {
		self.transport_url = url.to_string();
		self
	}

	pub fn build(self) -> EndpointDescriptor {
		EndpointDescriptor {
			id: EndpointId::derive(
				self.id.as_deref(),
				&self.provider,
				&self.transport_url,
				self.transport_schema,
				&self.chain,
			),
			chain: self.chain,
			provider: self.provider,
			provider_website: None,
			transport_schema: self.transport_schema,
			transport_url: self.transport_url,
			chain_name: self.chain_name,
			chain_env: self.chain_env,
			app_id: "web3.app_id.test".to_string(),
			zone: "web3.zone.test".to_string(),
			cluster: "web3.cluster.test".to_string(),
		}
	}

	/// Wraps `transport` in an endpoint with default breaker settings.
	pub fn endpoint<T>(self, transport: T, sink: Arc<dyn MetricsSink>) -> Endpoint<T> {
		Endpoint::new(
			self.build(),
			transport,
			Duration::from_secs(5),
			&CircuitBreakerConfig::default(),
			sink,
		)
	}
}
