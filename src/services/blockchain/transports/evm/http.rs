//! EVM transport implementation for blockchain interactions.
//!
//! Wraps the [`HttpTransportClient`] with an EVM-specific connection probe
//! (`net_version`).

use serde::Serialize;
use serde_json::Value;
use std::time::Duration;

use crate::{
	services::blockchain::transports::{BlockchainTransport, HttpTransportClient, TransportError},
	utils::http::RetryConfig,
};

const EVM_TEST_CONNECTION_PAYLOAD: &str =
	r#"{"id":1,"jsonrpc":"2.0","method":"net_version","params":[]}"#;

/// A client for interacting with EVM-compatible blockchain nodes
#[derive(Clone, Debug)]
pub struct EvmTransportClient {
	/// The underlying HTTP transport client that handles actual RPC communications
	pub http_client: HttpTransportClient,
}

impl EvmTransportClient {
	/// Creates a new EVM transport client for one provider URL
	///
	/// # Arguments
	/// * `url` - Provider URL
	/// * `retry_config` - Retry policy for transient failures
	/// * `request_timeout` - Upper bound for one HTTP attempt
	pub fn new(
		url: &str,
		retry_config: &RetryConfig,
		request_timeout: Duration,
	) -> Result<Self, TransportError> {
		let http_client = HttpTransportClient::new(
			url,
			retry_config,
			request_timeout,
			Some(EVM_TEST_CONNECTION_PAYLOAD.to_string()),
		)?;
		Ok(Self { http_client })
	}

	/// Issues `net_version` against the provider.
	pub async fn probe(&self) -> Result<(), TransportError> {
		self.http_client.probe().await
	}
}

#[async_trait::async_trait]
impl BlockchainTransport for EvmTransportClient {
	async fn get_current_url(&self) -> String {
		self.http_client.get_current_url().await
	}

	/// Sends a raw JSON-RPC request to the EVM node
	async fn send_raw_request<P>(
		&self,
		method: &str,
		params: Option<P>,
	) -> Result<Value, TransportError>
	where
		P: Into<Value> + Send + Clone + Serialize,
	{
		self.http_client.send_raw_request(method, params).await
	}
}
