//! Solana transport implementation for blockchain interactions.
//!
//! Wraps the [`HttpTransportClient`] with a Solana connection probe
//! (`getVersion`) and request shape: Solana nodes reject `"params": null`,
//! so the member is omitted when there are no parameters.

use serde::Serialize;
use serde_json::{json, Value};
use std::time::Duration;

use crate::{
	services::blockchain::transports::{BlockchainTransport, HttpTransportClient, TransportError},
	utils::http::RetryConfig,
};

const SOLANA_TEST_CONNECTION_PAYLOAD: &str =
	r#"{"id":1,"jsonrpc":"2.0","method":"getVersion"}"#;

/// A client for interacting with Solana RPC nodes
#[derive(Clone, Debug)]
pub struct SolanaTransportClient {
	/// The underlying HTTP transport client that handles actual RPC communications
	http_client: HttpTransportClient,
}

impl SolanaTransportClient {
	pub fn new(
		url: &str,
		retry_config: &RetryConfig,
		request_timeout: Duration,
	) -> Result<Self, TransportError> {
		let http_client = HttpTransportClient::new(
			url,
			retry_config,
			request_timeout,
			Some(SOLANA_TEST_CONNECTION_PAYLOAD.to_string()),
		)?;
		Ok(Self { http_client })
	}

	/// Issues `getVersion` against the provider.
	pub async fn probe(&self) -> Result<(), TransportError> {
		self.http_client.probe().await
	}
}

#[async_trait::async_trait]
impl BlockchainTransport for SolanaTransportClient {
	async fn get_current_url(&self) -> String {
		self.http_client.get_current_url().await
	}

	async fn send_raw_request<P>(
		&self,
		method: &str,
		params: Option<P>,
	) -> Result<Value, TransportError>
	where
		P: Into<Value> + Send + Clone + Serialize,
	{
		let body = self.customize_request(method, params).await;
		self.http_client.send_json(&body).await
	}

	async fn customize_request<P>(&self, method: &str, params: Option<P>) -> Value
	where
		P: Into<Value> + Send + Clone + Serialize,
	{
		match params.map(|p| p.into()) {
			Some(params) if !params.is_null() => json!({
				"jsonrpc": "2.0",
				"id": 1,
				"method": method,
				"params": params
			}),
			_ => json!({
				"jsonrpc": "2.0",
				"id": 1,
				"method": method
			}),
		}
	}
}
