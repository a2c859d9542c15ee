//! HTTP transport implementation for blockchain interactions.
//!
//! One [`HttpTransportClient`] talks to exactly one provider URL. Redundancy
//! across providers is the pool's job, so there is no in-transport URL
//! rotation; transient failures are retried by the middleware stack built in
//! [`create_retryable_http_client`].

use async_trait::async_trait;
use reqwest_middleware::ClientWithMiddleware;
use serde::Serialize;
use serde_json::{json, Value};
use std::time::Duration;
use url::Url;

use crate::{
	services::blockchain::transports::{
		redact_url, BlockchainTransport, TransientErrorRetryStrategy, TransportError,
	},
	utils::http::{create_retryable_http_client, RetryConfig},
};

/// Basic HTTP transport client for JSON-RPC nodes
///
/// The client is cheap to clone and safe to share across tasks; the
/// underlying connection pool is reused by every clone.
#[derive(Clone, Debug)]
pub struct HttpTransportClient {
	/// Retryable HTTP client for making requests
	pub client: ClientWithMiddleware,
	url: String,
	/// Redacted form of `url`, safe to log
	display_url: String,
	/// The stringified JSON RPC payload used by [`Self::probe`]
	test_connection_payload: Option<String>,
}

impl HttpTransportClient {
	/// Builds a client for `url`. No request is sent; see [`Self::probe`].
	///
	/// # Arguments
	/// * `url` - Provider URL, may embed an API key
	/// * `retry_config` - Backoff policy for transient failures
	/// * `request_timeout` - Upper bound for a single HTTP attempt
	/// * `test_connection_payload` - JSON-RPC payload for probes (default `net_version`)
	pub fn new(
		url: &str,
		retry_config: &RetryConfig,
		request_timeout: Duration,
		test_connection_payload: Option<String>,
	) -> Result<Self, TransportError> {
		let parsed = Url::parse(url).map_err(|e| {
			TransportError::network(
				format!("Invalid provider URL {}", redact_url(url)),
				Some(Box::new(e)),
				None,
			)
		})?;

		let base_http_client = reqwest::ClientBuilder::new()
			.pool_idle_timeout(Duration::from_secs(90))
			.pool_max_idle_per_host(32)
			.timeout(request_timeout)
			.connect_timeout(Duration::from_secs(20).min(request_timeout))
			.build()
			.map_err(|e| {
				TransportError::network(
					"Failed to create base HTTP client",
					Some(Box::new(e)),
					None,
				)
			})?;

		let client = create_retryable_http_client(
			retry_config,
			base_http_client,
			Some(TransientErrorRetryStrategy),
		);

		Ok(Self {
			client,
			display_url: redact_url(parsed.as_str()),
			url: url.to_string(),
			test_connection_payload,
		})
	}

	/// URL with credentials, path and query removed.
	pub fn display_url(&self) -> &str {
		&self.display_url
	}

	/// Sends the test payload and requires a 2xx answer without a JSON-RPC error.
	pub async fn probe(&self) -> Result<(), TransportError> {
		let test_request = match &self.test_connection_payload {
			Some(payload) => serde_json::from_str(payload).map_err(|e| {
				TransportError::request_serialization(
					"Failed to parse test payload as JSON",
					Some(Box::new(e)),
					None,
				)
			})?,
			None => json!({
				"jsonrpc": "2.0",
				"id": 1,
				"method": "net_version",
				"params": []
			}),
		};

		self.send_json(&test_request).await.map(|_| ())
	}

	/// Posts an already-built JSON-RPC body.
	pub async fn send_json(&self, body: &Value) -> Result<Value, TransportError> {
		let request_body = serde_json::to_string(body).map_err(|e| {
			TransportError::request_serialization(
				"Failed to serialize request JSON",
				Some(Box::new(e)),
				None,
			)
		})?;

		let response = self
			.client
			.post(&self.url)
			.header("Content-Type", "application/json")
			.body(request_body)
			.send()
			.await
			.map_err(|e| {
				tracing::warn!(url = %self.display_url, "Network error while sending request: {}", e);
				TransportError::network(
					format!("Request to {} failed", self.display_url),
					Some(Box::new(e)),
					None,
				)
			})?;

		let status = response.status();
		if !status.is_success() {
			let error_body = response.text().await.unwrap_or_default();
			tracing::warn!(
				"Request to {} failed with status {}: {}",
				self.display_url,
				status,
				error_body
			);
			return Err(TransportError::http(
				status,
				self.display_url.clone(),
				error_body,
				None,
				None,
			));
		}

		let payload: Value = response.json().await.map_err(|e| {
			TransportError::response_parse(
				"Failed to parse JSON response",
				Some(Box::new(e)),
				None,
			)
		})?;

		if let Some(error) = payload.get("error").filter(|e| !e.is_null()) {
			let code = error.get("code").and_then(Value::as_i64).unwrap_or_default();
			let message = error
				.get("message")
				.and_then(Value::as_str)
				.unwrap_or("unknown error")
				.to_string();
			return Err(TransportError::json_rpc(code, message, None));
		}

		Ok(payload)
	}
}

#[async_trait]
impl BlockchainTransport for HttpTransportClient {
	/// Redacted provider URL; the raw URL may carry an API key.
	async fn get_current_url(&self) -> String {
		self.display_url.clone()
	}

	/// Sends a JSON-RPC request and returns the whole response object.
	///
	/// Non-2xx statuses, unparsable bodies and JSON-RPC `error` members are
	/// all reported as [`TransportError`]s.
	async fn send_raw_request<P>(
		&self,
		method: &str,
		params: Option<P>,
	) -> Result<Value, TransportError>
	where
		P: Into<Value> + Send + Clone + Serialize,
	{
		let request_body = self.customize_request(method, params).await;
		tracing::debug!(url = %self.display_url, method, "Sending JSON-RPC request");
		self.send_json(&request_body).await
	}
}
