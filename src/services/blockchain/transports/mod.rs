//! Network transport implementations for blockchain clients.
//!
//! - Generic single-URL HTTP transport
//! - EVM and Solana wrappers that only differ in their connection probe

mod evm {
	pub mod http;
}
mod solana {
	pub mod http;
}

mod error;
mod http;

pub use error::TransportError;
pub use evm::http::EvmTransportClient;
pub use http::HttpTransportClient;
pub use solana::http::SolanaTransportClient;

use reqwest_retry::{
	default_on_request_failure, default_on_request_success, Retryable, RetryableStrategy,
};
use serde::Serialize;
use serde_json::{json, Value};
use url::Url;

/// Base trait for all blockchain transport clients
#[async_trait::async_trait]
pub trait BlockchainTransport: Send + Sync {
	/// Get the URL being used by the transport, safe for logs and replies
	async fn get_current_url(&self) -> String;

	/// Send a raw request to the blockchain
	async fn send_raw_request<P>(
		&self,
		method: &str,
		params: Option<P>,
	) -> Result<Value, TransportError>
	where
		P: Into<Value> + Send + Clone + Serialize;

	/// Customizes the request for specific blockchain requirements
	async fn customize_request<P>(&self, method: &str, params: Option<P>) -> Value
	where
		P: Into<Value> + Send + Clone + Serialize,
	{
		// Default implementation for JSON-RPC
		json!({
			"jsonrpc": "2.0",
			"id": 1,
			"method": method,
			"params": params.map(|p| p.into())
		})
	}
}

/// A default retry strategy that retries on requests based on the status code
/// This can be used to customise the retry strategy
pub struct TransientErrorRetryStrategy;
impl RetryableStrategy for TransientErrorRetryStrategy {
	fn handle(
		&self,
		res: &Result<reqwest::Response, reqwest_middleware::Error>,
	) -> Option<Retryable> {
		match res {
			Ok(success) => default_on_request_success(success),
			Err(error) => default_on_request_failure(error),
		}
	}
}

/// Reduces a provider URL to `scheme://host[:port]`.
///
/// Provider URLs routinely carry API keys in the path, query or userinfo;
/// only the origin is ever logged or returned to callers.
pub fn redact_url(url: &str) -> String {
	match Url::parse(url) {
		Ok(parsed) => match parsed.host_str() {
			Some(host) => match parsed.port() {
				Some(port) => format!("{}://{}:{}", parsed.scheme(), host, port),
				None => format!("{}://{}", parsed.scheme(), host),
			},
			None => format!("{}:", parsed.scheme()),
		},
		Err(_) => "<invalid url>".to_string(),
	}
}
