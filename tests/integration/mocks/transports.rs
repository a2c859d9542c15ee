use mockall::mock;
use serde::Serialize;
use serde_json::{json, Value};
use std::collections::HashMap;

use web3_gateway::services::blockchain::{BlockchainTransport, TransportError};

// Mock implementation of a EVM transport client.
// Used for testing Ethereum compatible blockchain interactions.
// Provides functionality to simulate raw JSON-RPC request handling.
mock! {
	pub EvmTransportClient {
		pub async fn send_raw_request(&self, method: &str, params: Option<Vec<Value>>) -> Result<Value, TransportError>;
		pub async fn get_current_url(&self) -> String;
	}
}

#[async_trait::async_trait]
impl BlockchainTransport for MockEvmTransportClient {
	async fn get_current_url(&self) -> String {
		self.get_current_url().await
	}

	async fn send_raw_request<P>(
		&self,
		method: &str,
		params: Option<P>,
	) -> Result<Value, TransportError>
	where
		P: Into<Value> + Send + Clone + Serialize,
	{
		let params_value = params.map(|p| p.into());
		self.send_raw_request(method, params_value.and_then(|v| v.as_array().cloned()))
			.await
	}
}

// Mock implementation of a Solana transport client.
// Used for testing Solana interactions.
mock! {
	pub SolanaTransportClient {
		pub async fn send_raw_request(&self, method: &str, params: Option<Vec<Value>>) -> Result<Value, TransportError>;
		pub async fn get_current_url(&self) -> String;
	}
}

#[async_trait::async_trait]
impl BlockchainTransport for MockSolanaTransportClient {
	async fn get_current_url(&self) -> String {
		self.get_current_url().await
	}

	async fn send_raw_request<P>(
		&self,
		method: &str,
		params: Option<P>,
	) -> Result<Value, TransportError>
	where
		P: Into<Value> + Send + Clone + Serialize,
	{
		let params_value = params.map(|p| p.into());
		self.send_raw_request(method, params_value.and_then(|v| v.as_array().cloned()))
			.await
	}
}

/// Wraps `result` in a JSON-RPC success envelope.
pub fn rpc_result(result: Value) -> Value {
	json!({"jsonrpc": "2.0", "id": 1, "result": result})
}

/// EVM transport answering each method with a fixed result.
///
/// Unknown methods fail with a JSON-RPC "method not found" error.
pub fn scripted_evm_transport(results: HashMap<&'static str, Value>) -> MockEvmTransportClient {
	let mut transport = MockEvmTransportClient::new();
	transport
		.expect_send_raw_request()
		.returning(move |method, _| match results.get(method) {
			Some(result) => Ok(rpc_result(result.clone())),
			None => Err(TransportError::json_rpc(-32601, "method not found", None)),
		});
	transport
}

/// Solana transport answering each method with a fixed result.
pub fn scripted_solana_transport(
	results: HashMap<&'static str, Value>,
) -> MockSolanaTransportClient {
	let mut transport = MockSolanaTransportClient::new();
	transport
		.expect_send_raw_request()
		.returning(move |method, _| match results.get(method) {
			Some(result) => Ok(rpc_result(result.clone())),
			None => Err(TransportError::json_rpc(-32601, "method not found", None)),
		});
	transport
}
