use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

fn default_jsonrpc() -> String {
	"2.0".to_string()
}

/// JSON-RPC shaped request accepted by the gateway.
///
/// The target chain normally comes from the route; `chain_id` / `chain_env`
/// in the body are accepted for clients that send them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RpcRequest {
	#[serde(default)]
	pub id: Value,
	#[serde(default = "default_jsonrpc")]
	pub jsonrpc: String,
	pub method: String,
	#[serde(default)]
	pub params: Vec<Value>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub chain_id: Option<u64>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub chain_env: Option<String>,
}

impl RpcRequest {
	pub fn new(method: impl Into<String>, params: Vec<Value>) -> Self {
		Self {
			id: Value::from(1),
			jsonrpc: default_jsonrpc(),
			method: method.into(),
			params,
			chain_id: None,
			chain_env: None,
		}
	}
}

/// Successful reply, echoing the request id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RpcReply {
	pub id: Value,
	pub jsonrpc: String,
	pub result: Value,
}

/// Error body returned for every failed dispatch. `code` is also the HTTP status.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrReply {
	pub code: u16,
	pub reason: String,
	pub message: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub metadata: Option<HashMap<String, String>>,
}
