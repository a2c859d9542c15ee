use serde::Serialize;
use sha2::{Digest, Sha256};
use std::fmt;

use crate::{impl_case_insensitive_unit_enum, utils::metrics::CallLabels};

/// Transport scheme declared for a provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportSchema {
	Https,
	Wss,
	Http,
	Ws,
}

impl_case_insensitive_unit_enum!(TransportSchema, {
	"https" => Https,
	"wss" => Wss,
	"http" => Http,
	"ws" => Ws,
});

impl TransportSchema {
	pub fn is_secure(&self) -> bool {
		matches!(self, TransportSchema::Https | TransportSchema::Wss)
	}

	/// Whether the pool can register a provider with this schema.
	///
	/// Calls are JSON-RPC over HTTP POST, so `https` is the only schema that
	/// is both secure and servable.
	pub fn is_routable(&self) -> bool {
		matches!(self, TransportSchema::Https)
	}

	pub fn as_str(&self) -> &'static str {
		match self {
			TransportSchema::Https => "https",
			TransportSchema::Wss => "wss",
			TransportSchema::Http => "http",
			TransportSchema::Ws => "ws",
		}
	}
}

impl fmt::Display for TransportSchema {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// Registry key: an EVM chain id or a Solana cluster environment.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(tag = "family", content = "key", rename_all = "lowercase")]
pub enum ChainKey {
	Evm(u64),
	Solana(String),
}

impl fmt::Display for ChainKey {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			ChainKey::Evm(chain_id) => write!(f, "evm:{}", chain_id),
			ChainKey::Solana(env) => write!(f, "solana:{}", env),
		}
	}
}

/// Stable endpoint identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct EndpointId(String);

impl EndpointId {
	/// Uses the configured id when present, otherwise a SHA-256 digest of the
	/// fields that make two endpoint configurations identical.
	pub fn derive(
		configured: Option<&str>,
		provider: &str,
		transport_url: &str,
		schema: TransportSchema,
		chain: &ChainKey,
	) -> Self {
		if let Some(id) = configured.map(str::trim).filter(|id| !id.is_empty()) {
			return Self(id.to_string());
		}

		let mut hasher = Sha256::new();
		for part in [provider, transport_url, schema.as_str(), &chain.to_string()] {
			hasher.update(part.as_bytes());
			hasher.update([0u8]);
		}
		Self(hex::encode(&hasher.finalize()[..8]))
	}

	pub fn as_str(&self) -> &str {
		&self.0
	}
}

impl fmt::Display for EndpointId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

/// Immutable description of one provider endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EndpointDescriptor {
	pub id: EndpointId,
	pub chain: ChainKey,
	pub provider: String,
	pub provider_website: Option<String>,
	pub transport_schema: TransportSchema,
	pub transport_url: String,
	pub chain_name: String,
	pub chain_env: String,
	pub app_id: String,
	pub zone: String,
	pub cluster: String,
}

impl EndpointDescriptor {
	/// Metric labels for calls made through this endpoint.
	pub fn labels(&self) -> CallLabels {
		CallLabels {
			client_id: self.id.to_string(),
			app_id: self.app_id.clone(),
			zone: self.zone.clone(),
			cluster: self.cluster.clone(),
			chain_id: match &self.chain {
				ChainKey::Evm(chain_id) => chain_id.to_string(),
				ChainKey::Solana(_) => String::new(),
			},
			chain_name: self.chain_name.clone(),
			chain_env: self.chain_env.clone(),
			provider: self.provider.clone(),
		}
	}
}
