use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::{
	impl_case_insensitive_unit_enum,
	models::{SecretValue, TransportSchema},
	utils::RetryConfig,
};

fn default_app_id() -> String {
	"web3.app_id.default".to_string()
}

fn default_zone() -> String {
	"web3.zone.default".to_string()
}

fn default_cluster() -> String {
	"web3.cluster.default".to_string()
}

fn default_request_timeout_ms() -> u64 {
	30_000
}

fn default_chain_env() -> String {
	"mainnet".to_string()
}

/// How [`ClientPool::select`](crate::services::blockchain::ClientPool) picks
/// among the healthy endpoints of a chain.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionPolicy {
	/// Rotate through endpoints, one step per selection
	#[default]
	RoundRobin,
	/// Always the first endpoint in configuration order whose breaker admits calls
	FirstAvailable,
}

impl_case_insensitive_unit_enum!(SelectionPolicy, {
	"round_robin" => RoundRobin,
	"first_available" => FirstAvailable,
});

/// Rolling-window circuit breaker settings, shared by every endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct CircuitBreakerConfig {
	/// Length of the rolling window
	pub window_ms: u64,
	/// Number of buckets the window is split into
	pub buckets: u32,
	/// Outcomes required in the window before the breaker may open
	pub minimum_requests: u32,
	/// Failure share (0, 1] at which the breaker opens
	pub failure_ratio: f64,
	/// How long an open breaker rejects calls before a probe is allowed
	pub open_duration_ms: u64,
}

impl Default for CircuitBreakerConfig {
	fn default() -> Self {
		Self {
			window_ms: 10_000,
			buckets: 10,
			minimum_requests: 10,
			failure_ratio: 0.5,
			open_duration_ms: 30_000,
		}
	}
}

/// One provider for an EVM chain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EvmClientConfig {
	#[serde(default)]
	pub client_id: Option<String>,
	pub provider: String,
	#[serde(default)]
	pub provider_website: Option<String>,
	pub transport_schema: TransportSchema,
	pub transport_url: SecretValue,
	#[serde(default)]
	pub gas_fee_rate: Option<Decimal>,
	#[serde(default)]
	pub gas_limit_rate: Option<Decimal>,
	#[serde(default)]
	pub gas_limit_max: Option<u64>,
	/// Private keys this endpoint may sign with
	#[serde(default)]
	pub signers: Vec<SecretValue>,
}

/// One EVM chain and its providers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EvmChainConfig {
	pub chain_id: u64,
	pub chain_name: String,
	#[serde(default = "default_chain_env")]
	pub chain_env: String,
	#[serde(default)]
	pub official_website: Option<String>,
	#[serde(default)]
	pub explorer_url: Option<String>,
	#[serde(default)]
	pub faucets: Vec<String>,
	#[serde(default)]
	pub clients: Vec<EvmClientConfig>,
}

/// One Solana provider, keyed by its cluster environment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SolanaClientConfig {
	#[serde(default)]
	pub client_id: Option<String>,
	pub provider: String,
	#[serde(default)]
	pub provider_website: Option<String>,
	pub transport_schema: TransportSchema,
	#[serde(default = "default_chain_env")]
	pub chain_env: String,
	pub transport_url: SecretValue,
}

/// Complete gateway topology: labels, policies and every configured provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GatewayConfig {
	#[serde(default = "default_app_id")]
	pub app_id: String,
	#[serde(default = "default_zone")]
	pub zone: String,
	#[serde(default = "default_cluster")]
	pub cluster: String,
	#[serde(default)]
	pub selection_policy: SelectionPolicy,
	#[serde(default = "default_request_timeout_ms")]
	pub request_timeout_ms: u64,
	/// Issue a health request to each endpoint while building the pool
	#[serde(default)]
	pub probe_on_startup: bool,
	#[serde(default)]
	pub circuit_breaker: CircuitBreakerConfig,
	#[serde(default)]
	pub retry: RetryConfig,
	#[serde(default)]
	pub evm_chains: BTreeMap<u64, EvmChainConfig>,
	#[serde(default)]
	pub solana_chains: Vec<SolanaClientConfig>,
}

impl Default for GatewayConfig {
	fn default() -> Self {
		Self {
			app_id: default_app_id(),
			zone: default_zone(),
			cluster: default_cluster(),
			selection_policy: SelectionPolicy::default(),
			request_timeout_ms: default_request_timeout_ms(),
			probe_on_startup: false,
			circuit_breaker: CircuitBreakerConfig::default(),
			retry: RetryConfig::default(),
			evm_chains: BTreeMap::new(),
			solana_chains: Vec::new(),
		}
	}
}
