//! Chain registry and endpoint selection.
//!
//! The pool maps every EVM chain id and Solana environment to an ordered set
//! of endpoints. Registration happens once at startup; selection runs per
//! request and consults each endpoint's circuit breaker:
//! - round-robin (default) rotates one step per selection
//! - first-available always starts from the first configured endpoint
//!
//! Breaker-open endpoints are skipped. A key with no endpoints yields
//! `NoClientAvailable`; a key whose endpoints are all open yields
//! `AllProvidersUnavailable`.

use async_trait::async_trait;
use std::{
	collections::HashMap,
	sync::{Arc, Mutex, PoisonError},
	time::Duration,
};
use tracing::{info, warn};
use url::Url;

use crate::{
	models::{
		ChainKey, CircuitBreakerConfig, ConfigError, EndpointDescriptor, EndpointId,
		EvmChainConfig, EvmClientConfig, GasPolicy, GatewayConfig, SelectionPolicy,
		SolanaClientConfig, TransportSchema,
	},
	services::{
		blockchain::{
			breaker::{BreakerState, CircuitBreaker},
			endpoint::Endpoint,
			error::BlockChainError,
			transports::{redact_url, EvmTransportClient, SolanaTransportClient, TransportError},
			EvmClient, EvmClientTrait, SolanaClient, SolanaClientTrait,
		},
		transaction::SignerStore,
	},
	utils::{client_storage::ClientStorage, http::RetryConfig, metrics::MetricsSink},
};

const SOLANA_CHAIN_NAME: &str = "Solana";

/// Access to the endpoint behind a pooled client.
pub trait PooledClient {
	fn descriptor(&self) -> &EndpointDescriptor;

	fn breaker(&self) -> &CircuitBreaker;
}

/// Trait for the client pool.
#[async_trait]
pub trait ClientPoolTrait: Send + Sync {
	type EvmClient: EvmClientTrait + PooledClient + 'static;
	type SolanaClient: SolanaClientTrait + PooledClient + 'static;

	async fn select_evm(&self, chain_id: u64) -> Result<Arc<Self::EvmClient>, BlockChainError>;

	async fn select_solana(
		&self,
		chain_env: &str,
	) -> Result<Arc<Self::SolanaClient>, BlockChainError>;

	async fn chain_keys(&self) -> Vec<ChainKey>;

	async fn endpoints(&self, key: &ChainKey) -> Vec<EndpointDescriptor>;
}

/// Pool-wide settings taken from the gateway configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct PoolSettings {
	pub app_id: String,
	pub zone: String,
	pub cluster: String,
	pub policy: SelectionPolicy,
	pub request_timeout: Duration,
	pub probe_on_startup: bool,
	pub circuit_breaker: CircuitBreakerConfig,
	pub retry: RetryConfig,
}

impl From<&GatewayConfig> for PoolSettings {
	fn from(config: &GatewayConfig) -> Self {
		Self {
			app_id: config.app_id.clone(),
			zone: config.zone.clone(),
			cluster: config.cluster.clone(),
			policy: config.selection_policy,
			request_timeout: Duration::from_millis(config.request_timeout_ms),
			probe_on_startup: config.probe_on_startup,
			circuit_breaker: config.circuit_breaker.clone(),
			retry: config.retry.clone(),
		}
	}
}

impl Default for PoolSettings {
	fn default() -> Self {
		Self::from(&GatewayConfig::default())
	}
}

/// Registry of EVM and Solana endpoints.
pub struct ClientPool<E = EvmTransportClient, S = SolanaTransportClient> {
	settings: PoolSettings,
	sink: Arc<dyn MetricsSink>,
	evm: ClientStorage<u64, EvmClient<E>>,
	solana: ClientStorage<String, SolanaClient<S>>,
	/// Next starting index per key, for round-robin selection
	cursors: Mutex<HashMap<ChainKey, usize>>,
}

impl<E, S> ClientPool<E, S> {
	/// Creates an empty pool.
	pub fn new(settings: PoolSettings, sink: Arc<dyn MetricsSink>) -> Self {
		Self {
			settings,
			sink,
			evm: ClientStorage::new(),
			solana: ClientStorage::new(),
			cursors: Mutex::new(HashMap::new()),
		}
	}

	pub fn settings(&self) -> &PoolSettings {
		&self.settings
	}

	/// Wraps `transport` in an endpoint using the pool's timeout, breaker
	/// settings and metrics sink.
	pub fn endpoint<T>(&self, descriptor: EndpointDescriptor, transport: T) -> Endpoint<T> {
		Endpoint::new(
			descriptor,
			transport,
			self.settings.request_timeout,
			&self.settings.circuit_breaker,
			self.sink.clone(),
		)
	}

	/// Descriptor for an EVM provider. The id is derived from the full URL;
	/// only the redacted origin is kept.
	pub fn evm_descriptor(
		&self,
		chain: &EvmChainConfig,
		client: &EvmClientConfig,
		transport_url: &str,
	) -> EndpointDescriptor {
		let key = ChainKey::Evm(chain.chain_id);
		EndpointDescriptor {
			id: EndpointId::derive(
				client.client_id.as_deref(),
				&client.provider,
				transport_url,
				client.transport_schema,
				&key,
			),
			chain: key,
			provider: client.provider.clone(),
			provider_website: client.provider_website.clone(),
			transport_schema: client.transport_schema,
			transport_url: redact_url(transport_url),
			chain_name: chain.chain_name.clone(),
			chain_env: chain.chain_env.clone(),
			app_id: self.settings.app_id.clone(),
			zone: self.settings.zone.clone(),
			cluster: self.settings.cluster.clone(),
		}
	}

	pub fn solana_descriptor(
		&self,
		client: &SolanaClientConfig,
		transport_url: &str,
	) -> EndpointDescriptor {
		let key = ChainKey::Solana(client.chain_env.clone());
		EndpointDescriptor {
			id: EndpointId::derive(
				client.client_id.as_deref(),
				&client.provider,
				transport_url,
				client.transport_schema,
				&key,
			),
			chain: key,
			provider: client.provider.clone(),
			provider_website: client.provider_website.clone(),
			transport_schema: client.transport_schema,
			transport_url: redact_url(transport_url),
			chain_name: SOLANA_CHAIN_NAME.to_string(),
			chain_env: client.chain_env.clone(),
			app_id: self.settings.app_id.clone(),
			zone: self.settings.zone.clone(),
			cluster: self.settings.cluster.clone(),
		}
	}

	/// Adds `client` under `chain_id`. An endpoint with the same id is kept
	/// once; its id is returned either way.
	pub async fn insert_evm(&self, chain_id: u64, client: EvmClient<E>) -> EndpointId {
		self.evm
			.insert_unique(chain_id, Arc::new(client), |a, b| {
				a.descriptor().id == b.descriptor().id
			})
			.await
			.descriptor()
			.id
			.clone()
	}

	pub async fn insert_solana(&self, chain_env: &str, client: SolanaClient<S>) -> EndpointId {
		self.solana
			.insert_unique(chain_env.to_string(), Arc::new(client), |a, b| {
				a.descriptor().id == b.descriptor().id
			})
			.await
			.descriptor()
			.id
			.clone()
	}

	pub async fn select_evm(&self, chain_id: u64) -> Result<Arc<EvmClient<E>>, BlockChainError> {
		let candidates = self.evm.get(&chain_id).await;
		self.pick(&ChainKey::Evm(chain_id), &candidates)
	}

	pub async fn select_solana(
		&self,
		chain_env: &str,
	) -> Result<Arc<SolanaClient<S>>, BlockChainError> {
		let candidates = self.solana.get(&chain_env.to_string()).await;
		self.pick(&ChainKey::Solana(chain_env.to_string()), &candidates)
	}

	/// Registered keys, EVM chains first, each family in ascending order.
	pub async fn chain_keys(&self) -> Vec<ChainKey> {
		let mut keys: Vec<ChainKey> = self
			.evm
			.keys()
			.await
			.into_iter()
			.map(ChainKey::Evm)
			.chain(self.solana.keys().await.into_iter().map(ChainKey::Solana))
			.collect();
		keys.sort();
		keys
	}

	/// Descriptors registered under `key`, in selection order.
	pub async fn endpoints(&self, key: &ChainKey) -> Vec<EndpointDescriptor> {
		match key {
			ChainKey::Evm(chain_id) => self
				.evm
				.get(chain_id)
				.await
				.iter()
				.map(|c| c.descriptor().clone())
				.collect(),
			ChainKey::Solana(env) => self
				.solana
				.get(env)
				.await
				.iter()
				.map(|c| c.descriptor().clone())
				.collect(),
		}
	}

	/// Current breaker state of one endpoint, if it is registered.
	pub async fn breaker_state(&self, id: &EndpointId) -> Option<BreakerState> {
		for key in self.chain_keys().await {
			let state = match &key {
				ChainKey::Evm(chain_id) => self
					.evm
					.get(chain_id)
					.await
					.iter()
					.find(|c| &c.descriptor().id == id)
					.map(|c| c.breaker().state()),
				ChainKey::Solana(env) => self
					.solana
					.get(env)
					.await
					.iter()
					.find(|c| &c.descriptor().id == id)
					.map(|c| c.breaker().state()),
			};
			if state.is_some() {
				return state;
			}
		}
		None
	}

	pub async fn len(&self) -> usize {
		self.evm.len().await + self.solana.len().await
	}

	pub async fn is_empty(&self) -> bool {
		self.len().await == 0
	}

	fn pick<C: PooledClient>(
		&self,
		key: &ChainKey,
		candidates: &[Arc<C>],
	) -> Result<Arc<C>, BlockChainError> {
		if candidates.is_empty() {
			return Err(BlockChainError::no_client_available(
				format!("No endpoint is registered for {}", key),
				None,
				Some(HashMap::from([("chain".to_string(), key.to_string())])),
			));
		}

		let mut cursors = self.cursors.lock().unwrap_or_else(PoisonError::into_inner);
		let start = match self.settings.policy {
			SelectionPolicy::RoundRobin => cursors.get(key).copied().unwrap_or(0) % candidates.len(),
			SelectionPolicy::FirstAvailable => 0,
		};

		for offset in 0..candidates.len() {
			let index = (start + offset) % candidates.len();
			let candidate = &candidates[index];
			if candidate.breaker().try_acquire() {
				if self.settings.policy == SelectionPolicy::RoundRobin {
					cursors.insert(key.clone(), index + 1);
				}
				return Ok(candidate.clone());
			}
		}

		Err(BlockChainError::all_providers_unavailable(
			format!(
				"All {} endpoints for {} have an open circuit",
				candidates.len(),
				key
			),
			None,
			Some(HashMap::from([("chain".to_string(), key.to_string())])),
		))
	}
}

/// Rejects schemas other than `https` and URLs whose scheme differs from the
/// declared one.
fn check_transport(
	key: &ChainKey,
	provider: &str,
	schema: TransportSchema,
	transport_url: &str,
) -> Result<(), ConfigError> {
	let metadata = || {
		HashMap::from([
			("chain".to_string(), key.to_string()),
			("provider".to_string(), provider.to_string()),
		])
	};

	if !schema.is_routable() {
		let reason = if schema.is_secure() {
			"unsupported"
		} else {
			"insecure"
		};
		return Err(ConfigError::validation_error(
			format!(
				"Provider '{}' on {} uses {} transport '{}'",
				provider, key, reason, schema
			),
			None,
			Some(metadata()),
		));
	}

	let url = Url::parse(transport_url).map_err(|e| {
		ConfigError::validation_error(
			format!("Provider '{}' on {} has an invalid transport URL", provider, key),
			Some(Box::new(e)),
			Some(metadata()),
		)
	})?;
	if url.scheme() != schema.as_str() {
		return Err(ConfigError::validation_error(
			format!(
				"Provider '{}' on {} declares '{}' but its URL uses '{}'",
				provider,
				key,
				schema,
				url.scheme()
			),
			None,
			Some(metadata()),
		));
	}
	Ok(())
}

fn transport_failure(key: &ChainKey, provider: &str, error: TransportError) -> ConfigError {
	ConfigError::validation_error(
		format!("Provider '{}' on {} is not usable: {}", provider, key, error),
		Some(Box::new(error)),
		Some(HashMap::from([
			("chain".to_string(), key.to_string()),
			("provider".to_string(), provider.to_string()),
		])),
	)
}

impl ClientPool {
	/// Builds the pool from configuration.
	///
	/// Entries whose schema is not `https` are skipped with a warning; any other
	/// registration failure aborts.
	pub async fn from_config(
		config: &GatewayConfig,
		sink: Arc<dyn MetricsSink>,
	) -> Result<Self, ConfigError> {
		let pool = Self::new(PoolSettings::from(config), sink);

		for chain in config.evm_chains.values() {
			for client in &chain.clients {
				if !client.transport_schema.is_routable() {
					warn!(
						chain_id = chain.chain_id,
						provider = %client.provider,
						schema = %client.transport_schema,
						"Skipping provider with an unroutable transport"
					);
					continue;
				}
				pool.register_evm(chain, client).await?;
			}
		}

		for client in &config.solana_chains {
			if !client.transport_schema.is_routable() {
				warn!(
					chain_env = %client.chain_env,
					provider = %client.provider,
					schema = %client.transport_schema,
					"Skipping provider with an unroutable transport"
				);
				continue;
			}
			pool.register_solana(client).await?;
		}

		for key in pool.chain_keys().await {
			let endpoints = pool.endpoints(&key).await;
			info!(
				chain = %key,
				endpoints = endpoints.len(),
				providers = ?endpoints.iter().map(|e| e.provider.as_str()).collect::<Vec<_>>(),
				"Registered chain"
			);
		}

		Ok(pool)
	}

	/// Validates and registers one EVM provider. Nothing is inserted on error.
	pub async fn register_evm(
		&self,
		chain: &EvmChainConfig,
		client: &EvmClientConfig,
	) -> Result<EndpointId, ConfigError> {
		let key = ChainKey::Evm(chain.chain_id);
		let url = client.transport_url.resolve().map_err(|e| {
			ConfigError::parse_error(
				format!("Cannot resolve the transport URL of '{}' on {}", client.provider, key),
				Some(e),
				None,
			)
		})?;
		check_transport(&key, &client.provider, client.transport_schema, url.as_str())?;

		let gas_policy = GasPolicy::from_overrides(
			client.gas_fee_rate,
			client.gas_limit_rate,
			client.gas_limit_max,
		);
		gas_policy.validate().map_err(|e| {
			ConfigError::validation_error(
				format!("Provider '{}' on {}: {}", client.provider, key, e),
				None,
				None,
			)
		})?;
		let signers = SignerStore::from_secrets(&client.signers).map_err(|e| {
			ConfigError::validation_error(
				format!("Provider '{}' on {} has an invalid signer", client.provider, key),
				Some(e),
				None,
			)
		})?;

		let transport = EvmTransportClient::new(
			url.as_str(),
			&self.settings.retry,
			self.settings.request_timeout,
		)
		.map_err(|e| transport_failure(&key, &client.provider, e))?;
		if self.settings.probe_on_startup {
			transport
				.probe()
				.await
				.map_err(|e| transport_failure(&key, &client.provider, e))?;
		}

		let descriptor = self.evm_descriptor(chain, client, url.as_str());
		let endpoint = self.endpoint(descriptor, transport);
		let id = self
			.insert_evm(
				chain.chain_id,
				EvmClient::new_with_transport(endpoint, gas_policy, signers),
			)
			.await;
		Ok(id)
	}

	/// Validates and registers one Solana provider. Nothing is inserted on error.
	pub async fn register_solana(
		&self,
		client: &SolanaClientConfig,
	) -> Result<EndpointId, ConfigError> {
		let key = ChainKey::Solana(client.chain_env.clone());
		let url = client.transport_url.resolve().map_err(|e| {
			ConfigError::parse_error(
				format!("Cannot resolve the transport URL of '{}' on {}", client.provider, key),
				Some(e),
				None,
			)
		})?;
		check_transport(&key, &client.provider, client.transport_schema, url.as_str())?;

		let transport = SolanaTransportClient::new(
			url.as_str(),
			&self.settings.retry,
			self.settings.request_timeout,
		)
		.map_err(|e| transport_failure(&key, &client.provider, e))?;
		if self.settings.probe_on_startup {
			transport
				.probe()
				.await
				.map_err(|e| transport_failure(&key, &client.provider, e))?;
		}

		let descriptor = self.solana_descriptor(client, url.as_str());
		let endpoint = self.endpoint(descriptor, transport);
		let id = self
			.insert_solana(&client.chain_env, SolanaClient::new_with_transport(endpoint))
			.await;
		Ok(id)
	}
}

#[async_trait]
impl<E, S> ClientPoolTrait for ClientPool<E, S>
where
	E: crate::services::blockchain::BlockchainTransport + 'static,
	S: crate::services::blockchain::BlockchainTransport + 'static,
{
	type EvmClient = EvmClient<E>;
	type SolanaClient = SolanaClient<S>;

	async fn select_evm(&self, chain_id: u64) -> Result<Arc<Self::EvmClient>, BlockChainError> {
		ClientPool::select_evm(self, chain_id).await
	}

	async fn select_solana(
		&self,
		chain_env: &str,
	) -> Result<Arc<Self::SolanaClient>, BlockChainError> {
		ClientPool::select_solana(self, chain_env).await
	}

	async fn chain_keys(&self) -> Vec<ChainKey> {
		ClientPool::chain_keys(self).await
	}

	async fn endpoints(&self, key: &ChainKey) -> Vec<EndpointDescriptor> {
		ClientPool::endpoints(self, key).await
	}
}
