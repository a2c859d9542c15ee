//! Gateway configuration loading and validation.
//!
//! Implements [`ConfigLoader`] for [`GatewayConfig`].

use async_trait::async_trait;
use std::{collections::HashMap, path::Path};

use crate::models::{
	blockchain::evm::GasPolicy, config::error::ConfigError, ConfigLoader, GatewayConfig,
	SecretValue,
};

/// Location used when neither `--config` nor `GATEWAY_CONFIG_PATH` is set.
pub const DEFAULT_CONFIG_PATH: &str = "config/gateway.json";

fn path_metadata(path: &Path) -> Option<HashMap<String, String>> {
	Some(HashMap::from([(
		"path".to_string(),
		path.display().to_string(),
	)]))
}

fn resolve_secret(secret: &SecretValue, what: &str) -> Result<SecretValue, ConfigError> {
	let resolved = secret.resolve().map_err(|e| {
		ConfigError::parse_error(format!("failed to resolve {}", what), Some(e), None)
	})?;
	Ok(SecretValue::Plain(resolved))
}

#[async_trait]
impl ConfigLoader for GatewayConfig {
	async fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
		if !Self::is_json_file(path) {
			return Err(ConfigError::file_error(
				"gateway config must be a .json file",
				None,
				path_metadata(path),
			));
		}

		let file = std::fs::File::open(path).map_err(|e| {
			ConfigError::file_error(
				format!("failed to open gateway config file: {}", e),
				Some(Box::new(e)),
				path_metadata(path),
			)
		})?;
		let config: GatewayConfig = serde_json::from_reader(file).map_err(|e| {
			ConfigError::parse_error(
				format!("failed to parse gateway config: {}", e),
				Some(Box::new(e)),
				path_metadata(path),
			)
		})?;

		let config = config.resolve_secrets().await?;
		config.validate()?;
		config.validate_protocol();

		Ok(config)
	}

	async fn resolve_secrets(&self) -> Result<Self, ConfigError> {
		let mut config = self.clone();

		for chain in config.evm_chains.values_mut() {
			for client in chain.clients.iter_mut() {
				client.transport_url = resolve_secret(
					&client.transport_url,
					&format!("transport_url of {} on chain {}", client.provider, chain.chain_id),
				)?;
				for signer in client.signers.iter_mut() {
					*signer = resolve_secret(
						signer,
						&format!("signer of {} on chain {}", client.provider, chain.chain_id),
					)?;
				}
			}
		}

		for client in config.solana_chains.iter_mut() {
			client.transport_url = resolve_secret(
				&client.transport_url,
				&format!("transport_url of {} on solana {}", client.provider, client.chain_env),
			)?;
		}

		Ok(config)
	}

	fn validate(&self) -> Result<(), ConfigError> {
		for (label, value) in [
			("app_id", &self.app_id),
			("zone", &self.zone),
			("cluster", &self.cluster),
		] {
			if value.trim().is_empty() {
				return Err(ConfigError::validation_error(
					format!("{} must not be empty", label),
					None,
					None,
				));
			}
		}

		if self.request_timeout_ms == 0 {
			return Err(ConfigError::validation_error(
				"request_timeout_ms must be greater than zero",
				None,
				None,
			));
		}

		let breaker = &self.circuit_breaker;
		if breaker.buckets == 0 || breaker.window_ms < breaker.buckets as u64 {
			return Err(ConfigError::validation_error(
				"circuit_breaker.window_ms must cover at least one millisecond per bucket",
				None,
				None,
			));
		}
		if !(breaker.failure_ratio > 0.0 && breaker.failure_ratio <= 1.0) {
			return Err(ConfigError::validation_error(
				format!(
					"circuit_breaker.failure_ratio must be in (0, 1], got {}",
					breaker.failure_ratio
				),
				None,
				None,
			));
		}
		if breaker.minimum_requests == 0 || breaker.open_duration_ms == 0 {
			return Err(ConfigError::validation_error(
				"circuit_breaker.minimum_requests and open_duration_ms must be greater than zero",
				None,
				None,
			));
		}

		for (key, chain) in &self.evm_chains {
			let chain_meta = Some(HashMap::from([(
				"chain_id".to_string(),
				chain.chain_id.to_string(),
			)]));
			if *key != chain.chain_id {
				return Err(ConfigError::validation_error(
					format!("evm_chains key {} does not match chain_id {}", key, chain.chain_id),
					None,
					chain_meta,
				));
			}
			if chain.chain_name.trim().is_empty() {
				return Err(ConfigError::validation_error(
					"chain_name is required",
					None,
					chain_meta,
				));
			}
			for client in &chain.clients {
				if client.provider.trim().is_empty() || client.transport_url.is_empty() {
					return Err(ConfigError::validation_error(
						"every client needs a provider and a transport_url",
						None,
						chain_meta,
					));
				}
				GasPolicy::from_overrides(
					client.gas_fee_rate,
					client.gas_limit_rate,
					client.gas_limit_max,
				)
				.validate()
				.map_err(|e| {
					ConfigError::validation_error(
						format!("invalid gas policy for {}: {}", client.provider, e),
						None,
						chain_meta.clone(),
					)
				})?;
				if client.signers.iter().any(SecretValue::is_empty) {
					return Err(ConfigError::validation_error(
						format!("empty signer entry for {}", client.provider),
						None,
						chain_meta,
					));
				}
			}
		}

		for client in &self.solana_chains {
			if client.chain_env.trim().is_empty()
				|| client.provider.trim().is_empty()
				|| client.transport_url.is_empty()
			{
				return Err(ConfigError::validation_error(
					"every solana client needs a chain_env, a provider and a transport_url",
					None,
					None,
				));
			}
		}

		Ok(())
	}

	fn validate_protocol(&self) {
		let evm = self.evm_chains.values().flat_map(|chain| {
			chain
				.clients
				.iter()
				.map(move |c| (format!("evm:{}", chain.chain_id), &c.provider, c.transport_schema))
		});
		let solana = self
			.solana_chains
			.iter()
			.map(|c| (format!("solana:{}", c.chain_env), &c.provider, c.transport_schema));

		for (chain, provider, schema) in evm.chain(solana) {
			if !schema.is_routable() {
				tracing::warn!(
					chain = %chain,
					provider = %provider,
					schema = %schema,
					"Provider transport is insecure or unsupported and will not be registered"
				);
			}
		}
	}
}
