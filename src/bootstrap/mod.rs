//! Bootstrap module for loading configuration and building the gateway.
//!
//! Startup is fail-fast: an unreadable or invalid configuration, or a
//! provider that cannot be registered, aborts before any server starts.

use std::{
	env,
	error::Error,
	path::{Path, PathBuf},
	sync::Arc,
};
use tracing::info;

use crate::{
	models::{ChainKey, ConfigLoader, GatewayConfig, DEFAULT_CONFIG_PATH},
	services::{blockchain::ClientPool, dispatch::Dispatcher},
	utils::metrics::MetricsSink,
};

/// Type alias for handling ServiceResult
pub type Result<T> = std::result::Result<T, Box<dyn Error>>;

/// Environment variable overriding the configuration path
pub const CONFIG_PATH_ENV: &str = "GATEWAY_CONFIG_PATH";

/// Configuration path: the CLI value, then `GATEWAY_CONFIG_PATH`, then the default.
pub fn resolve_config_path(cli_path: Option<&str>) -> PathBuf {
	cli_path
		.map(PathBuf::from)
		.or_else(|| env::var(CONFIG_PATH_ENV).ok().map(PathBuf::from))
		.unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}

/// Loads the configuration and builds the dispatcher over a populated pool.
///
/// # Errors
/// Returns an error if the configuration cannot be loaded or any provider
/// fails to register
pub async fn initialize_services(
	config_path: &Path,
	sink: Arc<dyn MetricsSink>,
) -> Result<(GatewayConfig, Dispatcher<ClientPool>)> {
	let config = GatewayConfig::load_from_path(config_path).await?;
	let pool = ClientPool::from_config(&config, sink).await?;

	let keys = pool.chain_keys().await;
	let evm_chains = keys
		.iter()
		.filter(|k| matches!(k, ChainKey::Evm(_)))
		.count();
	info!(
		path = %config_path.display(),
		evm_chains,
		solana_envs = keys.len() - evm_chains,
		endpoints = pool.len().await,
		"Gateway initialized"
	);

	Ok((config, Dispatcher::new(Arc::new(pool))))
}
