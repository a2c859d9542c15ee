//! Configuration loading and validation.
//!
//! The gateway reads a single JSON document describing every chain and
//! provider. Loading resolves secrets, then validates; any failure is fatal
//! at startup.

#![allow(clippy::result_large_err)]

use async_trait::async_trait;
use std::path::Path;

mod error;
mod gateway_config;

pub use error::ConfigError;
pub use gateway_config::DEFAULT_CONFIG_PATH;

/// Common interface for loading configuration files.
#[async_trait]
pub trait ConfigLoader: Sized {
	/// Reads, resolves secrets and validates a configuration file.
	async fn load_from_path(path: &Path) -> Result<Self, ConfigError>;

	/// Checks the configuration for structural and semantic errors.
	fn validate(&self) -> Result<(), ConfigError>;

	/// Warns about transports the pool will not register. Never fails.
	fn validate_protocol(&self);

	/// Replaces secret references with their resolved values.
	async fn resolve_secrets(&self) -> Result<Self, ConfigError>;

	fn is_json_file(path: &Path) -> bool {
		path.extension()
			.map(|ext| ext.to_string_lossy().to_lowercase() == "json")
			.unwrap_or(false)
	}
}
