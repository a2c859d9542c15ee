//! Multi-chain RPC gateway entry point.
//!
//! Loads the gateway configuration, registers every configured provider and
//! serves the JSON-RPC routes until interrupted.
//!
//! # Flow
//! 1. Applies CLI options to the environment and sets up logging
//! 2. Loads and validates the configuration (fatal on error)
//! 3. Builds the client pool and the dispatcher
//! 4. Starts the gateway server and, optionally, the metrics server
//! 5. Handles graceful shutdown on Ctrl+C

pub mod api;
pub mod bootstrap;
pub mod models;
pub mod services;
pub mod utils;

use crate::{
	api::create_gateway_server,
	bootstrap::{initialize_services, resolve_config_path, Result},
	models::{ConfigLoader, GatewayConfig},
	utils::{
		logging::setup_logging,
		metrics::{server::create_metrics_server, MetricsSink, NoopMetricsSink, PrometheusMetricsSink},
		parse_log_file_size,
	},
};

use clap::Parser;
use dotenvy::dotenv_override;
use std::env::{set_var, var};
use std::sync::Arc;
use tracing::{error, info};

const DEFAULT_BIND_ADDRESS: &str = "127.0.0.1:8080";
const DEFAULT_METRICS_ADDRESS: &str = "127.0.0.1:8081";

#[derive(Parser)]
#[command(
	name = "web3-gateway",
	about = "A multi-chain JSON-RPC gateway that pools EVM and Solana providers behind circuit breakers and signs outgoing transactions.",
	version
)]
struct Cli {
	/// Write logs to file instead of stdout
	#[arg(long)]
	log_file: bool,

	/// Set log level (trace, debug, info, warn, error)
	#[arg(long, value_name = "LEVEL")]
	log_level: Option<String>,

	/// Path to store log files (default: logs/)
	#[arg(long, value_name = "PATH")]
	log_path: Option<String>,

	/// Maximum log file size before rolling (e.g., "1GB", "500MB", "1024KB")
	#[arg(long, value_name = "SIZE", value_parser = parse_log_file_size)]
	log_max_size: Option<u64>,

	/// Address to start the metrics server on (default: 127.0.0.1:8081)
	#[arg(long, value_name = "HOST:PORT")]
	metrics_address: Option<String>,

	/// Enable metrics server
	#[arg(long)]
	metrics: bool,

	/// Address to serve the gateway API on (default: 127.0.0.1:8080)
	#[arg(long, value_name = "HOST:PORT")]
	bind_address: Option<String>,

	/// Path to the gateway configuration (default: config/gateway.json)
	#[arg(long, value_name = "CONFIG_PATH")]
	config: Option<String>,

	/// Validate the configuration file without starting the service
	#[arg(long)]
	check: bool,
}

impl Cli {
	/// Apply CLI options to environment variables, overriding any existing values
	fn apply_to_env(&self) {
		// Reload environment variables from .env file
		dotenv_override().ok();

		if self.log_file {
			set_var("LOG_MODE", "file");
		}

		if let Ok(level) = var("RUST_LOG") {
			set_var("LOG_LEVEL", level);
		}

		if let Some(level) = &self.log_level {
			set_var("LOG_LEVEL", level);
			set_var("RUST_LOG", level);
		}

		if let Some(path) = &self.log_path {
			set_var("LOG_DATA_DIR", path);
		}

		if let Some(max_size) = &self.log_max_size {
			set_var("LOG_MAX_SIZE", max_size.to_string());
		}

		if self.metrics {
			set_var("METRICS_ENABLED", "true");
		}
	}
}

/// Main entry point for the gateway.
///
/// # Errors
/// Returns an error if configuration loading or provider registration fails,
/// or if a server cannot bind its address.
#[actix_web::main]
async fn main() -> Result<()> {
	let cli = Cli::parse();
	cli.apply_to_env();

	setup_logging().unwrap_or_else(|e| {
		eprintln!("Failed to setup logging: {}", e);
	});

	let config_path = resolve_config_path(cli.config.as_deref());

	if cli.check {
		return validate_configuration(&config_path).await;
	}

	let metrics_enabled =
		cli.metrics || var("METRICS_ENABLED").map(|v| v == "true").unwrap_or(false);

	let prometheus = if metrics_enabled {
		Some(Arc::new(PrometheusMetricsSink::new()?))
	} else {
		None
	};
	let sink: Arc<dyn MetricsSink> = match &prometheus {
		Some(sink) => sink.clone() as Arc<dyn MetricsSink>,
		None => Arc::new(NoopMetricsSink),
	};

	let (_, dispatcher) = initialize_services(&config_path, sink)
		.await
		.map_err(|e| anyhow::anyhow!("Failed to initialize gateway from {}: {}", config_path.display(), e))?;

	let bind_address = cli
		.bind_address
		.or_else(|| var("BIND_ADDRESS").ok())
		.unwrap_or_else(|| DEFAULT_BIND_ADDRESS.to_string());
	let gateway_server = create_gateway_server(bind_address, dispatcher)?;

	let metrics_server = match prometheus {
		Some(sink) => {
			let metrics_address = cli
				.metrics_address
				.or_else(|| var("METRICS_ADDRESS").ok())
				.unwrap_or_else(|| DEFAULT_METRICS_ADDRESS.to_string());
			match create_metrics_server(metrics_address, sink) {
				Ok(server) => Some(server),
				Err(e) => {
					error!("Failed to create metrics server: {}", e);
					None
				}
			}
		}
		None => {
			info!("Metrics server disabled. Use --metrics flag or METRICS_ENABLED=true to enable");
			None
		}
	};

	info!("Gateway started. Press Ctrl+C to shutdown");

	let gateway_handle = gateway_server.handle();
	let metrics_handle = metrics_server.as_ref().map(|server| server.handle());
	let metrics_future = async move {
		match metrics_server {
			Some(server) => server.await,
			None => std::future::pending().await,
		}
	};

	tokio::select! {
		result = tokio::signal::ctrl_c() => {
			if let Err(e) = result {
				error!("Error waiting for Ctrl+C: {}", e);
			}
			info!("Shutdown signal received, stopping servers...");
		}
		result = gateway_server => {
			if let Err(e) = result {
				error!("Gateway server error: {}", e);
			}
			info!("Gateway server stopped, shutting down...");
		}
		result = metrics_future => {
			if let Err(e) = result {
				error!("Metrics server error: {}", e);
			}
			info!("Metrics server stopped, shutting down...");
		}
	}

	gateway_handle.stop(true).await;
	if let Some(handle) = metrics_handle {
		handle.stop(true).await;
	}

	info!("Shutdown complete");
	Ok(())
}

/// Loads the configuration and reports what would be registered.
async fn validate_configuration(path: &std::path::Path) -> Result<()> {
	info!("Validating configuration file {}...", path.display());

	match GatewayConfig::load_from_path(path).await {
		Ok(config) => {
			let endpoints: usize = config
				.evm_chains
				.values()
				.map(|chain| chain.clients.len())
				.sum::<usize>()
				+ config.solana_chains.len();
			info!(
				"✓ Found {} EVM chain(s), {} Solana endpoint(s), {} endpoint(s) in total",
				config.evm_chains.len(),
				config.solana_chains.len(),
				endpoints
			);
			info!("Configuration validation completed successfully!");
			Ok(())
		}
		Err(e) => {
			error!("{}", e);
			Err(Box::new(e))
		}
	}
}
