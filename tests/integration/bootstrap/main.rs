use once_cell::sync::Lazy;
use serde_json::json;
use std::{io::Write, path::PathBuf, sync::Arc, sync::Mutex};
use tempfile::NamedTempFile;

use web3_gateway::{
	bootstrap::{initialize_services, resolve_config_path, CONFIG_PATH_ENV},
	models::{ChainKey, DEFAULT_CONFIG_PATH},
	utils::metrics::NoopMetricsSink,
};

static CONFIG_PATH_LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));

fn write_config(value: serde_json::Value) -> NamedTempFile {
	let mut file = tempfile::Builder::new()
		.suffix(".json")
		.tempfile()
		.unwrap();
	file.write_all(value.to_string().as_bytes()).unwrap();
	file
}

fn two_chain_config() -> serde_json::Value {
	json!({
		"evm_chains": {
			"1": {
				"chain_id": 1,
				"chain_name": "Ethereum Mainnet",
				"clients": [
					{
						"client_id": "ankr",
						"provider": "Ankr",
						"transport_schema": "https",
						"transport_url": {"type": "plain", "value": "https://rpc.ankr.com/eth/secret-key"}
					},
					{
						"provider": "Local",
						"transport_schema": "http",
						"transport_url": {"type": "plain", "value": "http://localhost:8545"}
					}
				]
			}
		},
		"solana_chains": [
			{
				"provider": "Solana Labs",
				"transport_schema": "https",
				"chain_env": "devnet",
				"transport_url": {"type": "plain", "value": "https://api.devnet.solana.com"}
			}
		]
	})
}

#[tokio::test]
async fn test_initialize_services_builds_pool() {
	let file = write_config(two_chain_config());

	let (config, dispatcher) = initialize_services(file.path(), Arc::new(NoopMetricsSink))
		.await
		.unwrap();

	assert_eq!(config.evm_chains.len(), 1);
	let pool = dispatcher.pool();
	let keys = pool.chain_keys().await;
	assert!(keys.contains(&ChainKey::Evm(1)));
	assert!(keys.contains(&ChainKey::Solana("devnet".to_string())));

	// the plain-http provider is skipped, and urls are kept without their path
	let endpoints = pool.endpoints(&ChainKey::Evm(1)).await;
	assert_eq!(endpoints.len(), 1);
	assert_eq!(endpoints[0].transport_url, "https://rpc.ankr.com");
	assert!(!endpoints[0].transport_url.contains("secret-key"));
}

#[tokio::test]
async fn test_environment_secrets_are_resolved() {
	std::env::set_var("WEB3_GATEWAY_BOOTSTRAP_URL", "https://eth.example.org/v2/abc");
	let file = write_config(json!({
		"evm_chains": {
			"10": {
				"chain_id": 10,
				"chain_name": "OP Mainnet",
				"clients": [{
					"provider": "Example",
					"transport_schema": "https",
					"transport_url": {"type": "environment", "value": "WEB3_GATEWAY_BOOTSTRAP_URL"}
				}]
			}
		}
	}));

	let (_, dispatcher) = initialize_services(file.path(), Arc::new(NoopMetricsSink))
		.await
		.unwrap();
	let endpoints = dispatcher.pool().endpoints(&ChainKey::Evm(10)).await;
	assert_eq!(endpoints[0].transport_url, "https://eth.example.org");
	std::env::remove_var("WEB3_GATEWAY_BOOTSTRAP_URL");
}

#[tokio::test]
async fn test_unset_environment_secret_fails() {
	let file = write_config(json!({
		"evm_chains": {
			"1": {
				"chain_id": 1,
				"chain_name": "Ethereum Mainnet",
				"clients": [{
					"provider": "Example",
					"transport_schema": "https",
					"transport_url": {"type": "environment", "value": "WEB3_GATEWAY_NEVER_SET"}
				}]
			}
		}
	}));

	let result = initialize_services(file.path(), Arc::new(NoopMetricsSink)).await;
	assert!(result.is_err());
}

#[tokio::test]
async fn test_invalid_configuration_fails() {
	let mut file = tempfile::Builder::new()
		.suffix(".json")
		.tempfile()
		.unwrap();
	file.write_all(b"{ \"evm_chains\": ").unwrap();
	assert!(initialize_services(file.path(), Arc::new(NoopMetricsSink))
		.await
		.is_err());

	let mismatched = write_config(json!({
		"evm_chains": {
			"1": {"chain_id": 5, "chain_name": "Goerli", "clients": []}
		}
	}));
	assert!(initialize_services(mismatched.path(), Arc::new(NoopMetricsSink))
		.await
		.is_err());

	let missing = PathBuf::from("/nonexistent/gateway.json");
	assert!(initialize_services(&missing, Arc::new(NoopMetricsSink))
		.await
		.is_err());
}

#[tokio::test]
async fn test_shipped_configuration_loads() {
	let path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join(DEFAULT_CONFIG_PATH);

	let (config, dispatcher) = initialize_services(&path, Arc::new(NoopMetricsSink))
		.await
		.unwrap();

	assert!(config.evm_chains.contains_key(&1));
	assert!(!dispatcher.pool().is_empty().await);
}

#[test]
fn test_config_path_resolution_order() {
	let _guard = CONFIG_PATH_LOCK.lock().unwrap();

	std::env::remove_var(CONFIG_PATH_ENV);
	assert_eq!(resolve_config_path(None), PathBuf::from(DEFAULT_CONFIG_PATH));

	std::env::set_var(CONFIG_PATH_ENV, "/srv/gateway.json");
	assert_eq!(resolve_config_path(None), PathBuf::from("/srv/gateway.json"));
	assert_eq!(
		resolve_config_path(Some("cli.json")),
		PathBuf::from("cli.json")
	);
	std::env::remove_var(CONFIG_PATH_ENV);
}
