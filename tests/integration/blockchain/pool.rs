use serde_json::json;
use std::{collections::HashMap, sync::Arc};

use web3_gateway::{
	models::{ChainKey, SelectionPolicy},
	services::{
		blockchain::{
			BlockChainError, BreakerState, ClientPool, ClientPoolTrait, EvmClientTrait,
			PoolSettings, PooledClient, TransportError,
		},
		transaction::SignerStore,
	},
	utils::{
		metrics::NoopMetricsSink,
		tests::builders::gateway::{EvmClientConfigBuilder, GatewayConfigBuilder},
	},
};

use crate::integration::mocks::{
	fragile_settings, mock_evm_client, mock_pool, mock_solana_client, scripted_evm_transport,
	scripted_solana_transport, MockEvmTransportClient, MockPool,
};

fn healthy_transport() -> MockEvmTransportClient {
	scripted_evm_transport(HashMap::from([("eth_chainId", json!("0x1"))]))
}

fn failing_transport() -> MockEvmTransportClient {
	let mut transport = MockEvmTransportClient::new();
	transport
		.expect_send_raw_request()
		.returning(|_, _| Err(TransportError::network("connection reset", None, None)));
	transport
}

async fn pool_of(settings: PoolSettings, ids: &[&str]) -> MockPool {
	let pool = mock_pool(settings, Arc::new(NoopMetricsSink));
	for id in ids {
		let client = mock_evm_client(&pool, id, 1, healthy_transport(), SignerStore::default());
		pool.insert_evm(1, client).await;
	}
	pool
}

#[tokio::test]
async fn test_select_unknown_chain_is_no_client_available() {
	let pool = pool_of(PoolSettings::default(), &["a"]).await;

	let result = pool.select_evm(137).await;
	assert!(matches!(result, Err(BlockChainError::NoClientAvailable(_))));

	let result = pool.select_solana("devnet").await;
	assert!(matches!(result, Err(BlockChainError::NoClientAvailable(_))));
}

#[tokio::test]
async fn test_round_robin_rotates_through_endpoints() {
	let pool = pool_of(PoolSettings::default(), &["a", "b", "c"]).await;

	let mut picked = Vec::new();
	for _ in 0..6 {
		let client = pool.select_evm(1).await.unwrap();
		picked.push(client.descriptor().id.to_string());
	}
	assert_eq!(picked, vec!["a", "b", "c", "a", "b", "c"]);
}

#[tokio::test]
async fn test_first_available_prefers_configuration_order() {
	let settings = PoolSettings {
		policy: SelectionPolicy::FirstAvailable,
		..PoolSettings::default()
	};
	let pool = pool_of(settings, &["a", "b"]).await;

	for _ in 0..3 {
		let client = pool.select_evm(1).await.unwrap();
		assert_eq!(client.descriptor().id.as_str(), "a");
	}
}

#[tokio::test]
async fn test_open_breaker_is_skipped() {
	let pool = mock_pool(fragile_settings(), Arc::new(NoopMetricsSink));
	let bad = mock_evm_client(&pool, "bad", 1, failing_transport(), SignerStore::default());
	let good = mock_evm_client(&pool, "good", 1, healthy_transport(), SignerStore::default());
	let bad_id = pool.insert_evm(1, bad).await;
	pool.insert_evm(1, good).await;

	let first = pool.select_evm(1).await.unwrap();
	assert_eq!(first.descriptor().id, bad_id);
	assert!(first.chain_id().await.is_err());
	assert_eq!(pool.breaker_state(&bad_id).await, Some(BreakerState::Open));

	for _ in 0..4 {
		let client = pool.select_evm(1).await.unwrap();
		assert_eq!(client.descriptor().id.as_str(), "good");
		assert_eq!(client.chain_id().await.unwrap(), 1);
	}
}

#[tokio::test]
async fn test_all_breakers_open_is_all_providers_unavailable() {
	let pool = mock_pool(fragile_settings(), Arc::new(NoopMetricsSink));
	for id in ["a", "b"] {
		let client = mock_evm_client(&pool, id, 1, failing_transport(), SignerStore::default());
		pool.insert_evm(1, client).await;
	}

	for _ in 0..2 {
		let client = pool.select_evm(1).await.unwrap();
		let error = client.block_number().await.unwrap_err();
		assert!(error.transport_url().is_some());
	}

	let result = pool.select_evm(1).await;
	assert!(matches!(
		result,
		Err(BlockChainError::AllProvidersUnavailable(_))
	));
}

#[tokio::test]
async fn test_node_errors_keep_breaker_closed() {
	let pool = mock_pool(fragile_settings(), Arc::new(NoopMetricsSink));
	let transport = scripted_evm_transport(HashMap::new());
	let id = pool
		.insert_evm(
			1,
			mock_evm_client(&pool, "a", 1, transport, SignerStore::default()),
		)
		.await;

	for _ in 0..3 {
		let client = pool.select_evm(1).await.unwrap();
		assert!(client.gas_price().await.is_err());
	}
	assert_eq!(pool.breaker_state(&id).await, Some(BreakerState::Closed));
}

#[tokio::test]
async fn test_duplicate_endpoint_is_kept_once() {
	let pool = pool_of(PoolSettings::default(), &["a", "a"]).await;
	assert_eq!(pool.len().await, 1);
	assert_eq!(pool.endpoints(&ChainKey::Evm(1)).await.len(), 1);
}

#[tokio::test]
async fn test_chain_keys_and_endpoints() {
	let pool = pool_of(PoolSettings::default(), &["a", "b"]).await;
	let solana = mock_solana_client(
		&pool,
		"sol",
		"devnet",
		scripted_solana_transport(HashMap::new()),
	);
	pool.insert_solana("devnet", solana).await;

	let keys = ClientPoolTrait::chain_keys(&pool).await;
	assert_eq!(
		keys,
		vec![ChainKey::Evm(1), ChainKey::Solana("devnet".to_string())]
	);

	let endpoints = ClientPoolTrait::endpoints(&pool, &ChainKey::Evm(1)).await;
	let providers: Vec<_> = endpoints.iter().map(|e| e.provider.as_str()).collect();
	assert_eq!(providers, vec!["a", "b"]);

	let solana = pool.select_solana("devnet").await.unwrap();
	assert_eq!(solana.descriptor().chain_name, "Solana");
	assert!(!pool.is_empty().await);
}

#[tokio::test]
async fn test_from_config_skips_insecure_providers() {
	let config = GatewayConfigBuilder::new()
		.evm_chain(
			1,
			"Ethereum",
			vec![
				EvmClientConfigBuilder::new()
					.provider("Secure")
					.url("https://rpc.secure.test/v2/key")
					.build(),
				EvmClientConfigBuilder::new()
					.provider("Local")
					.url("http://localhost:8545")
					.build(),
			],
		)
		.solana_client("devnet", "Solana Labs", "https://api.devnet.solana.com")
		.build();

	let pool = ClientPool::from_config(&config, Arc::new(NoopMetricsSink))
		.await
		.unwrap();

	let endpoints = pool.endpoints(&ChainKey::Evm(1)).await;
	assert_eq!(endpoints.len(), 1);
	assert_eq!(endpoints[0].provider, "Secure");
	assert_eq!(endpoints[0].transport_url, "https://rpc.secure.test");
	assert_eq!(pool.len().await, 2);
}

#[tokio::test]
async fn test_websocket_providers_are_never_selectable() {
	let config = GatewayConfigBuilder::new()
		.evm_chain(
			1,
			"Ethereum",
			vec![
				EvmClientConfigBuilder::new()
					.provider("Streaming")
					.url("wss://rpc.stream.test/ws")
					.build(),
				EvmClientConfigBuilder::new()
					.provider("Secure")
					.url("https://rpc.secure.test")
					.build(),
			],
		)
		.solana_client("mainnet", "Streaming", "wss://api.stream.test")
		.build();

	let pool = ClientPool::from_config(&config, Arc::new(NoopMetricsSink))
		.await
		.unwrap();

	let endpoints = pool.endpoints(&ChainKey::Evm(1)).await;
	assert_eq!(endpoints.len(), 1);
	assert_eq!(endpoints[0].provider, "Secure");
	assert!(matches!(
		pool.select_solana("mainnet").await,
		Err(BlockChainError::NoClientAvailable(_))
	));

	let chain = &config.evm_chains[&1];
	let result = pool.register_evm(chain, &chain.clients[0]).await;
	let Err(error) = result else {
		panic!("wss provider must be rejected");
	};
	assert!(error.to_string().contains("wss"));
	assert!(pool
		.register_solana(&config.solana_chains[0])
		.await
		.is_err());
	assert_eq!(pool.len().await, 1);
}

#[tokio::test]
async fn test_register_rejects_invalid_signer() {
	let config = GatewayConfigBuilder::new()
		.evm_chain(
			1,
			"Ethereum",
			vec![EvmClientConfigBuilder::new().signer("not-a-key").build()],
		)
		.build();

	let result = ClientPool::from_config(&config, Arc::new(NoopMetricsSink)).await;
	let Err(error) = result else {
		panic!("expected a configuration error");
	};
	assert!(error.to_string().contains("invalid signer"));
	assert!(!error.to_string().contains("not-a-key"));
}
