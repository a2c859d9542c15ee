use alloy::primitives::{keccak256, Address, Bytes, B256, U256};
use mockall::predicate;
use serde_json::{json, Value};
use std::{str::FromStr, sync::Arc};

use web3_gateway::{
	models::{BlockNumberOrTag, BlockRef, CallRequest},
	services::{
		blockchain::{BlockChainError, EvmClientTrait, TransportError, RPC_ERROR_CODE_KEY},
		transaction::SignerStore,
	},
	utils::{
		logging::error::TraceableError,
		metrics::{CallStatus, NoopMetricsSink},
		tests::builders::endpoint::RecordingMetricsSink,
	},
};

use crate::integration::mocks::{
	mock_evm_client, mock_pool, rpc_result, MockEvmTransportClient,
};

const DEV_KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
const DEV_ADDRESS: &str = "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266";

fn expect_call(transport: &mut MockEvmTransportClient, method: &'static str, params: Vec<Value>, result: Value) {
	transport
		.expect_send_raw_request()
		.with(predicate::eq(method), predicate::eq(Some(params)))
		.times(1)
		.returning(move |_, _| Ok(rpc_result(result.clone())));
}

#[tokio::test]
async fn test_block_number_is_decoded_and_recorded() {
	let sink = Arc::new(RecordingMetricsSink::default());
	let pool = mock_pool(Default::default(), sink.clone());
	let mut transport = MockEvmTransportClient::new();
	expect_call(&mut transport, "eth_blockNumber", vec![], json!("0x1053c8e"));

	let client = mock_evm_client(&pool, "ankr", 1, transport, SignerStore::default());
	assert_eq!(client.block_number().await.unwrap(), 17177806);

	let records = sink.records();
	assert_eq!(records.len(), 1);
	assert_eq!(records[0].method, "eth_blockNumber");
	assert_eq!(records[0].status, CallStatus::Success);
	assert_eq!(records[0].labels.chain_id, "1");
	assert_eq!(records[0].labels.client_id, "ankr");
}

#[tokio::test]
async fn test_balance_sends_address_and_block() {
	let pool = mock_pool(Default::default(), Arc::new(NoopMetricsSink));
	let mut transport = MockEvmTransportClient::new();
	expect_call(
		&mut transport,
		"eth_getBalance",
		vec![
			json!("0x00000000000000000000000000000000000000aa"),
			json!("0x10"),
		],
		json!("0xde0b6b3a7640000"),
	);

	let client = mock_evm_client(&pool, "ankr", 1, transport, SignerStore::default());
	let balance = client
		.balance(
			Address::with_last_byte(0xaa),
			BlockRef::Number(BlockNumberOrTag::Number(16)),
		)
		.await
		.unwrap();
	assert_eq!(balance, U256::from(1_000_000_000_000_000_000u128));
}

#[tokio::test]
async fn test_call_encodes_request_object() {
	let pool = mock_pool(Default::default(), Arc::new(NoopMetricsSink));
	let mut transport = MockEvmTransportClient::new();
	expect_call(
		&mut transport,
		"eth_call",
		vec![
			json!({
				"to": "0x00000000000000000000000000000000000000aa",
				"data": "0x313ce567"
			}),
			json!("latest"),
		],
		json!("0x0000000000000000000000000000000000000000000000000000000000000012"),
	);

	let client = mock_evm_client(&pool, "ankr", 1, transport, SignerStore::default());
	let request = CallRequest {
		to: Some(Address::with_last_byte(0xaa)),
		data: Some(Bytes::from_static(&[0x31, 0x3c, 0xe5, 0x67])),
		..CallRequest::default()
	};
	let output = client.call(&request, BlockRef::latest()).await.unwrap();
	assert_eq!(output.len(), 32);
	assert_eq!(output[31], 18);
}

#[tokio::test]
async fn test_unknown_block_and_receipt_are_null() {
	let pool = mock_pool(Default::default(), Arc::new(NoopMetricsSink));
	let mut transport = MockEvmTransportClient::new();
	transport
		.expect_send_raw_request()
		.returning(|_, _| Ok(rpc_result(Value::Null)));

	let client = mock_evm_client(&pool, "ankr", 1, transport, SignerStore::default());
	assert_eq!(
		client
			.block_by_number(BlockNumberOrTag::Number(u64::MAX), false)
			.await
			.unwrap(),
		Value::Null
	);
	assert_eq!(
		client.transaction_receipt(B256::ZERO).await.unwrap(),
		Value::Null
	);
	assert_eq!(
		client.block_transaction_count_by_hash(B256::ZERO).await.unwrap(),
		None
	);
}

#[tokio::test]
async fn test_transaction_in_block_lookups_send_block_and_index() {
	let pool = mock_pool(Default::default(), Arc::new(NoopMetricsSink));
	let mut transport = MockEvmTransportClient::new();
	let transaction = json!({
		"hash": format!("0x{}", "cd".repeat(32)),
		"transactionIndex": "0x3"
	});
	expect_call(
		&mut transport,
		"eth_getTransactionByBlockHashAndIndex",
		vec![json!(format!("0x{}", "ab".repeat(32))), json!("0x3")],
		transaction.clone(),
	);
	expect_call(
		&mut transport,
		"eth_getTransactionByBlockNumberAndIndex",
		vec![json!("0x10"), json!("0x3")],
		Value::Null,
	);

	let client = mock_evm_client(&pool, "ankr", 1, transport, SignerStore::default());
	assert_eq!(
		client
			.transaction_by_block_hash_and_index(B256::repeat_byte(0xab), 3)
			.await
			.unwrap(),
		transaction
	);
	assert_eq!(
		client
			.transaction_by_block_number_and_index(BlockNumberOrTag::Number(16), 3)
			.await
			.unwrap(),
		Value::Null
	);
}

#[tokio::test]
async fn test_malformed_result_is_upstream_failure() {
	let sink = Arc::new(RecordingMetricsSink::default());
	let pool = mock_pool(Default::default(), sink.clone());
	let mut transport = MockEvmTransportClient::new();
	expect_call(&mut transport, "eth_chainId", vec![], json!(1));

	let client = mock_evm_client(&pool, "ankr", 1, transport, SignerStore::default());
	let error = client.chain_id().await.unwrap_err();

	assert!(matches!(error, BlockChainError::UpstreamRpc(_)));
	assert!(error.message().contains("eth_chainId"));
	assert_eq!(error.transport_url(), Some("https://ankr.rpc.test"));
	assert_eq!(sink.count("eth_chainId", CallStatus::Failure), 1);
}

#[tokio::test]
async fn test_node_error_keeps_code() {
	let pool = mock_pool(Default::default(), Arc::new(NoopMetricsSink));
	let mut transport = MockEvmTransportClient::new();
	transport
		.expect_send_raw_request()
		.returning(|_, _| Err(TransportError::json_rpc(3, "execution reverted", None)));

	let client = mock_evm_client(&pool, "ankr", 1, transport, SignerStore::default());
	let error = client
		.estimate_gas(&CallRequest::default())
		.await
		.unwrap_err();

	assert!(error.message().contains("execution reverted"));
	assert!(!error.is_provider_fault());
	assert!(!error.trace_id().is_empty());
	let BlockChainError::UpstreamRpc(ctx) = error else {
		panic!("expected an upstream error");
	};
	assert_eq!(ctx.metadata_value(RPC_ERROR_CODE_KEY), Some("3"));
}

#[tokio::test]
async fn test_send_transaction_simple_signs_and_submits() {
	let pool = mock_pool(Default::default(), Arc::new(NoopMetricsSink));
	let mut transport = MockEvmTransportClient::new();
	transport
		.expect_send_raw_request()
		.returning(|method, params| {
			let result = match method {
				"eth_getTransactionCount" => json!("0x5"),
				"eth_gasPrice" => json!("0x3b9aca00"),
				"eth_estimateGas" => json!("0x5208"),
				"eth_chainId" => json!("0xaa36a7"),
				"eth_sendRawTransaction" => {
					let raw = params
						.and_then(|p| p.first().and_then(|v| v.as_str().map(str::to_string)))
						.unwrap();
					let bytes = Bytes::from_str(&raw).unwrap();
					json!(format!("0x{:x}", keccak256(&bytes)))
				}
				other => panic!("unexpected method {}", other),
			};
			Ok(rpc_result(result))
		});

	let signers = SignerStore::from_secrets(&[web3_gateway::models::SecretValue::plain(DEV_KEY)])
		.unwrap();
	let client = mock_evm_client(&pool, "sepolia", 11155111, transport, signers);
	let from = Address::from_str(DEV_ADDRESS).unwrap();
	assert_eq!(client.signer_addresses(), vec![from]);

	let hash = client
		.send_transaction_simple(from, Address::with_last_byte(0xbb), U256::from(1000u64))
		.await
		.unwrap();
	assert_ne!(hash, B256::ZERO);
}

#[tokio::test]
async fn test_send_transaction_unknown_signer() {
	let pool = mock_pool(Default::default(), Arc::new(NoopMetricsSink));
	let mut transport = MockEvmTransportClient::new();
	transport.expect_send_raw_request().never();

	let client = mock_evm_client(&pool, "ankr", 1, transport, SignerStore::default());
	let error = client
		.send_transaction_simple(
			Address::with_last_byte(0x01),
			Address::with_last_byte(0x02),
			U256::ZERO,
		)
		.await
		.unwrap_err();
	assert!(matches!(error, BlockChainError::SignerNotFound(_)));
}
