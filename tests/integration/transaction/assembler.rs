use alloy::{
	consensus::{SignableTransaction, TxEnvelope},
	eips::eip2718::Decodable2718,
	primitives::{Address, Bytes, TxKind, B256, U256},
};
use std::{str::FromStr, sync::Arc};

use web3_gateway::{
	models::{GasPolicy, SecretValue, TransactionIntent},
	services::{
		blockchain::{BlockChainError, STEP_KEY},
		transaction::{SignerStore, TransactionAssembler},
	},
};

use crate::integration::mocks::MockEvmClientTrait;

const DEV_KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
const DEV_ADDRESS: &str = "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266";

fn dev_signers() -> SignerStore {
	SignerStore::from_secrets(&[SecretValue::plain(DEV_KEY)]).unwrap()
}

fn dev_address() -> Address {
	Address::from_str(DEV_ADDRESS).unwrap()
}

/// Node that reports nonce 5, a 1 gwei gas price, a 21000 gas estimate and
/// Sepolia's chain id.
fn sepolia_node() -> MockEvmClientTrait {
	let mut client = MockEvmClientTrait::new();
	client.expect_transaction_count().returning(|_, _| Ok(5));
	client.expect_gas_price().returning(|| Ok(1_000_000_000));
	client.expect_estimate_gas().returning(|_| Ok(21_000));
	client.expect_chain_id().returning(|| Ok(11_155_111));
	client
}

#[tokio::test]
async fn test_assembled_transaction_decodes_and_recovers_sender() {
	let client = sepolia_node();
	let signers = dev_signers();
	let assembler = TransactionAssembler::new(&client, &signers, GasPolicy::default());
	let to = Address::with_last_byte(0xbb);
	let intent = TransactionIntent::transfer(dev_address(), to, U256::from(1_000_000u64));

	let signed = assembler.assemble(&intent).await.unwrap();

	let fields = signed.fields();
	assert_eq!(fields.nonce, 5);
	assert_eq!(fields.gas_price, 1_100_000_000);
	assert_eq!(fields.gas_limit, 42_000);
	assert_eq!(fields.chain_id, 11_155_111);
	assert_eq!(signed.from(), dev_address());

	let envelope = TxEnvelope::decode_2718(&mut signed.raw().as_ref()).unwrap();
	let TxEnvelope::Legacy(legacy) = envelope else {
		panic!("expected a legacy transaction");
	};
	assert_eq!(*legacy.hash(), signed.hash());

	let tx = legacy.tx();
	assert_eq!(tx.nonce, 5);
	assert_eq!(tx.chain_id, Some(11_155_111));
	assert_eq!(tx.to, TxKind::Call(to));
	assert_eq!(tx.value, U256::from(1_000_000u64));

	let recovered = legacy
		.signature()
		.recover_address_from_prehash(&tx.signature_hash())
		.unwrap();
	assert_eq!(recovered, dev_address());
}

#[tokio::test]
async fn test_gas_limit_is_capped() {
	let mut client = MockEvmClientTrait::new();
	client.expect_transaction_count().returning(|_, _| Ok(0));
	client.expect_gas_price().returning(|| Ok(10));
	client.expect_estimate_gas().returning(|_| Ok(9_000_000));
	client.expect_chain_id().returning(|| Ok(1));
	let signers = dev_signers();
	let policy = GasPolicy {
		gas_limit_max: 10_000_000,
		..GasPolicy::default()
	};

	let assembler = TransactionAssembler::new(&client, &signers, policy);
	let intent = TransactionIntent::transfer(dev_address(), Address::ZERO, U256::ZERO)
		.with_data(Bytes::from_static(&[0xde, 0xad]));
	let signed = assembler.assemble(&intent).await.unwrap();

	assert_eq!(signed.fields().gas_limit, 10_000_000);
	assert_eq!(signed.fields().gas_price, 11);
}

#[tokio::test]
async fn test_unknown_sender_fails_before_any_call() {
	let client = MockEvmClientTrait::new();
	let signers = dev_signers();
	let assembler = TransactionAssembler::new(&client, &signers, GasPolicy::default());

	let intent = TransactionIntent::transfer(
		Address::with_last_byte(0x01),
		Address::with_last_byte(0x02),
		U256::ZERO,
	);
	let error = assembler.assemble(&intent).await.unwrap_err();
	assert!(matches!(error, BlockChainError::SignerNotFound(_)));
}

#[tokio::test]
async fn test_failed_step_is_named() {
	let mut client = MockEvmClientTrait::new();
	client.expect_transaction_count().returning(|_, _| Ok(5));
	client.expect_gas_price().returning(|| Ok(1_000_000_000));
	client.expect_estimate_gas().returning(|_| {
		Err(BlockChainError::upstream_rpc(
			"eth_estimateGas rejected by node: execution reverted",
			None,
			None,
		))
	});
	client.expect_chain_id().returning(|| Ok(1));
	let signers = dev_signers();
	let assembler = TransactionAssembler::new(&client, &signers, GasPolicy::default());

	let intent = TransactionIntent::transfer(dev_address(), Address::ZERO, U256::ZERO);
	let error = assembler.assemble(&intent).await.unwrap_err();

	let BlockChainError::UpstreamRpc(ctx) = error else {
		panic!("expected the upstream error to surface");
	};
	assert_eq!(ctx.metadata_value(STEP_KEY), Some("gas_limit"));
}

#[tokio::test]
async fn test_send_returns_node_hash() {
	let mut client = sepolia_node();
	client
		.expect_send_raw_transaction()
		.times(1)
		.returning(|_| Ok(B256::repeat_byte(0x42)));
	let signers = dev_signers();
	let assembler = TransactionAssembler::new(&client, &signers, GasPolicy::default());

	let intent = TransactionIntent::transfer(dev_address(), Address::ZERO, U256::from(1u64));
	let hash = assembler.send(&intent).await.unwrap();
	assert_eq!(hash, B256::repeat_byte(0x42));
}

#[tokio::test]
async fn test_concurrent_assemblies_observe_same_nonce() {
	let client = Arc::new(sepolia_node());
	let signers = Arc::new(dev_signers());

	let mut handles = Vec::new();
	for value in 1..=2u64 {
		let client = client.clone();
		let signers = signers.clone();
		handles.push(tokio::spawn(async move {
			let assembler =
				TransactionAssembler::new(client.as_ref(), signers.as_ref(), GasPolicy::default());
			let intent =
				TransactionIntent::transfer(dev_address(), Address::ZERO, U256::from(value));
			assembler.assemble(&intent).await.map(|signed| signed.fields().nonce)
		}));
	}

	for handle in handles {
		assert_eq!(handle.await.unwrap().unwrap(), 5);
	}
}
