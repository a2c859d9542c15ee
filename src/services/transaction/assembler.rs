//! Transaction assembly and signing.
//!
//! Derives the nonce, gas price, gas limit and chain id for a
//! [`TransactionIntent`], signs it as an EIP-155 legacy transaction and
//! optionally submits it. Concurrent assemblies for the same sender may
//! observe the same pending nonce; callers that need ordering serialise
//! their sends per signer.

use alloy::{
	consensus::{SignableTransaction, TxEnvelope, TxLegacy},
	eips::eip2718::Encodable2718,
	primitives::{Bytes, TxKind, B256},
	signers::SignerSync,
};
use std::{collections::HashMap, future::Future};
use tracing::{info, warn};

use crate::{
	models::{AssembledFields, CallRequest, GasPolicy, SignedTransaction, TransactionIntent},
	services::{
		blockchain::{BlockChainError, EvmClientTrait, STEP_KEY},
		transaction::SignerStore,
	},
};

/// Tags a failure with the assembly step that produced it.
async fn step<R>(
	name: &'static str,
	operation: impl Future<Output = Result<R, BlockChainError>>,
) -> Result<R, BlockChainError> {
	operation.await.map_err(|e| e.with_metadata(STEP_KEY, name))
}

pub struct TransactionAssembler<'a, C: ?Sized> {
	client: &'a C,
	signers: &'a SignerStore,
	policy: GasPolicy,
}

impl<'a, C: EvmClientTrait + ?Sized> TransactionAssembler<'a, C> {
	pub fn new(client: &'a C, signers: &'a SignerStore, policy: GasPolicy) -> Self {
		Self {
			client,
			signers,
			policy,
		}
	}

	/// Resolves every derived field and signs the result.
	pub async fn assemble(
		&self,
		intent: &TransactionIntent,
	) -> Result<SignedTransaction, BlockChainError> {
		let signer = self.signers.get(&intent.from)?;

		let estimate_request = CallRequest {
			from: Some(intent.from),
			to: Some(intent.to),
			value: Some(intent.value),
			data: Some(intent.data.clone()),
			..CallRequest::default()
		};

		let (nonce, node_gas_price, estimate, chain_id) = tokio::try_join!(
			step("nonce", self.client.pending_nonce(intent.from)),
			step("gas_price", self.client.gas_price()),
			step("gas_limit", self.client.estimate_gas(&estimate_request)),
			step("chain_id", self.client.chain_id()),
		)?;

		let gas_price = self
			.policy
			.apply_fee_rate(node_gas_price)
			.map_err(|e| self.failure("gas_price", e))?;
		let fields = AssembledFields {
			nonce,
			gas_price,
			gas_limit: self.policy.gas_limit(estimate),
			chain_id,
		};

		let tx = TxLegacy {
			chain_id: Some(fields.chain_id),
			nonce: fields.nonce,
			gas_price: fields.gas_price,
			gas_limit: fields.gas_limit,
			to: TxKind::Call(intent.to),
			value: intent.value,
			input: intent.data.clone(),
		};

		let signature = signer
			.sign_hash_sync(&tx.signature_hash())
			.map_err(|e| self.failure("sign", e.to_string()))?;
		let signed = tx.into_signed(signature);
		let hash = *signed.hash();
		let raw = Bytes::from(TxEnvelope::from(signed).encoded_2718());

		info!(
			from = %intent.from,
			hash = %hash,
			nonce = fields.nonce,
			gas_price = %fields.gas_price,
			gas_limit = fields.gas_limit,
			chain_id = fields.chain_id,
			"Signed transaction"
		);

		Ok(SignedTransaction::new(hash, raw, intent.from, fields))
	}

	/// Broadcasts an already signed transaction as-is.
	pub async fn submit(&self, signed: &SignedTransaction) -> Result<B256, BlockChainError> {
		let hash = step("submit", self.client.send_raw_transaction(signed.raw())).await?;
		if hash != signed.hash() {
			warn!(
				expected = %signed.hash(),
				returned = %hash,
				"Node returned a different transaction hash"
			);
		}
		Ok(hash)
	}

	pub async fn send(&self, intent: &TransactionIntent) -> Result<B256, BlockChainError> {
		let signed = self.assemble(intent).await?;
		self.submit(&signed).await
	}

	fn failure(&self, step: &str, reason: String) -> BlockChainError {
		BlockChainError::transaction_error(
			format!("Transaction assembly failed at {}: {}", step, reason),
			None,
			Some(HashMap::from([(STEP_KEY.to_string(), step.to_string())])),
		)
	}
}
