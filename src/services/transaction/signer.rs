//! Signing keys configured for an EVM endpoint.

use alloy::{primitives::Address, signers::local::PrivateKeySigner};
use std::{collections::HashMap, fmt, str::FromStr};

use crate::{
	models::{SecretValue, SecurityError},
	services::blockchain::BlockChainError,
};

/// Local signers indexed by their address.
#[derive(Clone, Default)]
pub struct SignerStore {
	signers: Vec<PrivateKeySigner>,
}

impl SignerStore {
	pub fn new(signers: Vec<PrivateKeySigner>) -> Self {
		let mut store = Self::default();
		for signer in signers {
			if !store.contains(&signer.address()) {
				store.signers.push(signer);
			}
		}
		store
	}

	/// Resolves and parses hex-encoded private keys.
	///
	/// Errors name the offending entry by position only; key material never
	/// reaches the error message.
	pub fn from_secrets(secrets: &[SecretValue]) -> Result<Self, Box<SecurityError>> {
		let mut signers = Vec::with_capacity(secrets.len());
		for (index, secret) in secrets.iter().enumerate() {
			let key = secret.resolve()?;
			let signer = PrivateKeySigner::from_str(key.as_str().trim()).map_err(|e| {
				Box::new(SecurityError::validation_error(
					format!("Signer #{} is not a valid private key", index),
					Some(Box::new(e)),
					Some(HashMap::from([("signer_index".to_string(), index.to_string())])),
				))
			})?;
			signers.push(signer);
		}
		Ok(Self::new(signers))
	}

	/// Exact-address lookup.
	pub fn get(&self, address: &Address) -> Result<&PrivateKeySigner, BlockChainError> {
		self.signers
			.iter()
			.find(|signer| signer.address() == *address)
			.ok_or_else(|| {
				BlockChainError::signer_not_found(
					format!("No signer configured for 0x{:x}", address),
					None,
					Some(HashMap::from([(
						"from".to_string(),
						format!("0x{:x}", address),
					)])),
				)
			})
	}

	pub fn contains(&self, address: &Address) -> bool {
		self.signers.iter().any(|signer| signer.address() == *address)
	}

	pub fn addresses(&self) -> Vec<Address> {
		self.signers.iter().map(PrivateKeySigner::address).collect()
	}

	pub fn len(&self) -> usize {
		self.signers.len()
	}

	pub fn is_empty(&self) -> bool {
		self.signers.is_empty()
	}
}

impl fmt::Debug for SignerStore {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("SignerStore")
			.field("addresses", &self.addresses())
			.finish()
	}
}
