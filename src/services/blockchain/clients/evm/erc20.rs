//! ERC-20 token helpers.
//!
//! Reads go through `eth_call`; writes are assembled and signed like any
//! other transaction. Calldata is built with dynamic ABI encoding so no
//! generated bindings are needed.

use alloy::{
	core::dyn_abi::{DynSolType, DynSolValue},
	primitives::{keccak256, Address, Bytes, B256, U256},
};
use std::collections::HashMap;

use crate::{
	models::{BlockRef, CallRequest, TransactionIntent},
	services::blockchain::{clients::evm::client::EvmClientTrait, error::BlockChainError},
};

/// First four bytes of the keccak hash of a function signature.
pub fn selector(signature: &str) -> [u8; 4] {
	let hash = keccak256(signature.as_bytes());
	[hash[0], hash[1], hash[2], hash[3]]
}

/// Builds calldata for `signature` with `args` ABI-encoded as parameters.
pub fn encode_call(signature: &str, args: Vec<DynSolValue>) -> Bytes {
	let mut data = selector(signature).to_vec();
	if !args.is_empty() {
		data.extend(DynSolValue::Tuple(args).abi_encode_params());
	}
	Bytes::from(data)
}

/// A token contract reached through one EVM client.
pub struct Erc20<'a, C: ?Sized> {
	client: &'a C,
	token: Address,
}

impl<'a, C: EvmClientTrait + ?Sized> Erc20<'a, C> {
	pub fn new(client: &'a C, token: Address) -> Self {
		Self { client, token }
	}

	pub fn token(&self) -> Address {
		self.token
	}

	pub async fn name(&self) -> Result<String, BlockChainError> {
		let value = self.read("name()", vec![], DynSolType::String).await?;
		self.as_string("name()", value)
	}

	pub async fn symbol(&self) -> Result<String, BlockChainError> {
		let value = self.read("symbol()", vec![], DynSolType::String).await?;
		self.as_string("symbol()", value)
	}

	pub async fn decimals(&self) -> Result<u8, BlockChainError> {
		let value = self.read("decimals()", vec![], DynSolType::Uint(8)).await?;
		let decimals = self.as_uint("decimals()", value)?;
		u8::try_from(decimals)
			.map_err(|_| self.unexpected("decimals()", format!("{} does not fit in u8", decimals)))
	}

	pub async fn total_supply(&self) -> Result<U256, BlockChainError> {
		let value = self
			.read("totalSupply()", vec![], DynSolType::Uint(256))
			.await?;
		self.as_uint("totalSupply()", value)
	}

	pub async fn balance_of(&self, owner: Address) -> Result<U256, BlockChainError> {
		let value = self
			.read(
				"balanceOf(address)",
				vec![DynSolValue::Address(owner)],
				DynSolType::Uint(256),
			)
			.await?;
		self.as_uint("balanceOf(address)", value)
	}

	pub async fn allowance(&self, owner: Address, spender: Address) -> Result<U256, BlockChainError> {
		let value = self
			.read(
				"allowance(address,address)",
				vec![DynSolValue::Address(owner), DynSolValue::Address(spender)],
				DynSolType::Uint(256),
			)
			.await?;
		self.as_uint("allowance(address,address)", value)
	}

	/// Sends `amount` tokens from `from` (a configured signer) to `to`.
	pub async fn transfer(
		&self,
		from: Address,
		to: Address,
		amount: U256,
	) -> Result<B256, BlockChainError> {
		self.write(from, "transfer(address,uint256)", to, amount)
			.await
	}

	/// Lets `spender` move up to `amount` of `owner`'s tokens.
	pub async fn approve(
		&self,
		owner: Address,
		spender: Address,
		amount: U256,
	) -> Result<B256, BlockChainError> {
		self.write(owner, "approve(address,uint256)", spender, amount)
			.await
	}

	/// Raises `spender`'s allowance by `added`.
	pub async fn increase_allowance(
		&self,
		owner: Address,
		spender: Address,
		added: U256,
	) -> Result<B256, BlockChainError> {
		self.write(owner, "increaseAllowance(address,uint256)", spender, added)
			.await
	}

	/// Lowers `spender`'s allowance by `subtracted`; the token reverts on underflow.
	pub async fn decrease_allowance(
		&self,
		owner: Address,
		spender: Address,
		subtracted: U256,
	) -> Result<B256, BlockChainError> {
		self.write(owner, "decreaseAllowance(address,uint256)", spender, subtracted)
			.await
	}

	/// Signs and submits a `(address,uint256)` call on the token from `signer`.
	async fn write(
		&self,
		signer: Address,
		signature: &str,
		target: Address,
		amount: U256,
	) -> Result<B256, BlockChainError> {
		let data = encode_call(
			signature,
			vec![DynSolValue::Address(target), DynSolValue::Uint(amount, 256)],
		);
		self.client
			.send_transaction(
				TransactionIntent::transfer(signer, self.token, U256::ZERO).with_data(data),
			)
			.await
	}

	async fn read(
		&self,
		signature: &str,
		args: Vec<DynSolValue>,
		output: DynSolType,
	) -> Result<DynSolValue, BlockChainError> {
		let request = CallRequest {
			to: Some(self.token),
			data: Some(encode_call(signature, args)),
			..CallRequest::default()
		};
		let returned = self.client.call(&request, BlockRef::latest()).await?;
		if returned.is_empty() {
			return Err(self.unexpected(signature, "empty return data".to_string()));
		}

		let decoded = DynSolType::Tuple(vec![output])
			.abi_decode_params(&returned)
			.map_err(|e| self.unexpected(signature, e.to_string()))?;
		match decoded {
			DynSolValue::Tuple(mut values) if values.len() == 1 => Ok(values.remove(0)),
			other => Err(self.unexpected(signature, format!("decoded {:?}", other))),
		}
	}

	fn as_string(&self, signature: &str, value: DynSolValue) -> Result<String, BlockChainError> {
		match value {
			DynSolValue::String(s) => Ok(s),
			other => Err(self.unexpected(signature, format!("expected a string, got {:?}", other))),
		}
	}

	fn as_uint(&self, signature: &str, value: DynSolValue) -> Result<U256, BlockChainError> {
		match value {
			DynSolValue::Uint(v, _) => Ok(v),
			other => Err(self.unexpected(signature, format!("expected a uint, got {:?}", other))),
		}
	}

	fn unexpected(&self, signature: &str, reason: String) -> BlockChainError {
		BlockChainError::upstream_rpc(
			format!("{} on token 0x{:x} returned invalid data: {}", signature, self.token, reason),
			None,
			Some(HashMap::from([(
				"token".to_string(),
				format!("0x{:x}", self.token),
			)])),
		)
	}
}
