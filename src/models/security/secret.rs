//! Secret values referenced from the gateway configuration.
//!
//! Provider URLs often embed API keys and signer entries are raw private keys,
//! so both are configured as [`SecretValue`]s. Values are zeroized on drop and
//! never printed by `Debug`.

use serde::{Deserialize, Serialize};
use std::{env, fmt};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::{
	impl_case_insensitive_enum,
	models::security::error::{SecurityError, SecurityResult},
};

/// Where a secret is read from.
///
/// ```json
/// {"type": "plain", "value": "https://rpc.ankr.com/eth"}
/// {"type": "environment", "value": "ETH_SIGNER_KEY"}
/// ```
#[derive(Clone, Serialize, ZeroizeOnDrop)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum SecretValue {
	Plain(SecretString),
	Environment(String),
}

impl_case_insensitive_enum!(SecretValue, {
	"plain" => Plain,
	"environment" => Environment,
});

impl PartialEq for SecretValue {
	fn eq(&self, other: &Self) -> bool {
		match (self, other) {
			(Self::Plain(l), Self::Plain(r)) => l == r,
			(Self::Environment(l), Self::Environment(r)) => l == r,
			_ => false,
		}
	}
}

impl fmt::Debug for SecretValue {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Plain(_) => write!(f, "Plain(<redacted>)"),
			Self::Environment(name) => write!(f, "Environment({})", name),
		}
	}
}

impl Zeroize for SecretValue {
	fn zeroize(&mut self) {
		match self {
			SecretValue::Plain(secret) => secret.zeroize(),
			SecretValue::Environment(name) => name.zeroize(),
		}
	}
}

impl SecretValue {
	pub fn plain(value: impl Into<String>) -> Self {
		Self::Plain(SecretString::new(value.into()))
	}

	/// Reads the secret. Environment lookups fail when the variable is unset.
	pub fn resolve(&self) -> SecurityResult<SecretString> {
		match self {
			SecretValue::Plain(secret) => Ok(secret.clone()),
			SecretValue::Environment(name) => env::var(name).map(SecretString::new).map_err(|e| {
				Box::new(SecurityError::parse_error(
					format!("Failed to get environment variable {}", name),
					Some(e.into()),
					None,
				))
			}),
		}
	}

	/// True when the configured reference (not the resolved secret) is blank.
	pub fn is_empty(&self) -> bool {
		match self {
			SecretValue::Plain(secret) => secret.as_str().trim().is_empty(),
			SecretValue::Environment(name) => name.trim().is_empty(),
		}
	}
}

/// A string that is wiped from memory when dropped.
#[derive(Clone, Serialize, Deserialize, Zeroize, ZeroizeOnDrop)]
pub struct SecretString(String);

impl PartialEq for SecretString {
	fn eq(&self, other: &Self) -> bool {
		self.0 == other.0
	}
}

impl fmt::Debug for SecretString {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "SecretString(<redacted>)")
	}
}

impl SecretString {
	pub fn new(value: String) -> Self {
		Self(value)
	}

	pub fn as_str(&self) -> &str {
		&self.0
	}
}

impl From<String> for SecretString {
	fn from(value: String) -> Self {
		Self::new(value)
	}
}

impl AsRef<str> for SecretString {
	fn as_ref(&self) -> &str {
		self.as_str()
	}
}
