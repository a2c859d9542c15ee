//! Blockchain service error types and handling.
//!
//! Covers endpoint selection, upstream provider failures, timeouts and
//! transaction assembly. Errors raised after an endpoint was chosen carry its
//! redacted `transport_url` in the metadata.

use crate::{
	services::blockchain::transports::TransportError,
	utils::logging::error::{BoxedError, ErrorContext, TraceableError},
};
use std::collections::HashMap;
use thiserror::Error as ThisError;
use uuid::Uuid;

/// Metadata key carrying the redacted provider URL
pub const TRANSPORT_URL_KEY: &str = "transport_url";
/// Metadata key set when the node itself answered with a JSON-RPC error
pub const RPC_ERROR_CODE_KEY: &str = "rpc_error_code";
/// Metadata key naming the failed assembly step
pub const STEP_KEY: &str = "step";

/// Represents possible errors that can occur during blockchain operations
#[derive(ThisError, Debug)]
pub enum BlockChainError {
	/// Nothing is registered for the requested chain key
	#[error("No client available: {0}")]
	NoClientAvailable(ErrorContext),

	/// Every endpoint for the chain key has an open breaker
	#[error("All providers unavailable: {0}")]
	AllProvidersUnavailable(ErrorContext),

	/// The sender address has no configured key
	#[error("Signer not found: {0}")]
	SignerNotFound(ErrorContext),

	/// The provider failed or the node returned an error payload
	#[error("Upstream RPC error: {0}")]
	UpstreamRpc(ErrorContext),

	/// The call did not finish before its deadline
	#[error("Timeout: {0}")]
	Timeout(ErrorContext),

	/// Errors related to transaction assembly and signing
	#[error("Transaction error: {0}")]
	TransactionError(ErrorContext),

	/// Internal errors within the blockchain client
	#[error("Internal error: {0}")]
	InternalError(ErrorContext),

	/// Other errors that don't fit into the categories above
	#[error(transparent)]
	Other(#[from] anyhow::Error),
}

impl BlockChainError {
	pub fn no_client_available(
		msg: impl Into<String>,
		source: Option<BoxedError>,
		metadata: Option<HashMap<String, String>>,
	) -> Self {
		Self::NoClientAvailable(ErrorContext::new(msg, source, metadata))
	}

	pub fn all_providers_unavailable(
		msg: impl Into<String>,
		source: Option<BoxedError>,
		metadata: Option<HashMap<String, String>>,
	) -> Self {
		Self::AllProvidersUnavailable(ErrorContext::new_with_log(msg, source, metadata))
	}

	pub fn signer_not_found(
		msg: impl Into<String>,
		source: Option<BoxedError>,
		metadata: Option<HashMap<String, String>>,
	) -> Self {
		Self::SignerNotFound(ErrorContext::new(msg, source, metadata))
	}

	pub fn upstream_rpc(
		msg: impl Into<String>,
		source: Option<BoxedError>,
		metadata: Option<HashMap<String, String>>,
	) -> Self {
		Self::UpstreamRpc(ErrorContext::new_with_log(msg, source, metadata))
	}

	pub fn timeout(
		msg: impl Into<String>,
		source: Option<BoxedError>,
		metadata: Option<HashMap<String, String>>,
	) -> Self {
		Self::Timeout(ErrorContext::new_with_log(msg, source, metadata))
	}

	pub fn transaction_error(
		msg: impl Into<String>,
		source: Option<BoxedError>,
		metadata: Option<HashMap<String, String>>,
	) -> Self {
		Self::TransactionError(ErrorContext::new_with_log(msg, source, metadata))
	}

	pub fn internal_error(
		msg: impl Into<String>,
		source: Option<BoxedError>,
		metadata: Option<HashMap<String, String>>,
	) -> Self {
		Self::InternalError(ErrorContext::new_with_log(msg, source, metadata))
	}

	/// Wraps a transport failure for the endpoint at `transport_url`.
	pub fn from_transport(method: &str, transport_url: &str, error: TransportError) -> Self {
		let mut metadata = HashMap::from([
			(TRANSPORT_URL_KEY.to_string(), transport_url.to_string()),
			("method".to_string(), method.to_string()),
		]);

		if let TransportError::JsonRpc { code, message, .. } = &error {
			metadata.insert(RPC_ERROR_CODE_KEY.to_string(), code.to_string());
			let msg = format!("{} rejected by node: {}", method, message);
			return Self::UpstreamRpc(ErrorContext::new(msg, Some(Box::new(error)), Some(metadata)));
		}

		Self::upstream_rpc(
			format!("{} failed: {}", method, error),
			Some(Box::new(error)),
			Some(metadata),
		)
	}

	fn context(&self) -> Option<&ErrorContext> {
		match self {
			Self::NoClientAvailable(ctx)
			| Self::AllProvidersUnavailable(ctx)
			| Self::SignerNotFound(ctx)
			| Self::UpstreamRpc(ctx)
			| Self::Timeout(ctx)
			| Self::TransactionError(ctx)
			| Self::InternalError(ctx) => Some(ctx),
			Self::Other(_) => None,
		}
	}

	fn context_mut(&mut self) -> Option<&mut ErrorContext> {
		match self {
			Self::NoClientAvailable(ctx)
			| Self::AllProvidersUnavailable(ctx)
			| Self::SignerNotFound(ctx)
			| Self::UpstreamRpc(ctx)
			| Self::Timeout(ctx)
			| Self::TransactionError(ctx)
			| Self::InternalError(ctx) => Some(ctx),
			Self::Other(_) => None,
		}
	}

	/// Message without the variant prefix.
	pub fn message(&self) -> String {
		match self.context() {
			Some(ctx) => ctx.message.clone(),
			None => self.to_string(),
		}
	}

	/// Redacted URL of the provider involved, when one was.
	pub fn transport_url(&self) -> Option<&str> {
		self.context()
			.and_then(|ctx| ctx.metadata_value(TRANSPORT_URL_KEY))
	}

	/// Adds a metadata entry unless one is already present for `key`.
	pub fn with_metadata(mut self, key: &str, value: impl Into<String>) -> Self {
		if let Some(ctx) = self.context_mut() {
			if ctx.metadata_value(key).is_none() {
				ctx.metadata
					.get_or_insert_with(HashMap::new)
					.insert(key.to_string(), value.into());
			}
		}
		self
	}

	/// Whether the failure says something about the provider's health.
	///
	/// Timeouts and transport failures do; a node answering with a JSON-RPC
	/// error payload does not.
	pub fn is_provider_fault(&self) -> bool {
		match self {
			Self::Timeout(_) => true,
			Self::UpstreamRpc(ctx) => ctx.metadata_value(RPC_ERROR_CODE_KEY).is_none(),
			_ => false,
		}
	}
}

impl TraceableError for BlockChainError {
	fn trace_id(&self) -> String {
		match self.context() {
			Some(ctx) => ctx.trace_id.clone(),
			None => Uuid::new_v4().to_string(),
		}
	}
}
