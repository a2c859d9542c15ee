//! Dispatch error types and their wire mapping.

use std::collections::HashMap;
use thiserror::Error as ThisError;

use crate::{
	models::ErrReply,
	services::blockchain::{BlockChainError, TRANSPORT_URL_KEY},
	utils::logging::error::{ErrorContext, TraceableError},
};

pub const PARAMS_ERR: &str = "PARAMS_ERR";
pub const NO_CLIENT_AVAILABLE: &str = "NO_CLIENT_AVAILABLE";
pub const ALL_PROVIDERS_UNAVAILABLE: &str = "ALL_PROVIDERS_UNAVAILABLE";
pub const SIGNER_NOT_FOUND: &str = "SIGNER_NOT_FOUND";
pub const UPSTREAM_ERR: &str = "UPSTREAM_ERR";
pub const UPSTREAM_TIMEOUT: &str = "UPSTREAM_TIMEOUT";
pub const INTERNAL_ERR: &str = "INTERNAL_ERR";

/// Errors returned by the dispatch router
#[derive(ThisError, Debug)]
pub enum DispatchError {
	/// The method is not in the supported set
	#[error("Method not supported: {0}")]
	MethodNotSupported(ErrorContext),

	/// A positional parameter is missing or has the wrong shape
	#[error("Params error: {0}")]
	ParamsError(ErrorContext),

	#[error(transparent)]
	Blockchain(#[from] BlockChainError),
}

impl DispatchError {
	pub fn method_not_supported(method: &str) -> Self {
		Self::MethodNotSupported(ErrorContext::new(
			format!("method '{}' is not supported", method),
			None,
			Some(HashMap::from([("method".to_string(), method.to_string())])),
		))
	}

	/// Names the method, the parameter position and the expected kind.
	pub fn params_error(method: &str, index: usize, expected: &str, detail: impl Into<String>) -> Self {
		let detail = detail.into();
		Self::ParamsError(ErrorContext::new(
			format!(
				"{}: param {} must be {} ({})",
				method, index, expected, detail
			),
			None,
			Some(HashMap::from([
				("method".to_string(), method.to_string()),
				("index".to_string(), index.to_string()),
			])),
		))
	}

	/// The request carries neither a chain id nor a Solana environment.
	pub fn missing_selector(method: &str) -> Self {
		Self::ParamsError(ErrorContext::new(
			format!("{}: request names neither chain_id nor chain_env", method),
			None,
			Some(HashMap::from([("method".to_string(), method.to_string())])),
		))
	}

	/// HTTP status: 400 for caller-caused errors, 500 for upstream ones.
	pub fn status_code(&self) -> u16 {
		match self {
			Self::MethodNotSupported(_) | Self::ParamsError(_) => 400,
			Self::Blockchain(error) => match error {
				BlockChainError::NoClientAvailable(_)
				| BlockChainError::AllProvidersUnavailable(_)
				| BlockChainError::SignerNotFound(_) => 400,
				_ => 500,
			},
		}
	}

	pub fn reason(&self) -> &'static str {
		match self {
			Self::MethodNotSupported(_) | Self::ParamsError(_) => PARAMS_ERR,
			Self::Blockchain(error) => match error {
				BlockChainError::NoClientAvailable(_) => NO_CLIENT_AVAILABLE,
				BlockChainError::AllProvidersUnavailable(_) => ALL_PROVIDERS_UNAVAILABLE,
				BlockChainError::SignerNotFound(_) => SIGNER_NOT_FOUND,
				BlockChainError::UpstreamRpc(_) => UPSTREAM_ERR,
				BlockChainError::Timeout(_) => UPSTREAM_TIMEOUT,
				BlockChainError::TransactionError(_)
				| BlockChainError::InternalError(_)
				| BlockChainError::Other(_) => INTERNAL_ERR,
			},
		}
	}

	pub fn message(&self) -> String {
		match self {
			Self::MethodNotSupported(ctx) | Self::ParamsError(ctx) => ctx.message.clone(),
			Self::Blockchain(error) => error.message(),
		}
	}

	/// Wire form; metadata carries the provider URL when one was involved.
	pub fn to_err_reply(&self) -> ErrReply {
		let metadata = match self {
			Self::Blockchain(error) => error.transport_url().map(|url| {
				HashMap::from([(TRANSPORT_URL_KEY.to_string(), url.to_string())])
			}),
			_ => None,
		};
		ErrReply {
			code: self.status_code(),
			reason: self.reason().to_string(),
			message: self.message(),
			metadata,
		}
	}
}

impl TraceableError for DispatchError {
	fn trace_id(&self) -> String {
		match self {
			Self::MethodNotSupported(ctx) | Self::ParamsError(ctx) => ctx.trace_id.clone(),
			Self::Blockchain(error) => error.trace_id(),
		}
	}
}

impl From<DispatchError> for ErrReply {
	fn from(error: DispatchError) -> Self {
		error.to_err_reply()
	}
}
