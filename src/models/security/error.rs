//! Errors raised while resolving secrets and parsing key material.

use crate::utils::logging::error::{BoxedError, ErrorContext, TraceableError};
use std::collections::HashMap;
use thiserror::Error as ThisError;

pub type SecurityResult<T> = Result<T, Box<SecurityError>>;

#[derive(ThisError, Debug)]
pub enum SecurityError {
	/// Key material or a secret reference is malformed
	#[error("Validation error: {0}")]
	ValidationError(ErrorContext),

	/// A secret could not be read from its source
	#[error("Parse error: {0}")]
	ParseError(ErrorContext),
}

impl SecurityError {
	pub fn validation_error(
		msg: impl Into<String>,
		source: Option<BoxedError>,
		metadata: Option<HashMap<String, String>>,
	) -> Self {
		Self::ValidationError(ErrorContext::new_with_log(msg, source, metadata))
	}

	pub fn parse_error(
		msg: impl Into<String>,
		source: Option<BoxedError>,
		metadata: Option<HashMap<String, String>>,
	) -> Self {
		Self::ParseError(ErrorContext::new_with_log(msg, source, metadata))
	}
}

impl TraceableError for SecurityError {
	fn trace_id(&self) -> String {
		match self {
			Self::ValidationError(ctx) | Self::ParseError(ctx) => ctx.trace_id.clone(),
		}
	}
}
