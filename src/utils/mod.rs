//! Utility modules for common functionality.
//!
//! This module provides various utility functions and types that are used across
//! the application. Currently includes:
//!
//! - client_storage: Keyed storage for pooled clients
//! - http: HTTP client utilities (i.e. creation retryable HTTP clients)
//! - logging: Logging utilities
//! - macros: Macros for common functionality
//! - metrics: Metrics utilities
//! - parsing: Command line value parsers
//! - quantity: Ethereum hex quantity encoding
//! - tests: Test utilities

pub mod client_storage;
pub mod http;
pub mod logging;
pub mod macros;
pub mod metrics;
pub mod parsing;
pub mod quantity;
pub mod tests;

pub use client_storage::ClientStorage;
pub use http::*;
pub use macros::*;
pub use parsing::*;
