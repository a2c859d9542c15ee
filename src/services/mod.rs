//! Core services implementing the business logic.
//!
//! This module contains the main service implementations:
//! - `blockchain`: Transports, breakers, typed clients and the client pool
//! - `dispatch`: Routing of generic JSON-RPC requests to typed operations
//! - `transaction`: Signer storage and transaction assembly

pub mod blockchain;
pub mod dispatch;
pub mod transaction;
