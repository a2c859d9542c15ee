//! Multi-chain JSON-RPC gateway.
//!
//! This library pools EVM and Solana RPC providers behind per-endpoint
//! circuit breakers and exposes them through a small HTTP API. It includes:
//!
//! - Configuration of the provider topology through a JSON file
//! - Instrumented outbound calls with Prometheus metrics
//! - Local transaction assembly and signing for EVM chains
//! - A generic dispatcher from JSON-RPC methods to typed client operations
//!
//! # Module Structure
//!
//! - `api`: HTTP routes for the gateway
//! - `bootstrap`: Bootstraps the application
//! - `models`: Data structures for configuration, topology and chain data
//! - `services`: Pool, clients, transaction assembly and dispatch
//! - `utils`: Common utilities and helper functions

pub mod api;
pub mod bootstrap;
pub mod models;
pub mod services;
pub mod utils;
