//! Mock implementations for testing purposes.
//!
//! This module contains mock implementations of various traits used throughout
//! the test suite. These mocks are generated using the mockall crate.

mod clients;
mod transports;

#[allow(unused_imports)]
pub use clients::*;
#[allow(unused_imports)]
pub use pool::*;
#[allow(unused_imports)]
pub use transports::*;
