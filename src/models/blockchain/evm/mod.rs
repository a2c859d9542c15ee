//! EVM-specific models.

mod block;
mod transaction;

pub use block::{BlockNumberOrTag, BlockRef, BlockTag, CallRequest};
pub use transaction::{
	AssembledFields, GasPolicy, SignedTransaction, TransactionIntent, DEFAULT_GAS_FEE_RATE,
	DEFAULT_GAS_LIMIT_MAX, DEFAULT_GAS_LIMIT_RATE,
};
