//! Solana-specific models.

mod rpc;

pub use rpc::{
	AccountInfo, AccountInfoReply, BalanceReply, BlockRequestConfig, ClusterNode, RpcContext,
	TokenAccountBalanceReply, TokenAmount, VersionReply, LAMPORTS_PER_SOL,
};
