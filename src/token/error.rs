//! Token errors

use thiserror::Error;

use crate::core::{AddressError, AddressType, TransactionError};
use crate::rpc::RpcError;
use crate::wallet::WalletError;

/// Token-related errors
#[derive(Error, Debug)]
pub enum TokenError {
    #[error("Token contract cell is not deployed on chain")]
    DependencyNotFound,
    #[error("Amount out of range: {0}")]
    OutOfRange(String),
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
    #[error("Malformed amount: expected 16 bytes, got {len}")]
    MalformedInput { len: usize },
    #[error("Insufficient tokens: have {have}, need {need}")]
    InsufficientTokens { have: u128, need: u128 },
    #[error("Insufficient capacity: have {have}, need {need}")]
    InsufficientCapacity { have: u64, need: u64 },
    #[error("Amount overflow")]
    AmountOverflow,
    #[error("Capacity overflow")]
    CapacityOverflow,
    #[error("Unsupported target: {0:?} addresses cannot receive tokens")]
    UnsupportedTarget(AddressType),
    #[error("Single-signature code and data cells are not configured")]
    MissingSystemCell,
    #[error("Address error: {0}")]
    Address(#[from] AddressError),
    #[error("Transaction error: {0}")]
    Transaction(#[from] TransactionError),
    #[error("Wallet error: {0}")]
    Wallet(#[from] WalletError),
    #[error("RPC error: {0}")]
    Rpc(#[from] RpcError),
}
