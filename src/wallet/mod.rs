//! Wallet module for key, coin selection and transaction management

pub mod collector;
pub mod wallet;

pub use collector::{CellCollector, CoinSelector, CollectorError, GatheredInputs, UnspentCells};
pub use wallet::{Wallet, WalletError};
