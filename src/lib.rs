//! Cell-Wallet: a client-side wallet for a cell-model blockchain
//!
//! This crate provides:
//! - Canonical transaction encoding and hashing (blake2b-256)
//! - Recoverable ECDSA signatures (secp256k1) and the signing message algorithm
//! - Single-signature and M-of-N multisig wallets with windowed coin selection
//! - Simple UDT token cells: amount codec, balance scanning and transfers
//! - Bech32 addresses for mainnet and testnet
//!
//! All chain access goes through the [`rpc::ChainRpc`] trait.
//!
//! # Example
//!
//! ```rust
//! use cell_wallet::config::WalletConfig;
//! use cell_wallet::crypto::KeyPair;
//! use cell_wallet::multisig::MultiSignConfiguration;
//!
//! let keys: Vec<KeyPair> = (0..3).map(|_| KeyPair::generate()).collect();
//! let policy = MultiSignConfiguration::from_private_keys(0, 2, &keys, 0).unwrap();
//!
//! assert_eq!(policy.description(), "2-of-3");
//! assert_eq!(policy.serialize().len(), 64);
//! assert_eq!(policy.lock_args().len(), 28);
//!
//! let config = WalletConfig::default();
//! assert_eq!(config.scan_window, 100);
//! ```

pub mod cli;
pub mod config;
pub mod core;
pub mod crypto;
pub mod multisig;
pub mod rpc;
pub mod signing;
pub mod token;
pub mod wallet;

// Re-export commonly used types
pub use config::{Network, WalletConfig};
pub use core::{Script, Transaction, TransactionBuilder, Witness};
pub use crypto::KeyPair;
pub use multisig::{MultiSignConfiguration, MultiSignWallet};
pub use rpc::{ChainRpc, MemoryChain};
pub use signing::{SignedTransaction, SigningMessageBuilder};
pub use token::{SimpleUdtWallet, TokenCellScanner};
pub use wallet::{CellCollector, CoinSelector, Wallet};
