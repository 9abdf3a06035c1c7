//! Multi-signature wallet and transaction support
//!
//! Provides M-of-N threshold signature wallets where M signatures
//! from N authorized signers are required to spend funds.
//!
//! # Example
//!
//! ```ignore
//! use cell_wallet::multisig::{MultiSignConfiguration, MultiSignWallet};
//!
//! // Create a 2-of-3 policy from the signers' keys
//! let policy = MultiSignConfiguration::from_private_keys(0, 2, &keys, 0)?;
//! let wallet = MultiSignWallet::new(&rpc, CellCollector::new(&rpc, &config), policy, &config);
//!
//! // Two of the three sign together and the transfer is broadcast
//! let hash = wallet.send(&target, capacity, &keys[..2], &[], fee)?;
//! ```

pub mod config;
pub mod wallet;

pub use config::{MultiSignConfiguration, MultisigError, CONFIG_HEADER_SIZE, MAX_POLICY_VALUE};
pub use wallet::MultiSignWallet;
