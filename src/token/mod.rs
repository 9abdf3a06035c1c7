//! Fungible tokens held in cells (simple UDT)
//!
//! A token cell's type script names the token contract and its owner; its
//! data is the 16-byte amount it holds.
//!
//! # Example
//!
//! ```ignore
//! use cell_wallet::token::SimpleUdtWallet;
//!
//! // Locates the token contract cell on chain
//! let wallet = SimpleUdtWallet::new(&rpc, key_pair, owner_lock_hash, &config)?;
//!
//! // Put 200 CKB of plain capacity into a zero-amount token cell
//! wallet.create_empty_wallet(200 * SHANNONS_PER_BYTE, fee)?;
//!
//! // Transfer tokens
//! wallet.send_amount(&recipient_address, 1000, fee, true)?;
//! println!("balance: {}", wallet.balance()?);
//! ```

pub mod amount;
pub mod error;
pub mod scanner;
pub mod wallet;

pub use amount::{decode_amount, encode_amount, parse_amount, AMOUNT_SIZE};
pub use error::TokenError;
pub use scanner::{TokenCell, TokenCellScanner, TokenCells, UDT_SCRIPT_HASH};
pub use wallet::{SimpleUdtWallet, UDT_CELL_CAPACITY};
