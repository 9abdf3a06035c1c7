//! Core chain data components
//!
//! This module contains the fundamental building blocks:
//! - Canonical binary encoding shared with the on-chain verifier
//! - Lock and type scripts
//! - Transactions (cell inputs/outputs, dependencies, witnesses)
//! - Human-readable addresses

pub mod address;
pub mod molecule;
pub mod script;
pub mod transaction;

pub use address::{
    full_address, short_single_sig_address, AddressError, AddressType, ParsedAddress,
};
pub use script::{Script, ScriptHashType};
pub use transaction::{
    bytes_to_shannons, CellDep, CellInput, CellOutput, DepType, OutPoint, Transaction,
    TransactionBuilder, TransactionError, Witness, WitnessArgs, SHANNONS_PER_BYTE, TX_VERSION,
};
