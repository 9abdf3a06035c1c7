//! Transaction signing
//!
//! An unsigned [`Transaction`] becomes a [`SignedTransaction`] only by going
//! through [`sign_transaction`], so anything handed to a broadcaster has had
//! its witness-0 lock filled in.

pub mod message;

use thiserror::Error;

use crate::core::{Transaction, TransactionError};
use crate::crypto::{KeyError, KeyPair, HASH_SIZE, SIGNATURE_SIZE};

pub use message::SigningMessageBuilder;

/// Signing errors
#[derive(Error, Debug)]
pub enum SigningError {
    #[error("Transaction error: {0}")]
    Transaction(#[from] TransactionError),
    #[error("Crypto error: {0}")]
    Crypto(#[from] KeyError),
}

/// A transaction whose witness-0 lock carries real signatures
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedTransaction {
    tx: Transaction,
    message: [u8; HASH_SIZE],
}

impl SignedTransaction {
    pub fn transaction(&self) -> &Transaction {
        &self.tx
    }

    /// The digest every signature in witness 0 was made over
    pub fn signing_message(&self) -> &[u8; HASH_SIZE] {
        &self.message
    }

    pub fn compute_hash(&self) -> [u8; HASH_SIZE] {
        self.tx.compute_hash()
    }
}

/// Sign `tx` with every key, in the order given
///
/// Witness 0's lock becomes `lock_prefix || sig_0 || sig_1 || ...`.
pub fn sign_transaction(
    tx: Transaction,
    builder: &SigningMessageBuilder,
    lock_prefix: &[u8],
    keys: &[KeyPair],
) -> Result<SignedTransaction, SigningError> {
    let message = builder.build(&tx)?;

    let mut lock = Vec::with_capacity(lock_prefix.len() + SIGNATURE_SIZE * keys.len());
    lock.extend_from_slice(lock_prefix);
    for key in keys {
        lock.extend_from_slice(&key.sign_recoverable(&message)?);
    }
    log::debug!(
        "Signed transaction {} with {} key(s)",
        tx.hash_hex(),
        keys.len()
    );

    let tx = tx.with_witness_lock(0, lock)?;
    Ok(SignedTransaction { tx, message })
}
