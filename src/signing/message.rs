//! Signing message reconstruction
//!
//! The lock script recomputes this digest when it verifies a witness, so it
//! must match byte for byte:
//!
//! ```text
//! blake2b( tx_hash
//!        || len(w0') || w0'          w0' = witness 0 with lock = placeholder
//!        || len(w1)  || w1
//!        || ... )
//! ```
//!
//! Lengths are u64 little-endian. The placeholder has exactly the size of the
//! final lock field, with every signature byte zeroed.

use super::SigningError;
use crate::core::{Transaction, TransactionError};
use crate::crypto::{Hasher, HASH_SIZE, SIGNATURE_SIZE};
use crate::multisig::MultiSignConfiguration;

/// Computes the digest signed for the input group owning witness 0
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SigningMessageBuilder {
    lock_placeholder: Vec<u8>,
}

impl SigningMessageBuilder {
    /// Builder using an arbitrary witness-0 lock placeholder
    pub fn new(lock_placeholder: Vec<u8>) -> Self {
        Self { lock_placeholder }
    }

    /// Placeholder for a multisig lock: the policy blob, then room for
    /// `threshold` zeroed signatures
    pub fn multisig(config: &MultiSignConfiguration) -> Self {
        let mut placeholder = config.serialize();
        placeholder.resize(
            placeholder.len() + SIGNATURE_SIZE * usize::from(config.threshold()),
            0,
        );
        Self::new(placeholder)
    }

    /// Placeholder for a single-signature lock
    pub fn single_sig() -> Self {
        Self::new(vec![0u8; SIGNATURE_SIZE])
    }

    pub fn placeholder(&self) -> &[u8] {
        &self.lock_placeholder
    }

    pub fn build(&self, tx: &Transaction) -> Result<[u8; HASH_SIZE], SigningError> {
        let first = tx
            .witnesses
            .first()
            .ok_or(TransactionError::MissingWitness(0))?;
        let mut zeroed = first.args().ok_or(TransactionError::OpaqueWitness(0))?;
        zeroed.lock = Some(self.lock_placeholder.clone());

        let mut hasher = Hasher::new();
        hasher.update(&tx.compute_hash());
        hasher.update_length_prefixed(&zeroed.serialize());
        for witness in &tx.witnesses[1..] {
            hasher.update_length_prefixed(&witness.to_bytes());
        }
        Ok(hasher.finalize())
    }
}
