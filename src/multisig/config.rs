//! Multisig policy configuration
//!
//! An M-of-N policy with an optional "first R required" rule, plus the
//! lock-time every spend must carry. Its blake160 and `since` together form
//! the lock args that identify the policy on chain.

use thiserror::Error;

use crate::core::{AddressError, AddressType};
use crate::crypto::{blake160, KeyPair, BLAKE160_SIZE};
use crate::rpc::RpcError;
use crate::signing::SigningError;
use crate::wallet::CollectorError;

/// Largest value any one-byte policy field can hold
pub const MAX_POLICY_VALUE: usize = 255;

/// `reserved || require_first_n || threshold || pubkey count`
pub const CONFIG_HEADER_SIZE: usize = 4;

/// Errors related to multisig operations
#[derive(Error, Debug)]
pub enum MultisigError {
    #[error("Invalid policy: {0}")]
    InvalidPolicy(String),
    #[error("Wrong number of keys: expected {expected}, got {actual}")]
    WrongKeyCount { expected: u8, actual: usize },
    #[error("Unsupported target: only plain single-signature addresses are accepted, got {0:?}")]
    UnsupportedTarget(AddressType),
    #[error("Capacity overflow")]
    CapacityOverflow,
    #[error("Address error: {0}")]
    Address(#[from] AddressError),
    #[error("Coin selection error: {0}")]
    Collector(#[from] CollectorError),
    #[error("Signing error: {0}")]
    Signing(#[from] SigningError),
    #[error("RPC error: {0}")]
    Rpc(#[from] RpcError),
}

/// Validated M-of-N multisig policy
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct MultiSignConfiguration {
    require_first_n: u8,
    threshold: u8,
    pubkey_hashes: Vec<[u8; BLAKE160_SIZE]>,
    since: u64,
}

impl MultiSignConfiguration {
    /// Create a new multisig configuration
    ///
    /// # Errors
    /// Returns `InvalidPolicy` if `require_first_n`, `threshold` or the
    /// number of pubkey hashes exceeds 255
    pub fn new(
        require_first_n: usize,
        threshold: usize,
        pubkey_hashes: Vec<[u8; BLAKE160_SIZE]>,
        since: u64,
    ) -> Result<Self, MultisigError> {
        let require_first_n = u8::try_from(require_first_n).map_err(|_| {
            MultisigError::InvalidPolicy(format!(
                "require_first_n {} exceeds {}",
                require_first_n, MAX_POLICY_VALUE
            ))
        })?;
        let threshold = u8::try_from(threshold).map_err(|_| {
            MultisigError::InvalidPolicy(format!(
                "threshold {} exceeds {}",
                threshold, MAX_POLICY_VALUE
            ))
        })?;
        if pubkey_hashes.len() > MAX_POLICY_VALUE {
            return Err(MultisigError::InvalidPolicy(format!(
                "{} pubkey hashes exceed {}",
                pubkey_hashes.len(),
                MAX_POLICY_VALUE
            )));
        }

        Ok(Self {
            require_first_n,
            threshold,
            pubkey_hashes,
            since,
        })
    }

    /// Create a configuration from the keys of all signers, in order
    pub fn from_private_keys(
        require_first_n: usize,
        threshold: usize,
        keys: &[KeyPair],
        since: u64,
    ) -> Result<Self, MultisigError> {
        let pubkey_hashes = keys.iter().map(KeyPair::pubkey_hash).collect();
        Self::new(require_first_n, threshold, pubkey_hashes, since)
    }

    /// Rebuild a configuration from its serialized blob
    pub fn from_serialized(blob: &[u8], since: u64) -> Result<Self, MultisigError> {
        if blob.len() < CONFIG_HEADER_SIZE {
            return Err(MultisigError::InvalidPolicy(format!(
                "blob of {} bytes is shorter than the header",
                blob.len()
            )));
        }
        if blob[0] != 0 {
            return Err(MultisigError::InvalidPolicy(format!(
                "reserved byte is {:#04x}",
                blob[0]
            )));
        }

        let count = usize::from(blob[3]);
        let expected = CONFIG_HEADER_SIZE + BLAKE160_SIZE * count;
        if blob.len() != expected {
            return Err(MultisigError::InvalidPolicy(format!(
                "expected {} bytes for {} pubkey hashes, got {}",
                expected,
                count,
                blob.len()
            )));
        }

        let pubkey_hashes = blob[CONFIG_HEADER_SIZE..]
            .chunks_exact(BLAKE160_SIZE)
            .map(|chunk| {
                let mut hash = [0u8; BLAKE160_SIZE];
                hash.copy_from_slice(chunk);
                hash
            })
            .collect();
        Self::new(usize::from(blob[1]), usize::from(blob[2]), pubkey_hashes, since)
    }

    /// Number of leading pubkey hashes whose signatures are mandatory
    pub fn require_first_n(&self) -> u8 {
        self.require_first_n
    }

    /// Signatures required to unlock (M)
    pub fn threshold(&self) -> u8 {
        self.threshold
    }

    pub fn pubkey_hashes(&self) -> &[[u8; BLAKE160_SIZE]] {
        &self.pubkey_hashes
    }

    pub fn since(&self) -> u64 {
        self.since
    }

    /// Total signer count (N)
    pub fn signer_count(&self) -> usize {
        self.pubkey_hashes.len()
    }

    /// Get description like "2-of-3"
    pub fn description(&self) -> String {
        format!("{}-of-{}", self.threshold, self.signer_count())
    }

    /// `0x00 || require_first_n || threshold || N || pubkey_hashes`
    pub fn serialize(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(CONFIG_HEADER_SIZE + BLAKE160_SIZE * self.pubkey_hashes.len());
        out.push(0);
        out.push(self.require_first_n);
        out.push(self.threshold);
        out.push(self.signer_count() as u8);
        for hash in &self.pubkey_hashes {
            out.extend_from_slice(hash);
        }
        out
    }

    pub fn blake160(&self) -> [u8; BLAKE160_SIZE] {
        blake160(&self.serialize())
    }

    /// `blake160 || since` (u64 little-endian)
    pub fn lock_args(&self) -> Vec<u8> {
        let mut args = self.blake160().to_vec();
        args.extend_from_slice(&self.since.to_le_bytes());
        args
    }
}
