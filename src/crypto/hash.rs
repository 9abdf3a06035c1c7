//! Content hashing utilities for the wallet
//!
//! Provides the chain's blake2b-256 hash (with its fixed personalization)
//! used for transaction hashes, script hashes and blake160 fingerprints.

use ckb_hash::{new_blake2b, Blake2b};

/// Size of a full content hash in bytes
pub const HASH_SIZE: usize = 32;

/// Size of a blake160 fingerprint in bytes
pub const BLAKE160_SIZE: usize = 20;

/// Computes the blake2b-256 hash of the input data
pub fn blake2b_256(data: &[u8]) -> [u8; HASH_SIZE] {
    ckb_hash::blake2b_256(data)
}

/// Computes the blake2b-256 hash and returns it as a hex string
pub fn blake2b_256_hex(data: &[u8]) -> String {
    hex::encode(blake2b_256(data))
}

/// First 20 bytes of the blake2b-256 hash
pub fn blake160(data: &[u8]) -> [u8; BLAKE160_SIZE] {
    let hash = blake2b_256(data);
    let mut out = [0u8; BLAKE160_SIZE];
    out.copy_from_slice(&hash[..BLAKE160_SIZE]);
    out
}

/// Incremental blake2b-256 hasher
pub struct Hasher {
    inner: Blake2b,
}

impl Hasher {
    pub fn new() -> Self {
        Self {
            inner: new_blake2b(),
        }
    }

    pub fn update(&mut self, data: &[u8]) {
        self.inner.update(data);
    }

    /// Feed the byte length of `data` as a little-endian u64, then `data` itself
    pub fn update_length_prefixed(&mut self, data: &[u8]) {
        self.inner.update(&(data.len() as u64).to_le_bytes());
        self.inner.update(data);
    }

    pub fn finalize(self) -> [u8; HASH_SIZE] {
        let mut out = [0u8; HASH_SIZE];
        self.inner.finalize(&mut out);
        out
    }
}

impl Default for Hasher {
    fn default() -> Self {
        Self::new()
    }
}
