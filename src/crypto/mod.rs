//! Cryptographic utilities for the wallet
//!
//! This module provides:
//! - blake2b-256 content hashing and blake160 fingerprints
//! - ECDSA key management with recoverable signatures (secp256k1)

pub mod hash;
pub mod keys;

pub use hash::{blake160, blake2b_256, blake2b_256_hex, Hasher, BLAKE160_SIZE, HASH_SIZE};
pub use keys::{
    public_key_from_hex, pubkey_hash, recover_public_key, sign_recoverable, KeyError, KeyPair,
    SIGNATURE_SIZE,
};
