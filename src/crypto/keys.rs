//! ECDSA key management for the wallet
//!
//! Provides key pair generation, recoverable signing and public key
//! recovery using the secp256k1 elliptic curve.

use rand::rngs::OsRng;
use secp256k1::ecdsa::{RecoverableSignature, RecoveryId};
use secp256k1::{Message, PublicKey, Secp256k1, SecretKey};
use thiserror::Error;

use super::hash::{blake160, BLAKE160_SIZE, HASH_SIZE};

/// Size of a recoverable signature: 64-byte compact form plus recovery id
pub const SIGNATURE_SIZE: usize = 65;

/// Errors that can occur during key operations
#[derive(Error, Debug)]
pub enum KeyError {
    #[error("Invalid private key")]
    InvalidPrivateKey,
    #[error("Invalid public key")]
    InvalidPublicKey,
    #[error("Invalid signature")]
    InvalidSignature,
    #[error("Secp256k1 error: {0}")]
    Secp256k1Error(#[from] secp256k1::Error),
}

/// A key pair consisting of a private key and its corresponding public key
#[derive(Clone)]
pub struct KeyPair {
    pub secret_key: SecretKey,
    pub public_key: PublicKey,
}

impl KeyPair {
    /// Generate a new random key pair
    pub fn generate() -> Self {
        let secp = Secp256k1::new();
        let (secret_key, public_key) = secp.generate_keypair(&mut OsRng);
        Self {
            secret_key,
            public_key,
        }
    }

    /// Create a key pair from an existing secret key
    pub fn from_secret_key(secret_key: SecretKey) -> Self {
        let secp = Secp256k1::new();
        let public_key = PublicKey::from_secret_key(&secp, &secret_key);
        Self {
            secret_key,
            public_key,
        }
    }

    /// Create a key pair from a hex-encoded private key (optional `0x` prefix)
    pub fn from_private_key_hex(hex_key: &str) -> Result<Self, KeyError> {
        let bytes = hex::decode(strip_hex_prefix(hex_key)).map_err(|_| KeyError::InvalidPrivateKey)?;
        let secret_key =
            SecretKey::from_slice(&bytes).map_err(|_| KeyError::InvalidPrivateKey)?;
        Ok(Self::from_secret_key(secret_key))
    }

    /// Get the private key as a hex string
    pub fn private_key_hex(&self) -> String {
        hex::encode(self.secret_key.secret_bytes())
    }

    /// Get the public key as a hex string (compressed format)
    pub fn public_key_hex(&self) -> String {
        hex::encode(self.public_key.serialize())
    }

    /// blake160 of the compressed public key
    pub fn pubkey_hash(&self) -> [u8; BLAKE160_SIZE] {
        pubkey_hash(&self.public_key)
    }

    /// Produce a 65-byte recoverable signature over a 32-byte message
    pub fn sign_recoverable(&self, message: &[u8; HASH_SIZE]) -> Result<[u8; SIGNATURE_SIZE], KeyError> {
        sign_recoverable(&self.secret_key, message)
    }
}

impl std::fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyPair")
            .field("public_key", &self.public_key_hex())
            .finish_non_exhaustive()
    }
}

/// blake160 of a compressed public key
pub fn pubkey_hash(public_key: &PublicKey) -> [u8; BLAKE160_SIZE] {
    blake160(&public_key.serialize())
}

/// Sign a message with a secret key, returning `compact(64) || recovery_id(1)`
pub fn sign_recoverable(
    secret_key: &SecretKey,
    message: &[u8; HASH_SIZE],
) -> Result<[u8; SIGNATURE_SIZE], KeyError> {
    let secp = Secp256k1::new();
    let message = Message::from_digest_slice(message)?;
    let signature = secp.sign_ecdsa_recoverable(&message, secret_key);
    let (recovery_id, compact) = signature.serialize_compact();

    let mut out = [0u8; SIGNATURE_SIZE];
    out[..64].copy_from_slice(&compact);
    out[64] = recovery_id.to_i32() as u8;
    Ok(out)
}

/// Recover the public key that produced a 65-byte recoverable signature
pub fn recover_public_key(message: &[u8; HASH_SIZE], signature: &[u8]) -> Result<PublicKey, KeyError> {
    if signature.len() != SIGNATURE_SIZE {
        return Err(KeyError::InvalidSignature);
    }
    let secp = Secp256k1::new();
    let recovery_id = RecoveryId::from_i32(i32::from(signature[64]))?;
    let signature = RecoverableSignature::from_compact(&signature[..64], recovery_id)?;
    let message = Message::from_digest_slice(message)?;
    Ok(secp.recover_ecdsa(&message, &signature)?)
}

/// Parse a public key from hex string
pub fn public_key_from_hex(hex_key: &str) -> Result<PublicKey, KeyError> {
    let bytes = hex::decode(strip_hex_prefix(hex_key)).map_err(|_| KeyError::InvalidPublicKey)?;
    PublicKey::from_slice(&bytes).map_err(|_| KeyError::InvalidPublicKey)
}

fn strip_hex_prefix(s: &str) -> &str {
    s.strip_prefix("0x").unwrap_or(s)
}
