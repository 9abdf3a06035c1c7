//! Single-signature wallet
//!
//! Provides key management, the default single-signature lock, and
//! transaction creation and signing for it.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

use super::collector::{CoinSelector, CollectorError};
use crate::config::{Network, SystemScripts, WalletConfig};
use crate::core::{
    short_single_sig_address, AddressError, CellOutput, Script, ScriptHashType, Transaction,
    TransactionBuilder,
};
use crate::crypto::{KeyError, KeyPair, HASH_SIZE};
use crate::signing::{sign_transaction, SignedTransaction, SigningError, SigningMessageBuilder};

/// Wallet-related errors
#[derive(Error, Debug)]
pub enum WalletError {
    #[error("Capacity overflow")]
    CapacityOverflow,
    #[error("Coin selection error: {0}")]
    Collector(#[from] CollectorError),
    #[error("Signing error: {0}")]
    Signing(#[from] SigningError),
    #[error("Address error: {0}")]
    Address(#[from] AddressError),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
    #[error("Crypto error: {0}")]
    CryptoError(#[from] KeyError),
}

/// Serializable wallet data for persistence
#[derive(Debug, Serialize, Deserialize)]
struct WalletData {
    private_key_hex: String,
    label: Option<String>,
}

/// A wallet guarding its cells with the default single-signature lock
#[derive(Debug, Clone)]
pub struct Wallet {
    key_pair: KeyPair,
    network: Network,
    scripts: SystemScripts,
    /// Optional label for the wallet
    pub label: Option<String>,
}

impl Wallet {
    pub fn new(key_pair: KeyPair, config: &WalletConfig) -> Self {
        Self {
            key_pair,
            network: config.network,
            scripts: config.system_scripts.clone(),
            label: None,
        }
    }

    /// Create a wallet with a fresh key pair
    pub fn generate(config: &WalletConfig) -> Self {
        Self::new(KeyPair::generate(), config)
    }

    /// Import a wallet from a private key
    pub fn from_private_key(private_key_hex: &str, config: &WalletConfig) -> Result<Self, WalletError> {
        let key_pair = KeyPair::from_private_key_hex(private_key_hex)?;
        Ok(Self::new(key_pair, config))
    }

    pub fn key_pair(&self) -> &KeyPair {
        &self.key_pair
    }

    /// Get the wallet's public key (hex)
    pub fn public_key(&self) -> String {
        self.key_pair.public_key_hex()
    }

    pub fn lock(&self) -> Script {
        Script::new(
            self.scripts.secp_cell_type_hash,
            ScriptHashType::Type,
            self.key_pair.pubkey_hash().to_vec(),
        )
    }

    pub fn lock_hash(&self) -> [u8; HASH_SIZE] {
        self.lock().compute_hash()
    }

    /// Short-format address of this wallet's lock
    pub fn address(&self) -> Result<String, WalletError> {
        Ok(short_single_sig_address(
            self.network,
            &self.key_pair.pubkey_hash(),
        )?)
    }

    /// Build an unsigned transaction paying `output` (with `data`) from this wallet
    ///
    /// Change returns to the wallet's own lock when any remains.
    pub fn generate_tx<S: CoinSelector>(
        &self,
        selector: &S,
        output: CellOutput,
        data: Vec<u8>,
        fee: u64,
    ) -> Result<Transaction, WalletError> {
        let capacity = output.capacity;
        let mut change = CellOutput::new(0, self.lock(), None);

        let gathered = selector.gather_inputs(
            &[self.lock_hash()],
            capacity,
            output.min_capacity(data.len()),
            change.min_capacity(0),
            fee,
        )?;

        let spent = capacity.checked_add(fee).ok_or(WalletError::CapacityOverflow)?;
        change.capacity = gathered.capacities.saturating_sub(spent);

        let mut builder = TransactionBuilder::new()
            .cell_dep(self.scripts.secp_group_dep())
            .inputs_with_since(gathered.inputs, None)
            .output(output, data)
            .witnesses(gathered.witnesses);
        if change.capacity > 0 {
            builder = builder.output(change, Vec::new());
        }
        Ok(builder.build())
    }

    /// Sign the input group owning witness 0 with this wallet's key
    pub fn sign(&self, tx: Transaction) -> Result<SignedTransaction, WalletError> {
        Ok(sign_transaction(
            tx,
            &SigningMessageBuilder::single_sig(),
            &[],
            std::slice::from_ref(&self.key_pair),
        )?)
    }

    /// Save wallet to file
    pub fn save(&self, path: &Path) -> Result<(), WalletError> {
        let data = WalletData {
            private_key_hex: self.key_pair.private_key_hex(),
            label: self.label.clone(),
        };

        let json = serde_json::to_string_pretty(&data)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Load wallet from file
    pub fn load(path: &Path, config: &WalletConfig) -> Result<Self, WalletError> {
        let json = fs::read_to_string(path)?;
        let data: WalletData = serde_json::from_str(&json)?;

        let mut wallet = Self::from_private_key(&data.private_key_hex, config)?;
        wallet.label = data.label;
        Ok(wallet)
    }
}
