//! Wallet configuration
//!
//! Network selection, the system scripts every wallet depends on, and the
//! scanning parameters. Persisted as JSON.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

use crate::core::{CellDep, DepType, OutPoint};
use crate::crypto::HASH_SIZE;

/// Default number of blocks fetched per live-cell query window
pub const DEFAULT_SCAN_WINDOW: u64 = 100;

/// Type hash of the default secp256k1/blake160 single-signature lock
pub const SECP256K1_BLAKE160_SIGHASH_ALL_TYPE_HASH: [u8; HASH_SIZE] = [
    0x9b, 0xd7, 0xe0, 0x6f, 0x3e, 0xcf, 0x4b, 0xe0,
    0xf2, 0xfc, 0xd2, 0x18, 0x8b, 0x23, 0xf1, 0xb9,
    0xfc, 0xc8, 0x8e, 0x5d, 0x4b, 0x65, 0xa8, 0x63,
    0x7b, 0x17, 0x72, 0x3b, 0xbd, 0xa3, 0xcc, 0xe8,
];

/// Type hash of the default secp256k1/blake160 multisig lock
pub const SECP256K1_BLAKE160_MULTISIG_ALL_TYPE_HASH: [u8; HASH_SIZE] = [
    0x5c, 0x50, 0x69, 0xeb, 0x08, 0x57, 0xef, 0xc6,
    0x5e, 0x1b, 0xca, 0x0c, 0x07, 0xdf, 0x34, 0xc3,
    0x16, 0x63, 0xb3, 0x62, 0x2f, 0xd3, 0x87, 0x6c,
    0x87, 0x63, 0x20, 0xfc, 0x96, 0x34, 0xe2, 0xa8,
];

/// Genesis transaction holding the mainnet system dep groups
const MAINNET_DEP_GROUP_TX: [u8; HASH_SIZE] = [
    0x71, 0xa7, 0xba, 0x8f, 0xc9, 0x63, 0x49, 0xfe,
    0xa0, 0xed, 0x3a, 0x5c, 0x47, 0x99, 0x2e, 0x3b,
    0x40, 0x84, 0xb0, 0x31, 0xa4, 0x22, 0x64, 0xa0,
    0x18, 0xe0, 0x07, 0x2e, 0x81, 0x72, 0xe4, 0x6c,
];

/// Genesis transaction holding the testnet system dep groups
const TESTNET_DEP_GROUP_TX: [u8; HASH_SIZE] = [
    0xf8, 0xde, 0x3b, 0xb4, 0x7d, 0x05, 0x5c, 0xdf,
    0x46, 0x0d, 0x93, 0xa2, 0xa6, 0xe1, 0xb0, 0x5f,
    0x74, 0x32, 0xf9, 0x77, 0x7c, 0x8c, 0x47, 0x4a,
    0xbf, 0x4e, 0xec, 0x1d, 0x4a, 0xee, 0x5d, 0x37,
];

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Target network, which fixes the address prefix
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    Mainnet,
    Testnet,
}

impl Network {
    pub fn prefix(self) -> &'static str {
        match self {
            Network::Mainnet => "ckb",
            Network::Testnet => "ckt",
        }
    }

    pub fn from_prefix(prefix: &str) -> Option<Self> {
        match prefix {
            "ckb" => Some(Network::Mainnet),
            "ckt" => Some(Network::Testnet),
            _ => None,
        }
    }
}

impl FromStr for Network {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "mainnet" => Ok(Network::Mainnet),
            "testnet" => Ok(Network::Testnet),
            other => Err(ConfigError::Invalid(format!("unknown network '{}'", other))),
        }
    }
}

/// Well-known scripts and the cells that deploy them
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SystemScripts {
    #[serde(with = "hex")]
    pub secp_cell_type_hash: [u8; HASH_SIZE],
    pub secp_group_out_point: OutPoint,
    /// Code cell of the single-signature lock, for callers not using the dep group
    #[serde(default)]
    pub secp_code_out_point: Option<OutPoint>,
    /// Data cell the single-signature lock loads alongside its code
    #[serde(default)]
    pub secp_data_out_point: Option<OutPoint>,
    #[serde(with = "hex")]
    pub multi_sign_secp_cell_type_hash: [u8; HASH_SIZE],
    pub multi_sign_secp_group_out_point: OutPoint,
}

impl SystemScripts {
    pub fn for_network(network: Network) -> Self {
        let dep_group_tx = match network {
            Network::Mainnet => MAINNET_DEP_GROUP_TX,
            Network::Testnet => TESTNET_DEP_GROUP_TX,
        };
        Self {
            secp_cell_type_hash: SECP256K1_BLAKE160_SIGHASH_ALL_TYPE_HASH,
            secp_group_out_point: OutPoint::new(dep_group_tx, 0),
            secp_code_out_point: None,
            secp_data_out_point: None,
            multi_sign_secp_cell_type_hash: SECP256K1_BLAKE160_MULTISIG_ALL_TYPE_HASH,
            multi_sign_secp_group_out_point: OutPoint::new(dep_group_tx, 1),
        }
    }

    pub fn secp_group_dep(&self) -> CellDep {
        CellDep::new(self.secp_group_out_point.clone(), DepType::DepGroup)
    }

    pub fn multisig_group_dep(&self) -> CellDep {
        CellDep::new(self.multi_sign_secp_group_out_point.clone(), DepType::DepGroup)
    }

    /// Code and data deps of the single-signature lock, when both are configured
    pub fn secp_code_deps(&self) -> Option<[CellDep; 2]> {
        let code = self.secp_code_out_point.clone()?;
        let data = self.secp_data_out_point.clone()?;
        Some([
            CellDep::new(code, DepType::Code),
            CellDep::new(data, DepType::Code),
        ])
    }
}

impl Default for SystemScripts {
    fn default() -> Self {
        Self::for_network(Network::Testnet)
    }
}

/// Wallet configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WalletConfig {
    pub network: Network,
    pub system_scripts: SystemScripts,
    /// Blocks per live-cell query window
    #[serde(default = "default_scan_window")]
    pub scan_window: u64,
    /// Ignore cells carrying data or a type script when selecting plain capacity
    #[serde(default = "default_skip_data_and_type")]
    pub skip_data_and_type: bool,
}

fn default_scan_window() -> u64 {
    DEFAULT_SCAN_WINDOW
}

fn default_skip_data_and_type() -> bool {
    true
}

impl WalletConfig {
    pub fn for_network(network: Network) -> Self {
        Self {
            network,
            system_scripts: SystemScripts::for_network(network),
            scan_window: DEFAULT_SCAN_WINDOW,
            skip_data_and_type: true,
        }
    }

    /// Load configuration from a JSON file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json = fs::read_to_string(path)?;
        let config: WalletConfig = serde_json::from_str(&json)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a JSON file
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        self.validate()?;
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.scan_window == 0 {
            return Err(ConfigError::Invalid(
                "scan_window must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for WalletConfig {
    fn default() -> Self {
        Self::for_network(Network::Testnet)
    }
}
