//! Human-readable addresses
//!
//! An address is the Bech32 encoding of a payload under a network prefix.
//! Payload formats:
//! - short: `0x01 || code_hash_index || args(20)`, index 0 is the default
//!   single-signature lock, index 1 the default multisig lock
//! - full data: `0x02 || code_hash || args`
//! - full type: `0x04 || code_hash || args`

use bech32::primitives::decode::{CheckedHrpstring, CheckedHrpstringError};
use bech32::{Bech32, Hrp};
use thiserror::Error;

use super::script::{Script, ScriptHashType};
use crate::config::{Network, SystemScripts};
use crate::crypto::{BLAKE160_SIZE, HASH_SIZE};

pub const SHORT_FORMAT: u8 = 0x01;
pub const FULL_DATA_FORMAT: u8 = 0x02;
pub const FULL_TYPE_FORMAT: u8 = 0x04;

pub const CODE_HASH_INDEX_SINGLESIG: u8 = 0x00;
pub const CODE_HASH_INDEX_MULTISIG: u8 = 0x01;

/// Address-related errors
#[derive(Error, Debug)]
pub enum AddressError {
    #[error("Bech32 decode error: {0}")]
    Decode(#[from] CheckedHrpstringError),
    #[error("Bech32 encode error: {0}")]
    Encode(#[from] bech32::EncodeError),
    #[error("Invalid prefix: {0}")]
    InvalidPrefix(String),
    #[error("Unknown address format: {0:#04x}")]
    UnknownFormat(u8),
    #[error("Unknown code hash index: {0:#04x}")]
    UnknownCodeHashIndex(u8),
    #[error("Invalid payload length: {0}")]
    InvalidLength(usize),
}

/// Shape of the script an address resolves to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressType {
    ShortSingleSig,
    ShortMultiSig,
    FullData,
    FullType,
}

/// A decoded address
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedAddress {
    pub network: Network,
    pub address_type: AddressType,
    pub script: Script,
}

impl ParsedAddress {
    /// Decode `address`, resolving short formats against the known system scripts
    ///
    /// Only the legacy Bech32 checksum is accepted.
    pub fn parse(address: &str, scripts: &SystemScripts) -> Result<Self, AddressError> {
        let checked = CheckedHrpstring::new::<Bech32>(address)?;
        let prefix = checked.hrp().to_lowercase();
        let payload: Vec<u8> = checked.byte_iter().collect();
        let network = Network::from_prefix(&prefix).ok_or(AddressError::InvalidPrefix(prefix))?;

        let (&format, rest) = payload
            .split_first()
            .ok_or(AddressError::InvalidLength(0))?;

        let (address_type, script) = match format {
            SHORT_FORMAT => {
                if rest.len() != 1 + BLAKE160_SIZE {
                    return Err(AddressError::InvalidLength(payload.len()));
                }
                let args = rest[1..].to_vec();
                match rest[0] {
                    CODE_HASH_INDEX_SINGLESIG => (
                        AddressType::ShortSingleSig,
                        Script::new(scripts.secp_cell_type_hash, ScriptHashType::Type, args),
                    ),
                    CODE_HASH_INDEX_MULTISIG => (
                        AddressType::ShortMultiSig,
                        Script::new(
                            scripts.multi_sign_secp_cell_type_hash,
                            ScriptHashType::Type,
                            args,
                        ),
                    ),
                    index => return Err(AddressError::UnknownCodeHashIndex(index)),
                }
            }
            FULL_DATA_FORMAT | FULL_TYPE_FORMAT => {
                if rest.len() < HASH_SIZE {
                    return Err(AddressError::InvalidLength(payload.len()));
                }
                let mut code_hash = [0u8; HASH_SIZE];
                code_hash.copy_from_slice(&rest[..HASH_SIZE]);
                let (address_type, hash_type) = if format == FULL_DATA_FORMAT {
                    (AddressType::FullData, ScriptHashType::Data)
                } else {
                    (AddressType::FullType, ScriptHashType::Type)
                };
                (
                    address_type,
                    Script::new(code_hash, hash_type, rest[HASH_SIZE..].to_vec()),
                )
            }
            other => return Err(AddressError::UnknownFormat(other)),
        };

        Ok(Self {
            network,
            address_type,
            script,
        })
    }
}

/// Encode a raw payload under the network's prefix
pub fn encode_payload(network: Network, payload: &[u8]) -> Result<String, AddressError> {
    let hrp = Hrp::parse(network.prefix()).map_err(|e| AddressError::InvalidPrefix(e.to_string()))?;
    Ok(bech32::encode::<Bech32>(hrp, payload)?)
}

/// Short address of the default single-signature lock
pub fn short_single_sig_address(
    network: Network,
    pubkey_hash: &[u8; BLAKE160_SIZE],
) -> Result<String, AddressError> {
    let mut payload = vec![SHORT_FORMAT, CODE_HASH_INDEX_SINGLESIG];
    payload.extend_from_slice(pubkey_hash);
    encode_payload(network, &payload)
}

/// Full-format address carrying the script's code hash and args
pub fn full_address(network: Network, script: &Script) -> Result<String, AddressError> {
    let format = match script.hash_type {
        ScriptHashType::Data => FULL_DATA_FORMAT,
        ScriptHashType::Type => FULL_TYPE_FORMAT,
    };
    let mut payload = vec![format];
    payload.extend_from_slice(&script.code_hash);
    payload.extend_from_slice(&script.args);
    encode_payload(network, &payload)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_single_sig_roundtrip() {
        let scripts = SystemScripts::default();
        let address = short_single_sig_address(Network::Testnet, &[0x36; 20]).unwrap();
        assert!(address.starts_with("ckt1"));

        let parsed = ParsedAddress::parse(&address, &scripts).unwrap();
        assert_eq!(parsed.network, Network::Testnet);
        assert_eq!(parsed.address_type, AddressType::ShortSingleSig);
        assert_eq!(parsed.script.code_hash, scripts.secp_cell_type_hash);
        assert_eq!(parsed.script.args, vec![0x36; 20]);
    }

    #[test]
    fn test_short_multisig() {
        let scripts = SystemScripts::default();
        let mut payload = vec![SHORT_FORMAT, CODE_HASH_INDEX_MULTISIG];
        payload.extend_from_slice(&[0x01; 20]);
        let address = encode_payload(Network::Mainnet, &payload).unwrap();
        assert!(address.starts_with("ckb1"));

        let parsed = ParsedAddress::parse(&address, &scripts).unwrap();
        assert_eq!(parsed.address_type, AddressType::ShortMultiSig);
        assert_eq!(parsed.script.code_hash, scripts.multi_sign_secp_cell_type_hash);
    }

    #[test]
    fn test_full_type_address() {
        let scripts = SystemScripts::default();
        let script = Script::new([0x5c; 32], ScriptHashType::Type, vec![0xab; 28]);
        let address = full_address(Network::Testnet, &script).unwrap();

        let parsed = ParsedAddress::parse(&address, &scripts).unwrap();
        assert_eq!(parsed.address_type, AddressType::FullType);
        assert_eq!(parsed.script, script);
    }

    #[test]
    fn test_rejects_unknown_prefix_and_format() {
        let scripts = SystemScripts::default();
        let hrp = Hrp::parse("xyz").unwrap();
        let foreign = bech32::encode::<Bech32>(hrp, &[SHORT_FORMAT, 0, 1, 2]).unwrap();
        assert!(matches!(
            ParsedAddress::parse(&foreign, &scripts),
            Err(AddressError::InvalidPrefix(_))
        ));

        let odd = encode_payload(Network::Testnet, &[0x07, 1, 2, 3]).unwrap();
        assert!(matches!(
            ParsedAddress::parse(&odd, &scripts),
            Err(AddressError::UnknownFormat(0x07))
        ));
    }

    #[test]
    fn test_rejects_bech32m_checksum() {
        let scripts = SystemScripts::default();
        let mut payload = vec![SHORT_FORMAT, CODE_HASH_INDEX_SINGLESIG];
        payload.extend_from_slice(&[0x36; 20]);
        let modern = bech32::encode::<bech32::Bech32m>(Hrp::parse("ckt").unwrap(), &payload).unwrap();

        assert!(matches!(
            ParsedAddress::parse(&modern, &scripts),
            Err(AddressError::Decode(_))
        ));
        let legacy = encode_payload(Network::Testnet, &payload).unwrap();
        assert!(ParsedAddress::parse(&legacy, &scripts).is_ok());
    }

    #[test]
    fn test_rejects_short_payload() {
        let scripts = SystemScripts::default();
        let short = encode_payload(Network::Testnet, &[SHORT_FORMAT, 0, 1, 2]).unwrap();
        assert!(matches!(
            ParsedAddress::parse(&short, &scripts),
            Err(AddressError::InvalidLength(4))
        ));
    }
}
