//! Lock and type scripts
//!
//! A script names on-chain code (`code_hash` interpreted per `hash_type`)
//! plus the arguments it is run with. Its hash is the identity used to
//! index cells by lock or by type.

use serde::{Deserialize, Serialize};

use super::molecule::{pack_bytes, pack_table};
use crate::crypto::{blake2b_256, HASH_SIZE};

/// How a script's `code_hash` is matched against deployed code
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ScriptHashType {
    /// `code_hash` is the hash of the code cell's data
    Data,
    /// `code_hash` is the hash of the code cell's type script
    Type,
}

impl ScriptHashType {
    pub fn as_byte(self) -> u8 {
        match self {
            ScriptHashType::Data => 0,
            ScriptHashType::Type => 1,
        }
    }
}

/// A lock or type script
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Script {
    #[serde(with = "hex")]
    pub code_hash: [u8; HASH_SIZE],
    pub hash_type: ScriptHashType,
    #[serde(with = "hex")]
    pub args: Vec<u8>,
}

impl Script {
    pub fn new(code_hash: [u8; HASH_SIZE], hash_type: ScriptHashType, args: Vec<u8>) -> Self {
        Self {
            code_hash,
            hash_type,
            args,
        }
    }

    /// Canonical encoding: table of `code_hash`, `hash_type`, `args`
    pub fn serialize(&self) -> Vec<u8> {
        pack_table(&[
            self.code_hash.to_vec(),
            vec![self.hash_type.as_byte()],
            pack_bytes(&self.args),
        ])
    }

    pub fn compute_hash(&self) -> [u8; HASH_SIZE] {
        blake2b_256(&self.serialize())
    }

    /// Bytes this script occupies when stored in a cell
    pub fn occupied_bytes(&self) -> u64 {
        (HASH_SIZE + 1 + self.args.len()) as u64
    }
}
