//! Transaction data types for the cell model
//!
//! Inputs reference previous outputs by out-point, outputs are cells
//! (capacity + lock + optional type) with a parallel data payload, and
//! witnesses carry the unlocking data. The transaction hash covers
//! everything except the witnesses.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::molecule::{pack_bytes, pack_bytes_opt, pack_dynvec, pack_fixvec, pack_table};
use super::script::Script;
use crate::crypto::{blake2b_256, HASH_SIZE};

// =============================================================================
// Constants
// =============================================================================

/// Shannons per byte of occupied cell space (1 CKByte)
pub const SHANNONS_PER_BYTE: u64 = 100_000_000;

/// Bytes taken by the capacity field of every cell
pub const CAPACITY_BYTES: u64 = 8;

/// Current transaction version
pub const TX_VERSION: u32 = 0;

/// Convert a byte count into the capacity needed to store it
pub fn bytes_to_shannons(bytes: u64) -> u64 {
    bytes.saturating_mul(SHANNONS_PER_BYTE)
}

/// Errors raised while shaping transactions
#[derive(Error, Debug)]
pub enum TransactionError {
    #[error("Transaction has no witness at index {0}")]
    MissingWitness(usize),
    #[error("Witness {0} is opaque and cannot carry a lock")]
    OpaqueWitness(usize),
}

// =============================================================================
// Out points, inputs and dependencies
// =============================================================================

/// Reference to an output of a committed transaction
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct OutPoint {
    #[serde(with = "hex")]
    pub tx_hash: [u8; HASH_SIZE],
    pub index: u32,
}

impl OutPoint {
    pub fn new(tx_hash: [u8; HASH_SIZE], index: u32) -> Self {
        Self { tx_hash, index }
    }

    pub fn serialize(&self) -> Vec<u8> {
        let mut out = self.tx_hash.to_vec();
        out.extend_from_slice(&self.index.to_le_bytes());
        out
    }
}

impl std::fmt::Display for OutPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", hex::encode(self.tx_hash), self.index)
    }
}

/// Transaction input: a previous output plus its lock-time constraint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellInput {
    pub previous_output: OutPoint,
    pub since: u64,
}

impl CellInput {
    pub fn new(previous_output: OutPoint, since: u64) -> Self {
        Self {
            previous_output,
            since,
        }
    }

    pub fn serialize(&self) -> Vec<u8> {
        let mut out = self.since.to_le_bytes().to_vec();
        out.extend_from_slice(&self.previous_output.serialize());
        out
    }
}

/// How a cell dependency is resolved
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum DepType {
    /// The referenced cell itself is code
    Code,
    /// The referenced cell's data lists further out-points to load
    DepGroup,
}

impl DepType {
    pub fn as_byte(self) -> u8 {
        match self {
            DepType::Code => 0,
            DepType::DepGroup => 1,
        }
    }
}

/// A cell made available to scripts during verification
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct CellDep {
    pub out_point: OutPoint,
    pub dep_type: DepType,
}

impl CellDep {
    pub fn new(out_point: OutPoint, dep_type: DepType) -> Self {
        Self {
            out_point,
            dep_type,
        }
    }

    pub fn serialize(&self) -> Vec<u8> {
        let mut out = self.out_point.serialize();
        out.push(self.dep_type.as_byte());
        out
    }
}

// =============================================================================
// Cell outputs
// =============================================================================

/// A cell produced by a transaction (its data lives in `outputs_data`)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellOutput {
    /// Capacity in shannons
    pub capacity: u64,
    pub lock: Script,
    pub type_: Option<Script>,
}

impl CellOutput {
    pub fn new(capacity: u64, lock: Script, type_: Option<Script>) -> Self {
        Self {
            capacity,
            lock,
            type_,
        }
    }

    pub fn serialize(&self) -> Vec<u8> {
        pack_table(&[
            self.capacity.to_le_bytes().to_vec(),
            self.lock.serialize(),
            self.type_.as_ref().map(Script::serialize).unwrap_or_default(),
        ])
    }

    /// Bytes this cell occupies on chain when carrying `data_len` bytes of data
    pub fn occupied_bytes(&self, data_len: usize) -> u64 {
        CAPACITY_BYTES
            + data_len as u64
            + self.lock.occupied_bytes()
            + self.type_.as_ref().map(Script::occupied_bytes).unwrap_or(0)
    }

    /// Smallest capacity this cell may hold with `data_len` bytes of data
    pub fn min_capacity(&self, data_len: usize) -> u64 {
        bytes_to_shannons(self.occupied_bytes(data_len))
    }
}

// =============================================================================
// Witnesses
// =============================================================================

/// Structured witness with optional lock / input-type / output-type fields
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WitnessArgs {
    pub lock: Option<Vec<u8>>,
    pub input_type: Option<Vec<u8>>,
    pub output_type: Option<Vec<u8>>,
}

impl WitnessArgs {
    pub fn with_lock(lock: Vec<u8>) -> Self {
        Self {
            lock: Some(lock),
            ..Default::default()
        }
    }

    pub fn serialize(&self) -> Vec<u8> {
        pack_table(&[
            pack_bytes_opt(self.lock.as_deref()),
            pack_bytes_opt(self.input_type.as_deref()),
            pack_bytes_opt(self.output_type.as_deref()),
        ])
    }
}

/// A witness as supplied alongside a transaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Witness {
    Structured(WitnessArgs),
    /// Raw bytes hashed and submitted as-is
    Opaque(Vec<u8>),
}

impl Witness {
    pub fn empty() -> Self {
        Witness::Structured(WitnessArgs::default())
    }

    /// The exact bytes the chain sees for this witness
    pub fn to_bytes(&self) -> Vec<u8> {
        match self {
            Witness::Structured(args) => args.serialize(),
            Witness::Opaque(bytes) => bytes.clone(),
        }
    }

    /// Structured view of the witness; an empty opaque witness reads as empty args
    pub fn args(&self) -> Option<WitnessArgs> {
        match self {
            Witness::Structured(args) => Some(args.clone()),
            Witness::Opaque(bytes) if bytes.is_empty() => Some(WitnessArgs::default()),
            Witness::Opaque(_) => None,
        }
    }
}

impl Default for Witness {
    fn default() -> Self {
        Self::empty()
    }
}

// =============================================================================
// Transaction
// =============================================================================

/// A cell-model transaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    pub version: u32,
    pub cell_deps: Vec<CellDep>,
    pub header_deps: Vec<[u8; HASH_SIZE]>,
    pub inputs: Vec<CellInput>,
    pub outputs: Vec<CellOutput>,
    pub outputs_data: Vec<Vec<u8>>,
    pub witnesses: Vec<Witness>,
}

impl Transaction {
    /// Canonical encoding of everything but the witnesses
    pub fn serialize_raw(&self) -> Vec<u8> {
        let cell_deps: Vec<Vec<u8>> = self.cell_deps.iter().map(CellDep::serialize).collect();
        let inputs: Vec<Vec<u8>> = self.inputs.iter().map(CellInput::serialize).collect();
        let outputs: Vec<Vec<u8>> = self.outputs.iter().map(CellOutput::serialize).collect();
        let outputs_data: Vec<Vec<u8>> = self.outputs_data.iter().map(|d| pack_bytes(d)).collect();

        pack_table(&[
            self.version.to_le_bytes().to_vec(),
            pack_fixvec(&cell_deps),
            pack_fixvec(&self.header_deps),
            pack_fixvec(&inputs),
            pack_dynvec(&outputs),
            pack_dynvec(&outputs_data),
        ])
    }

    /// Full canonical encoding including witnesses
    pub fn serialize(&self) -> Vec<u8> {
        let witnesses: Vec<Vec<u8>> = self
            .witnesses
            .iter()
            .map(|w| pack_bytes(&w.to_bytes()))
            .collect();
        pack_table(&[self.serialize_raw(), pack_dynvec(&witnesses)])
    }

    /// Transaction hash (witnesses excluded)
    pub fn compute_hash(&self) -> [u8; HASH_SIZE] {
        blake2b_256(&self.serialize_raw())
    }

    pub fn hash_hex(&self) -> String {
        hex::encode(self.compute_hash())
    }

    /// Out-point of this transaction's output at `index`
    pub fn out_point(&self, index: u32) -> OutPoint {
        OutPoint::new(self.compute_hash(), index)
    }

    /// Total capacity of all outputs, `None` on overflow
    pub fn total_output_capacity(&self) -> Option<u64> {
        self.outputs
            .iter()
            .try_fold(0u64, |acc, output| acc.checked_add(output.capacity))
    }

    /// Return a copy with the witness at `index` carrying `lock`
    pub fn with_witness_lock(mut self, index: usize, lock: Vec<u8>) -> Result<Self, TransactionError> {
        let witness = self
            .witnesses
            .get(index)
            .ok_or(TransactionError::MissingWitness(index))?;
        let mut args = witness.args().ok_or(TransactionError::OpaqueWitness(index))?;
        args.lock = Some(lock);
        self.witnesses[index] = Witness::Structured(args);
        Ok(self)
    }

    /// Return a copy with one more cell dependency
    pub fn with_cell_dep(mut self, dep: CellDep) -> Self {
        self.cell_deps.push(dep);
        self
    }
}

/// Incremental builder for unsigned transactions
///
/// Every step consumes the draft and returns the updated one.
#[derive(Debug, Clone, Default)]
pub struct TransactionBuilder {
    cell_deps: Vec<CellDep>,
    inputs: Vec<CellInput>,
    outputs: Vec<CellOutput>,
    outputs_data: Vec<Vec<u8>>,
    witnesses: Vec<Witness>,
}

impl TransactionBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a cell dependency
    pub fn cell_dep(mut self, dep: CellDep) -> Self {
        self.cell_deps.push(dep);
        self
    }

    /// Add an input
    pub fn input(mut self, input: CellInput) -> Self {
        self.inputs.push(input);
        self
    }

    /// Add several inputs, overriding their `since` when one is given
    pub fn inputs_with_since<I>(mut self, inputs: I, since: Option<u64>) -> Self
    where
        I: IntoIterator<Item = CellInput>,
    {
        for mut input in inputs {
            if let Some(since) = since {
                input.since = since;
            }
            self.inputs.push(input);
        }
        self
    }

    /// Add an output together with its data payload
    pub fn output(mut self, output: CellOutput, data: Vec<u8>) -> Self {
        self.outputs.push(output);
        self.outputs_data.push(data);
        self
    }

    /// Add a witness
    pub fn witness(mut self, witness: Witness) -> Self {
        self.witnesses.push(witness);
        self
    }

    /// Add several witnesses
    pub fn witnesses<I>(mut self, witnesses: I) -> Self
    where
        I: IntoIterator<Item = Witness>,
    {
        self.witnesses.extend(witnesses);
        self
    }

    pub fn build(self) -> Transaction {
        Transaction {
            version: TX_VERSION,
            cell_deps: self.cell_deps,
            header_deps: Vec::new(),
            inputs: self.inputs,
            outputs: self.outputs,
            outputs_data: self.outputs_data,
            witnesses: self.witnesses,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ScriptHashType;

    fn lock() -> Script {
        Script::new([0x11; 32], ScriptHashType::Type, vec![0x22; 20])
    }

    fn sample_tx() -> Transaction {
        TransactionBuilder::new()
            .cell_dep(CellDep::new(OutPoint::new([0x33; 32], 0), DepType::DepGroup))
            .input(CellInput::new(OutPoint::new([0x44; 32], 1), 0))
            .output(CellOutput::new(100 * SHANNONS_PER_BYTE, lock(), None), vec![])
            .witness(Witness::empty())
            .build()
    }

    #[test]
    fn test_out_point_layout() {
        let bytes = OutPoint::new([0xaa; 32], 3).serialize();
        assert_eq!(bytes.len(), 36);
        assert_eq!(&bytes[32..], &[3, 0, 0, 0]);
    }

    #[test]
    fn test_cell_input_layout() {
        let bytes = CellInput::new(OutPoint::new([0; 32], 0), 7).serialize();
        assert_eq!(bytes.len(), 44);
        assert_eq!(&bytes[..8], &7u64.to_le_bytes());
    }

    #[test]
    fn test_empty_witness_args() {
        // Header only: total size + three offsets, all fields absent
        assert_eq!(
            WitnessArgs::default().serialize(),
            vec![16, 0, 0, 0, 16, 0, 0, 0, 16, 0, 0, 0, 16, 0, 0, 0]
        );
    }

    #[test]
    fn test_witness_args_with_lock() {
        let bytes = WitnessArgs::with_lock(vec![0u8; 65]).serialize();
        assert_eq!(bytes.len(), 16 + 4 + 65);
        assert_eq!(&bytes[0..4], &85u32.to_le_bytes());
        assert_eq!(&bytes[8..12], &85u32.to_le_bytes());
    }

    #[test]
    fn test_min_capacity() {
        let output = CellOutput::new(0, lock(), None);
        // 8 capacity + 53 lock
        assert_eq!(output.min_capacity(0), 61 * SHANNONS_PER_BYTE);
        assert_eq!(output.min_capacity(16), 77 * SHANNONS_PER_BYTE);
    }

    #[test]
    fn test_hash_ignores_witnesses() {
        let tx = sample_tx();
        let signed = tx.clone().with_witness_lock(0, vec![1u8; 65]).unwrap();
        assert_eq!(tx.compute_hash(), signed.compute_hash());
        assert_ne!(tx.serialize(), signed.serialize());
    }

    #[test]
    fn test_hash_covers_since() {
        let tx = sample_tx();
        let mut changed = tx.clone();
        changed.inputs[0].since = 1;
        assert_ne!(tx.compute_hash(), changed.compute_hash());
    }

    #[test]
    fn test_witness_lock_errors() {
        let mut tx = sample_tx();
        assert!(matches!(
            tx.clone().with_witness_lock(5, vec![]),
            Err(TransactionError::MissingWitness(5))
        ));

        tx.witnesses[0] = Witness::Opaque(vec![0xff]);
        assert!(matches!(
            tx.with_witness_lock(0, vec![]),
            Err(TransactionError::OpaqueWitness(0))
        ));
    }

    #[test]
    fn test_inputs_with_since_override() {
        let inputs = vec![
            CellInput::new(OutPoint::new([1; 32], 0), 5),
            CellInput::new(OutPoint::new([2; 32], 0), 0),
        ];
        let tx = TransactionBuilder::new()
            .inputs_with_since(inputs, Some(42))
            .build();
        assert!(tx.inputs.iter().all(|i| i.since == 42));
    }
}
