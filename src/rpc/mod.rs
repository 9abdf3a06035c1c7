//! Chain RPC contract
//!
//! The wallet never talks to a node directly; it goes through [`ChainRpc`].
//! Transport, retries and timeouts belong to the implementor.

pub mod memory;

use thiserror::Error;

use crate::core::{CellOutput, OutPoint, Script, Transaction};
use crate::crypto::HASH_SIZE;
use crate::signing::SignedTransaction;

pub use memory::MemoryChain;

/// Errors surfaced by a chain RPC implementation
#[derive(Error, Debug)]
pub enum RpcError {
    #[error("Transport error: {0}")]
    Transport(String),
    #[error("Block not found: {0}")]
    BlockNotFound(u64),
    #[error("Cell is not live: {0}")]
    CellNotLive(OutPoint),
    #[error("Transaction rejected by node: {0}")]
    Rejected(String),
}

/// A block as returned by the node
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    pub number: u64,
    pub transactions: Vec<Transaction>,
}

/// A live cell as listed by lock hash
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellOutputWithOutPoint {
    pub out_point: OutPoint,
    pub capacity: u64,
    pub lock: Script,
    pub type_: Option<Script>,
    pub output_data_len: u64,
    pub block_number: u64,
}

/// A live cell fetched by out-point
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiveCell {
    pub output: CellOutput,
    /// Present only when requested with data
    pub data: Option<Vec<u8>>,
}

/// Narrow node interface consumed by the wallets
pub trait ChainRpc {
    fn get_tip_block_number(&self) -> Result<u64, RpcError>;

    fn get_block_by_number(&self, number: u64) -> Result<Block, RpcError>;

    /// Live cells under `lock_hash` created in blocks `from..=to`
    fn get_cells_by_lock_hash(
        &self,
        lock_hash: &[u8; HASH_SIZE],
        from: u64,
        to: u64,
    ) -> Result<Vec<CellOutputWithOutPoint>, RpcError>;

    fn get_live_cell(&self, out_point: &OutPoint, with_data: bool) -> Result<LiveCell, RpcError>;

    /// Broadcast a fully signed transaction, returning its hash
    fn send_transaction(&self, tx: &SignedTransaction) -> Result<[u8; HASH_SIZE], RpcError>;
}

impl<T: ChainRpc + ?Sized> ChainRpc for &T {
    fn get_tip_block_number(&self) -> Result<u64, RpcError> {
        (**self).get_tip_block_number()
    }

    fn get_block_by_number(&self, number: u64) -> Result<Block, RpcError> {
        (**self).get_block_by_number(number)
    }

    fn get_cells_by_lock_hash(
        &self,
        lock_hash: &[u8; HASH_SIZE],
        from: u64,
        to: u64,
    ) -> Result<Vec<CellOutputWithOutPoint>, RpcError> {
        (**self).get_cells_by_lock_hash(lock_hash, from, to)
    }

    fn get_live_cell(&self, out_point: &OutPoint, with_data: bool) -> Result<LiveCell, RpcError> {
        (**self).get_live_cell(out_point, with_data)
    }

    fn send_transaction(&self, tx: &SignedTransaction) -> Result<[u8; HASH_SIZE], RpcError> {
        (**self).send_transaction(tx)
    }
}

/// Inclusive block ranges `[from, to]` covering `0..=tip`
///
/// Each range ends `window` blocks after it starts (clamped to the tip).
#[derive(Debug, Clone)]
pub struct BlockWindows {
    next: u64,
    tip: u64,
    window: u64,
    done: bool,
}

impl BlockWindows {
    pub fn new(tip: u64, window: u64) -> Self {
        Self {
            next: 0,
            tip,
            window,
            done: false,
        }
    }
}

impl Iterator for BlockWindows {
    type Item = (u64, u64);

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let from = self.next;
        let to = from.saturating_add(self.window).min(self.tip);
        if to == self.tip {
            self.done = true;
        } else {
            self.next = to + 1;
        }
        Some((from, to))
    }
}
