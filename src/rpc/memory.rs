//! In-process chain
//!
//! Keeps blocks and the live cell set in memory and answers the
//! [`ChainRpc`] queries from them. Broadcast transactions are queued and
//! only become part of the chain when [`MemoryChain::mine_pending`] runs.

use std::sync::{Mutex, MutexGuard};

use super::{Block, CellOutputWithOutPoint, ChainRpc, LiveCell, RpcError};
use crate::core::{CellOutput, OutPoint, Transaction};
use crate::crypto::HASH_SIZE;
use crate::signing::SignedTransaction;

#[derive(Debug, Clone)]
struct LiveEntry {
    listing: CellOutputWithOutPoint,
    output: CellOutput,
    data: Vec<u8>,
}

#[derive(Debug, Default)]
struct ChainState {
    blocks: Vec<Block>,
    live: Vec<LiveEntry>,
    pending: Vec<Transaction>,
    submitted: Vec<Transaction>,
    fetched_blocks: Vec<u64>,
    reject_reason: Option<String>,
}

impl ChainState {
    fn apply(&mut self, number: u64, tx: &Transaction) {
        self.live.retain(|entry| {
            !tx.inputs
                .iter()
                .any(|input| input.previous_output == entry.listing.out_point)
        });

        let tx_hash = tx.compute_hash();
        for (index, output) in tx.outputs.iter().enumerate() {
            let data = tx.outputs_data.get(index).cloned().unwrap_or_default();
            self.live.push(LiveEntry {
                listing: CellOutputWithOutPoint {
                    out_point: OutPoint::new(tx_hash, index as u32),
                    capacity: output.capacity,
                    lock: output.lock.clone(),
                    type_: output.type_.clone(),
                    output_data_len: data.len() as u64,
                    block_number: number,
                },
                output: output.clone(),
                data,
            });
        }
    }
}

/// In-memory chain starting from an empty genesis block
#[derive(Debug)]
pub struct MemoryChain {
    state: Mutex<ChainState>,
}

impl MemoryChain {
    pub fn new() -> Self {
        let chain = Self {
            state: Mutex::new(ChainState::default()),
        };
        chain.push_block(Vec::new());
        chain
    }

    fn state(&self) -> MutexGuard<'_, ChainState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Append a block and apply its transactions to the live set
    pub fn push_block(&self, transactions: Vec<Transaction>) -> u64 {
        let mut state = self.state();
        let number = state.blocks.len() as u64;
        for tx in &transactions {
            state.apply(number, tx);
        }
        state.blocks.push(Block {
            number,
            transactions,
        });
        number
    }

    /// Commit every queued broadcast transaction in a new block
    pub fn mine_pending(&self) -> u64 {
        let pending = std::mem::take(&mut self.state().pending);
        self.push_block(pending)
    }

    /// Make every later broadcast fail with `reason`
    pub fn reject_transactions(&self, reason: &str) {
        self.state().reject_reason = Some(reason.to_string());
    }

    /// Transactions accepted by `send_transaction`, in order
    pub fn submitted(&self) -> Vec<Transaction> {
        self.state().submitted.clone()
    }

    /// Block numbers fetched through `get_block_by_number`, in order
    pub fn fetched_blocks(&self) -> Vec<u64> {
        self.state().fetched_blocks.clone()
    }
}

impl Default for MemoryChain {
    fn default() -> Self {
        Self::new()
    }
}

impl ChainRpc for MemoryChain {
    fn get_tip_block_number(&self) -> Result<u64, RpcError> {
        Ok(self.state().blocks.len().saturating_sub(1) as u64)
    }

    fn get_block_by_number(&self, number: u64) -> Result<Block, RpcError> {
        let mut state = self.state();
        state.fetched_blocks.push(number);
        state
            .blocks
            .get(number as usize)
            .cloned()
            .ok_or(RpcError::BlockNotFound(number))
    }

    fn get_cells_by_lock_hash(
        &self,
        lock_hash: &[u8; HASH_SIZE],
        from: u64,
        to: u64,
    ) -> Result<Vec<CellOutputWithOutPoint>, RpcError> {
        Ok(self
            .state()
            .live
            .iter()
            .filter(|entry| {
                (from..=to).contains(&entry.listing.block_number)
                    && &entry.listing.lock.compute_hash() == lock_hash
            })
            .map(|entry| entry.listing.clone())
            .collect())
    }

    fn get_live_cell(&self, out_point: &OutPoint, with_data: bool) -> Result<LiveCell, RpcError> {
        self.state()
            .live
            .iter()
            .find(|entry| &entry.listing.out_point == out_point)
            .map(|entry| LiveCell {
                output: entry.output.clone(),
                data: with_data.then(|| entry.data.clone()),
            })
            .ok_or_else(|| RpcError::CellNotLive(out_point.clone()))
    }

    fn send_transaction(&self, tx: &SignedTransaction) -> Result<[u8; HASH_SIZE], RpcError> {
        let mut state = self.state();
        if let Some(reason) = &state.reject_reason {
            return Err(RpcError::Rejected(reason.clone()));
        }
        let tx = tx.transaction().clone();
        state.submitted.push(tx.clone());
        state.pending.push(tx.clone());
        Ok(tx.compute_hash())
    }
}
