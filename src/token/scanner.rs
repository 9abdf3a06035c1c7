//! Token cell discovery
//!
//! Finds the cell deploying the token contract and collects the token
//! cells a lock owns. The located dependency is cached on the scanner
//! until [`TokenCellScanner::invalidate`] is called.

use super::amount::decode_amount;
use super::error::TokenError;
use crate::config::DEFAULT_SCAN_WINDOW;
use crate::core::{CellDep, DepType, Script};
use crate::crypto::{blake2b_256, HASH_SIZE};
use crate::rpc::{BlockWindows, CellOutputWithOutPoint, ChainRpc};

/// Data hash of the simple UDT contract binary
pub const UDT_SCRIPT_HASH: [u8; HASH_SIZE] = [
    0x57, 0xdd, 0x00, 0x67, 0x81, 0x4d, 0xab, 0x35, 0x6e, 0x05, 0xc6, 0xde, 0xf0, 0xd0, 0x94, 0xbb,
    0x79, 0x77, 0x67, 0x11, 0xe6, 0x8f, 0xfd, 0xfa, 0xd2, 0xdf, 0x6a, 0x7f, 0x87, 0x7f, 0x7d, 0xb6,
];

/// A live token cell and the amount it holds
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenCell {
    pub cell: CellOutputWithOutPoint,
    pub amount: u128,
}

/// Token cells under one lock with their totals
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenCells {
    pub cells: Vec<TokenCell>,
    pub total_capacities: u64,
    pub total_amounts: u128,
}

#[derive(Debug, Clone)]
pub struct TokenCellScanner {
    code_hash: [u8; HASH_SIZE],
    window: u64,
    cell_dep: Option<CellDep>,
}

impl TokenCellScanner {
    pub fn new() -> Self {
        Self::with_code_hash(UDT_SCRIPT_HASH)
    }

    /// Scanner for a contract whose binary hashes to `code_hash`
    pub fn with_code_hash(code_hash: [u8; HASH_SIZE]) -> Self {
        Self {
            code_hash,
            window: DEFAULT_SCAN_WINDOW,
            cell_dep: None,
        }
    }

    pub fn with_window(mut self, window: u64) -> Self {
        self.window = window;
        self
    }

    pub fn code_hash(&self) -> [u8; HASH_SIZE] {
        self.code_hash
    }

    pub fn cached_dependency(&self) -> Option<&CellDep> {
        self.cell_dep.as_ref()
    }

    /// Forget the located dependency so the next lookup rescans
    pub fn invalidate(&mut self) {
        self.cell_dep = None;
    }

    /// Find the first output, from genesis upwards, whose data is the contract
    pub fn locate_dependency<R: ChainRpc>(&mut self, rpc: &R) -> Result<CellDep, TokenError> {
        if let Some(dep) = &self.cell_dep {
            return Ok(dep.clone());
        }

        let tip = rpc.get_tip_block_number()?;
        for number in 0..=tip {
            let block = rpc.get_block_by_number(number)?;
            for tx in &block.transactions {
                let found = tx
                    .outputs_data
                    .iter()
                    .position(|data| blake2b_256(data) == self.code_hash);
                if let Some(index) = found {
                    let dep = CellDep::new(tx.out_point(index as u32), DepType::Code);
                    log::info!(
                        "Found token contract at {} in block {}",
                        dep.out_point,
                        number
                    );
                    self.cell_dep = Some(dep.clone());
                    return Ok(dep);
                }
            }
        }

        log::warn!("Token contract not found up to block {}", tip);
        Err(TokenError::DependencyNotFound)
    }

    /// Token cells under `lock_hash` whose type script hashes to `type_hash`
    pub fn collect_balance<R: ChainRpc>(
        &self,
        rpc: &R,
        lock_hash: &[u8; HASH_SIZE],
        type_hash: &[u8; HASH_SIZE],
    ) -> Result<TokenCells, TokenError> {
        let tip = rpc.get_tip_block_number()?;
        let mut result = TokenCells::default();

        for (from, to) in BlockWindows::new(tip, self.window) {
            for cell in rpc.get_cells_by_lock_hash(lock_hash, from, to)? {
                let matches = cell
                    .type_
                    .as_ref()
                    .map(Script::compute_hash)
                    .is_some_and(|hash| &hash == type_hash);
                if !matches {
                    continue;
                }

                let live = rpc.get_live_cell(&cell.out_point, true)?;
                let amount = decode_amount(live.data.as_deref().unwrap_or_default())?;

                result.total_capacities = result
                    .total_capacities
                    .checked_add(cell.capacity)
                    .ok_or(TokenError::CapacityOverflow)?;
                result.total_amounts = result
                    .total_amounts
                    .checked_add(amount)
                    .ok_or(TokenError::AmountOverflow)?;
                result.cells.push(TokenCell { cell, amount });
            }
        }

        log::debug!(
            "Collected {} token cell(s): {} tokens, {} shannons",
            result.cells.len(),
            result.total_amounts,
            result.total_capacities
        );
        Ok(result)
    }
}

impl Default for TokenCellScanner {
    fn default() -> Self {
        Self::new()
    }
}
