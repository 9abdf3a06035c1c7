//! Coin selection
//!
//! [`CoinSelector`] is the contract the transaction builders depend on;
//! [`CellCollector`] is the default implementation, scanning live cells by
//! lock hash in block windows.

use thiserror::Error;

use crate::config::WalletConfig;
use crate::core::{CellInput, Witness};
use crate::crypto::HASH_SIZE;
use crate::rpc::{BlockWindows, CellOutputWithOutPoint, ChainRpc, RpcError};

/// Coin selection errors
#[derive(Error, Debug)]
pub enum CollectorError {
    #[error("Insufficient funds: have {have}, need {need}")]
    InsufficientFunds { have: u64, need: u64 },
    #[error("Capacity {capacity} is below the minimum {min} for the output")]
    CapacityBelowMinimum { capacity: u64, min: u64 },
    #[error("Capacity overflow")]
    CapacityOverflow,
    #[error("RPC error: {0}")]
    Rpc(#[from] RpcError),
}

/// Inputs chosen to fund a transaction
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GatheredInputs {
    pub inputs: Vec<CellInput>,
    /// Sum of the selected cells' capacities
    pub capacities: u64,
    /// One witness per input; the first is structured, the rest are empty placeholders
    pub witnesses: Vec<Witness>,
}

/// Chooses input cells covering a payment
pub trait CoinSelector {
    /// Gather inputs under `lock_hashes` covering `capacity + fee`, leaving
    /// either no change or at least `min_change_capacity`
    fn gather_inputs(
        &self,
        lock_hashes: &[[u8; HASH_SIZE]],
        capacity: u64,
        min_capacity: u64,
        min_change_capacity: u64,
        fee: u64,
    ) -> Result<GatheredInputs, CollectorError>;
}

impl<T: CoinSelector + ?Sized> CoinSelector for &T {
    fn gather_inputs(
        &self,
        lock_hashes: &[[u8; HASH_SIZE]],
        capacity: u64,
        min_capacity: u64,
        min_change_capacity: u64,
        fee: u64,
    ) -> Result<GatheredInputs, CollectorError> {
        (**self).gather_inputs(lock_hashes, capacity, min_capacity, min_change_capacity, fee)
    }
}

/// Live cells under one lock and their total capacity
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UnspentCells {
    pub cells: Vec<CellOutputWithOutPoint>,
    pub total_capacities: u64,
}

/// Windowed live-cell scanner used for balances and coin selection
#[derive(Debug, Clone)]
pub struct CellCollector<R> {
    rpc: R,
    skip_data_and_type: bool,
    window: u64,
}

impl<R: ChainRpc> CellCollector<R> {
    pub fn new(rpc: R, config: &WalletConfig) -> Self {
        Self {
            rpc,
            skip_data_and_type: config.skip_data_and_type,
            window: config.scan_window,
        }
    }

    fn usable(&self, cell: &CellOutputWithOutPoint) -> bool {
        !self.skip_data_and_type || (cell.output_data_len == 0 && cell.type_.is_none())
    }

    /// All usable live cells under `lock_hash`, from genesis to the tip
    pub fn get_unspent_cells(&self, lock_hash: &[u8; HASH_SIZE]) -> Result<UnspentCells, CollectorError> {
        let tip = self.rpc.get_tip_block_number()?;
        let mut result = UnspentCells::default();

        for (from, to) in BlockWindows::new(tip, self.window) {
            for cell in self.rpc.get_cells_by_lock_hash(lock_hash, from, to)? {
                if !self.usable(&cell) {
                    continue;
                }
                result.total_capacities = result
                    .total_capacities
                    .checked_add(cell.capacity)
                    .ok_or(CollectorError::CapacityOverflow)?;
                result.cells.push(cell);
            }
        }
        Ok(result)
    }
}

impl<R: ChainRpc> CoinSelector for CellCollector<R> {
    fn gather_inputs(
        &self,
        lock_hashes: &[[u8; HASH_SIZE]],
        capacity: u64,
        min_capacity: u64,
        min_change_capacity: u64,
        fee: u64,
    ) -> Result<GatheredInputs, CollectorError> {
        if capacity < min_capacity {
            return Err(CollectorError::CapacityBelowMinimum {
                capacity,
                min: min_capacity,
            });
        }
        let needed = capacity
            .checked_add(fee)
            .ok_or(CollectorError::CapacityOverflow)?;

        let mut gathered = GatheredInputs::default();
        let settled = |total: u64| {
            total >= needed && (total == needed || total - needed >= min_change_capacity)
        };

        'scan: for lock_hash in lock_hashes {
            let tip = self.rpc.get_tip_block_number()?;
            for (from, to) in BlockWindows::new(tip, self.window) {
                for cell in self.rpc.get_cells_by_lock_hash(lock_hash, from, to)? {
                    if !self.usable(&cell) {
                        continue;
                    }
                    gathered.capacities = gathered
                        .capacities
                        .checked_add(cell.capacity)
                        .ok_or(CollectorError::CapacityOverflow)?;
                    gathered.witnesses.push(if gathered.inputs.is_empty() {
                        Witness::empty()
                    } else {
                        Witness::Opaque(Vec::new())
                    });
                    gathered.inputs.push(CellInput::new(cell.out_point, 0));

                    if settled(gathered.capacities) {
                        break 'scan;
                    }
                }
            }
        }

        if !settled(gathered.capacities) {
            let need = if gathered.capacities < needed {
                needed
            } else {
                needed.saturating_add(min_change_capacity)
            };
            return Err(CollectorError::InsufficientFunds {
                have: gathered.capacities,
                need,
            });
        }

        log::debug!(
            "Gathered {} input(s) holding {} shannons for {} + fee {}",
            gathered.inputs.len(),
            gathered.capacities,
            capacity,
            fee
        );
        Ok(gathered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{CellOutput, Script, ScriptHashType, Transaction, TransactionBuilder};
    use crate::rpc::MemoryChain;

    fn lock() -> Script {
        Script::new([0x11; 32], ScriptHashType::Type, vec![0x22; 20])
    }

    fn funding(capacity: u64, data: Vec<u8>) -> Transaction {
        TransactionBuilder::new()
            .output(CellOutput::new(capacity, lock(), None), data)
            .build()
    }

    fn chain_with(capacities: &[u64]) -> MemoryChain {
        let chain = MemoryChain::new();
        for capacity in capacities {
            chain.push_block(vec![funding(*capacity, vec![])]);
        }
        chain
    }

    #[test]
    fn test_unspent_cells_skip_data() {
        let chain = chain_with(&[100, 200]);
        chain.push_block(vec![funding(500, vec![1, 2, 3])]);

        let collector = CellCollector::new(&chain, &WalletConfig::default());
        let cells = collector.get_unspent_cells(&lock().compute_hash()).unwrap();
        assert_eq!(cells.cells.len(), 2);
        assert_eq!(cells.total_capacities, 300);

        let mut config = WalletConfig::default();
        config.skip_data_and_type = false;
        let collector = CellCollector::new(&chain, &config);
        let cells = collector.get_unspent_cells(&lock().compute_hash()).unwrap();
        assert_eq!(cells.total_capacities, 800);
    }

    #[test]
    fn test_gather_exact() {
        let chain = chain_with(&[100, 200, 300]);
        let collector = CellCollector::new(&chain, &WalletConfig::default());

        let gathered = collector
            .gather_inputs(&[lock().compute_hash()], 250, 61, 61, 50)
            .unwrap();
        assert_eq!(gathered.inputs.len(), 2);
        assert_eq!(gathered.capacities, 300);
        assert_eq!(gathered.witnesses[0], Witness::empty());
        assert_eq!(gathered.witnesses[1], Witness::Opaque(vec![]));
    }

    #[test]
    fn test_gather_keeps_going_for_change() {
        let chain = chain_with(&[100, 200, 300]);
        let collector = CellCollector::new(&chain, &WalletConfig::default());

        // 300 covers 260 but leaves 40 < 61 change, so a third cell is taken
        let gathered = collector
            .gather_inputs(&[lock().compute_hash()], 250, 61, 61, 10)
            .unwrap();
        assert_eq!(gathered.inputs.len(), 3);
        assert_eq!(gathered.capacities, 600);
    }

    #[test]
    fn test_gather_insufficient() {
        let chain = chain_with(&[100]);
        let collector = CellCollector::new(&chain, &WalletConfig::default());

        let result = collector.gather_inputs(&[lock().compute_hash()], 150, 61, 61, 0);
        assert!(matches!(
            result,
            Err(CollectorError::InsufficientFunds { have: 100, need: 150 })
        ));
    }

    #[test]
    fn test_gather_change_too_small() {
        let chain = chain_with(&[100]);
        let collector = CellCollector::new(&chain, &WalletConfig::default());

        let result = collector.gather_inputs(&[lock().compute_hash()], 80, 61, 61, 0);
        assert!(matches!(
            result,
            Err(CollectorError::InsufficientFunds { have: 100, need: 141 })
        ));
    }

    #[test]
    fn test_gather_below_minimum() {
        let chain = chain_with(&[100]);
        let collector = CellCollector::new(&chain, &WalletConfig::default());
        assert!(matches!(
            collector.gather_inputs(&[lock().compute_hash()], 10, 61, 61, 0),
            Err(CollectorError::CapacityBelowMinimum { capacity: 10, min: 61 })
        ));
    }

    #[test]
    fn test_windows_span_many_blocks() {
        let chain = chain_with(&[1; 12]);
        let mut config = WalletConfig::default();
        config.scan_window = 3;
        let collector = CellCollector::new(&chain, &config);

        let cells = collector.get_unspent_cells(&lock().compute_hash()).unwrap();
        assert_eq!(cells.cells.len(), 12);
    }
}
