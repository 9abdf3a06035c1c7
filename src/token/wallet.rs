//! Simple UDT wallet
//!
//! Holds token cells under the default single-signature lock. Every token
//! cell carries the token type script (contract code hash, hash type
//! `data`, args = owner lock hash) and a 16-byte amount.

use super::amount::encode_amount;
use super::error::TokenError;
use super::scanner::{TokenCellScanner, TokenCells};
use crate::config::WalletConfig;
use crate::core::{
    AddressType, CellDep, CellInput, CellOutput, ParsedAddress, Script, ScriptHashType,
    TransactionBuilder, Witness, SHANNONS_PER_BYTE,
};
use crate::crypto::{KeyPair, HASH_SIZE};
use crate::rpc::ChainRpc;
use crate::signing::SignedTransaction;
use crate::wallet::{CellCollector, Wallet};

/// Capacity given to every token output (142 CKB)
pub const UDT_CELL_CAPACITY: u64 = 142 * SHANNONS_PER_BYTE;

/// Token wallet for one owner and one key
pub struct SimpleUdtWallet<R> {
    rpc: R,
    wallet: Wallet,
    owner_script_hash: [u8; HASH_SIZE],
    scanner: TokenCellScanner,
    config: WalletConfig,
}

impl<R: ChainRpc> SimpleUdtWallet<R> {
    /// Open a wallet for the well-known token contract
    ///
    /// Fails with `DependencyNotFound` when the contract is not on chain.
    pub fn new(
        rpc: R,
        key_pair: KeyPair,
        owner_script_hash: [u8; HASH_SIZE],
        config: &WalletConfig,
    ) -> Result<Self, TokenError> {
        let scanner = TokenCellScanner::new().with_window(config.scan_window);
        Self::with_scanner(rpc, key_pair, owner_script_hash, scanner, config)
    }

    /// Open a wallet using a custom scanner
    pub fn with_scanner(
        rpc: R,
        key_pair: KeyPair,
        owner_script_hash: [u8; HASH_SIZE],
        mut scanner: TokenCellScanner,
        config: &WalletConfig,
    ) -> Result<Self, TokenError> {
        scanner.locate_dependency(&rpc)?;
        Ok(Self {
            rpc,
            wallet: Wallet::new(key_pair, config),
            owner_script_hash,
            scanner,
            config: config.clone(),
        })
    }

    pub fn owner_script_hash(&self) -> [u8; HASH_SIZE] {
        self.owner_script_hash
    }

    /// The token contract cell, as located when the wallet was opened
    pub fn cell_dep(&self) -> Result<CellDep, TokenError> {
        self.scanner
            .cached_dependency()
            .cloned()
            .ok_or(TokenError::DependencyNotFound)
    }

    /// Drop the cached contract location and scan the chain again
    pub fn refresh_dependency(&mut self) -> Result<CellDep, TokenError> {
        self.scanner.invalidate();
        self.scanner.locate_dependency(&self.rpc)
    }

    pub fn type_script(&self) -> Script {
        Script::new(
            self.scanner.code_hash(),
            ScriptHashType::Data,
            self.owner_script_hash.to_vec(),
        )
    }

    pub fn type_hash(&self) -> [u8; HASH_SIZE] {
        self.type_script().compute_hash()
    }

    pub fn lock(&self) -> Script {
        self.wallet.lock()
    }

    pub fn lock_hash(&self) -> [u8; HASH_SIZE] {
        self.wallet.lock_hash()
    }

    pub fn address(&self) -> Result<String, TokenError> {
        Ok(self.wallet.address()?)
    }

    /// Every token cell this wallet holds
    pub fn get_unspent_cells(&self) -> Result<TokenCells, TokenError> {
        self.scanner
            .collect_balance(&self.rpc, &self.lock_hash(), &self.type_hash())
    }

    /// Total tokens held
    pub fn balance(&self) -> Result<u128, TokenError> {
        Ok(self.get_unspent_cells()?.total_amounts)
    }

    /// Total capacity locked in token cells
    pub fn capacities(&self) -> Result<u64, TokenError> {
        Ok(self.get_unspent_cells()?.total_capacities)
    }

    /// Send `amount` tokens to an address
    ///
    /// Short multisig addresses cannot receive tokens from this wallet.
    pub fn send_amount(
        &self,
        target_address: &str,
        amount: u128,
        fee: u64,
        use_dep_group: bool,
    ) -> Result<[u8; HASH_SIZE], TokenError> {
        let parsed = ParsedAddress::parse(target_address, &self.config.system_scripts)?;
        if parsed.address_type == AddressType::ShortMultiSig {
            return Err(TokenError::UnsupportedTarget(parsed.address_type));
        }
        self.send_amount_raw(parsed.script, amount, fee, use_dep_group)
    }

    /// Send `amount` tokens to `target_lock` and broadcast
    pub fn send_amount_raw(
        &self,
        target_lock: Script,
        amount: u128,
        fee: u64,
        use_dep_group: bool,
    ) -> Result<[u8; HASH_SIZE], TokenError> {
        let tx = self.build_transfer(target_lock, amount, fee, use_dep_group)?;
        let hash = self.rpc.send_transaction(&tx)?;
        log::info!("Broadcast token transfer {}", hex::encode(hash));
        Ok(hash)
    }

    /// Build and sign a transfer spending every token cell held
    ///
    /// Produces two token outputs of 142 CKB each: `amount` for the target
    /// and the remaining tokens (with the remaining capacity minus fee) back
    /// to this wallet.
    pub fn build_transfer(
        &self,
        target_lock: Script,
        amount: u128,
        fee: u64,
        use_dep_group: bool,
    ) -> Result<SignedTransaction, TokenError> {
        let cells = self.get_unspent_cells()?;
        if amount > cells.total_amounts {
            return Err(TokenError::InsufficientTokens {
                have: cells.total_amounts,
                need: amount,
            });
        }
        let needed = (2 * UDT_CELL_CAPACITY)
            .checked_add(fee)
            .ok_or(TokenError::CapacityOverflow)?;
        if cells.total_capacities < needed {
            return Err(TokenError::InsufficientCapacity {
                have: cells.total_capacities,
                need: needed,
            });
        }
        let change_capacity = cells.total_capacities - UDT_CELL_CAPACITY - fee;

        let mut builder = TransactionBuilder::new().cell_dep(self.cell_dep()?);
        if use_dep_group {
            builder = builder.cell_dep(self.config.system_scripts.secp_group_dep());
        } else {
            let [code, data] = self
                .config
                .system_scripts
                .secp_code_deps()
                .ok_or(TokenError::MissingSystemCell)?;
            builder = builder.cell_dep(code).cell_dep(data);
        }

        let input_count = cells.cells.len();
        let tx = builder
            .inputs_with_since(
                cells
                    .cells
                    .into_iter()
                    .map(|token| CellInput::new(token.cell.out_point, 0)),
                None,
            )
            .output(
                CellOutput::new(UDT_CELL_CAPACITY, target_lock, Some(self.type_script())),
                encode_amount(amount).to_vec(),
            )
            .output(
                CellOutput::new(change_capacity, self.lock(), Some(self.type_script())),
                encode_amount(cells.total_amounts - amount).to_vec(),
            )
            .witnesses(std::iter::repeat_with(Witness::empty).take(input_count))
            .build();

        log::debug!(
            "Token transfer of {} from {} cell(s), fee {}",
            amount,
            input_count,
            fee
        );
        Ok(self.wallet.sign(tx)?)
    }

    /// Create this wallet's first, empty token cell
    pub fn create_empty_wallet(&self, capacity: u64, fee: u64) -> Result<[u8; HASH_SIZE], TokenError> {
        self.deposit_capacity_to_udt_wallet(capacity, fee)
    }

    /// Move plain capacity from the owner's lock into a new zero-amount token cell
    pub fn deposit_capacity_to_udt_wallet(
        &self,
        capacity: u64,
        fee: u64,
    ) -> Result<[u8; HASH_SIZE], TokenError> {
        let mut collector_config = self.config.clone();
        collector_config.skip_data_and_type = true;
        let collector = CellCollector::new(&self.rpc, &collector_config);

        let output = CellOutput::new(capacity, self.lock(), Some(self.type_script()));
        let tx = self
            .wallet
            .generate_tx(&collector, output, encode_amount(0).to_vec(), fee)?
            .with_cell_dep(self.cell_dep()?);
        let tx = self.wallet.sign(tx)?;

        let hash = self.rpc.send_transaction(&tx)?;
        log::info!(
            "Deposited {} shannons into token cell, tx {}",
            capacity,
            hex::encode(hash)
        );
        Ok(hash)
    }
}
