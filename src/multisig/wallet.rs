//! Multi-signature wallet implementation
//!
//! Builds, signs and broadcasts transfers out of cells locked by a
//! [`MultiSignConfiguration`]. All `threshold` signers sign in one call.

use super::config::{MultiSignConfiguration, MultisigError};
use crate::config::{Network, SystemScripts, WalletConfig};
use crate::core::{
    full_address, AddressType, CellOutput, ParsedAddress, Script, ScriptHashType,
    TransactionBuilder,
};
use crate::crypto::{KeyPair, HASH_SIZE};
use crate::rpc::ChainRpc;
use crate::signing::{sign_transaction, SignedTransaction, SigningMessageBuilder};
use crate::wallet::{CellCollector, CoinSelector, CollectorError};

/// A wallet spending cells guarded by a multisig policy
pub struct MultiSignWallet<R, S> {
    rpc: R,
    selector: S,
    configuration: MultiSignConfiguration,
    config: WalletConfig,
}

impl<R: ChainRpc, S: CoinSelector> MultiSignWallet<R, S> {
    pub fn new(rpc: R, selector: S, configuration: MultiSignConfiguration, config: &WalletConfig) -> Self {
        Self {
            rpc,
            selector,
            configuration,
            config: config.clone(),
        }
    }

    /// Get the configuration
    pub fn configuration(&self) -> &MultiSignConfiguration {
        &self.configuration
    }

    fn scripts(&self) -> &SystemScripts {
        &self.config.system_scripts
    }

    pub fn network(&self) -> Network {
        self.config.network
    }

    /// Lock script guarding this wallet's cells
    pub fn lock(&self) -> Script {
        Script::new(
            self.scripts().multi_sign_secp_cell_type_hash,
            ScriptHashType::Type,
            self.configuration.lock_args(),
        )
    }

    pub fn lock_hash(&self) -> [u8; HASH_SIZE] {
        self.lock().compute_hash()
    }

    /// Full-format address of the multisig lock
    pub fn address(&self) -> Result<String, MultisigError> {
        Ok(full_address(self.network(), &self.lock())?)
    }

    /// Total capacity of plain live cells under the multisig lock
    pub fn get_balance(&self) -> Result<u64, MultisigError> {
        let collector = CellCollector::new(&self.rpc, &self.config);
        Ok(collector.get_unspent_cells(&self.lock_hash())?.total_capacities)
    }

    /// Build and sign a transfer of `capacity` shannons to `target_address`
    ///
    /// `private_keys` must hold exactly `threshold` keys, in the order their
    /// signatures should appear in the witness.
    pub fn build(
        &self,
        target_address: &str,
        capacity: u64,
        private_keys: &[KeyPair],
        data: &[u8],
        fee: u64,
    ) -> Result<SignedTransaction, MultisigError> {
        let threshold = self.configuration.threshold();
        if private_keys.len() != usize::from(threshold) {
            return Err(MultisigError::WrongKeyCount {
                expected: threshold,
                actual: private_keys.len(),
            });
        }

        let parsed = ParsedAddress::parse(target_address, self.scripts())?;
        if parsed.address_type != AddressType::ShortSingleSig {
            return Err(MultisigError::UnsupportedTarget(parsed.address_type));
        }

        let output = CellOutput::new(capacity, parsed.script, None);
        let mut change = CellOutput::new(0, self.lock(), None);

        let gathered = self.selector.gather_inputs(
            &[self.lock_hash()],
            capacity,
            output.min_capacity(data.len()),
            change.min_capacity(0),
            fee,
        )?;

        let spent = capacity
            .checked_add(fee)
            .ok_or(MultisigError::CapacityOverflow)?;
        change.capacity = gathered.capacities.checked_sub(spent).ok_or(
            CollectorError::InsufficientFunds {
                have: gathered.capacities,
                need: spent,
            },
        )?;

        // The policy's since replaces whatever the inputs carried, without
        // checking whether that lock-time has already passed.
        let mut builder = TransactionBuilder::new()
            .cell_dep(self.scripts().multisig_group_dep())
            .inputs_with_since(gathered.inputs, Some(self.configuration.since()))
            .output(output, data.to_vec())
            .witnesses(gathered.witnesses);
        if change.capacity > 0 {
            builder = builder.output(change, Vec::new());
        }
        let tx = builder.build();

        log::info!(
            "Signing {} transfer of {} shannons ({} input(s), fee {})",
            self.configuration.description(),
            capacity,
            tx.inputs.len(),
            fee
        );

        Ok(sign_transaction(
            tx,
            &SigningMessageBuilder::multisig(&self.configuration),
            &self.configuration.serialize(),
            private_keys,
        )?)
    }

    /// Build, sign and broadcast a transfer; returns the transaction hash
    pub fn send(
        &self,
        target_address: &str,
        capacity: u64,
        private_keys: &[KeyPair],
        data: &[u8],
        fee: u64,
    ) -> Result<[u8; HASH_SIZE], MultisigError> {
        let tx = self.build(target_address, capacity, private_keys, data, fee)?;
        let hash = self.rpc.send_transaction(&tx)?;
        log::info!("Broadcast multisig transaction {}", hex::encode(hash));
        Ok(hash)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::address::{encode_payload, CODE_HASH_INDEX_MULTISIG, SHORT_FORMAT};
    use crate::core::{short_single_sig_address, Witness, SHANNONS_PER_BYTE};
    use crate::crypto::{pubkey_hash, recover_public_key, SIGNATURE_SIZE};
    use crate::rpc::{MemoryChain, RpcError};
    use crate::wallet::GatheredInputs;
    use std::cell::Cell;

    const CKB: u64 = SHANNONS_PER_BYTE;

    struct CountingSelector {
        calls: Cell<usize>,
    }

    impl CoinSelector for CountingSelector {
        fn gather_inputs(
            &self,
            _lock_hashes: &[[u8; HASH_SIZE]],
            _capacity: u64,
            _min_capacity: u64,
            _min_change_capacity: u64,
            _fee: u64,
        ) -> Result<GatheredInputs, CollectorError> {
            self.calls.set(self.calls.get() + 1);
            Ok(GatheredInputs::default())
        }
    }

    struct Fixture {
        keys: Vec<KeyPair>,
        configuration: MultiSignConfiguration,
        config: WalletConfig,
        chain: MemoryChain,
    }

    impl Fixture {
        fn new(since: u64, capacities: &[u64]) -> Self {
            let keys: Vec<KeyPair> = (0..3).map(|_| KeyPair::generate()).collect();
            let configuration = MultiSignConfiguration::from_private_keys(0, 2, &keys, since).unwrap();
            let config = WalletConfig::default();
            let chain = MemoryChain::new();

            let lock = Script::new(
                config.system_scripts.multi_sign_secp_cell_type_hash,
                ScriptHashType::Type,
                configuration.lock_args(),
            );
            for capacity in capacities {
                chain.push_block(vec![TransactionBuilder::new()
                    .output(CellOutput::new(*capacity, lock.clone(), None), vec![])
                    .build()]);
            }

            Self {
                keys,
                configuration,
                config,
                chain,
            }
        }

        fn wallet(&self) -> MultiSignWallet<&MemoryChain, CellCollector<&MemoryChain>> {
            MultiSignWallet::new(
                &self.chain,
                CellCollector::new(&self.chain, &self.config),
                self.configuration.clone(),
                &self.config,
            )
        }

        fn target(&self) -> String {
            short_single_sig_address(self.config.network, &KeyPair::generate().pubkey_hash()).unwrap()
        }
    }

    #[test]
    fn test_lock_and_address() {
        let fixture = Fixture::new(0, &[]);
        let wallet = fixture.wallet();

        assert_eq!(wallet.lock().args.len(), 28);
        let parsed = ParsedAddress::parse(&wallet.address().unwrap(), &fixture.config.system_scripts).unwrap();
        assert_eq!(parsed.address_type, AddressType::FullType);
        assert_eq!(parsed.script, wallet.lock());
    }

    #[test]
    fn test_balance() {
        let fixture = Fixture::new(0, &[100 * CKB, 250 * CKB]);
        assert_eq!(fixture.wallet().get_balance().unwrap(), 350 * CKB);
    }

    #[test]
    fn test_build_signs_in_key_order() {
        let fixture = Fixture::new(0, &[1000 * CKB]);
        let wallet = fixture.wallet();
        let signers = &fixture.keys[..2];

        let signed = wallet
            .build(&fixture.target(), 300 * CKB, signers, &[], 1000)
            .unwrap();
        let tx = signed.transaction();

        let lock = tx.witnesses[0].args().unwrap().lock.unwrap();
        assert_eq!(lock.len(), 4 + 20 * 3 + SIGNATURE_SIZE * 2);

        let blob = fixture.configuration.serialize();
        assert_eq!(&lock[..blob.len()], &blob[..]);
        for (i, hash) in fixture.configuration.pubkey_hashes()[..2].iter().enumerate() {
            let start = blob.len() + i * SIGNATURE_SIZE;
            let recovered =
                recover_public_key(signed.signing_message(), &lock[start..start + SIGNATURE_SIZE]).unwrap();
            assert_eq!(&pubkey_hash(&recovered), hash);
        }

        assert_eq!(tx.cell_deps, vec![fixture.config.system_scripts.multisig_group_dep()]);
        assert_eq!(tx.outputs.len(), 2);
        assert_eq!(tx.outputs[0].capacity, 300 * CKB);
        assert_eq!(tx.outputs[1].capacity, 700 * CKB - 1000);
        assert_eq!(tx.outputs[1].lock, wallet.lock());
        assert_eq!(tx.total_output_capacity(), Some(1000 * CKB - 1000));
    }

    #[test]
    fn test_signing_message_matches_unsigned_draft() {
        let fixture = Fixture::new(0, &[1000 * CKB]);
        let signed = fixture
            .wallet()
            .build(&fixture.target(), 300 * CKB, &fixture.keys[..2], &[], 0)
            .unwrap();

        let mut unsigned = signed.transaction().clone();
        unsigned.witnesses[0] = Witness::empty();
        let expected = SigningMessageBuilder::multisig(&fixture.configuration)
            .build(&unsigned)
            .unwrap();
        assert_eq!(signed.signing_message(), &expected);
    }

    #[test]
    fn test_exact_spend_has_no_change() {
        let fixture = Fixture::new(0, &[500 * CKB]);
        let signed = fixture
            .wallet()
            .build(&fixture.target(), 500 * CKB - 1000, &fixture.keys[..2], b"memo", 1000)
            .unwrap();

        let tx = signed.transaction();
        assert_eq!(tx.outputs.len(), 1);
        assert_eq!(tx.outputs_data, vec![b"memo".to_vec()]);
    }

    #[test]
    fn test_wrong_key_count_touches_nothing() {
        let fixture = Fixture::new(0, &[1000 * CKB]);
        let selector = CountingSelector {
            calls: Cell::new(0),
        };
        let wallet = MultiSignWallet::new(
            &fixture.chain,
            &selector,
            fixture.configuration.clone(),
            &fixture.config,
        );

        for keys in [&fixture.keys[..1], &fixture.keys[..3]] {
            let result = wallet.send(&fixture.target(), 100 * CKB, keys, &[], 0);
            assert!(matches!(
                result,
                Err(MultisigError::WrongKeyCount { expected: 2, .. })
            ));
        }
        assert_eq!(selector.calls.get(), 0);
        assert!(fixture.chain.submitted().is_empty());
    }

    #[test]
    fn test_unsupported_targets() {
        let fixture = Fixture::new(0, &[1000 * CKB]);
        let wallet = fixture.wallet();

        let network = fixture.config.network;
        let mut short_multisig = vec![SHORT_FORMAT, CODE_HASH_INDEX_MULTISIG];
        short_multisig.extend_from_slice(&fixture.configuration.blake160());
        let data_lock = Script::new([0x42; 32], ScriptHashType::Data, vec![1; 20]);

        let targets = [
            (wallet.address().unwrap(), AddressType::FullType),
            (encode_payload(network, &short_multisig).unwrap(), AddressType::ShortMultiSig),
            (full_address(network, &data_lock).unwrap(), AddressType::FullData),
        ];
        for (target, expected) in targets {
            match wallet.build(&target, 100 * CKB, &fixture.keys[..2], &[], 0) {
                Err(MultisigError::UnsupportedTarget(actual)) => assert_eq!(actual, expected),
                other => panic!("expected UnsupportedTarget({:?}), got {:?}", expected, other.map(|_| ())),
            }
        }
        assert!(fixture.chain.submitted().is_empty());
    }

    #[test]
    fn test_insufficient_funds() {
        let fixture = Fixture::new(0, &[100 * CKB]);
        let result = fixture
            .wallet()
            .build(&fixture.target(), 500 * CKB, &fixture.keys[..2], &[], 0);
        assert!(matches!(
            result,
            Err(MultisigError::Collector(CollectorError::InsufficientFunds { .. }))
        ));
    }

    #[test]
    fn test_since_overrides_input_lock_time_unchecked() {
        // Known gap: the policy since is written to every input even when it
        // may already have elapsed.
        let since = 0x2000_0000_0000_0010;
        let fixture = Fixture::new(since, &[200 * CKB, 200 * CKB]);
        let signed = fixture
            .wallet()
            .build(&fixture.target(), 300 * CKB, &fixture.keys[..2], &[], 0)
            .unwrap();

        let tx = signed.transaction();
        assert_eq!(tx.inputs.len(), 2);
        assert!(tx.inputs.iter().all(|input| input.since == since));
    }

    #[test]
    fn test_send_broadcasts() {
        let fixture = Fixture::new(0, &[1000 * CKB]);
        let wallet = fixture.wallet();

        let hash = wallet
            .send(&fixture.target(), 300 * CKB, &fixture.keys[..2], &[], 0)
            .unwrap();
        let submitted = fixture.chain.submitted();
        assert_eq!(submitted.len(), 1);
        assert_eq!(submitted[0].compute_hash(), hash);

        fixture.chain.mine_pending();
        assert_eq!(wallet.get_balance().unwrap(), 700 * CKB);
    }

    #[test]
    fn test_broadcast_rejection_surfaces() {
        let fixture = Fixture::new(0, &[1000 * CKB]);
        fixture.chain.reject_transactions("script verification failed");

        let result = fixture
            .wallet()
            .send(&fixture.target(), 300 * CKB, &fixture.keys[..2], &[], 0);
        assert!(matches!(result, Err(MultisigError::Rpc(RpcError::Rejected(_)))));
    }
}
