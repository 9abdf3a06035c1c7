//! End-to-end wallet flows against the in-memory chain

use cell_wallet::core::{CellOutput, Script, ScriptHashType, SHANNONS_PER_BYTE};
use cell_wallet::crypto::{blake2b_256, pubkey_hash, recover_public_key, SIGNATURE_SIZE};
use cell_wallet::multisig::MultisigError;
use cell_wallet::rpc::RpcError;
use cell_wallet::token::UDT_CELL_CAPACITY;
use cell_wallet::{
    CellCollector, KeyPair, MemoryChain, MultiSignConfiguration, MultiSignWallet, SimpleUdtWallet,
    TokenCellScanner, TransactionBuilder, Wallet, WalletConfig,
};

const CKB: u64 = SHANNONS_PER_BYTE;
const CONTRACT: &[u8] = b"simple udt contract binary";

fn fund(chain: &MemoryChain, lock: Script, capacity: u64) {
    chain.push_block(vec![TransactionBuilder::new()
        .output(CellOutput::new(capacity, lock, None), vec![])
        .build()]);
}

#[test]
fn multisig_payout_then_token_issue() {
    let config = WalletConfig::default();
    let chain = MemoryChain::new();

    // Token contract deployed before anything else
    chain.push_block(vec![TransactionBuilder::new()
        .output(
            CellOutput::new(50_000 * CKB, Script::new([0; 32], ScriptHashType::Data, vec![]), None),
            CONTRACT.to_vec(),
        )
        .build()]);

    // 2-of-3 treasury with two funding cells
    let signers: Vec<KeyPair> = (0..3).map(|_| KeyPair::generate()).collect();
    let policy = MultiSignConfiguration::from_private_keys(0, 2, &signers, 0).unwrap();
    let treasury = MultiSignWallet::new(&chain, CellCollector::new(&chain, &config), policy.clone(), &config);
    fund(&chain, treasury.lock(), 600 * CKB);
    fund(&chain, treasury.lock(), 600 * CKB);
    assert_eq!(treasury.get_balance().unwrap(), 1200 * CKB);

    // Pay an operator out of the treasury
    let operator = Wallet::generate(&config);
    let signed = treasury
        .build(&operator.address().unwrap(), 1000 * CKB, &signers[1..], &[], 2000)
        .unwrap();
    let lock = signed.transaction().witnesses[0].args().unwrap().lock.unwrap();
    assert_eq!(lock.len(), 4 + 20 * 3 + SIGNATURE_SIZE * 2);
    let blob_len = policy.serialize().len();
    for (i, key) in signers[1..].iter().enumerate() {
        let start = blob_len + i * SIGNATURE_SIZE;
        let recovered =
            recover_public_key(signed.signing_message(), &lock[start..start + SIGNATURE_SIZE]).unwrap();
        assert_eq!(pubkey_hash(&recovered), key.pubkey_hash());
    }

    treasury
        .send(&operator.address().unwrap(), 1000 * CKB, &signers[1..], &[], 2000)
        .unwrap();
    chain.mine_pending();
    assert_eq!(treasury.get_balance().unwrap(), 200 * CKB - 2000);

    let collector = CellCollector::new(&chain, &config);
    assert_eq!(
        collector.get_unspent_cells(&operator.lock_hash()).unwrap().total_capacities,
        1000 * CKB
    );

    // The operator opens a token wallet owned by the treasury lock
    let tokens = SimpleUdtWallet::with_scanner(
        &chain,
        operator.key_pair().clone(),
        treasury.lock_hash(),
        TokenCellScanner::with_code_hash(blake2b_256(CONTRACT)),
        &config,
    )
    .unwrap();
    tokens.create_empty_wallet(300 * CKB, 1000).unwrap();
    chain.mine_pending();

    assert_eq!(tokens.balance().unwrap(), 0);
    assert_eq!(tokens.capacities().unwrap(), 300 * CKB);
    assert!(tokens.capacities().unwrap() >= 2 * UDT_CELL_CAPACITY);
}

#[test]
fn multisig_failures_leave_chain_untouched() {
    let config = WalletConfig::default();
    let chain = MemoryChain::new();
    let signers: Vec<KeyPair> = (0..2).map(|_| KeyPair::generate()).collect();
    let policy = MultiSignConfiguration::from_private_keys(0, 2, &signers, 0).unwrap();
    let wallet = MultiSignWallet::new(&chain, CellCollector::new(&chain, &config), policy, &config);
    fund(&chain, wallet.lock(), 500 * CKB);

    let target = Wallet::generate(&config).address().unwrap();
    assert!(matches!(
        wallet.send(&target, 100 * CKB, &signers[..1], &[], 0),
        Err(MultisigError::WrongKeyCount { expected: 2, actual: 1 })
    ));

    chain.reject_transactions("double spend");
    assert!(matches!(
        wallet.send(&target, 100 * CKB, &signers, &[], 0),
        Err(MultisigError::Rpc(RpcError::Rejected(_)))
    ));
    assert!(chain.submitted().is_empty());
    assert_eq!(wallet.get_balance().unwrap(), 500 * CKB);
}
