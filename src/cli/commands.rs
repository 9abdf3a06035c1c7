//! CLI commands for the wallet
//!
//! Implements the offline command handlers: nothing here talks to a node.

use std::path::Path;

use crate::config::{Network, WalletConfig};
use crate::core::{full_address, Script, ScriptHashType};
use crate::crypto::{pubkey_hash, public_key_from_hex, BLAKE160_SIZE};
use crate::multisig::MultiSignConfiguration;
use crate::token::{decode_amount, encode_amount, parse_amount};
use crate::wallet::Wallet;

/// Result type for CLI operations
pub type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

/// Load the wallet configuration, falling back to testnet defaults
pub fn load_config(path: &Path) -> CliResult<WalletConfig> {
    if path.exists() {
        let config = WalletConfig::load(path)?;
        config.validate()?;
        Ok(config)
    } else {
        log::debug!("No config at {:?}, using testnet defaults", path);
        Ok(WalletConfig::default())
    }
}

/// Write a default configuration for `network`
pub fn cmd_config_init(path: &Path, network: Network, force: bool) -> CliResult<()> {
    if path.exists() && !force {
        println!("⚠️  Config already exists at {:?}", path);
        println!("   Use --force to overwrite it");
        return Ok(());
    }

    let config = WalletConfig::for_network(network);
    config.save(path)?;

    println!("✅ Config written to {:?}", path);
    println!("   🌐 Network: {:?} (prefix {})", network, network.prefix());
    println!("   🔎 Scan window: {} blocks", config.scan_window);
    Ok(())
}

/// Generate a key and print its single-signature address
pub fn cmd_key_new(config: &WalletConfig, label: Option<&str>, output: Option<&Path>) -> CliResult<()> {
    let mut wallet = Wallet::generate(config);
    wallet.label = label.map(str::to_string);

    println!("🔐 New key generated!");
    println!("   📍 Address: {}", wallet.address()?);
    println!("   🔑 Public Key: {}", wallet.public_key());
    println!("   #️⃣  Lock args: 0x{}", hex::encode(wallet.key_pair().pubkey_hash()));

    match output {
        Some(path) => {
            wallet.save(path)?;
            println!("\n   💾 Saved to {:?}", path);
            println!("   ⚠️  The file holds the private key in plain text.");
        }
        None => println!("   🗝️  Private Key: {}", wallet.key_pair().private_key_hex()),
    }
    Ok(())
}

/// Parse a 20-byte pubkey hash, with or without `0x`
pub fn parse_pubkey_hash(input: &str) -> CliResult<[u8; BLAKE160_SIZE]> {
    let bytes = hex::decode(input.trim().trim_start_matches("0x"))?;
    let hash: [u8; BLAKE160_SIZE] = bytes
        .as_slice()
        .try_into()
        .map_err(|_| format!("pubkey hash must be {} bytes, got {}", BLAKE160_SIZE, bytes.len()))?;
    Ok(hash)
}

/// Build a policy from pubkey hashes and/or public keys (hashes first)
pub fn build_policy(
    require_first_n: usize,
    threshold: usize,
    pubkey_hashes: &[String],
    public_keys: &[String],
    since: u64,
) -> CliResult<MultiSignConfiguration> {
    let mut hashes = pubkey_hashes
        .iter()
        .map(|h| parse_pubkey_hash(h))
        .collect::<CliResult<Vec<_>>>()?;
    for key in public_keys {
        hashes.push(pubkey_hash(&public_key_from_hex(key.trim_start_matches("0x"))?));
    }
    if hashes.is_empty() {
        return Err("at least one pubkey hash or public key is required".into());
    }

    Ok(MultiSignConfiguration::new(require_first_n, threshold, hashes, since)?)
}

/// Print the lock args and address of a multisig policy
pub fn cmd_multisig_address(config: &WalletConfig, policy: &MultiSignConfiguration) -> CliResult<()> {
    let lock = Script::new(
        config.system_scripts.multi_sign_secp_cell_type_hash,
        ScriptHashType::Type,
        policy.lock_args(),
    );

    println!("🔏 {} multisig policy", policy.description());
    println!("   ├─ Required first: {}", policy.require_first_n());
    println!("   ├─ Since: {:#x}", policy.since());
    println!("   ├─ Policy: 0x{}", hex::encode(policy.serialize()));
    println!("   ├─ Lock args: 0x{}", hex::encode(policy.lock_args()));
    println!("   └─ Address: {}", full_address(config.network, &lock)?);
    Ok(())
}

/// Hex encoding of a decimal token amount
pub fn amount_to_hex(amount: &str) -> CliResult<String> {
    Ok(format!("0x{}", hex::encode(encode_amount(parse_amount(amount)?))))
}

/// Decimal token amount from its hex encoding
pub fn amount_from_hex(data: &str) -> CliResult<String> {
    let bytes = hex::decode(data.trim().trim_start_matches("0x"))?;
    Ok(decode_amount(&bytes)?.to_string())
}

pub fn cmd_udt_encode(amount: &str) -> CliResult<()> {
    println!("{}", amount_to_hex(amount)?);
    Ok(())
}

pub fn cmd_udt_decode(data: &str) -> CliResult<()> {
    println!("{}", amount_from_hex(data)?);
    Ok(())
}
