//! Cell-Wallet CLI Application
//!
//! Offline helpers for wallet configuration, keys, multisig policies and
//! token amounts.

use clap::{Parser, Subcommand};
use cell_wallet::cli;
use cell_wallet::config::Network;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "cell-wallet")]
#[command(version = "0.1.0")]
#[command(about = "Offline tooling for a cell-model blockchain wallet", long_about = None)]
struct Cli {
    /// Wallet configuration file
    #[arg(short, long, default_value = "wallet.json")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Configuration operations
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },

    /// Key operations
    Key {
        #[command(subcommand)]
        action: KeyCommands,
    },

    /// Multisig policy operations
    Multisig {
        #[command(subcommand)]
        action: MultisigCommands,
    },

    /// Token amount encoding
    Udt {
        #[command(subcommand)]
        action: UdtCommands,
    },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Write a default configuration file
    Init {
        /// Network: mainnet or testnet
        #[arg(short, long, default_value = "testnet")]
        network: Network,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[derive(Subcommand)]
enum KeyCommands {
    /// Generate a new key
    New {
        /// Optional label for the key
        #[arg(short, long)]
        label: Option<String>,

        /// Save the key to this file instead of printing the private key
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
enum MultisigCommands {
    /// Show the lock args and address of a policy
    Address {
        /// Signatures required (M)
        #[arg(short, long)]
        threshold: usize,

        /// Leading signers whose signatures are mandatory
        #[arg(short, long, default_value = "0")]
        require_first_n: usize,

        /// Lock-time every spend must carry
        #[arg(short, long, default_value = "0")]
        since: u64,

        /// Signer pubkey hashes (comma-separated hex)
        #[arg(long, value_delimiter = ',')]
        pubkey_hashes: Vec<String>,

        /// Signer public keys (comma-separated hex), appended after the hashes
        #[arg(long, value_delimiter = ',')]
        public_keys: Vec<String>,
    },
}

#[derive(Subcommand)]
enum UdtCommands {
    /// Encode a decimal amount as cell data
    Encode {
        amount: String,
    },

    /// Decode cell data into a decimal amount
    Decode {
        data: String,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logger
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Config { action } => match action {
            ConfigCommands::Init { network, force } => {
                cli::cmd_config_init(&cli.config, network, force)?;
            }
        },

        Commands::Key { action } => match action {
            KeyCommands::New { label, output } => {
                let config = cli::load_config(&cli.config)?;
                cli::cmd_key_new(&config, label.as_deref(), output.as_deref())?;
            }
        },

        Commands::Multisig { action } => match action {
            MultisigCommands::Address {
                threshold,
                require_first_n,
                since,
                pubkey_hashes,
                public_keys,
            } => {
                let config = cli::load_config(&cli.config)?;
                let policy =
                    cli::build_policy(require_first_n, threshold, &pubkey_hashes, &public_keys, since)?;
                cli::cmd_multisig_address(&config, &policy)?;
            }
        },

        Commands::Udt { action } => match action {
            UdtCommands::Encode { amount } => cli::cmd_udt_encode(&amount)?,
            UdtCommands::Decode { data } => cli::cmd_udt_decode(&data)?,
        },
    }

    Ok(())
}
