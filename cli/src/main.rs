//! ChainLens CLI: the command-line front end for the enrichment engine.
//!
//! # Commands
//! ```text
//! chainlens enrich      --tx <tx.json> --block <block.json> [--signatures <dir>]
//! chainlens payload     decode <base64> [--framed]
//! chainlens payload     group --file <payloads.json>
//! chainlens amount      <raw> --denomination <n> [--display-units]
//! chainlens signatures  list|validate --dir <dir>
//! chainlens chains      [--blockchains <list.json>]
//! ```

use anyhow::{Context, Result};
use chainlens_core::chain::NetworkId;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod cmd_amount;
mod cmd_enrich;
mod cmd_payload;
mod cmd_signatures;
mod config;

use config::{CliConfig, Overrides};

#[derive(Parser)]
#[command(
    name = "chainlens",
    about = "Transaction enrichment for block explorers: ChainLens CLI",
    long_about = "
ChainLens CLI: turn raw indexer transactions into presentable models.
Correlates block logs, decodes them against known event signatures,
rebuilds the call tree from flat traces, and decodes UTXO payloads.

ENVIRONMENT VARIABLES:
  RUST_LOG    Log filter, overrides --log-level unless the config disables it
",
    version
)]
struct Cli {
    /// YAML config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// mainnet or testnet (overrides the config file)
    #[arg(long, global = true)]
    network: Option<NetworkId>,

    /// Global log level, e.g. debug
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Enrich a transaction (or a JSON array of them) against its block
    Enrich {
        /// Raw transaction JSON file
        #[arg(long)]
        tx: PathBuf,
        /// Raw block JSON file, including its logs
        #[arg(long)]
        block: PathBuf,
        /// Directory of event signature files
        #[arg(long)]
        signatures: Option<PathBuf>,
        /// Single-line JSON output
        #[arg(long)]
        compact: bool,
    },

    /// Decode and group UTXO payloads
    Payload {
        #[command(subcommand)]
        action: PayloadAction,
    },

    /// Scale and format a raw amount for display
    Amount {
        /// Raw amount: decimal integer, decimal fraction, or 0x hex
        raw: String,
        /// Fractional digits of the asset, e.g. 18 for AVAX on the C-chain
        #[arg(short, long, default_value_t = 18)]
        denomination: u32,
        /// `raw` is already in display units
        #[arg(long)]
        display_units: bool,
    },

    /// Event signature management
    Signatures {
        #[command(subcommand)]
        action: SignaturesAction,
    },

    /// Show the primary chain IDs of the selected network
    Chains {
        /// JSON array of blockchains to flag as indexed or not
        #[arg(long)]
        blockchains: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
enum PayloadAction {
    /// Decode one base64 payload
    Decode {
        payload: String,
        /// Input carries the 4-byte length prefix
        #[arg(long)]
        framed: bool,
    },
    /// Decode and group a JSON array of `{assetID, groupID, payload}` entries
    Group {
        #[arg(long)]
        file: PathBuf,
        /// Fail on the first undecodable payload instead of skipping it
        #[arg(long)]
        strict: bool,
    },
}

#[derive(Subcommand)]
enum SignaturesAction {
    /// List all signatures in a directory
    List {
        #[arg(long)]
        dir: Option<PathBuf>,
    },
    /// Validate every signature file in a directory
    Validate {
        #[arg(long)]
        dir: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let overrides = Overrides {
        network: cli.network,
        log_level: cli.log_level,
        log_json: cli.log_json,
    };
    let config = CliConfig::load(cli.config.as_deref())?.apply(&overrides);
    chainlens_observability::init_tracing(&config.log).context("initialise logging")?;

    match cli.command {
        Commands::Enrich { tx, block, signatures, compact } => {
            let dir = config.signature_dir(signatures);
            cmd_enrich::run(&config, &tx, &block, dir.as_deref(), compact)
        }

        Commands::Payload { action } => match action {
            PayloadAction::Decode { payload, framed } => cmd_payload::decode(&payload, framed),
            PayloadAction::Group { file, strict } => cmd_payload::group(&file, strict),
        },

        Commands::Amount { raw, denomination, display_units } => {
            cmd_amount::run(&raw, denomination, !display_units, &config.format)
        }

        Commands::Signatures { action } => match action {
            SignaturesAction::List { dir } => {
                cmd_signatures::list(&require_dir(config.signature_dir(dir))?)
            }
            SignaturesAction::Validate { dir } => {
                cmd_signatures::validate(&require_dir(config.signature_dir(dir))?)
            }
        },

        Commands::Chains { blockchains } => cmd_chains(&config, blockchains.as_deref()),
    }
}

fn require_dir(dir: Option<PathBuf>) -> Result<PathBuf> {
    dir.context("no signature directory: pass --dir or set `signatures` in the config file")
}

// ─── Command implementations ─────────────────────────────────────────────────

fn cmd_chains(config: &CliConfig, blockchains: Option<&std::path::Path>) -> Result<()> {
    use chainlens_core::chain::{AllowAll, Blockchain};

    let network = config.enricher.network;
    let set = config.enricher.chains();
    println!("Network:  {} (id {})", network, network.as_u32());
    println!("  P-chain: {}", set.p_chain);
    println!("  X-chain: {}", set.x_chain);
    println!("  C-chain: {} (EVM chain id {})", set.c_chain, set.evm_chain_id);

    if let Some(path) = blockchains {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("read blockchains file '{}'", path.display()))?;
        let chains: Vec<Blockchain> =
            serde_json::from_str(&content).context("parse blockchains JSON")?;
        println!("\nBlockchains:");
        for chain in &chains {
            let flags = set.derive_flags(chain, &AllowAll);
            let marker = if flags.indexed { "✓" } else { " " };
            println!("  {} {:50} {}", marker, chain.id, chain.name);
        }
    }
    Ok(())
}
