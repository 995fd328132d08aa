//! `chainlens enrich`: enrich raw transactions against their block.

use anyhow::{Context, Result};
use chainlens_core::transaction::{RawBlock, RawTransaction};
use chainlens_enrich::Enricher;
use chainlens_registry::MemoryRegistry;
use serde::Deserialize;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

use crate::config::CliConfig;

/// A `--tx` file holds one transaction or an array of them.
#[derive(Deserialize)]
#[serde(untagged)]
enum TxInput {
    Many(Vec<RawTransaction>),
    One(Box<RawTransaction>),
}

pub fn run(
    config: &CliConfig,
    tx_path: &Path,
    block_path: &Path,
    signature_dir: Option<&Path>,
    compact: bool,
) -> Result<()> {
    let block: RawBlock = read_json(block_path)?;
    let input: TxInput = read_json(tx_path)?;

    let registry = MemoryRegistry::new();
    if let Some(dir) = signature_dir {
        let loaded = registry
            .load_directory(dir)
            .with_context(|| format!("load signatures from '{}'", dir.display()))?;
        info!(dir = %dir.display(), loaded, "signatures ready");
    }
    let enricher = Enricher::new(Arc::new(registry), config.enricher.clone());

    let output = match input {
        TxInput::One(tx) => serde_json::to_value(enricher.enrich(&tx, &block))?,
        TxInput::Many(txs) => {
            let items: Vec<(RawTransaction, RawBlock)> =
                txs.into_iter().map(|tx| (tx, block.clone())).collect();
            serde_json::to_value(enricher.enrich_many(&items))?
        }
    };

    if compact {
        println!("{}", serde_json::to_string(&output)?);
    } else {
        println!("{}", serde_json::to_string_pretty(&output)?);
    }
    Ok(())
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("read '{}'", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("parse '{}'", path.display()))
}
