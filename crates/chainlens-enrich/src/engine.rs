//! `Enricher`: composes log correlation and call-tree reconstruction into one
//! enriched transaction view.

use chainlens_core::{
    chain::{Blockchain, ChainFlags, ChainSet, NameScreen},
    log::DecodedLog,
    schema::SignatureRegistry,
    transaction::{EnrichedTransaction, EnrichmentWarning, RawBlock, RawTransaction, DERIVED_KEYS},
};
use chainlens_evm::{trace_graph, LogCorrelator};
use rayon::prelude::*;
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::config::EnricherConfig;

/// Transaction enrichment engine.
///
/// Holds no per-transaction state; one instance can serve concurrent calls.
#[derive(Debug, Clone)]
pub struct Enricher {
    correlator: LogCorrelator,
    chains: ChainSet,
    config: EnricherConfig,
}

impl Enricher {
    pub fn new(registry: Arc<dyn SignatureRegistry>, config: EnricherConfig) -> Self {
        Self {
            correlator: LogCorrelator::new(registry, config.log_hash_match),
            chains: config.chains(),
            config,
        }
    }

    pub fn config(&self) -> &EnricherConfig {
        &self.config
    }

    /// Primary-network chain IDs for the configured network.
    pub fn chains(&self) -> &ChainSet {
        &self.chains
    }

    /// Display flags for `chain` on the configured network.
    pub fn chain_flags(&self, chain: &Blockchain, screen: &dyn NameScreen) -> ChainFlags {
        self.chains.derive_flags(chain, screen)
    }

    /// Enrich one transaction. Never fails: a call tree that cannot be built
    /// is reported as a warning and `traces_graph` is left empty.
    pub fn enrich(&self, tx: &RawTransaction, block: &RawBlock) -> EnrichedTransaction {
        debug!(tx_hash = %tx.hash, traces = tx.traces.len(), "enriching transaction");

        let logs = self.logs(tx, block);

        let mut warnings = Vec::new();
        let traces_graph = match trace_graph::build(tx.traces.clone()) {
            Ok(root) => Some(root),
            Err(err) => {
                warn!(tx_hash = %tx.hash, error = %err, "call tree unavailable");
                warnings.push(EnrichmentWarning::from(&err));
                None
            }
        };

        EnrichedTransaction {
            transaction_hash: tx.hash.clone(),
            fields: merge_fields(tx, block),
            logs,
            traces: tx.traces.clone(),
            traces_graph,
            transfers: Vec::new(),
            warnings,
        }
    }

    /// Enrich independent transactions in parallel. Output order matches input.
    pub fn enrich_many(&self, items: &[(RawTransaction, RawBlock)]) -> Vec<EnrichedTransaction> {
        let out: Vec<EnrichedTransaction> = items
            .par_iter()
            .map(|(tx, block)| self.enrich(tx, block))
            .collect();
        info!(
            total = out.len(),
            partial = out.iter().filter(|t| t.is_partial()).count(),
            "enriched batch"
        );
        out
    }

    fn logs(&self, tx: &RawTransaction, block: &RawBlock) -> Vec<DecodedLog> {
        if self.config.decode_logs {
            self.correlator.correlate(block, &tx.hash)
        } else {
            self.correlator
                .logs_for(block, &tx.hash)
                .into_iter()
                .map(DecodedLog::unrecognized)
                .collect()
        }
    }
}

/// Shallow merge of the raw objects, block keys over transaction keys, with
/// the keys the enricher derives removed so the typed fields own them.
fn merge_fields(tx: &RawTransaction, block: &RawBlock) -> Map<String, Value> {
    let mut fields = tx.fields.clone();
    fields.extend(block.fields.clone());
    for key in DERIVED_KEYS {
        fields.remove(*key);
    }
    fields
}
