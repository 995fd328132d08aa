//! Log correlation: narrows a block's log list to one transaction and
//! decodes what it can.

use chainlens_core::{
    decoder::LogDecoder,
    log::{DecodedLog, LogRecord},
    schema::SignatureRegistry,
    transaction::RawBlock,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

use crate::decoder::EvmLogDecoder;

/// How a log's `transactionHash` is compared against the requested hash.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum HashMatch {
    /// Byte-for-byte string equality
    #[default]
    Exact,
    /// `0xABC` and `0xabc` are the same transaction
    IgnoreAsciiCase,
}

impl HashMatch {
    pub fn matches(self, a: &str, b: &str) -> bool {
        match self {
            HashMatch::IgnoreAsciiCase => a.eq_ignore_ascii_case(b),
            HashMatch::Exact => a == b,
        }
    }
}

/// Filter a block's logs down to those of `tx_hash`.
///
/// Block order is kept as-is; the logs are never re-sorted by `logIndex`.
pub fn logs_for(block: &RawBlock, tx_hash: &str, mode: HashMatch) -> Vec<LogRecord> {
    block
        .logs
        .iter()
        .filter(|log| mode.matches(&log.transaction_hash, tx_hash))
        .cloned()
        .collect()
}

/// Correlates and decodes logs against an injected signature registry.
#[derive(Clone)]
pub struct LogCorrelator {
    registry: Arc<dyn SignatureRegistry>,
    decoder: EvmLogDecoder,
    hash_match: HashMatch,
}

impl LogCorrelator {
    pub fn new(registry: Arc<dyn SignatureRegistry>, hash_match: HashMatch) -> Self {
        Self { registry, decoder: EvmLogDecoder::new(), hash_match }
    }

    pub fn logs_for(&self, block: &RawBlock, tx_hash: &str) -> Vec<LogRecord> {
        logs_for(block, tx_hash, self.hash_match)
    }

    /// Best-effort decode of each log; one bad log never fails the batch.
    pub fn decode(&self, logs: &[LogRecord]) -> Vec<DecodedLog> {
        self.decoder.decode_logs(logs, self.registry.as_ref())
    }

    /// `logs_for` followed by `decode`.
    pub fn correlate(&self, block: &RawBlock, tx_hash: &str) -> Vec<DecodedLog> {
        let logs = self.logs_for(block, tx_hash);
        let decoded = self.decode(&logs);
        debug!(
            tx_hash,
            block_logs = block.logs.len(),
            matched = decoded.len(),
            recognized = decoded.iter().filter(|l| l.is_recognized()).count(),
            "correlated logs"
        );
        decoded
    }
}

impl std::fmt::Debug for LogCorrelator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LogCorrelator")
            .field("hash_match", &self.hash_match)
            .finish_non_exhaustive()
    }
}
