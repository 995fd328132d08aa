//! The `LogDecoder` trait and the best-effort batch decode built on it.
//!
//! Implementations are `Send + Sync` so one decoder can serve concurrent
//! enrichments without locking.

use crate::error::DecodeError;
use crate::log::{DecodedLog, EventMatch, LogRecord};
use crate::schema::{EventSignature, SignatureRegistry};
use indexmap::IndexMap;
use std::collections::HashMap;

/// Key under which a whole-log failure is recorded in `decode_errors`.
pub const EVENT_ERROR_KEY: &str = "__event__";

pub trait LogDecoder: Send + Sync {
    /// Decode one log with an already-resolved signature.
    fn decode_log(
        &self,
        log: &LogRecord,
        signature: &EventSignature,
    ) -> Result<DecodedLog, DecodeError>;

    /// Decode every log, in order.
    ///
    /// Never fails as a whole: unknown selectors become
    /// `EventMatch::Unrecognized` and per-log failures are recorded on that
    /// log.
    fn decode_logs(&self, logs: &[LogRecord], registry: &dyn SignatureRegistry) -> Vec<DecodedLog> {
        logs.iter()
            .map(|log| decode_or_mark(self, log, registry))
            .collect()
    }
}

/// Resolve the signature for `log` and decode it, marking instead of failing.
pub fn decode_or_mark<D: LogDecoder + ?Sized>(
    decoder: &D,
    log: &LogRecord,
    registry: &dyn SignatureRegistry,
) -> DecodedLog {
    let Some(selector) = log.selector() else {
        return DecodedLog::unrecognized(log.clone());
    };
    let Some(signature) = registry.resolve(&selector, log.topics.len()) else {
        return DecodedLog::unrecognized(log.clone());
    };
    match decoder.decode_log(log, &signature) {
        Ok(decoded) => decoded,
        Err(err) => {
            let mut decode_errors = HashMap::new();
            decode_errors.insert(EVENT_ERROR_KEY.to_string(), err.to_string());
            DecodedLog {
                log: log.clone(),
                event: EventMatch::Recognized {
                    name: signature.name.clone(),
                    signature: signature.canonical(),
                    params: IndexMap::new(),
                    decode_errors,
                },
            }
        }
    }
}
