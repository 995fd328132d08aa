//! Raw and decoded log types.

use crate::schema::Selector;
use crate::types::NormalizedValue;
use alloy_primitives::Bytes;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One emitted log as reported in a block's log list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogRecord {
    pub transaction_hash: String,
    /// Emitting contract
    pub address: String,
    /// topics[0] is the event selector; topics[1..] are indexed params
    #[serde(default)]
    pub topics: Vec<String>,
    #[serde(default)]
    pub data: Bytes,
    #[serde(with = "crate::quantity::u64_quantity")]
    pub log_index: u64,
}

impl LogRecord {
    /// topics[0] as a selector. `None` when there are no topics or the
    /// first one is not a 32-byte hash.
    pub fn selector(&self) -> Option<Selector> {
        let selector = Selector::new(self.topics.first()?);
        selector.is_well_formed().then_some(selector)
    }
}

/// Result of matching a log against the signature registry.
///
/// An unknown selector is a normal, displayable outcome rather than an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum EventMatch {
    #[serde(rename_all = "camelCase")]
    Recognized {
        /// Registry name, e.g. "ERC20Transfer"
        name: String,
        /// Canonical signature, e.g. "Transfer(address,address,uint256)"
        signature: String,
        /// Decoded parameters in declaration order
        params: IndexMap<String, NormalizedValue>,
        /// Parameters that failed to decode: name → reason
        #[serde(skip_serializing_if = "HashMap::is_empty", default)]
        decode_errors: HashMap<String, String>,
    },
    Unrecognized,
}

/// A log plus its decoded event, if any.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecodedLog {
    #[serde(flatten)]
    pub log: LogRecord,
    pub event: EventMatch,
}

impl DecodedLog {
    pub fn unrecognized(log: LogRecord) -> Self {
        Self { log, event: EventMatch::Unrecognized }
    }

    pub fn is_recognized(&self) -> bool {
        matches!(self.event, EventMatch::Recognized { .. })
    }

    /// Registry name of the matched event.
    pub fn event_name(&self) -> Option<&str> {
        match &self.event {
            EventMatch::Recognized { name, .. } => Some(name.as_str()),
            EventMatch::Unrecognized => None,
        }
    }

    pub fn param(&self, name: &str) -> Option<&NormalizedValue> {
        match &self.event {
            EventMatch::Recognized { params, .. } => params.get(name),
            EventMatch::Unrecognized => None,
        }
    }

    /// Returns `true` if any parameter failed to decode.
    pub fn has_errors(&self) -> bool {
        match &self.event {
            EventMatch::Recognized { decode_errors, .. } => !decode_errors.is_empty(),
            EventMatch::Unrecognized => false,
        }
    }
}
