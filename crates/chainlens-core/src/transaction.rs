//! Raw transaction/block inputs and the enriched transaction view.

use crate::error::TraceGraphError;
use crate::log::{DecodedLog, LogRecord};
use crate::trace::{CallTrace, TraceNode};
use alloy_primitives::{Bytes, U256};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

/// Keys owned by the enrichment step. Raw fields with these names are
/// dropped from the merged view.
pub const DERIVED_KEYS: &[&str] = &[
    "transactionHash",
    "logs",
    "traces",
    "tracesGraph",
    "transfers",
    "warnings",
];

/// A transaction as returned by the indexer.
///
/// The fields the engine reads are typed; `fields` keeps the whole object
/// exactly as received, typed keys included, for the merged view.
#[derive(Debug, Clone, PartialEq)]
pub struct RawTransaction {
    pub hash: String,
    pub from: String,
    pub to: Option<String>,
    pub value: U256,
    pub input: Bytes,
    pub traces: Vec<CallTrace>,
    pub fields: Map<String, Value>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TypedFields {
    hash: String,
    from: String,
    #[serde(default)]
    to: Option<String>,
    #[serde(with = "crate::quantity::u256_quantity", default)]
    value: U256,
    #[serde(default)]
    input: Bytes,
    #[serde(default)]
    traces: Vec<CallTrace>,
}

impl RawTransaction {
    /// Read the typed fields out of a raw indexer object, keeping the object.
    pub fn from_fields(fields: Map<String, Value>) -> Result<Self, serde_json::Error> {
        let typed = TypedFields::deserialize(Value::Object(fields.clone()))?;
        Ok(Self {
            hash: typed.hash,
            from: typed.from,
            to: typed.to,
            value: typed.value,
            input: typed.input,
            traces: typed.traces,
            fields,
        })
    }
}

impl<'de> Deserialize<'de> for RawTransaction {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        let fields = Map::<String, Value>::deserialize(d)?;
        Self::from_fields(fields).map_err(de::Error::custom)
    }
}

/// Serialized as the object it was read from.
impl Serialize for RawTransaction {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        self.fields.serialize(s)
    }
}

/// A block with its full log list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawBlock {
    #[serde(default)]
    pub logs: Vec<LogRecord>,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

/// A value movement derived from a transaction.
///
/// Produced by a downstream extraction pass; the core leaves the list empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValueTransfer {
    /// Token contract, or `None` for the native asset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    pub from: String,
    pub to: String,
    #[serde(with = "crate::quantity::u256_quantity")]
    pub value: U256,
}

/// A non-fatal problem found while enriching. The result is still usable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "detail", rename_all = "camelCase")]
pub enum EnrichmentWarning {
    /// The call tree could not be rebuilt; `tracesGraph` is absent.
    TraceGraph(String),
}

impl From<&TraceGraphError> for EnrichmentWarning {
    fn from(err: &TraceGraphError) -> Self {
        EnrichmentWarning::TraceGraph(err.to_string())
    }
}

/// The presentable model of one transaction.
///
/// `fields` is the shallow merge of the raw transaction and block objects,
/// block keys last, so a block `hash` or `number` replaces the
/// transaction's. The typed fields below are derived and always take
/// precedence; `transaction_hash` keeps the transaction's own identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrichedTransaction {
    pub transaction_hash: String,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
    pub logs: Vec<DecodedLog>,
    /// The flat trace list exactly as received
    pub traces: Vec<CallTrace>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub traces_graph: Option<TraceNode>,
    pub transfers: Vec<ValueTransfer>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<EnrichmentWarning>,
}

impl EnrichedTransaction {
    /// Raw field from the merged transaction/block view.
    pub fn field(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// True when some enrichment step degraded.
    pub fn is_partial(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// Logs that matched no known event signature.
    pub fn unrecognized_logs(&self) -> impl Iterator<Item = &DecodedLog> {
        self.logs.iter().filter(|l| !l.is_recognized())
    }
}
