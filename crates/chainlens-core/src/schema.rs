//! Event signatures: the selector → name + parameter schema mapping used to
//! decode logs.

use crate::types::CanonicalType;
use serde::{Deserialize, Serialize};

/// The identifying selector of an event: keccak256 of its canonical
/// signature, emitted as `topics[0]`.
///
/// Stored lowercase with a `0x` prefix so lookups are case-insensitive.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct Selector(String);

impl Selector {
    pub fn new(hex: impl AsRef<str>) -> Self {
        let hex = hex.as_ref().trim();
        let body = hex
            .strip_prefix("0x")
            .or_else(|| hex.strip_prefix("0X"))
            .unwrap_or(hex);
        Self(format!("0x{}", body.to_ascii_lowercase()))
    }

    pub fn as_hex(&self) -> &str {
        &self.0
    }

    /// True when this looks like a full 32-byte selector.
    pub fn is_well_formed(&self) -> bool {
        let body = &self.0[2..];
        body.len() == 64 && body.chars().all(|c| c.is_ascii_hexdigit())
    }
}

impl From<String> for Selector {
    fn from(s: String) -> Self {
        Selector::new(s)
    }
}

impl From<Selector> for String {
    fn from(s: Selector) -> Self {
        s.0
    }
}

impl std::fmt::Display for Selector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Definition of a single event parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDef {
    pub ty: CanonicalType,
    /// Indexed parameters are carried in `topics[1..]`.
    pub indexed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Metadata block attached to a signature.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SignatureMeta {
    /// Protocol slug, e.g. "erc20"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub protocol: Option<String>,
    /// Category, e.g. "token", "dex", "nft"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

/// A known event signature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventSignature {
    /// Registry name, e.g. "ERC20Transfer"
    pub name: String,
    /// Solidity event name, e.g. "Transfer"
    pub event: String,
    pub selector: Selector,
    /// Ordered parameters (order matters for ABI decode)
    pub fields: Vec<(String, FieldDef)>,
    pub meta: SignatureMeta,
}

impl EventSignature {
    /// Canonical signature string, e.g. `Transfer(address,address,uint256)`.
    pub fn canonical(&self) -> String {
        let types: Vec<String> = self.fields.iter().map(|(_, f)| f.ty.to_string()).collect();
        format!("{}({})", self.event, types.join(","))
    }

    /// Indexed parameters, in declaration order (EVM topics[1..]).
    pub fn indexed_fields(&self) -> Vec<(&str, &FieldDef)> {
        self.fields
            .iter()
            .filter(|(_, f)| f.indexed)
            .map(|(k, v)| (k.as_str(), v))
            .collect()
    }

    /// Non-indexed parameters (EVM data payload).
    pub fn data_fields(&self) -> Vec<(&str, &FieldDef)> {
        self.fields
            .iter()
            .filter(|(_, f)| !f.indexed)
            .map(|(k, v)| (k.as_str(), v))
            .collect()
    }
}

/// A thread-safe, read-only view of an event-signature registry.
/// Concrete implementations live in `chainlens-registry`.
pub trait SignatureRegistry: Send + Sync {
    /// Every signature registered under `selector`.
    ///
    /// More than one is possible: ERC-20 and ERC-721 `Transfer` share a
    /// selector and differ only in which parameters are indexed.
    fn candidates(&self, selector: &Selector) -> Vec<EventSignature>;

    /// All registered signatures, in no particular order.
    fn list(&self) -> Vec<EventSignature>;

    /// Pick the signature for a log with `topic_count` topics: the candidate
    /// whose indexed parameter count fits, else the first registered one.
    fn resolve(&self, selector: &Selector, topic_count: usize) -> Option<EventSignature> {
        let mut found = self.candidates(selector);
        if found.is_empty() {
            return None;
        }
        let pos = found
            .iter()
            .position(|s| s.indexed_fields().len() + 1 == topic_count)
            .unwrap_or(0);
        Some(found.swap_remove(pos))
    }
}
