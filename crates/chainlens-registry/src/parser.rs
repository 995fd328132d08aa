//! Signature parsing: YAML signature documents, Solidity event declarations
//! and JSON ABI files, all producing `chainlens_core::EventSignature`.
//!
//! A YAML file may hold several documents separated by `---`:
//!
//! ```yaml
//! signature ERC20Transfer:
//!   event: Transfer
//!   fields:
//!     from:  { type: address, indexed: true }
//!     to:    { type: address, indexed: true }
//!     value: { type: uint256 }
//!   meta: { protocol: erc20, category: token }
//! ```
//!
//! A missing `selector` is computed from the canonical signature; a present
//! one must match it.

use alloy_json_abi::{Event, JsonAbi};
use chainlens_core::{
    error::RegistryError,
    schema::{EventSignature, FieldDef, Selector, SignatureMeta},
    types::CanonicalType,
};
use indexmap::IndexMap;
use serde::Deserialize;
use tiny_keccak::{Hasher, Keccak};

// ─── Raw YAML serde types ─────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct SignatureRaw {
    event: String,
    #[serde(default)]
    selector: Option<String>,
    // IndexMap preserves YAML insertion order, which is the ABI decode order
    #[serde(default)]
    fields: IndexMap<String, FieldRaw>,
    #[serde(default)]
    meta: SignatureMeta,
}

#[derive(Debug, Deserialize)]
struct FieldRaw {
    #[serde(rename = "type")]
    ty: String,
    #[serde(default)]
    indexed: bool,
    #[serde(default)]
    description: Option<String>,
}

// ─── Parser ───────────────────────────────────────────────────────────────────

pub struct SignatureParser;

impl SignatureParser {
    /// Parse all signature documents from a YAML string, in file order.
    pub fn parse_yaml(yaml: &str) -> Result<Vec<EventSignature>, RegistryError> {
        use serde::de::Deserialize as _;

        let mut out = Vec::new();
        for doc in serde_yaml::Deserializer::from_str(yaml) {
            let value = serde_yaml::Value::deserialize(doc)
                .map_err(|e| RegistryError::ParseError(e.to_string()))?;
            // Skip empty documents (e.g. trailing `---`)
            if value.is_null() {
                continue;
            }
            out.push(Self::parse_value(value)?);
        }
        Ok(out)
    }

    /// Parse one YAML document. The top-level key is `signature <Name>`.
    fn parse_value(value: serde_yaml::Value) -> Result<EventSignature, RegistryError> {
        let serde_yaml::Value::Mapping(mapping) = value else {
            return Err(RegistryError::ParseError(
                "signature document must be a YAML mapping".into(),
            ));
        };

        let (name, body) = mapping
            .into_iter()
            .find_map(|(k, v)| {
                let name = k.as_str()?.strip_prefix("signature ")?.trim().to_string();
                Some((name, v))
            })
            .ok_or_else(|| RegistryError::ParseError("missing 'signature <Name>' key".into()))?;

        if name.is_empty() {
            return Err(RegistryError::ParseError("signature name is empty".into()));
        }

        let raw: SignatureRaw = serde_yaml::from_value(body)
            .map_err(|e| RegistryError::ParseError(format!("signature '{name}': {e}")))?;

        let mut fields = Vec::with_capacity(raw.fields.len());
        for (field_name, f) in raw.fields {
            let ty = CanonicalType::parse(&f.ty).map_err(|e| {
                RegistryError::ParseError(format!("signature '{name}', field '{field_name}': {e}"))
            })?;
            fields.push((
                field_name,
                FieldDef { ty, indexed: f.indexed, description: f.description },
            ));
        }

        finish(name, raw.event, fields, raw.meta, raw.selector)
    }

    /// Parse a Solidity event declaration, e.g.
    /// `event Transfer(address indexed from, address indexed to, uint256 value)`.
    ///
    /// The registry name is the event name.
    pub fn parse_event(declaration: &str) -> Result<EventSignature, RegistryError> {
        let event = Event::parse(declaration.trim())
            .map_err(|e| RegistryError::ParseError(format!("'{declaration}': {e}")))?;
        from_abi_event(&event)
    }

    /// Parse every non-empty, non-comment line of `text` as an event declaration.
    pub fn parse_events(text: &str) -> Result<Vec<EventSignature>, RegistryError> {
        text.lines()
            .map(str::trim)
            .filter(|l| !l.is_empty() && !l.starts_with('#') && !l.starts_with("//"))
            .map(Self::parse_event)
            .collect()
    }

    /// Parse the events of a JSON ABI.
    ///
    /// Accepts a bare ABI array or a build artifact with an `abi` key.
    /// Anonymous events carry no selector topic and are skipped.
    pub fn parse_json_abi(json: &str) -> Result<Vec<EventSignature>, RegistryError> {
        let mut value: serde_json::Value =
            serde_json::from_str(json).map_err(|e| RegistryError::ParseError(e.to_string()))?;
        if let Some(abi) = value.get_mut("abi") {
            value = abi.take();
        }
        let abi: JsonAbi =
            serde_json::from_value(value).map_err(|e| RegistryError::ParseError(e.to_string()))?;
        abi.events()
            .filter(|e| !e.anonymous)
            .map(from_abi_event)
            .collect()
    }
}

fn from_abi_event(event: &Event) -> Result<EventSignature, RegistryError> {
    if event.anonymous {
        return Err(RegistryError::ValidationFailed {
            reason: format!("event '{}' is anonymous and has no selector", event.name),
        });
    }
    let mut fields = Vec::with_capacity(event.inputs.len());
    for (i, param) in event.inputs.iter().enumerate() {
        let ty = CanonicalType::parse(&param.selector_type())
            .map_err(|e| RegistryError::ParseError(format!("event '{}': {e}", event.name)))?;
        let name = if param.name.is_empty() { format!("arg{i}") } else { param.name.clone() };
        fields.push((name, FieldDef { ty, indexed: param.indexed, description: None }));
    }
    finish(event.name.clone(), event.name.clone(), fields, SignatureMeta::default(), None)
}

/// Assemble a signature, computing or checking its selector.
fn finish(
    name: String,
    event: String,
    fields: Vec<(String, FieldDef)>,
    meta: SignatureMeta,
    declared: Option<String>,
) -> Result<EventSignature, RegistryError> {
    let mut sig = EventSignature {
        name,
        event,
        selector: Selector::new(""),
        fields,
        meta,
    };
    let computed = selector_of(&sig.canonical());
    sig.selector = match declared.map(Selector::new) {
        None => computed,
        Some(given) if given == computed => given,
        Some(given) => {
            return Err(RegistryError::ValidationFailed {
                reason: format!(
                    "signature '{}': selector {given} does not match {} ({computed})",
                    sig.name,
                    sig.canonical()
                ),
            })
        }
    };
    Ok(sig)
}

/// keccak256 of a canonical event signature.
pub fn selector_of(canonical: &str) -> Selector {
    let mut hasher = Keccak::v256();
    let mut output = [0u8; 32];
    hasher.update(canonical.as_bytes());
    hasher.finalize(&mut output);
    Selector::new(hex::encode(output))
}

#[cfg(test)]
mod tests {
    use super::*;

    const ERC20_TRANSFER: &str =
        "0xddf252ad1be2c89b69c2b068fc378daa952ba7f163c4a11628f55a4df523b3ef";

    const SAMPLE: &str = r#"
signature ERC20Transfer:
  event: Transfer
  selector: "0xddf252ad1be2c89b69c2b068fc378daa952ba7f163c4a11628f55a4df523b3ef"
  fields:
    from:  { type: address, indexed: true }
    to:    { type: address, indexed: true }
    value: { type: uint256, description: "amount in token base units" }
  meta:
    protocol: erc20
    category: token
---
signature ERC20Approval:
  event: Approval
  fields:
    owner:   { type: address, indexed: true }
    spender: { type: address, indexed: true }
    value:   { type: uint256 }
---
"#;

    #[test]
    fn parse_multi_doc_yaml() {
        let sigs = SignatureParser::parse_yaml(SAMPLE).unwrap();
        assert_eq!(sigs.len(), 2);
        assert_eq!(sigs[0].name, "ERC20Transfer");
        assert_eq!(sigs[0].meta.protocol.as_deref(), Some("erc20"));
        assert_eq!(
            sigs[1].selector.as_hex(),
            "0x8c5be1e5ebec7d5bd14f71427d1e84f3dd0314c0f7b2291e5b200ac8c7c3b925"
        );
    }

    #[test]
    fn field_order_preserved() {
        let sigs = SignatureParser::parse_yaml(SAMPLE).unwrap();
        let names: Vec<&str> = sigs[0].fields.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["from", "to", "value"]);
        assert!(sigs[0].fields[0].1.indexed);
        assert!(!sigs[0].fields[2].1.indexed);
    }

    #[test]
    fn wrong_selector_is_rejected() {
        let yaml = r#"
signature Bad:
  event: Transfer
  selector: "0x0000000000000000000000000000000000000000000000000000000000000001"
  fields:
    from: { type: address, indexed: true }
"#;
        let err = SignatureParser::parse_yaml(yaml).unwrap_err();
        assert!(matches!(err, RegistryError::ValidationFailed { .. }));
    }

    #[test]
    fn unknown_type_is_a_parse_error() {
        let yaml = "signature Bad:\n  event: Foo\n  fields:\n    x: { type: uint7 }\n";
        assert!(matches!(
            SignatureParser::parse_yaml(yaml).unwrap_err(),
            RegistryError::ParseError(_)
        ));
    }

    #[test]
    fn missing_signature_key() {
        let yaml = "event: Transfer\n";
        assert!(SignatureParser::parse_yaml(yaml).is_err());
    }

    #[test]
    fn parse_solidity_declaration() {
        let sig = SignatureParser::parse_event(
            "event Transfer(address indexed from, address indexed to, uint256 value)",
        )
        .unwrap();
        assert_eq!(sig.selector.as_hex(), ERC20_TRANSFER);
        assert_eq!(sig.indexed_fields().len(), 2);
        assert_eq!(sig.data_fields()[0].0, "value");
    }

    #[test]
    fn parse_declaration_lines() {
        let text = "# tokens\nevent Transfer(address indexed from, address indexed to, uint256 value)\n\nevent Approval(address indexed owner, address indexed spender, uint256 value)\n";
        let sigs = SignatureParser::parse_events(text).unwrap();
        assert_eq!(sigs.len(), 2);
    }

    #[test]
    fn parse_json_abi_artifact() {
        let json = r#"{
            "contractName": "Token",
            "abi": [
                {"type": "function", "name": "totalSupply", "inputs": [], "outputs": [{"name": "", "type": "uint256"}], "stateMutability": "view"},
                {"type": "event", "name": "Transfer", "anonymous": false, "inputs": [
                    {"name": "from", "type": "address", "indexed": true},
                    {"name": "to", "type": "address", "indexed": true},
                    {"name": "value", "type": "uint256", "indexed": false}
                ]},
                {"type": "event", "name": "Hidden", "anonymous": true, "inputs": []}
            ]
        }"#;
        let sigs = SignatureParser::parse_json_abi(json).unwrap();
        assert_eq!(sigs.len(), 1);
        assert_eq!(sigs[0].selector.as_hex(), ERC20_TRANSFER);
    }

    #[test]
    fn unnamed_params_get_positional_names() {
        let sig = SignatureParser::parse_event("event Ping(uint256, bytes32 indexed)").unwrap();
        assert_eq!(sig.fields[0].0, "arg0");
        assert_eq!(sig.fields[1].0, "arg1");
        assert_eq!(sig.canonical(), "Ping(uint256,bytes32)");
    }
}
