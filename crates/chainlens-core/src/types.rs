//! Parameter types and decoded values.
//!
//! Event parameters are declared with a `CanonicalType` and decoded into a
//! `NormalizedValue`, so presentation code never touches ABI-level
//! representations.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Type of a single event parameter.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CanonicalType {
    /// Unsigned integer (uint8 .. uint256). Width in bits.
    Uint(u16),
    /// Signed integer (int8 .. int256). Width in bits.
    Int(u16),
    Bool,
    /// Fixed-size byte array (bytes1 .. bytes32). Length in bytes.
    Bytes(u8),
    /// Variable-length byte array
    BytesVec,
    Str,
    /// 20-byte EVM address
    Address,
    /// Fixed-length array of a type
    Array { elem: Box<CanonicalType>, len: u64 },
    /// Variable-length array of a type
    Vec(Box<CanonicalType>),
    /// Tuple / struct
    Tuple(Vec<(String, CanonicalType)>),
}

impl CanonicalType {
    /// Reference types are hashed when indexed, so their value cannot be
    /// recovered from a topic.
    pub fn is_reference(&self) -> bool {
        matches!(
            self,
            CanonicalType::Str
                | CanonicalType::BytesVec
                | CanonicalType::Vec(_)
                | CanonicalType::Array { .. }
                | CanonicalType::Tuple(_)
        )
    }

    /// Parse a Solidity type string such as `uint256`, `address[]` or
    /// `bytes32[4]`.
    ///
    /// Bare `uint` / `int` are accepted as their 256-bit forms.
    pub fn parse(s: &str) -> Result<Self, String> {
        let s = s.trim();
        if let Some(inner) = s.strip_suffix("[]") {
            return Ok(CanonicalType::Vec(Box::new(Self::parse(inner)?)));
        }
        if let Some(open) = s.rfind('[') {
            if let Some(len) = s[open + 1..].strip_suffix(']') {
                let len: u64 = len
                    .parse()
                    .map_err(|_| format!("invalid array length in '{s}'"))?;
                let elem = Self::parse(&s[..open])?;
                return Ok(CanonicalType::Array { elem: Box::new(elem), len });
            }
        }
        if let Some(body) = s.strip_prefix('(').and_then(|b| b.strip_suffix(')')) {
            let parts = split_top_level(body);
            let fields = parts
                .iter()
                .enumerate()
                .map(|(i, p)| Ok((i.to_string(), Self::parse(p)?)))
                .collect::<Result<Vec<_>, String>>()?;
            return Ok(CanonicalType::Tuple(fields));
        }
        match s {
            "bool" => Ok(CanonicalType::Bool),
            "address" => Ok(CanonicalType::Address),
            "bytes" => Ok(CanonicalType::BytesVec),
            "string" => Ok(CanonicalType::Str),
            "uint" => Ok(CanonicalType::Uint(256)),
            "int" => Ok(CanonicalType::Int(256)),
            _ => {
                if let Some(bits) = s.strip_prefix("uint").and_then(|b| b.parse::<u16>().ok()) {
                    return valid_width(bits, s).map(CanonicalType::Uint);
                }
                if let Some(bits) = s.strip_prefix("int").and_then(|b| b.parse::<u16>().ok()) {
                    return valid_width(bits, s).map(CanonicalType::Int);
                }
                if let Some(n) = s.strip_prefix("bytes").and_then(|b| b.parse::<u8>().ok()) {
                    if (1..=32).contains(&n) {
                        return Ok(CanonicalType::Bytes(n));
                    }
                }
                Err(format!("unknown type: '{s}'"))
            }
        }
    }
}

fn valid_width(bits: u16, s: &str) -> Result<u16, String> {
    if bits > 0 && bits <= 256 && bits % 8 == 0 {
        Ok(bits)
    } else {
        Err(format!("invalid integer width in '{s}'"))
    }
}

/// Split a tuple body on commas that are not nested inside parentheses.
fn split_top_level(body: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0usize;
    for (i, c) in body.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                parts.push(body[start..i].trim());
                start = i + 1;
            }
            _ => {}
        }
    }
    let last = body[start..].trim();
    if !last.is_empty() {
        parts.push(last);
    }
    parts
}

impl fmt::Display for CanonicalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CanonicalType::Uint(bits) => write!(f, "uint{bits}"),
            CanonicalType::Int(bits) => write!(f, "int{bits}"),
            CanonicalType::Bool => write!(f, "bool"),
            CanonicalType::Bytes(n) => write!(f, "bytes{n}"),
            CanonicalType::BytesVec => write!(f, "bytes"),
            CanonicalType::Str => write!(f, "string"),
            CanonicalType::Address => write!(f, "address"),
            CanonicalType::Array { elem, len } => write!(f, "{elem}[{len}]"),
            CanonicalType::Vec(elem) => write!(f, "{elem}[]"),
            CanonicalType::Tuple(fields) => {
                let parts: Vec<_> = fields.iter().map(|(_, t)| t.to_string()).collect();
                write!(f, "({})", parts.join(","))
            }
        }
    }
}

/// A decoded event parameter value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum NormalizedValue {
    Uint(u128),
    /// Large uints (> u128) stored as decimal string
    BigUint(String),
    Int(i128),
    /// Large ints (> i128) stored as decimal string
    BigInt(String),
    Bool(bool),
    Bytes(#[serde(with = "crate::quantity::hex_bytes")] Vec<u8>),
    Str(String),
    /// EVM address, lowercase hex with 0x prefix
    Address(String),
    Array(Vec<NormalizedValue>),
    Tuple(Vec<(String, NormalizedValue)>),
    Null,
}

impl NormalizedValue {
    pub fn is_null(&self) -> bool {
        matches!(self, NormalizedValue::Null)
    }

    pub fn as_address(&self) -> Option<&str> {
        match self {
            NormalizedValue::Address(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Decimal string form of an unsigned value of any width.
    ///
    /// Feed this to `decimal::scale` for token amounts.
    pub fn as_uint_string(&self) -> Option<String> {
        match self {
            NormalizedValue::Uint(v) => Some(v.to_string()),
            NormalizedValue::BigUint(v) => Some(v.clone()),
            _ => None,
        }
    }
}

impl fmt::Display for NormalizedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NormalizedValue::Uint(v) => write!(f, "{v}"),
            NormalizedValue::BigUint(v) => write!(f, "{v}"),
            NormalizedValue::Int(v) => write!(f, "{v}"),
            NormalizedValue::BigInt(v) => write!(f, "{v}"),
            NormalizedValue::Bool(v) => write!(f, "{v}"),
            NormalizedValue::Bytes(b) => write!(f, "0x{}", hex::encode(b)),
            NormalizedValue::Str(s) => write!(f, "{s}"),
            NormalizedValue::Address(a) => write!(f, "{a}"),
            NormalizedValue::Array(v) => {
                let parts: Vec<_> = v.iter().map(|x| x.to_string()).collect();
                write!(f, "[{}]", parts.join(", "))
            }
            NormalizedValue::Tuple(fields) => {
                let parts: Vec<_> = fields.iter().map(|(k, v)| format!("{k}: {v}")).collect();
                write!(f, "{{{}}}", parts.join(", "))
            }
            NormalizedValue::Null => write!(f, "null"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_type_display() {
        assert_eq!(CanonicalType::Uint(256).to_string(), "uint256");
        assert_eq!(CanonicalType::Address.to_string(), "address");
        assert_eq!(
            CanonicalType::Vec(Box::new(CanonicalType::Address)).to_string(),
            "address[]"
        );
    }

    #[test]
    fn parse_scalar_types() {
        assert_eq!(CanonicalType::parse("uint256").unwrap(), CanonicalType::Uint(256));
        assert_eq!(CanonicalType::parse("int24").unwrap(), CanonicalType::Int(24));
        assert_eq!(CanonicalType::parse("uint").unwrap(), CanonicalType::Uint(256));
        assert_eq!(CanonicalType::parse("bytes32").unwrap(), CanonicalType::Bytes(32));
        assert_eq!(CanonicalType::parse("bytes").unwrap(), CanonicalType::BytesVec);
    }

    #[test]
    fn parse_composite_types() {
        let t = CanonicalType::parse("address[]").unwrap();
        assert!(matches!(t, CanonicalType::Vec(_)));

        let t = CanonicalType::parse("uint8[4]").unwrap();
        assert_eq!(t.to_string(), "uint8[4]");

        let t = CanonicalType::parse("(address,(uint256,bool))").unwrap();
        assert_eq!(t.to_string(), "(address,(uint256,bool))");
    }

    #[test]
    fn parse_rejects_bad_widths() {
        assert!(CanonicalType::parse("uint7").is_err());
        assert!(CanonicalType::parse("bytes33").is_err());
        assert!(CanonicalType::parse("float").is_err());
    }

    #[test]
    fn bytes_serialize_as_hex() {
        let val = NormalizedValue::Bytes(vec![0x12, 0x34]);
        let json = serde_json::to_value(&val).unwrap();
        assert_eq!(json, serde_json::json!({"type": "bytes", "value": "0x1234"}));
        let back: NormalizedValue = serde_json::from_value(json).unwrap();
        assert_eq!(back, val);
    }
}
