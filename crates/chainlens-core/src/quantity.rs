//! Serde helpers for chain-reported quantities.
//!
//! Indexers are inconsistent about numbers: `"0x5208"`, `"21000"` and `21000`
//! all show up for the same field. Every form is accepted; anything else is
//! a deserialisation error, never a silent zero.

use alloy_primitives::U256;
use serde::{de, Deserialize, Deserializer, Serializer};
use std::str::FromStr;

#[derive(Deserialize)]
#[serde(untagged)]
enum Raw {
    Num(u64),
    Str(String),
}

/// Parse a `0x`-hex or decimal string into a `U256`.
pub fn parse_u256(s: &str) -> Result<U256, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("empty quantity".into());
    }
    match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some("") => Err(format!("empty hex quantity {s:?}")),
        Some(hex) => U256::from_str_radix(hex, 16).map_err(|e| format!("{s:?}: {e}")),
        None => U256::from_str(s).map_err(|e| format!("{s:?}: {e}")),
    }
}

/// `U256` field: accepts hex string, decimal string or JSON number; writes
/// a decimal string.
pub mod u256_quantity {
    use super::*;

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<U256, D::Error> {
        match Raw::deserialize(d)? {
            Raw::Num(n) => Ok(U256::from(n)),
            Raw::Str(s) => parse_u256(&s).map_err(de::Error::custom),
        }
    }

    pub fn serialize<S: Serializer>(v: &U256, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&v.to_string())
    }
}

/// `u64` field with the same input rules; writes a JSON number.
pub mod u64_quantity {
    use super::*;

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<u64, D::Error> {
        match Raw::deserialize(d)? {
            Raw::Num(n) => Ok(n),
            Raw::Str(s) => {
                let v = parse_u256(&s).map_err(de::Error::custom)?;
                u64::try_from(v).map_err(|_| de::Error::custom(format!("{s:?} overflows u64")))
            }
        }
    }

    pub fn serialize<S: Serializer>(v: &u64, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(*v)
    }
}

/// Byte strings as `0x`-prefixed hex.
pub mod hex_bytes {
    use super::*;

    pub fn serialize<S: Serializer>(bytes: &[u8], s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&format!("0x{}", hex::encode(bytes)))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<u8>, D::Error> {
        let s = String::deserialize(d)?;
        let body = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")).unwrap_or(&s);
        hex::decode(body).map_err(de::Error::custom)
    }
}
