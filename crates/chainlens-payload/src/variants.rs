//! Built-in payload types and their decoded content.

use crate::registry::ContentDecoder;
use num_bigint::BigUint;
use serde::{Deserialize, Serialize};
use std::fmt;
use url::Url;

/// The built-in payload type tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
#[repr(u8)]
pub enum PayloadType {
    Bin = 0,
    Utf8 = 1,
    HexStr = 2,
    B58Str = 3,
    B64Str = 4,
    BigNum = 5,
    XChainAddr = 6,
    PChainAddr = 7,
    CChainAddr = 8,
    TxId = 9,
    AssetId = 10,
    UtxoId = 11,
    NftId = 12,
    SubnetId = 13,
    ChainId = 14,
    NodeId = 15,
    SecpSig = 16,
    SecpEnc = 17,
    Jpeg = 18,
    Png = 19,
    Bmp = 20,
    Ico = 21,
    Svg = 22,
    Csv = 23,
    Json = 24,
    Yaml = 25,
    Email = 26,
    Url = 27,
    Ipfs = 28,
    Onion = 29,
    Magnet = 30,
}

impl PayloadType {
    pub const ALL: [PayloadType; 31] = [
        PayloadType::Bin,
        PayloadType::Utf8,
        PayloadType::HexStr,
        PayloadType::B58Str,
        PayloadType::B64Str,
        PayloadType::BigNum,
        PayloadType::XChainAddr,
        PayloadType::PChainAddr,
        PayloadType::CChainAddr,
        PayloadType::TxId,
        PayloadType::AssetId,
        PayloadType::UtxoId,
        PayloadType::NftId,
        PayloadType::SubnetId,
        PayloadType::ChainId,
        PayloadType::NodeId,
        PayloadType::SecpSig,
        PayloadType::SecpEnc,
        PayloadType::Jpeg,
        PayloadType::Png,
        PayloadType::Bmp,
        PayloadType::Ico,
        PayloadType::Svg,
        PayloadType::Csv,
        PayloadType::Json,
        PayloadType::Yaml,
        PayloadType::Email,
        PayloadType::Url,
        PayloadType::Ipfs,
        PayloadType::Onion,
        PayloadType::Magnet,
    ];

    pub fn tag(self) -> u8 {
        self as u8
    }

    pub fn from_tag(tag: u8) -> Option<Self> {
        Self::ALL.get(usize::from(tag)).copied()
    }

    pub fn name(self) -> &'static str {
        match self {
            PayloadType::Bin => "BIN",
            PayloadType::Utf8 => "UTF8",
            PayloadType::HexStr => "HEXSTR",
            PayloadType::B58Str => "B58STR",
            PayloadType::B64Str => "B64STR",
            PayloadType::BigNum => "BIGNUM",
            PayloadType::XChainAddr => "XCHAINADDR",
            PayloadType::PChainAddr => "PCHAINADDR",
            PayloadType::CChainAddr => "CCHAINADDR",
            PayloadType::TxId => "TXID",
            PayloadType::AssetId => "ASSETID",
            PayloadType::UtxoId => "UTXOID",
            PayloadType::NftId => "NFTID",
            PayloadType::SubnetId => "SUBNETID",
            PayloadType::ChainId => "CHAINID",
            PayloadType::NodeId => "NODEID",
            PayloadType::SecpSig => "SECPSIG",
            PayloadType::SecpEnc => "SECPENC",
            PayloadType::Jpeg => "JPEG",
            PayloadType::Png => "PNG",
            PayloadType::Bmp => "BMP",
            PayloadType::Ico => "ICO",
            PayloadType::Svg => "SVG",
            PayloadType::Csv => "CSV",
            PayloadType::Json => "JSON",
            PayloadType::Yaml => "YAML",
            PayloadType::Email => "EMAIL",
            PayloadType::Url => "URL",
            PayloadType::Ipfs => "IPFS",
            PayloadType::Onion => "ONION",
            PayloadType::Magnet => "MAGNET",
        }
    }

    /// The content decoder registered for this tag by `PayloadRegistry::builtin`.
    pub(crate) fn decoder(self) -> ContentDecoder {
        match self {
            PayloadType::Bin
            | PayloadType::HexStr
            | PayloadType::B58Str
            | PayloadType::B64Str
            | PayloadType::SecpSig
            | PayloadType::SecpEnc => decode_binary,
            PayloadType::Utf8
            | PayloadType::Svg
            | PayloadType::Csv
            | PayloadType::Yaml
            | PayloadType::Email
            | PayloadType::Ipfs
            | PayloadType::Onion
            | PayloadType::Magnet => decode_text,
            PayloadType::BigNum => decode_bignum,
            PayloadType::XChainAddr => |c| decode_address(c, AddressChain::X),
            PayloadType::PChainAddr => |c| decode_address(c, AddressChain::P),
            PayloadType::CChainAddr => |c| decode_address(c, AddressChain::C),
            PayloadType::TxId
            | PayloadType::AssetId
            | PayloadType::SubnetId
            | PayloadType::ChainId => |c| decode_id(c, 32, true),
            PayloadType::UtxoId | PayloadType::NftId => |c| decode_id(c, 32, false),
            PayloadType::NodeId => |c| decode_id(c, 20, true),
            PayloadType::Jpeg => |c| decode_image(c, "image/jpeg"),
            PayloadType::Png => |c| decode_image(c, "image/png"),
            PayloadType::Bmp => |c| decode_image(c, "image/bmp"),
            PayloadType::Ico => |c| decode_image(c, "image/x-icon"),
            PayloadType::Json => decode_json,
            PayloadType::Url => decode_url,
        }
    }
}

impl fmt::Display for PayloadType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Which primary chain an address payload belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AddressChain {
    X,
    P,
    C,
}

/// Decoded payload content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum PayloadContent {
    /// Opaque bytes, rendered by the display layer
    Binary {
        #[serde(with = "chainlens_core::quantity::hex_bytes")]
        bytes: Vec<u8>,
    },
    Text { text: String },
    /// Unsigned big-endian integer as a decimal string
    BigNum { value: String },
    Address {
        chain: AddressChain,
        #[serde(with = "chainlens_core::quantity::hex_bytes")]
        bytes: Vec<u8>,
    },
    Id {
        #[serde(with = "chainlens_core::quantity::hex_bytes")]
        bytes: Vec<u8>,
    },
    Image {
        mime: String,
        #[serde(with = "chainlens_core::quantity::hex_bytes")]
        bytes: Vec<u8>,
    },
    Json { value: serde_json::Value },
    Url { url: Url },
}

// ─── Built-in decoders ────────────────────────────────────────────────────────
//
// Decoders return a bare reason; the codec attaches the tag being decoded.

fn utf8(content: &[u8]) -> Result<String, String> {
    String::from_utf8(content.to_vec()).map_err(|e| e.to_string())
}

fn decode_binary(content: &[u8]) -> Result<PayloadContent, String> {
    Ok(PayloadContent::Binary { bytes: content.to_vec() })
}

fn decode_text(content: &[u8]) -> Result<PayloadContent, String> {
    Ok(PayloadContent::Text { text: utf8(content)? })
}

fn decode_bignum(content: &[u8]) -> Result<PayloadContent, String> {
    if content.is_empty() {
        return Err("empty integer".into());
    }
    Ok(PayloadContent::BigNum { value: BigUint::from_bytes_be(content).to_string() })
}

fn decode_address(content: &[u8], chain: AddressChain) -> Result<PayloadContent, String> {
    if content.len() != 20 {
        return Err(format!("expected 20 address bytes, got {}", content.len()));
    }
    Ok(PayloadContent::Address { chain, bytes: content.to_vec() })
}

/// `exact`: the id must be exactly `len` bytes, otherwise at least `len`.
fn decode_id(content: &[u8], len: usize, exact: bool) -> Result<PayloadContent, String> {
    let ok = if exact { content.len() == len } else { content.len() >= len };
    if !ok {
        return Err(format!("identifier of {} bytes (expected {len})", content.len()));
    }
    Ok(PayloadContent::Id { bytes: content.to_vec() })
}

fn decode_image(content: &[u8], mime: &str) -> Result<PayloadContent, String> {
    Ok(PayloadContent::Image { mime: mime.to_string(), bytes: content.to_vec() })
}

fn decode_json(content: &[u8]) -> Result<PayloadContent, String> {
    let value = serde_json::from_slice(content).map_err(|e| e.to_string())?;
    Ok(PayloadContent::Json { value })
}

fn decode_url(content: &[u8]) -> Result<PayloadContent, String> {
    let url = Url::parse(utf8(content)?.trim()).map_err(|e| e.to_string())?;
    Ok(PayloadContent::Url { url })
}
