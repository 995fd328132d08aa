//! Framing and decoding of type-tagged payload buffers.

use base64::{engine::general_purpose, Engine as _};
use bytes::{Buf, BufMut, BytesMut};
use chainlens_core::error::PayloadError;
use serde::{Deserialize, Serialize};

use crate::registry::PayloadRegistry;
use crate::variants::{PayloadContent, PayloadType};

/// Size of the big-endian length prefix.
pub const LENGTH_PREFIX: usize = 4;

/// A decoded payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PayloadBlock {
    pub type_id: u8,
    #[serde(rename = "typedContent")]
    pub content: PayloadContent,
}

impl PayloadBlock {
    /// The built-in type for `type_id`, if it is one.
    pub fn payload_type(&self) -> Option<PayloadType> {
        PayloadType::from_tag(self.type_id)
    }
}

/// Prepend the 4-byte big-endian length to `tagged` (tag byte + content).
pub fn frame(tagged: &[u8]) -> Result<Vec<u8>, PayloadError> {
    let len = u32::try_from(tagged.len()).map_err(|_| PayloadError::TooLarge { len: tagged.len() })?;
    let mut buf = BytesMut::with_capacity(LENGTH_PREFIX + tagged.len());
    buf.put_u32(len);
    buf.put_slice(tagged);
    Ok(buf.to_vec())
}

/// Decodes payload buffers with an injected type registry.
#[derive(Debug, Clone)]
pub struct PayloadCodec {
    registry: PayloadRegistry,
}

impl Default for PayloadCodec {
    fn default() -> Self {
        Self::new(PayloadRegistry::builtin())
    }
}

impl PayloadCodec {
    pub fn new(registry: PayloadRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &PayloadRegistry {
        &self.registry
    }

    /// Decode a framed buffer: `[u32 BE length][tag][content]`.
    ///
    /// The prefix must equal the number of bytes that follow it exactly.
    pub fn decode(&self, buffer: &[u8]) -> Result<PayloadBlock, PayloadError> {
        if buffer.len() < LENGTH_PREFIX + 1 {
            return Err(PayloadError::Truncated { needed: LENGTH_PREFIX + 1, got: buffer.len() });
        }
        let mut buf = buffer;
        let declared = buf.get_u32() as usize;
        if declared != buf.remaining() {
            return Err(PayloadError::LengthMismatch { declared, actual: buf.remaining() });
        }
        let type_id = buf.get_u8();
        let decode = self
            .registry
            .get(type_id)
            .ok_or(PayloadError::UnknownPayloadType { type_id })?;
        let content = decode(buf.chunk())
            .map_err(|reason| PayloadError::InvalidContent { type_id, reason })?;
        Ok(PayloadBlock { type_id, content })
    }

    /// Decode an unframed tag + content buffer.
    pub fn decode_unframed(&self, tagged: &[u8]) -> Result<PayloadBlock, PayloadError> {
        self.decode(&frame(tagged)?)
    }

    /// Decode a base64 payload that arrives without its length prefix.
    pub fn decode_base64(&self, encoded: &str) -> Result<PayloadBlock, PayloadError> {
        let tagged = general_purpose::STANDARD
            .decode(encoded.trim())
            .map_err(|e| PayloadError::InvalidBase64(e.to_string()))?;
        self.decode_unframed(&tagged)
    }
}
