//! Tag → content decoder table.

use std::collections::BTreeMap;
use std::fmt;

use crate::variants::{PayloadContent, PayloadType};

/// Decodes the content bytes that follow a tag. Errors are plain reasons;
/// the codec reports them against the tag being decoded.
pub type ContentDecoder = fn(&[u8]) -> Result<PayloadContent, String>;

/// Payload type registry, injected into the codec at construction.
#[derive(Clone, Default)]
pub struct PayloadRegistry {
    decoders: BTreeMap<u8, ContentDecoder>,
}

impl PayloadRegistry {
    /// An empty registry: every tag is unknown.
    pub fn new() -> Self {
        Self::default()
    }

    /// Every built-in payload type (tags 0 through 30).
    pub fn builtin() -> Self {
        let mut reg = Self::new();
        for ty in PayloadType::ALL {
            reg.register(ty.tag(), ty.decoder());
        }
        reg
    }

    /// Add or replace the decoder for `tag`. Returns the previous one.
    pub fn register(&mut self, tag: u8, decoder: ContentDecoder) -> Option<ContentDecoder> {
        self.decoders.insert(tag, decoder)
    }

    pub fn remove(&mut self, tag: u8) -> Option<ContentDecoder> {
        self.decoders.remove(&tag)
    }

    pub fn get(&self, tag: u8) -> Option<ContentDecoder> {
        self.decoders.get(&tag).copied()
    }

    pub fn contains(&self, tag: u8) -> bool {
        self.decoders.contains_key(&tag)
    }

    /// Registered tags in ascending order.
    pub fn tags(&self) -> impl Iterator<Item = u8> + '_ {
        self.decoders.keys().copied()
    }
}

impl fmt::Debug for PayloadRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PayloadRegistry")
            .field("tags", &self.decoders.keys().collect::<Vec<_>>())
            .finish()
    }
}
