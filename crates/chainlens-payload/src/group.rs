//! Per-`(assetID, groupID)` ordered payload collections.
//!
//! Payload order within a group encodes application history, so blocks are
//! only ever appended: never reordered, never deduplicated.

use chainlens_core::error::PayloadError;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::codec::{PayloadBlock, PayloadCodec};

/// A payload as delivered with a UTXO: base64 content plus its grouping key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawPayload {
    #[serde(rename = "assetID")]
    pub asset_id: String,
    #[serde(rename = "groupID")]
    pub group_id: u32,
    /// Base64 tag + content, without a length prefix
    pub payload: String,
}

/// A payload that `ingest_all` could not decode.
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedPayload {
    /// Position in the ingested sequence
    pub index: usize,
    pub asset_id: String,
    pub group_id: u32,
    pub error: PayloadError,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct IngestReport {
    pub accepted: usize,
    pub skipped: Vec<SkippedPayload>,
}

impl IngestReport {
    pub fn is_clean(&self) -> bool {
        self.skipped.is_empty()
    }
}

/// assetID → groupID → blocks, all in first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct PayloadGroups {
    groups: IndexMap<String, IndexMap<u32, Vec<PayloadBlock>>>,
}

impl PayloadGroups {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `block` to its group, creating the group on first use.
    pub fn group(&mut self, block: PayloadBlock, asset_id: &str, group_id: u32) {
        self.groups
            .entry(asset_id.to_string())
            .or_default()
            .entry(group_id)
            .or_default()
            .push(block);
    }

    pub fn get(&self, asset_id: &str, group_id: u32) -> Option<&[PayloadBlock]> {
        self.groups.get(asset_id)?.get(&group_id).map(Vec::as_slice)
    }

    /// Groups of one asset, in first-seen order.
    pub fn asset(&self, asset_id: &str) -> Option<&IndexMap<u32, Vec<PayloadBlock>>> {
        self.groups.get(asset_id)
    }

    pub fn assets(&self) -> impl Iterator<Item = &str> {
        self.groups.keys().map(String::as_str)
    }

    /// Total number of blocks across all groups.
    pub fn block_count(&self) -> usize {
        self.groups.values().flat_map(IndexMap::values).map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Decode one raw payload and group it. On error nothing is changed.
    pub fn ingest(&mut self, codec: &PayloadCodec, raw: &RawPayload) -> Result<(), PayloadError> {
        let block = codec.decode_base64(&raw.payload)?;
        debug!(asset_id = %raw.asset_id, group_id = raw.group_id, type_id = block.type_id, "grouped payload");
        self.group(block, &raw.asset_id, raw.group_id);
        Ok(())
    }

    /// Ingest a sequence, skipping (and logging) payloads that fail to decode.
    pub fn ingest_all<'a, I>(&mut self, codec: &PayloadCodec, raws: I) -> IngestReport
    where
        I: IntoIterator<Item = &'a RawPayload>,
    {
        let mut report = IngestReport::default();
        for (index, raw) in raws.into_iter().enumerate() {
            match self.ingest(codec, raw) {
                Ok(()) => report.accepted += 1,
                Err(error) => {
                    warn!(
                        index,
                        asset_id = %raw.asset_id,
                        group_id = raw.group_id,
                        error = %error,
                        "skipping undecodable payload"
                    );
                    report.skipped.push(SkippedPayload {
                        index,
                        asset_id: raw.asset_id.clone(),
                        group_id: raw.group_id,
                        error,
                    });
                }
            }
        }
        report
    }
}
