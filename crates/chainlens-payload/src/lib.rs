//! # chainlens-payload
//!
//! Codec for the binary payloads attached to NFT transfers.
//!
//! ## Layout
//! ```text
//! [u32 BE length][u8 type tag][content ...]
//! ```
//! `length` counts the tag byte plus the content. Payloads that arrive as
//! bare base64 (tag + content, no prefix) are framed before decoding.
//!
//! Decoded blocks are grouped per `(assetID, groupID)` in arrival order;
//! see [`PayloadGroups`].

pub mod codec;
pub mod group;
pub mod registry;
pub mod variants;

pub use codec::{frame, PayloadBlock, PayloadCodec};
pub use group::{IngestReport, PayloadGroups, RawPayload, SkippedPayload};
pub use registry::{ContentDecoder, PayloadRegistry};
pub use variants::{AddressChain, PayloadContent, PayloadType};
