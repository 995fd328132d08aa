//! Error types for the ChainLens enrichment pipeline.

use thiserror::Error;

/// Malformed or out-of-range numeric input. Never recovered by substituting zero.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecimalError {
    #[error("invalid numeric value {input:?}: {reason}")]
    Parse { input: String, reason: String },
    #[error("decimal exponent out of range: {0}")]
    OutOfRange(String),
}

/// Errors raised while decoding a single log against its event signature.
///
/// These never escape a batch: the correlator records them next to the
/// partially decoded log.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("ABI decode failed: {reason}")]
    AbiDecodeFailed { reason: String },

    #[error("Invalid topic {index}: {reason}")]
    InvalidTopic { index: usize, reason: String },

    #[error("Missing indexed field: {field}")]
    MissingField { field: String },

    #[error("Unsupported type: {ty}")]
    UnsupportedType { ty: String },
}

/// Structural failures while rebuilding the call hierarchy.
///
/// Recoverable at the orchestrator: the flat trace list stays usable and only
/// the graph is omitted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TraceGraphError {
    #[error("no root trace (address path []) in input")]
    MissingRoot,

    #[error("trace {path:?} has no ancestor trace at {ancestor:?}")]
    MissingAncestor { path: Vec<usize>, ancestor: Vec<usize> },

    #[error("more than one trace at address path {path:?}")]
    DuplicateTrace { path: Vec<usize> },
}

/// Errors raised while decoding a binary payload block.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PayloadError {
    /// Recoverable: the caller logs it and skips the payload.
    #[error("unknown payload type {type_id}")]
    UnknownPayloadType { type_id: u8 },

    #[error("payload truncated: need at least {needed} bytes, got {got}")]
    Truncated { needed: usize, got: usize },

    #[error("length prefix says {declared} bytes but {actual} follow")]
    LengthMismatch { declared: usize, actual: usize },

    #[error("payload too large to frame: {len} bytes")]
    TooLarge { len: usize },

    #[error("invalid base64 payload: {0}")]
    InvalidBase64(String),

    #[error("invalid content for payload type {type_id}: {reason}")]
    InvalidContent { type_id: u8, reason: String },
}

/// Errors from the event-signature registry.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("Signature for selector {selector} already registered as '{name}'")]
    AlreadyExists { selector: String, name: String },

    #[error("Signature validation failed: {reason}")]
    ValidationFailed { reason: String },

    #[error("Parse error in signature file: {0}")]
    ParseError(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
