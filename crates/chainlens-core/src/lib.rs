//! # chainlens-core
//!
//! Data model, error types, and primitives shared by every ChainLens crate:
//! call traces and the call tree, logs and decoded events, raw and enriched
//! transactions, event-signature registries, network configuration, and
//! exact decimal scaling for amounts.

pub mod chain;
pub mod decimal;
pub mod decoder;
pub mod error;
pub mod log;
pub mod quantity;
pub mod schema;
pub mod trace;
pub mod transaction;
pub mod types;

pub use chain::{Blockchain, ChainFlags, ChainSet, NameScreen, NetworkId};
pub use decimal::{DecimalAmount, FormatOptions};
pub use decoder::LogDecoder;
pub use error::{DecimalError, DecodeError, PayloadError, RegistryError, TraceGraphError};
pub use log::{DecodedLog, EventMatch, LogRecord};
pub use schema::{EventSignature, FieldDef, Selector, SignatureRegistry};
pub use trace::{CallKind, CallTrace, TraceNode};
pub use transaction::{EnrichedTransaction, EnrichmentWarning, RawBlock, RawTransaction, ValueTransfer};
pub use types::{CanonicalType, NormalizedValue};
