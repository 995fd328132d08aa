//! # chainlens-enrich
//!
//! Turns one transaction's raw artifacts (flat call traces, the block's log
//! list, the transaction object) into a single `EnrichedTransaction`.
//!
//! ```no_run
//! use std::sync::Arc;
//! use chainlens_enrich::{Enricher, EnricherConfig};
//! use chainlens_registry::MemoryRegistry;
//! # fn demo(tx: chainlens_core::RawTransaction, block: chainlens_core::RawBlock) {
//! let enricher = Enricher::new(Arc::new(MemoryRegistry::new()), EnricherConfig::default());
//! let enriched = enricher.enrich(&tx, &block);
//! if enriched.is_partial() {
//!     // tracesGraph is absent; the flat trace list is still usable
//! }
//! # }
//! ```

pub mod config;
pub mod engine;

pub use config::{EnricherConfig, HashMatch};
pub use engine::Enricher;
