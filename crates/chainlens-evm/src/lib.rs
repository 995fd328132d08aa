//! # chainlens-evm
//!
//! EVM-side enrichment for ChainLens:
//! - `correlator`: picks one transaction's logs out of a block and decodes them
//! - `decoder`: ABI event decoding built on `alloy-core`
//! - `trace_graph`: rebuilds the call tree from a flat trace list
//!
//! ## Log layout
//! - `topics[0]` is the event selector (keccak256 of the canonical signature)
//! - `topics[1..]` hold indexed parameters, one 32-byte word each
//! - `data` holds the non-indexed parameters, ABI-encoded

pub mod correlator;
pub mod decoder;
pub mod normalizer;
pub mod trace_graph;

pub use correlator::{HashMatch, LogCorrelator};
pub use decoder::EvmLogDecoder;
pub use trace_graph::build;
