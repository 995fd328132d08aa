//! # chainlens-registry
//!
//! Event-signature registry for ChainLens.
//!
//! Signatures come from three sources:
//! 1. YAML signature files (`signature <Name>:` documents, `---` separated)
//! 2. Solidity event declarations (`event Transfer(address indexed from, ...)`)
//! 3. JSON ABI files (every `event` entry)
//!
//! The public-facing API is the `SignatureRegistry` trait from `chainlens-core`.

pub mod memory;
pub mod parser;

pub use memory::{signature_files, MemoryRegistry};
pub use parser::SignatureParser;
