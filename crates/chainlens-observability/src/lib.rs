//! # chainlens-observability
//!
//! Installs the `tracing` subscriber for ChainLens binaries. Library crates
//! only emit events; they never install a subscriber themselves.

pub mod tracing_setup;

pub use tracing_setup::{init_tracing, LogConfig, LogFormat};
