//! Enricher configuration, passed explicitly at construction.

use chainlens_core::chain::{ChainSet, NetworkId};
use serde::{Deserialize, Serialize};

pub use chainlens_evm::HashMatch;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EnricherConfig {
    /// Selects the mainnet or testnet chain-ID set
    pub network: NetworkId,
    /// When false, logs are still filtered but not looked up in the registry
    pub decode_logs: bool,
    pub log_hash_match: HashMatch,
}

impl Default for EnricherConfig {
    fn default() -> Self {
        Self {
            network: NetworkId::Mainnet,
            decode_logs: true,
            log_hash_match: HashMatch::Exact,
        }
    }
}

impl EnricherConfig {
    pub fn for_network(network: NetworkId) -> Self {
        Self { network, ..Self::default() }
    }

    pub fn chains(&self) -> ChainSet {
        self.network.chains()
    }
}
