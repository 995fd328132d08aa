//! Network selection and per-blockchain display flags.
//!
//! A `NetworkId` selects which set of primary-network blockchain IDs counts as
//! "indexed". Constructing a `Blockchain` is plain data; the derived flags are
//! computed by an explicit `ChainSet::derive_flags` call.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Which network the explorer is pointed at.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NetworkId {
    #[default]
    Mainnet,
    Testnet,
}

impl NetworkId {
    /// Numeric network id as used by the node API.
    pub fn as_u32(self) -> u32 {
        match self {
            NetworkId::Mainnet => 1,
            NetworkId::Testnet => 5,
        }
    }

    /// Primary-network blockchain IDs for this network.
    pub fn chains(self) -> ChainSet {
        match self {
            NetworkId::Mainnet => ChainSet {
                p_chain: "11111111111111111111111111111111LpoYY".into(),
                x_chain: "2oYMBNV4eNHyqk2fjjV5nVQLDbtmNJzq5s3qs3Lo6ftnC6FByM".into(),
                c_chain: "2q9e4r6Mu3U68nU1fYjgbR6JvwrRx36CohpAX5UQxse55x1Q5".into(),
                evm_chain_id: 43114,
            },
            NetworkId::Testnet => ChainSet {
                p_chain: "11111111111111111111111111111111LpoYY".into(),
                x_chain: "2JVSBoinj9C2J33VntvzYtVJNZdN2NKiwwKjcumHUWEb5DbBrm".into(),
                c_chain: "yH8D7ThNJkxmtkuv2jgBa4P1Rn3Qpr4pPr7QYNfcdoS6k6HWp".into(),
                evm_chain_id: 43113,
            },
        }
    }
}

impl fmt::Display for NetworkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NetworkId::Mainnet => write!(f, "mainnet"),
            NetworkId::Testnet => write!(f, "testnet"),
        }
    }
}

impl std::str::FromStr for NetworkId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "mainnet" | "1" => Ok(NetworkId::Mainnet),
            "testnet" | "fuji" | "5" => Ok(NetworkId::Testnet),
            other => Err(format!("unknown network '{other}' (expected mainnet or testnet)")),
        }
    }
}

/// The primary-network blockchain IDs of one network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainSet {
    pub p_chain: String,
    pub x_chain: String,
    pub c_chain: String,
    /// EVM chain id of the C-chain
    pub evm_chain_id: u64,
}

impl ChainSet {
    pub fn is_indexed(&self, blockchain_id: &str) -> bool {
        blockchain_id == self.p_chain || blockchain_id == self.x_chain || blockchain_id == self.c_chain
    }

    /// Compute the display flags for a blockchain.
    pub fn derive_flags(&self, chain: &Blockchain, screen: &dyn NameScreen) -> ChainFlags {
        ChainFlags {
            indexed: self.is_indexed(&chain.id),
            profane: screen.is_profane(&chain.name),
        }
    }
}

/// A blockchain as listed by the platform API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Blockchain {
    pub id: String,
    pub name: String,
    #[serde(rename = "subnetID")]
    pub subnet_id: String,
    #[serde(rename = "vmID")]
    pub vm_id: String,
}

/// Flags derived from a `Blockchain` for presentation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainFlags {
    /// One of the network's primary chains, served by the indexer
    pub indexed: bool,
    /// Name failed the profanity screen; hide by default
    pub profane: bool,
}

/// Screens user-chosen names. Backed by an external word list.
pub trait NameScreen: Send + Sync {
    fn is_profane(&self, name: &str) -> bool;
}

/// Screen that accepts every name.
#[derive(Debug, Default, Clone, Copy)]
pub struct AllowAll;

impl NameScreen for AllowAll {
    fn is_profane(&self, _name: &str) -> bool {
        false
    }
}

/// Blanket impl so closures can be used as screens.
impl<F: Fn(&str) -> bool + Send + Sync> NameScreen for F {
    fn is_profane(&self, name: &str) -> bool {
        self(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain(id: &str, name: &str) -> Blockchain {
        Blockchain {
            id: id.into(),
            name: name.into(),
            subnet_id: "11111111111111111111111111111111LpoYY".into(),
            vm_id: "mgj786NP7uDwBCcq6YwThhaN8FLyybkCa4zBWTQbNgmK6k9A6".into(),
        }
    }

    #[test]
    fn primary_chains_are_indexed() {
        let set = NetworkId::Mainnet.chains();
        let c = chain(&set.c_chain, "C-Chain");
        let flags = set.derive_flags(&c, &AllowAll);
        assert!(flags.indexed);
        assert!(!flags.profane);

        let other = chain("2tmrrBo1Lgt1mzzvPSFt73kkQKFas5d1AP88tv9cicwoFp8BSn", "Dexalot");
        assert!(!set.derive_flags(&other, &AllowAll).indexed);
    }

    #[test]
    fn networks_have_distinct_x_chains() {
        let main = NetworkId::Mainnet.chains();
        let test = NetworkId::Testnet.chains();
        assert_ne!(main.x_chain, test.x_chain);
        assert!(!test.is_indexed(&main.c_chain));
        assert_eq!(test.evm_chain_id, 43113);
    }

    #[test]
    fn profanity_screen_is_injected() {
        let set = NetworkId::Testnet.chains();
        let screen = |name: &str| name.to_lowercase().contains("darn");
        let flags = set.derive_flags(&chain("abc", "Darn Chain"), &screen);
        assert!(flags.profane);
    }

    #[test]
    fn network_from_str() {
        assert_eq!("fuji".parse::<NetworkId>().unwrap(), NetworkId::Testnet);
        assert_eq!("MAINNET".parse::<NetworkId>().unwrap(), NetworkId::Mainnet);
        assert!("devnet".parse::<NetworkId>().is_err());
    }

    #[test]
    fn network_serde() {
        let json = serde_json::to_string(&NetworkId::Testnet).unwrap();
        assert_eq!(json, "\"testnet\"");
    }
}
