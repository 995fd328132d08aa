//! CLI configuration file (`--config chainlens.yaml`).
//!
//! ```yaml
//! enricher:
//!   network: testnet
//!   logHashMatch: ignoreAsciiCase
//! log:
//!   level: info
//!   components:
//!     chainlens-evm: debug
//! signatures: ./signatures
//! format:
//!   group_separator: " "
//! ```
//!
//! Every section is optional. Command-line flags override the file.

use anyhow::{Context, Result};
use chainlens_core::{chain::NetworkId, decimal::FormatOptions};
use chainlens_enrich::EnricherConfig;
use chainlens_observability::{LogConfig, LogFormat};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    pub enricher: EnricherConfig,
    pub log: LogConfig,
    /// Default signature directory for `enrich` and `signatures`
    pub signatures: Option<PathBuf>,
    pub format: FormatOptions,
}

/// Global flags that override the config file.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub network: Option<NetworkId>,
    pub log_level: Option<String>,
    pub log_json: bool,
}

impl CliConfig {
    /// Read the YAML file at `path`, or the defaults when there is none.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => {
                let content = std::fs::read_to_string(path)
                    .with_context(|| format!("read config file '{}'", path.display()))?;
                Self::from_yaml(&content)
                    .with_context(|| format!("parse config file '{}'", path.display()))
            }
            None => Ok(Self::default()),
        }
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(content)?)
    }

    pub fn apply(mut self, overrides: &Overrides) -> Self {
        if let Some(network) = overrides.network {
            self.enricher.network = network;
        }
        if let Some(level) = &overrides.log_level {
            self.log.level = level.clone();
        }
        if overrides.log_json {
            self.log.format = LogFormat::Json;
        }
        self
    }

    /// The signature directory: an explicit flag wins over the config file.
    pub fn signature_dir(&self, flag: Option<PathBuf>) -> Option<PathBuf> {
        flag.or_else(|| self.signatures.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chainlens_enrich::HashMatch;

    #[test]
    fn full_file() {
        let yaml = r#"
enricher:
  network: testnet
  logHashMatch: ignoreAsciiCase
log:
  level: debug
  components:
    chainlens-evm: trace
signatures: ./sigs
format:
  group_separator: " "
"#;
        let cfg = CliConfig::from_yaml(yaml).unwrap();
        assert_eq!(cfg.enricher.network, NetworkId::Testnet);
        assert_eq!(cfg.enricher.log_hash_match, HashMatch::IgnoreAsciiCase);
        assert!(cfg.enricher.decode_logs);
        assert_eq!(cfg.log.level, "debug");
        assert_eq!(cfg.signatures, Some(PathBuf::from("./sigs")));
        assert_eq!(cfg.format.group_separator, " ");
        assert_eq!(cfg.format.decimal_separator, ".");
    }

    #[test]
    fn empty_file_is_default() {
        let cfg = CliConfig::from_yaml("\n").unwrap();
        assert_eq!(cfg.enricher, EnricherConfig::default());
        assert!(cfg.signatures.is_none());
    }

    #[test]
    fn flags_override_file() {
        let cfg = CliConfig::from_yaml("log:\n  level: warn\nsignatures: ./a\n").unwrap();
        let cfg = cfg.apply(&Overrides {
            network: Some(NetworkId::Testnet),
            log_level: Some("trace".into()),
            log_json: true,
        });
        assert_eq!(cfg.enricher.network, NetworkId::Testnet);
        assert_eq!(cfg.log.level, "trace");
        assert_eq!(cfg.log.format, LogFormat::Json);
        assert_eq!(cfg.signature_dir(Some("./b".into())), Some(PathBuf::from("./b")));
        assert_eq!(cfg.signature_dir(None), Some(PathBuf::from("./a")));
    }

    #[test]
    fn unknown_network_is_rejected() {
        assert!(CliConfig::from_yaml("enricher:\n  network: devnet\n").is_err());
    }
}
