//! In-memory `SignatureRegistry` implementation.
//!
//! Thread-safe via `Arc<RwLock<Inner>>`; clones share the same store.

use chainlens_core::{
    error::RegistryError,
    schema::{EventSignature, Selector, SignatureRegistry},
};
use std::{
    collections::HashMap,
    path::{Path, PathBuf},
    sync::{Arc, RwLock},
};
use tracing::{debug, info};

use crate::parser::SignatureParser;

#[derive(Default)]
struct Inner {
    /// Selector → signatures in registration order
    by_selector: HashMap<Selector, Vec<EventSignature>>,
    count: usize,
}

/// Thread-safe in-memory signature registry.
#[derive(Clone, Default)]
pub struct MemoryRegistry {
    inner: Arc<RwLock<Inner>>,
}

impl MemoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a signature.
    ///
    /// Signatures may share a selector only if they index a different number
    /// of parameters, since that is all a log can tell them apart by.
    pub fn add(&self, sig: EventSignature) -> Result<(), RegistryError> {
        if !sig.selector.is_well_formed() {
            return Err(RegistryError::ValidationFailed {
                reason: format!("signature '{}': malformed selector {}", sig.name, sig.selector),
            });
        }
        let mut inner = self.inner.write().unwrap();
        let slot = inner.by_selector.entry(sig.selector.clone()).or_default();
        let indexed = sig.indexed_fields().len();
        if let Some(existing) = slot.iter().find(|s| s.indexed_fields().len() == indexed) {
            return Err(RegistryError::AlreadyExists {
                selector: sig.selector.to_string(),
                name: existing.name.clone(),
            });
        }
        debug!(name = %sig.name, selector = %sig.selector, "registered signature");
        slot.push(sig);
        inner.count += 1;
        Ok(())
    }

    /// Alias for `add()`.
    pub fn insert(&self, sig: EventSignature) -> Result<(), RegistryError> {
        self.add(sig)
    }

    /// Load one signature file, choosing the format by extension:
    /// `.yaml`/`.yml` signature documents, `.json`/`.abi` JSON ABI, or
    /// `.events` Solidity declarations (one per line).
    ///
    /// Returns the number of signatures loaded.
    pub fn load_file(&self, path: &Path) -> Result<usize, RegistryError> {
        let content = std::fs::read_to_string(path)?;
        let sigs = match extension(path).as_deref() {
            Some("yaml" | "yml") => SignatureParser::parse_yaml(&content)?,
            Some("json" | "abi") => SignatureParser::parse_json_abi(&content)?,
            Some("events") => SignatureParser::parse_events(&content)?,
            _ => {
                return Err(RegistryError::ParseError(format!(
                    "{}: unsupported signature file type",
                    path.display()
                )))
            }
        };
        if sigs.is_empty() {
            return Err(RegistryError::ParseError(format!(
                "{}: no signatures found",
                path.display()
            )));
        }
        let count = sigs.len();
        for sig in sigs {
            self.add(sig)?;
        }
        info!(path = %path.display(), count, "loaded signature file");
        Ok(count)
    }

    /// Load every supported signature file under `dir`, recursively, in
    /// path order. Returns the total number of signatures loaded.
    pub fn load_directory(&self, dir: &Path) -> Result<usize, RegistryError> {
        let mut count = 0;
        for path in signature_files(dir)? {
            count += self.load_file(&path)?;
        }
        Ok(count)
    }

    /// Total number of signatures stored.
    pub fn len(&self) -> usize {
        self.inner.read().unwrap().count
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All registry names, sorted.
    pub fn all_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.list().into_iter().map(|s| s.name).collect();
        names.sort();
        names
    }
}

impl SignatureRegistry for MemoryRegistry {
    fn candidates(&self, selector: &Selector) -> Vec<EventSignature> {
        self.inner
            .read()
            .unwrap()
            .by_selector
            .get(selector)
            .cloned()
            .unwrap_or_default()
    }

    fn list(&self) -> Vec<EventSignature> {
        self.inner
            .read()
            .unwrap()
            .by_selector
            .values()
            .flatten()
            .cloned()
            .collect()
    }
}

fn extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
}

/// All supported signature files under `dir`, recursively, sorted by path.
pub fn signature_files(dir: &Path) -> Result<Vec<PathBuf>, RegistryError> {
    if !dir.is_dir() {
        return Err(RegistryError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("{} is not a directory", dir.display()),
        )));
    }
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() {
            files.extend(signature_files(&path)?);
        } else if matches!(
            extension(&path).as_deref(),
            Some("yaml" | "yml" | "json" | "abi" | "events")
        ) {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;

    const TRANSFER: &str = "0xddf252ad1be2c89b69c2b068fc378daa952ba7f163c4a11628f55a4df523b3ef";

    fn event(decl: &str) -> EventSignature {
        SignatureParser::parse_event(decl).unwrap()
    }

    fn erc20() -> EventSignature {
        event("event Transfer(address indexed from, address indexed to, uint256 value)")
    }

    fn erc721() -> EventSignature {
        event("event Transfer(address indexed from, address indexed to, uint256 indexed tokenId)")
    }

    #[test]
    fn add_and_lookup() {
        let reg = MemoryRegistry::new();
        reg.add(erc20()).unwrap();
        let found = reg.candidates(&Selector::new(TRANSFER.to_uppercase()));
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "Transfer");
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn shared_selector_resolves_by_topic_count() {
        let reg = MemoryRegistry::new();
        reg.add(erc20()).unwrap();
        reg.add(erc721()).unwrap();
        let sel = Selector::new(TRANSFER);
        assert_eq!(reg.resolve(&sel, 3).unwrap().fields[2].0, "value");
        assert_eq!(reg.resolve(&sel, 4).unwrap().fields[2].0, "tokenId");
        // No exact fit falls back to the first registered
        assert_eq!(reg.resolve(&sel, 1).unwrap().fields[2].0, "value");
        assert!(reg.resolve(&Selector::new("0x00"), 3).is_none());
    }

    #[test]
    fn duplicate_rejected() {
        let reg = MemoryRegistry::new();
        reg.add(erc20()).unwrap();
        let err = reg.add(erc20()).unwrap_err();
        assert!(matches!(err, RegistryError::AlreadyExists { .. }));
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn malformed_selector_rejected() {
        let mut sig = erc20();
        sig.selector = Selector::new("0x1234");
        assert!(MemoryRegistry::new().add(sig).is_err());
    }

    #[test]
    fn clones_share_state() {
        let reg = MemoryRegistry::new();
        let other = reg.clone();
        other.add(erc20()).unwrap();
        assert!(!reg.is_empty());
        assert_eq!(reg.all_names(), vec!["Transfer".to_string()]);
    }

    #[test]
    fn load_directory_reads_every_format() {
        let dir = std::env::temp_dir().join(format!("chainlens-registry-{}", std::process::id()));
        let nested = dir.join("nested");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(
            dir.join("tokens.events"),
            "event Approval(address indexed owner, address indexed spender, uint256 value)\n",
        )
        .unwrap();
        std::fs::write(
            nested.join("transfer.yaml"),
            "signature ERC20Transfer:\n  event: Transfer\n  fields:\n    from: { type: address, indexed: true }\n    to: { type: address, indexed: true }\n    value: { type: uint256 }\n",
        )
        .unwrap();
        std::fs::write(dir.join("README.md"), "ignored").unwrap();

        let reg = MemoryRegistry::new();
        let count = reg.load_directory(&dir).unwrap();
        std::fs::remove_dir_all(&dir).unwrap();

        assert_eq!(count, 2);
        assert_eq!(reg.all_names(), vec!["Approval".to_string(), "ERC20Transfer".to_string()]);
    }

    #[test]
    fn load_directory_missing() {
        let err = MemoryRegistry::new()
            .load_directory(Path::new("/definitely/not/here"))
            .unwrap_err();
        assert!(matches!(err, RegistryError::Io(_)));
    }
}
