//! `chainlens signatures`: list and validate signature directories.

use anyhow::{bail, Result};
use chainlens_core::schema::SignatureRegistry;
use chainlens_registry::{signature_files, MemoryRegistry};
use std::path::Path;

pub fn list(dir: &Path) -> Result<()> {
    let registry = MemoryRegistry::new();
    let count = registry.load_directory(dir)?;

    println!("Loaded {} signatures from '{}'", count, dir.display());
    let mut sigs = registry.list();
    sigs.sort_by(|a, b| a.name.cmp(&b.name));
    for sig in &sigs {
        println!("  {:30} {} {}", sig.name, sig.selector, sig.canonical());
    }
    Ok(())
}

/// Load each file into one shared registry so selector clashes across
/// files are reported too.
pub fn validate(dir: &Path) -> Result<()> {
    let registry = MemoryRegistry::new();
    let mut ok = 0;
    let mut errors = 0;

    for path in signature_files(dir)? {
        match registry.load_file(&path) {
            Ok(n) => {
                ok += n;
                println!("  ✓ {} ({} signatures)", path.display(), n);
            }
            Err(e) => {
                errors += 1;
                eprintln!("  ✗ {}: {}", path.display(), e);
            }
        }
    }

    println!("\n{} signatures valid, {} files with errors", ok, errors);
    if errors > 0 {
        bail!("{} signature files failed validation", errors);
    }
    Ok(())
}
