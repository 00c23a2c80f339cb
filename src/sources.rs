//! Loading the source mapping table from disk.
//!
//! The table is a flat map keyed by bare file name, stored as TOML or JSON:
//!
//! ```toml
//! ["report.pdf"]
//! url = "https://example.org/report"
//! description = "Annual Report"
//! ```
//!
//! It is read once at startup and never modified.

use anyhow::{bail, Context, Result};
use std::path::Path;

use pdf_harness_core::sources::SourceMap;

use crate::config::Config;

/// Read a mapping table, choosing the format from the file extension.
pub fn load_source_map(path: &Path) -> Result<SourceMap> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read source mapping: {}", path.display()))?;

    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    let map = match ext.as_deref() {
        Some("toml") => toml::from_str(&content)
            .with_context(|| format!("Failed to parse source mapping: {}", path.display()))?,
        Some("json") => serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse source mapping: {}", path.display()))?,
        _ => bail!(
            "Unsupported source mapping format: {} (expected .toml or .json)",
            path.display()
        ),
    };
    Ok(map)
}

/// The configured mapping table, or an empty one when `[sources]` is unset.
pub fn load_configured(config: &Config) -> Result<SourceMap> {
    match &config.sources.mapping {
        Some(path) => load_source_map(path),
        None => Ok(SourceMap::new()),
    }
}

/// CLI entry point for `pdfh sources`.
pub fn run_sources(config: &Config) -> Result<()> {
    let map = load_configured(config)?;
    if map.is_empty() {
        println!("No source mappings configured.");
        return Ok(());
    }

    println!("{:<32} {:<40} URL", "FILE", "DESCRIPTION");
    for (name, entry) in map.iter() {
        println!(
            "{:<32} {:<40} {}",
            name,
            entry.description.as_deref().unwrap_or("-"),
            entry.url.as_deref().unwrap_or("-")
        );
    }
    Ok(())
}

/// CLI entry point for `pdfh resolve`: print the citation for one stored path.
pub fn run_resolve(config: &Config, source: &str) -> Result<()> {
    let map = load_configured(config)?;
    let resolved = map.resolve(source);
    println!("{}", serde_json::to_string_pretty(&resolved)?);
    Ok(())
}
