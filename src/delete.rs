//! Delete every stored chunk that came from one source path.
//!
//! The match is exact on the `source` metadata, the same string the
//! pipeline stored at ingestion time. Finding nothing is a normal outcome,
//! reported as [`DeleteOutcome::NothingToDelete`]; only store failures are
//! errors.

use anyhow::Result;
use tracing::info;

use pdf_harness_core::store::VectorStore;

use crate::config::Config;
use crate::sqlite_store;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    NothingToDelete,
    Deleted(usize),
}

pub async fn delete_by_source(store: &dyn VectorStore, source: &str) -> Result<DeleteOutcome> {
    let ids = store.ids_by_source(source).await?;
    if ids.is_empty() {
        info!(source, "No chunks found");
        return Ok(DeleteOutcome::NothingToDelete);
    }

    let deleted = store.delete(&ids).await?;
    info!(source, deleted, "Deleted chunks");
    Ok(DeleteOutcome::Deleted(deleted))
}

/// CLI entry point for `pdfh delete`.
pub async fn run_delete(config: &Config, source: &str) -> Result<()> {
    let store = sqlite_store::open(config).await?;

    match delete_by_source(&store, source).await? {
        DeleteOutcome::NothingToDelete => println!("No chunks found with source: {}", source),
        DeleteOutcome::Deleted(n) => println!("Deleted {} chunks with source: {}", n, source),
    }

    store.pool().close().await;
    Ok(())
}
