//! Persistent store abstraction.
//!
//! The [`VectorStore`] trait is the only view the ingestion, deletion, and
//! query paths have of the chunk store. Handles are constructed by the
//! caller and passed in, so tests can substitute fakes.
//!
//! # Operations
//!
//! | Method | Purpose |
//! |--------|---------|
//! | [`add`](VectorStore::add) | Batch insert of chunks, all-or-nothing |
//! | [`ids_by_source`](VectorStore::ids_by_source) | Record ids whose `source` equals a path |
//! | [`delete`](VectorStore::delete) | Batch delete by record id |
//! | [`similarity_search`](VectorStore::similarity_search) | Top-k chunks for a query |
//!
//! The store is shared with concurrent readers; implementations must not
//! assume exclusive access.

pub mod memory;

use anyhow::Result;
use async_trait::async_trait;

use crate::models::{Chunk, SearchHit};

#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Insert a batch of chunks. Either every chunk is stored or none is.
    async fn add(&self, chunks: &[Chunk]) -> Result<()>;

    /// Record ids of every stored chunk whose `source` metadata equals `source` exactly.
    async fn ids_by_source(&self, source: &str) -> Result<Vec<String>>;

    /// Delete the given records, returning how many were removed.
    async fn delete(&self, ids: &[String]) -> Result<usize>;

    /// Return up to `k` chunks ranked by relevance to `query`, best first.
    async fn similarity_search(&self, query: &str, k: usize) -> Result<Vec<SearchHit>>;
}
