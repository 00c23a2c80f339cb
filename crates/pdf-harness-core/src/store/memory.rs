//! In-memory [`VectorStore`] implementation for tests and dry runs.
//!
//! Chunks live in a `Vec` behind `std::sync::RwLock`. Similarity search is a
//! case-insensitive term-overlap count; there is no embedding model.

use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use uuid::Uuid;

use crate::models::{Chunk, SearchHit, META_SOURCE};

use super::VectorStore;

struct StoredChunk {
    id: String,
    chunk: Chunk,
}

/// In-memory chunk store.
#[derive(Default)]
pub struct InMemoryStore {
    chunks: RwLock<Vec<StoredChunk>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored chunks.
    pub fn len(&self) -> usize {
        self.read().map(|c| c.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Snapshot of every stored chunk, in insertion order.
    pub fn chunks(&self) -> Vec<Chunk> {
        self.read()
            .map(|c| c.iter().map(|sc| sc.chunk.clone()).collect())
            .unwrap_or_default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Vec<StoredChunk>>> {
        self.chunks
            .read()
            .map_err(|_| anyhow!("in-memory store lock poisoned"))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Vec<StoredChunk>>> {
        self.chunks
            .write()
            .map_err(|_| anyhow!("in-memory store lock poisoned"))
    }
}

#[async_trait]
impl VectorStore for InMemoryStore {
    async fn add(&self, chunks: &[Chunk]) -> Result<()> {
        let mut stored = self.write()?;
        stored.extend(chunks.iter().map(|c| StoredChunk {
            id: Uuid::new_v4().to_string(),
            chunk: c.clone(),
        }));
        Ok(())
    }

    async fn ids_by_source(&self, source: &str) -> Result<Vec<String>> {
        Ok(self
            .read()?
            .iter()
            .filter(|sc| sc.chunk.metadata.get(META_SOURCE).map(String::as_str) == Some(source))
            .map(|sc| sc.id.clone())
            .collect())
    }

    async fn delete(&self, ids: &[String]) -> Result<usize> {
        let mut stored = self.write()?;
        let before = stored.len();
        stored.retain(|sc| !ids.contains(&sc.id));
        Ok(before - stored.len())
    }

    async fn similarity_search(&self, query: &str, k: usize) -> Result<Vec<SearchHit>> {
        let query_lower = query.to_lowercase();
        let terms: Vec<&str> = query_lower.split_whitespace().collect();
        if terms.is_empty() {
            return Ok(Vec::new());
        }

        let stored = self.read()?;
        let mut hits: Vec<SearchHit> = stored
            .iter()
            .filter_map(|sc| {
                let text_lower = sc.chunk.text.to_lowercase();
                let matches = terms.iter().filter(|t| text_lower.contains(*t)).count();
                (matches > 0).then(|| SearchHit {
                    chunk: sc.chunk.clone(),
                    score: matches as f64,
                })
            })
            .collect();
        // Stable sort keeps insertion order among equal scores.
        hits.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        hits.truncate(k);
        Ok(hits)
    }
}
