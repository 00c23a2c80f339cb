//! SQLite-backed [`VectorStore`] implementation.
//!
//! Chunks live in `chunks` (with a `chunks_fts` FTS5 mirror for keyword
//! ranking). When an [`Embedder`] is configured, `add` embeds every chunk
//! before opening the write transaction and stores the vectors in
//! `chunk_vectors`; `similarity_search` then ranks by cosine similarity.
//! Without an embedder it ranks by FTS5 bm25.

use anyhow::{bail, Result};
use async_trait::async_trait;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use std::sync::Arc;
use uuid::Uuid;

use pdf_harness_core::embedding::{blob_to_vec, cosine_similarity, vec_to_blob, Embedder};
use pdf_harness_core::models::{Chunk, Metadata, SearchHit, META_ID, META_NAME, META_SOURCE};
use pdf_harness_core::store::VectorStore;

use crate::config::Config;
use crate::{db, embedding, migrate};

/// Open the configured database, ensure the schema, and attach the
/// configured embedder (if any).
pub async fn open(config: &Config) -> Result<SqliteStore> {
    let pool = db::connect(config).await?;
    migrate::apply_schema(&pool).await?;
    let embedder = embedding::create_embedder(&config.embedding)?;
    Ok(SqliteStore::with_embedder(pool, embedder))
}

pub struct SqliteStore {
    pool: SqlitePool,
    embedder: Option<Arc<dyn Embedder>>,
}

impl SqliteStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            pool,
            embedder: None,
        }
    }

    pub fn with_embedder(pool: SqlitePool, embedder: Option<Arc<dyn Embedder>>) -> Self {
        Self { pool, embedder }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Total number of stored chunks.
    pub async fn count(&self) -> Result<i64> {
        let n: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM chunks")
            .fetch_one(&self.pool)
            .await?;
        Ok(n)
    }

    async fn keyword_search(&self, query: &str, k: usize) -> Result<Vec<SearchHit>> {
        let Some(match_expr) = fts_query(query) else {
            return Ok(Vec::new());
        };

        let rows = sqlx::query(
            r#"
            SELECT c.text, c.metadata_json, c.chunk_index, c.start_char,
                   bm25(chunks_fts) AS score_rank
            FROM chunks_fts
            JOIN chunks c ON c.id = chunks_fts.chunk_id
            WHERE chunks_fts MATCH ?
            ORDER BY score_rank
            LIMIT ?
            "#,
        )
        .bind(&match_expr)
        .bind(k as i64)
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| {
                let rank: f64 = row.get("score_rank");
                Ok(SearchHit {
                    chunk: row_to_chunk(row)?,
                    score: -rank,
                })
            })
            .collect()
    }

    async fn vector_search(
        &self,
        embedder: &dyn Embedder,
        query: &str,
        k: usize,
    ) -> Result<Vec<SearchHit>> {
        let query_vec = embedder
            .embed(&[query.to_string()])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| anyhow::anyhow!("Empty embedding response"))?;

        let rows = sqlx::query(
            r#"
            SELECT c.text, c.metadata_json, c.chunk_index, c.start_char, v.embedding
            FROM chunk_vectors v
            JOIN chunks c ON c.id = v.chunk_id
            WHERE v.model = ?
            "#,
        )
        .bind(embedder.model_name())
        .fetch_all(&self.pool)
        .await?;

        let mut hits = Vec::with_capacity(rows.len());
        for row in &rows {
            let blob: Vec<u8> = row.get("embedding");
            let score = cosine_similarity(&query_vec, &blob_to_vec(&blob)) as f64;
            hits.push(SearchHit {
                chunk: row_to_chunk(row)?,
                score,
            });
        }

        hits.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        hits.truncate(k);
        Ok(hits)
    }
}

/// Build an FTS5 MATCH expression that ORs every alphanumeric term, quoted.
///
/// Returns `None` when the query contains no searchable terms.
fn fts_query(query: &str) -> Option<String> {
    let terms: Vec<String> = query
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(|t| format!("\"{}\"", t))
        .collect();
    if terms.is_empty() {
        None
    } else {
        Some(terms.join(" OR "))
    }
}

fn row_to_chunk(row: &SqliteRow) -> Result<Chunk> {
    let metadata_json: String = row.get("metadata_json");
    let metadata: Metadata = serde_json::from_str(&metadata_json)?;
    let index: i64 = row.get("chunk_index");
    let start: i64 = row.get("start_char");
    Ok(Chunk {
        text: row.get("text"),
        metadata,
        index: index as usize,
        start: start as usize,
    })
}

#[async_trait]
impl VectorStore for SqliteStore {
    async fn add(&self, chunks: &[Chunk]) -> Result<()> {
        if chunks.is_empty() {
            return Ok(());
        }

        // Embed before touching the database so a provider failure leaves no rows behind.
        let vectors = match &self.embedder {
            Some(embedder) => {
                let texts: Vec<String> = chunks.iter().map(|c| c.text.clone()).collect();
                let vectors = embedder.embed(&texts).await?;
                if vectors.len() != chunks.len() {
                    bail!(
                        "embedder returned {} vectors for {} chunks",
                        vectors.len(),
                        chunks.len()
                    );
                }
                Some(vectors)
            }
            None => None,
        };

        let now = chrono::Utc::now().timestamp();
        let mut tx = self.pool.begin().await?;

        for (i, chunk) in chunks.iter().enumerate() {
            let id = Uuid::new_v4().to_string();
            let metadata_json = serde_json::to_string(&chunk.metadata)?;

            sqlx::query(
                r#"
                INSERT INTO chunks (id, document_id, source, name, chunk_index, start_char,
                                    text, metadata_json, created_at)
                VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(&id)
            .bind(chunk.meta(META_ID))
            .bind(chunk.meta(META_SOURCE))
            .bind(chunk.meta(META_NAME))
            .bind(chunk.index as i64)
            .bind(chunk.start as i64)
            .bind(&chunk.text)
            .bind(&metadata_json)
            .bind(now)
            .execute(&mut *tx)
            .await?;

            sqlx::query("INSERT INTO chunks_fts (chunk_id, text) VALUES (?, ?)")
                .bind(&id)
                .bind(&chunk.text)
                .execute(&mut *tx)
                .await?;

            if let (Some(embedder), Some(vecs)) = (&self.embedder, &vectors) {
                sqlx::query(
                    "INSERT INTO chunk_vectors (chunk_id, model, dims, embedding) VALUES (?, ?, ?, ?)",
                )
                .bind(&id)
                .bind(embedder.model_name())
                .bind(vecs[i].len() as i64)
                .bind(vec_to_blob(&vecs[i]))
                .execute(&mut *tx)
                .await?;
            }
        }

        tx.commit().await?;
        Ok(())
    }

    async fn ids_by_source(&self, source: &str) -> Result<Vec<String>> {
        let ids: Vec<String> = sqlx::query_scalar(
            "SELECT id FROM chunks WHERE source = ? ORDER BY created_at, document_id, chunk_index",
        )
        .bind(source)
        .fetch_all(&self.pool)
        .await?;
        Ok(ids)
    }

    async fn delete(&self, ids: &[String]) -> Result<usize> {
        if ids.is_empty() {
            return Ok(0);
        }

        let mut tx = self.pool.begin().await?;
        let mut deleted = 0u64;

        for id in ids {
            sqlx::query("DELETE FROM chunk_vectors WHERE chunk_id = ?")
                .bind(id)
                .execute(&mut *tx)
                .await?;
            sqlx::query("DELETE FROM chunks_fts WHERE chunk_id = ?")
                .bind(id)
                .execute(&mut *tx)
                .await?;
            deleted += sqlx::query("DELETE FROM chunks WHERE id = ?")
                .bind(id)
                .execute(&mut *tx)
                .await?
                .rows_affected();
        }

        tx.commit().await?;
        Ok(deleted as usize)
    }

    async fn similarity_search(&self, query: &str, k: usize) -> Result<Vec<SearchHit>> {
        match &self.embedder {
            Some(embedder) => self.vector_search(embedder.as_ref(), query, k).await,
            None => self.keyword_search(query, k).await,
        }
    }
}
