//! Retrieval wrapper used at query time.
//!
//! Runs a similarity search against the store and pairs every hit with
//! its display citation. [`Retrieval::knowledge_string`] flattens the hit
//! texts into the single context string handed to a language model.

use anyhow::Result;
use serde::Serialize;

use pdf_harness_core::models::{ResolvedSource, SearchHit, META_SOURCE};
use pdf_harness_core::sources::SourceMap;
use pdf_harness_core::store::VectorStore;

use crate::config::Config;
use crate::sources::load_configured;
use crate::sqlite_store;

/// Search results plus one resolved citation per hit, index-aligned.
#[derive(Debug, Clone, Serialize)]
pub struct Retrieval {
    pub hits: Vec<SearchHit>,
    pub sources: Vec<ResolvedSource>,
}

impl Retrieval {
    /// Hit texts joined with a single space, in rank order.
    pub fn knowledge_string(&self) -> String {
        self.hits
            .iter()
            .map(|h| h.chunk.text.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

pub async fn retrieve(
    store: &dyn VectorStore,
    sources: &SourceMap,
    query: &str,
    k: usize,
) -> Result<Retrieval> {
    let hits = store.similarity_search(query, k).await?;
    let resolved = hits
        .iter()
        .map(|h| sources.resolve(h.chunk.meta(META_SOURCE)))
        .collect();
    Ok(Retrieval {
        hits,
        sources: resolved,
    })
}

/// CLI entry point for `pdfh query`.
pub async fn run_query(
    config: &Config,
    query: &str,
    limit: Option<usize>,
    json: bool,
) -> Result<()> {
    let k = limit.unwrap_or(config.retrieval.top_k);
    let map = load_configured(config)?;
    let store = sqlite_store::open(config).await?;

    let retrieval = if query.trim().is_empty() {
        Retrieval {
            hits: Vec::new(),
            sources: Vec::new(),
        }
    } else {
        retrieve(&store, &map, query, k).await?
    };
    store.pool().close().await;

    if json {
        println!("{}", serde_json::to_string_pretty(&retrieval)?);
        return Ok(());
    }

    if retrieval.hits.is_empty() {
        println!("No results.");
        return Ok(());
    }

    for (i, (hit, source)) in retrieval.hits.iter().zip(&retrieval.sources).enumerate() {
        let label = if source.human_readable.is_empty() {
            source.full_path.as_str()
        } else {
            source.human_readable.as_str()
        };
        println!("{}. [{:.2}] {}", i + 1, hit.score, label);
        println!("    source: {}", source.full_path);
        if !source.url.is_empty() {
            println!("    url: {}", source.url);
        }
        println!(
            "    excerpt: \"{}\"",
            hit.chunk.text.replace('\n', " ").trim()
        );
        println!();
    }
    Ok(())
}
