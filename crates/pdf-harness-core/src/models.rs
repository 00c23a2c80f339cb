//! Core data models shared by the ingestion and retrieval paths.
//!
//! A [`Document`] is one loaded page of a source file. The tagger stamps it
//! with an ingestion identifier, the chunker splits it into [`Chunk`]s, and
//! each chunk carries its own copy of the document's [`Metadata`] into the
//! store. At query time a chunk's `source` is turned into a display-only
//! [`ResolvedSource`].

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Flat, string-keyed metadata attached to documents and chunks.
///
/// Every value is owned, so cloning the map yields a fully independent copy.
pub type Metadata = BTreeMap<String, String>;

/// Ingestion identifier shared by all chunks of one document.
pub const META_ID: &str = "id";
/// Originating file path as handed to the pipeline.
pub const META_SOURCE: &str = "source";
/// Bare file name of the originating file.
pub const META_NAME: &str = "name";
/// Zero-based page number set by the loader.
pub const META_PAGE: &str = "page";

/// One loaded unit of source content (one PDF page).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    pub text: String,
    pub metadata: Metadata,
}

impl Document {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            metadata: Metadata::new(),
        }
    }

    pub fn with_metadata(mut self, key: &str, value: impl Into<String>) -> Self {
        self.metadata.insert(key.to_string(), value.into());
        self
    }
}

/// A contiguous span of a document's text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    pub text: String,
    pub metadata: Metadata,
    /// Position of this chunk within its document, starting at 0.
    #[serde(default)]
    pub index: usize,
    /// Char offset of the first char of `text` within the document.
    #[serde(default)]
    pub start: usize,
}

impl Chunk {
    /// Looks up a metadata value, returning `""` when absent.
    pub fn meta(&self, key: &str) -> &str {
        self.metadata.get(key).map(String::as_str).unwrap_or("")
    }
}

/// A chunk returned from similarity search, with its backend score.
///
/// Higher scores are better for every backend.
#[derive(Debug, Clone, Serialize)]
pub struct SearchHit {
    pub chunk: Chunk,
    pub score: f64,
}

/// A curated description for a known source file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceEntry {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

/// Display-only citation derived from a stored source path. Never persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ResolvedSource {
    pub full_path: String,
    pub filename: String,
    pub url: String,
    pub human_readable: String,
}
