//! Metadata tagging for loaded documents.
//!
//! Stamps a [`Document`] with a fresh ingestion identifier, its originating
//! path, and its file name before it is chunked. Chunks inherit these values
//! through [`ChunkingPolicy::split`](crate::chunk::ChunkingPolicy::split),
//! which clones the map per chunk.

use std::path::Path;

use uuid::Uuid;

use crate::models::{Document, META_ID, META_NAME, META_SOURCE};

/// Generate a new ingestion identifier (random 128-bit UUID).
pub fn new_ingestion_id() -> String {
    Uuid::new_v4().to_string()
}

/// Bare file name of `path`, or `""` when it has none.
pub fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default()
}

/// Tag `doc` with a new identifier plus the `source` and `name` of `path`.
///
/// Returns the identifier that was assigned. Loader-provided keys other
/// than `id`, `source`, and `name` are left untouched.
pub fn tag_document(doc: &mut Document, path: &Path) -> String {
    let id = new_ingestion_id();
    doc.metadata.insert(META_ID.to_string(), id.clone());
    doc.metadata
        .insert(META_SOURCE.to_string(), path.to_string_lossy().to_string());
    doc.metadata.insert(META_NAME.to_string(), file_name(path));
    id
}
