//! # PDF Harness Core
//!
//! Pure logic for PDF Harness: data models, the chunking policy, the
//! metadata tagger, source resolution, the embedding trait, and the
//! vector store abstraction.
//!
//! This crate performs no filesystem or database I/O. Loading PDFs,
//! talking to SQLite, and calling embedding APIs live in the
//! `pdf-harness` application crate.

pub mod chunk;
pub mod embedding;
pub mod models;
pub mod sources;
pub mod store;
pub mod tagger;
