//! # PDF Harness
//!
//! Ingest a folder of PDF files into a searchable chunk store and retrieve
//! cited context for questions asked against it.
//!
//! Each PDF page is loaded as a document, stamped with an ingestion
//! identifier and its source path, split into overlapping chunks, and
//! written to SQLite in one batch per file. At query time the top chunks
//! are returned together with a human-readable citation resolved from a
//! curated source mapping table.
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────┐   ┌─────────────────────┐   ┌───────────┐
//! │ PDF folder│──▶│ load → tag → chunk  │──▶│  SQLite   │
//! └───────────┘   └─────────────────────┘   │ FTS5+Vec  │
//!                                           └─────┬─────┘
//!                     ┌──────────────┐            │
//!                     │ source table │──▶ query ◀─┘
//!                     └──────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! pdfh init                          # create database
//! pdfh ingest ./pdfs                 # ingest every *.pdf in ./pdfs
//! pdfh query "when should I water"   # top chunks with citations
//! pdfh delete ./pdfs/old.pdf         # remove one file's chunks
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`db`] | Database connection |
//! | [`migrate`] | Schema creation |
//! | [`loader`] | PDF page extraction |
//! | [`ingest`] | Directory ingestion pipeline |
//! | [`delete`] | Delete by source path |
//! | [`query`] | Retrieval with resolved citations |
//! | [`sources`] | Source mapping table loading |
//! | [`embedding`] | Embedding providers |
//! | [`sqlite_store`] | SQLite chunk store |
//!
//! Data types, chunking, tagging, and the resolver live in
//! [`pdf_harness_core`].

pub mod config;
pub mod db;
pub mod delete;
pub mod embedding;
pub mod ingest;
pub mod loader;
pub mod migrate;
pub mod query;
pub mod sources;
pub mod sqlite_store;
