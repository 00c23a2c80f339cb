//! Ingestion pipeline orchestration.
//!
//! Scans one directory (non-recursively) and, for every `*.pdf` regular
//! file, runs load → tag → chunk → store. Files are processed one at a
//! time in file-name order. A failure while loading or storing one file is
//! recorded in its [`FileReport`] and the scan moves on; only a missing or
//! unreadable directory stops the run, before any side effect.
//!
//! Each file's chunks are persisted with a single [`VectorStore::add`]
//! call. A killed run can still leave the file being processed partially
//! stored if the backend is not transactional.

use anyhow::Result;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};
use walkdir::WalkDir;

use pdf_harness_core::chunk::ChunkingPolicy;
use pdf_harness_core::models::{Chunk, Document};
use pdf_harness_core::sources::ends_with_pdf;
use pdf_harness_core::store::memory::InMemoryStore;
use pdf_harness_core::store::VectorStore;
use pdf_harness_core::tagger::{file_name, tag_document};

use crate::config::Config;
use crate::loader::{DocumentLoader, PdfLoader};
use crate::sqlite_store;

/// Everything the pipeline needs, constructed by the caller.
pub struct IngestContext {
    pub loader: Arc<dyn DocumentLoader>,
    pub store: Arc<dyn VectorStore>,
    pub policy: ChunkingPolicy,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct IngestOptions {
    /// Load, tag, and chunk, but never call the store.
    pub dry_run: bool,
}

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("Folder not found: {}", .0.display())]
    DirectoryNotFound(PathBuf),
    #[error("Failed to read folder {}: {source}", .path.display())]
    ReadDir {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },
}

/// Result of ingesting one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileOutcome {
    /// All chunks were persisted in one batch.
    Added { chunks: usize },
    /// Dry run: this many chunks would have been persisted.
    DryRun { chunks: usize },
    /// Loading or persisting failed; nothing from this file was added.
    Failed { reason: String },
}

#[derive(Debug, Clone)]
pub struct FileReport {
    pub path: PathBuf,
    pub name: String,
    pub pages: usize,
    pub outcome: FileOutcome,
}

/// Per-run summary of a directory scan.
#[derive(Debug, Clone, Default)]
pub struct IngestReport {
    pub dir: PathBuf,
    /// Every `*.pdf` file that was attempted, in processing order.
    pub files: Vec<FileReport>,
    /// Entries that were not `*.pdf` regular files.
    pub skipped: Vec<PathBuf>,
}

impl IngestReport {
    pub fn attempted(&self) -> usize {
        self.files.len()
    }

    pub fn succeeded(&self) -> usize {
        self.files
            .iter()
            .filter(|f| !matches!(f.outcome, FileOutcome::Failed { .. }))
            .count()
    }

    pub fn failed(&self) -> usize {
        self.attempted() - self.succeeded()
    }

    pub fn chunks_added(&self) -> usize {
        self.files
            .iter()
            .map(|f| match f.outcome {
                FileOutcome::Added { chunks } => chunks,
                _ => 0,
            })
            .sum()
    }

    pub fn file(&self, name: &str) -> Option<&FileReport> {
        self.files.iter().find(|f| f.name == name)
    }
}

/// Whether `path` is a regular file whose name ends in `.pdf` (any case).
pub fn is_eligible(path: &Path) -> bool {
    path.is_file() && ends_with_pdf(&file_name(path))
}

/// Tag every document with `path` and split it into chunks.
///
/// Each document gets its own ingestion id; its chunks share it.
pub fn chunk_documents(
    policy: &ChunkingPolicy,
    documents: Vec<Document>,
    path: &Path,
) -> Vec<Chunk> {
    let mut chunks = Vec::new();
    for mut doc in documents {
        tag_document(&mut doc, path);
        chunks.extend(policy.split(&doc));
    }
    chunks
}

/// Ingest every eligible file directly inside `dir`.
pub async fn ingest_directory(
    ctx: &IngestContext,
    dir: &Path,
    options: IngestOptions,
) -> Result<IngestReport, IngestError> {
    if !dir.is_dir() {
        warn!(dir = %dir.display(), "Folder not found");
        return Err(IngestError::DirectoryNotFound(dir.to_path_buf()));
    }

    let mut report = IngestReport {
        dir: dir.to_path_buf(),
        ..IngestReport::default()
    };

    let walker = WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name();

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) if e.depth() == 0 => {
                return Err(IngestError::ReadDir {
                    path: dir.to_path_buf(),
                    source: e,
                });
            }
            Err(e) => {
                warn!(error = %e, "Skipping unreadable entry");
                continue;
            }
        };

        let path = entry.path();
        if !is_eligible(path) {
            info!(path = %path.display(), "Skipping unsupported file");
            report.skipped.push(path.to_path_buf());
            continue;
        }

        report.files.push(ingest_file(ctx, path, options).await);
    }

    Ok(report)
}

/// Load, tag, chunk, and persist a single file.
///
/// Never fails: load and store errors are captured in the returned report.
pub async fn ingest_file(ctx: &IngestContext, path: &Path, options: IngestOptions) -> FileReport {
    let name = file_name(path);
    let report = |pages: usize, outcome: FileOutcome| FileReport {
        path: path.to_path_buf(),
        name: name.clone(),
        pages,
        outcome,
    };

    let documents = match ctx.loader.load(path) {
        Ok(documents) => documents,
        Err(e) => {
            warn!(file = %name, error = %e, "Failed to load document");
            return report(
                0,
                FileOutcome::Failed {
                    reason: e.to_string(),
                },
            );
        }
    };
    let pages = documents.len();
    info!(file = %name, pages, "Loaded {} pages from {}", pages, path.display());

    let chunks = chunk_documents(&ctx.policy, documents, path);

    if options.dry_run {
        return report(
            pages,
            FileOutcome::DryRun {
                chunks: chunks.len(),
            },
        );
    }

    if chunks.is_empty() {
        info!(file = %name, "No text extracted, nothing to add");
        return report(pages, FileOutcome::Added { chunks: 0 });
    }

    match ctx.store.add(&chunks).await {
        Ok(()) => {
            info!(
                file = %name,
                chunks = chunks.len(),
                "Successfully added {} chunks from {}",
                chunks.len(),
                name
            );
            report(
                pages,
                FileOutcome::Added {
                    chunks: chunks.len(),
                },
            )
        }
        Err(e) => {
            let reason = format!("{:#}", e);
            warn!(file = %name, error = %reason, "Failed to add documents from {}", name);
            report(pages, FileOutcome::Failed { reason })
        }
    }
}

/// CLI entry point for `pdfh ingest`.
pub async fn run_ingest(config: &Config, dir: Option<PathBuf>, dry_run: bool) -> Result<()> {
    let dir = dir
        .or_else(|| config.ingest.dir.clone())
        .ok_or_else(|| anyhow::anyhow!("No folder given and [ingest].dir is not configured"))?;

    // A dry run never touches the store, so it does not open the database either.
    let store: Arc<dyn VectorStore> = if dry_run {
        Arc::new(InMemoryStore::new())
    } else {
        Arc::new(sqlite_store::open(config).await?)
    };
    let ctx = IngestContext {
        loader: Arc::new(PdfLoader),
        store,
        policy: config.chunking.policy()?,
    };

    let report = ingest_directory(&ctx, &dir, IngestOptions { dry_run }).await?;
    print_report(&report, dry_run);
    Ok(())
}

fn print_report(report: &IngestReport, dry_run: bool) {
    if dry_run {
        println!("ingest {} (dry-run)", report.dir.display());
    } else {
        println!("ingest {}", report.dir.display());
    }

    for file in &report.files {
        match &file.outcome {
            FileOutcome::Added { chunks } => {
                println!("  {}: added {} chunks ({} pages)", file.name, chunks, file.pages)
            }
            FileOutcome::DryRun { chunks } => println!(
                "  {}: would add {} chunks ({} pages)",
                file.name, chunks, file.pages
            ),
            FileOutcome::Failed { reason } => println!("  {}: failed: {}", file.name, reason),
        }
    }
    for path in &report.skipped {
        println!("  {}: skipped", file_name(path));
    }

    println!("  files attempted: {}", report.attempted());
    println!("  files failed: {}", report.failed());
    println!("  entries skipped: {}", report.skipped.len());
    if dry_run {
        let planned: usize = report
            .files
            .iter()
            .map(|f| match f.outcome {
                FileOutcome::DryRun { chunks } => chunks,
                _ => 0,
            })
            .sum();
        println!("  estimated chunks: {}", planned);
    } else {
        println!("  chunks added: {}", report.chunks_added());
    }
    println!("ok");
}
