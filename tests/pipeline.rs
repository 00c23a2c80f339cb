//! Library-level tests for the ingestion pipeline, deletion, and retrieval,
//! driven through fake loaders and stores.

use anyhow::{bail, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

use pdf_harness::delete::{delete_by_source, DeleteOutcome};
use pdf_harness::ingest::{
    ingest_directory, FileOutcome, IngestContext, IngestError, IngestOptions,
};
use pdf_harness::loader::{DocumentLoader, LoadError};
use pdf_harness::query::retrieve;
use pdf_harness::sqlite_store::SqliteStore;
use pdf_harness::{db, migrate};
use pdf_harness_core::chunk::ChunkingPolicy;
use pdf_harness_core::models::{
    Chunk, Document, SearchHit, SourceEntry, META_ID, META_NAME, META_PAGE, META_SOURCE,
};
use pdf_harness_core::sources::SourceMap;
use pdf_harness_core::store::memory::InMemoryStore;
use pdf_harness_core::store::VectorStore;

/// Serves canned pages keyed by file name; unknown names fail to load.
struct FakeLoader {
    pages: HashMap<String, Vec<String>>,
}

impl FakeLoader {
    fn new(files: Vec<(&str, Vec<&str>)>) -> Self {
        Self {
            pages: files
                .into_iter()
                .map(|(name, pages)| {
                    (
                        name.to_string(),
                        pages.into_iter().map(String::from).collect(),
                    )
                })
                .collect(),
        }
    }
}

impl DocumentLoader for FakeLoader {
    fn load(&self, path: &Path) -> Result<Vec<Document>, LoadError> {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        let pages = self
            .pages
            .get(&name)
            .ok_or_else(|| LoadError::Pdf(format!("cannot parse {}", name)))?;
        Ok(pages
            .iter()
            .enumerate()
            .map(|(i, text)| {
                Document::new(text.as_str())
                    .with_metadata(META_SOURCE, path.to_string_lossy())
                    .with_metadata(META_PAGE, i.to_string())
            })
            .collect())
    }
}

/// Wraps an in-memory store and rejects any batch from one file name.
struct FailingStore {
    inner: InMemoryStore,
    reject: String,
    add_calls: std::sync::Mutex<usize>,
}

impl FailingStore {
    fn new(reject: &str) -> Self {
        Self {
            inner: InMemoryStore::new(),
            reject: reject.to_string(),
            add_calls: std::sync::Mutex::new(0),
        }
    }

    fn add_calls(&self) -> usize {
        *self.add_calls.lock().unwrap()
    }
}

#[async_trait]
impl VectorStore for FailingStore {
    async fn add(&self, chunks: &[Chunk]) -> Result<()> {
        *self.add_calls.lock().unwrap() += 1;
        if chunks.iter().any(|c| c.meta(META_NAME) == self.reject) {
            bail!("store rejected {}", self.reject);
        }
        self.inner.add(chunks).await
    }

    async fn ids_by_source(&self, source: &str) -> Result<Vec<String>> {
        self.inner.ids_by_source(source).await
    }

    async fn delete(&self, ids: &[String]) -> Result<usize> {
        self.inner.delete(ids).await
    }

    async fn similarity_search(&self, query: &str, k: usize) -> Result<Vec<SearchHit>> {
        self.inner.similarity_search(query, k).await
    }
}

fn touch(dir: &Path, names: &[&str]) {
    for name in names {
        fs::write(dir.join(name), b"placeholder").unwrap();
    }
}

fn context(loader: FakeLoader, store: Arc<dyn VectorStore>) -> IngestContext {
    IngestContext {
        loader: Arc::new(loader),
        store,
        policy: ChunkingPolicy::new(40, 5).unwrap(),
    }
}

#[tokio::test]
async fn test_mixed_directory_counts() {
    let tmp = TempDir::new().unwrap();
    touch(tmp.path(), &["a.pdf", "B.PDF", "notes.txt", "image.png"]);
    fs::create_dir(tmp.path().join("nested.pdf")).unwrap();

    let loader = FakeLoader::new(vec![
        ("a.pdf", vec!["Short page about drip irrigation."]),
        ("B.PDF", vec!["Page one.", "Page two."]),
    ]);
    let store = Arc::new(InMemoryStore::new());
    let ctx = context(loader, store.clone());

    let report = ingest_directory(&ctx, tmp.path(), IngestOptions::default())
        .await
        .unwrap();

    assert_eq!(report.attempted(), 2);
    assert_eq!(report.failed(), 0);
    assert_eq!(report.skipped.len(), 3);
    // Sorted by file name: uppercase sorts first.
    assert_eq!(report.files[0].name, "B.PDF");
    assert_eq!(report.files[0].pages, 2);
    assert_eq!(report.chunks_added(), store.len());

    for chunk in store.chunks() {
        assert!(!chunk.meta(META_ID).is_empty());
        assert!(chunk.meta(META_SOURCE).ends_with(chunk.meta(META_NAME)));
    }
}

#[tokio::test]
async fn test_bare_pdf_extension_is_attempted() {
    let tmp = TempDir::new().unwrap();
    touch(tmp.path(), &[".pdf", ".PDF", "pdf"]);

    let loader = FakeLoader::new(vec![
        (".pdf", vec!["lower case name"]),
        (".PDF", vec!["upper case name"]),
    ]);
    let store = Arc::new(InMemoryStore::new());
    let ctx = context(loader, store.clone());

    let report = ingest_directory(&ctx, tmp.path(), IngestOptions::default())
        .await
        .unwrap();

    assert_eq!(report.attempted(), 2);
    assert_eq!(report.failed(), 0);
    assert_eq!(report.skipped.len(), 1);
    assert_eq!(report.files[0].name, ".PDF");
    assert_eq!(report.files[1].name, ".pdf");
    assert_eq!(store.len(), 2);
}

#[tokio::test]
async fn test_store_failure_isolated_to_one_file() {
    let tmp = TempDir::new().unwrap();
    touch(tmp.path(), &["a.pdf", "b.pdf", "c.pdf"]);

    let loader = FakeLoader::new(vec![
        ("a.pdf", vec!["alpha text"]),
        ("b.pdf", vec!["beta text"]),
        ("c.pdf", vec!["gamma text"]),
    ]);
    let store = Arc::new(FailingStore::new("b.pdf"));
    let ctx = context(loader, store.clone());

    let report = ingest_directory(&ctx, tmp.path(), IngestOptions::default())
        .await
        .unwrap();

    assert_eq!(report.attempted(), 3);
    assert_eq!(report.failed(), 1);
    assert!(matches!(
        report.file("b.pdf").unwrap().outcome,
        FileOutcome::Failed { .. }
    ));
    assert_eq!(
        report.file("c.pdf").unwrap().outcome,
        FileOutcome::Added { chunks: 1 }
    );
    assert_eq!(store.add_calls(), 3);
    let rejected = tmp.path().join("b.pdf").to_string_lossy().to_string();
    assert!(store.ids_by_source(&rejected).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_load_failure_is_per_file() {
    let tmp = TempDir::new().unwrap();
    touch(tmp.path(), &["corrupt.pdf", "good.pdf"]);

    let loader = FakeLoader::new(vec![("good.pdf", vec!["fine"])]);
    let store = Arc::new(InMemoryStore::new());
    let ctx = context(loader, store.clone());

    let report = ingest_directory(&ctx, tmp.path(), IngestOptions::default())
        .await
        .unwrap();
    assert_eq!(report.failed(), 1);
    assert_eq!(report.succeeded(), 1);
    assert_eq!(store.len(), 1);
}

#[tokio::test]
async fn test_empty_document_adds_nothing() {
    let tmp = TempDir::new().unwrap();
    touch(tmp.path(), &["blank.pdf"]);

    let loader = FakeLoader::new(vec![("blank.pdf", vec![""])]);
    let store = Arc::new(FailingStore::new("none"));
    let ctx = context(loader, store.clone());

    let report = ingest_directory(&ctx, tmp.path(), IngestOptions::default())
        .await
        .unwrap();
    assert_eq!(
        report.file("blank.pdf").unwrap().outcome,
        FileOutcome::Added { chunks: 0 }
    );
    assert_eq!(store.add_calls(), 0);
}

#[tokio::test]
async fn test_dry_run_never_calls_store() {
    let tmp = TempDir::new().unwrap();
    touch(tmp.path(), &["a.pdf"]);

    let loader = FakeLoader::new(vec![(
        "a.pdf",
        vec!["some text that is long enough to split in two"],
    )]);
    let store = Arc::new(FailingStore::new("none"));
    let ctx = context(loader, store.clone());

    let report = ingest_directory(&ctx, tmp.path(), IngestOptions { dry_run: true })
        .await
        .unwrap();
    assert!(matches!(
        report.files[0].outcome,
        FileOutcome::DryRun { chunks } if chunks >= 2
    ));
    assert_eq!(store.add_calls(), 0);
    assert_eq!(report.chunks_added(), 0);
}

#[tokio::test]
async fn test_missing_directory_has_no_side_effects() {
    let tmp = TempDir::new().unwrap();
    let store = Arc::new(FailingStore::new("none"));
    let ctx = context(FakeLoader::new(vec![]), store.clone());

    let err = ingest_directory(&ctx, &tmp.path().join("gone"), IngestOptions::default())
        .await
        .unwrap_err();
    assert!(matches!(err, IngestError::DirectoryNotFound(_)));
    assert_eq!(store.add_calls(), 0);
}

#[tokio::test]
async fn test_ingest_delete_query_against_sqlite() {
    let tmp = TempDir::new().unwrap();
    let pdfs = tmp.path().join("pdfs");
    fs::create_dir(&pdfs).unwrap();
    touch(&pdfs, &["guide.pdf", "report.pdf"]);

    let pool = db::connect_path(&tmp.path().join("data/pdfh.sqlite"))
        .await
        .unwrap();
    migrate::apply_schema(&pool).await.unwrap();
    let store = Arc::new(SqliteStore::new(pool));

    let loader = FakeLoader::new(vec![
        ("guide.pdf", vec!["Water lawns early in the morning."]),
        ("report.pdf", vec!["Annual rainfall totals by region."]),
    ]);
    let ctx = context(loader, store.clone());
    let report = ingest_directory(&ctx, &pdfs, IngestOptions::default())
        .await
        .unwrap();
    assert_eq!(report.failed(), 0);
    assert_eq!(store.count().await.unwrap(), 2);

    let mut map = SourceMap::new();
    map.insert(
        "report.pdf",
        SourceEntry {
            url: Some("http://x".to_string()),
            description: Some("Report".to_string()),
        },
    );

    let r = retrieve(store.as_ref(), &map, "rainfall", 4).await.unwrap();
    assert_eq!(r.hits.len(), 1);
    assert_eq!(r.sources[0].filename, "report.pdf");
    assert_eq!(r.sources[0].human_readable, "Report");
    assert_eq!(r.knowledge_string(), "Annual rainfall totals by region.");

    let report_source = pdfs.join("report.pdf").to_string_lossy().to_string();
    assert_eq!(
        delete_by_source(store.as_ref(), &report_source).await.unwrap(),
        DeleteOutcome::Deleted(1)
    );
    assert_eq!(
        delete_by_source(store.as_ref(), &report_source).await.unwrap(),
        DeleteOutcome::NothingToDelete
    );
    assert!(retrieve(store.as_ref(), &map, "rainfall", 4)
        .await
        .unwrap()
        .hits
        .is_empty());
}
