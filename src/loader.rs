//! Document loading.
//!
//! A [`DocumentLoader`] turns one file into a sequence of [`Document`]s.
//! [`PdfLoader`] yields one document per PDF page, each carrying `source`
//! (the path) and `page` (zero-based) metadata. Loading never panics: bad
//! input comes back as a [`LoadError`] and the pipeline records it against
//! that file only.

use std::path::{Path, PathBuf};

use thiserror::Error;

use pdf_harness_core::models::{Document, META_PAGE, META_SOURCE};

/// Why a file could not be turned into documents.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("PDF extraction failed: {0}")]
    Pdf(String),
}

/// Loads a file into page-level documents.
pub trait DocumentLoader: Send + Sync {
    fn load(&self, path: &Path) -> Result<Vec<Document>, LoadError>;
}

/// Loader for PDF files, backed by `pdf-extract`.
#[derive(Debug, Default, Clone, Copy)]
pub struct PdfLoader;

impl DocumentLoader for PdfLoader {
    fn load(&self, path: &Path) -> Result<Vec<Document>, LoadError> {
        let bytes = std::fs::read(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let pages = extract_pages(&bytes)?;
        let source = path.to_string_lossy().to_string();

        Ok(pages
            .into_iter()
            .enumerate()
            .map(|(page, text)| {
                Document::new(text)
                    .with_metadata(META_SOURCE, source.clone())
                    .with_metadata(META_PAGE, page.to_string())
            })
            .collect())
    }
}

/// Extract plain text for every page of an in-memory PDF.
///
/// `pdf-extract` can panic on malformed input; that is reported as an error.
pub fn extract_pages(bytes: &[u8]) -> Result<Vec<String>, LoadError> {
    match std::panic::catch_unwind(|| pdf_extract::extract_text_from_mem_by_pages(bytes)) {
        Ok(result) => result.map_err(|e| LoadError::Pdf(e.to_string())),
        Err(_) => Err(LoadError::Pdf("extractor panicked on malformed input".to_string())),
    }
}
