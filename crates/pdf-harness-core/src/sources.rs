//! Source mapping table and citation resolver.
//!
//! Stored chunks only know the raw path they were ingested from. At query
//! time [`SourceMap::resolve`] turns that path into a [`ResolvedSource`]
//! using a curated table keyed by bare file name. Resolution never fails:
//!
//! | Input | Result |
//! |-------|--------|
//! | path ending in a mapped `*.pdf` | curated `url` and `description` |
//! | path ending in an unmapped `*.pdf` | empty `url`, file name as label |
//! | anything else | only `full_path` set, other fields empty |

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::models::{ResolvedSource, SourceEntry};

/// Whether `name` ends in `.pdf`, ASCII case-insensitive. `.pdf` itself matches.
pub fn ends_with_pdf(name: &str) -> bool {
    let n = name.len();
    n >= 4 && name.is_char_boundary(n - 4) && name[n - 4..].eq_ignore_ascii_case(".pdf")
}

/// Whether `name` ends in `.pdf` (ASCII case-insensitive) after at least one char.
pub fn has_pdf_extension(name: &str) -> bool {
    name.len() > 4 && ends_with_pdf(name)
}

/// Extract the trailing `*.pdf` file name from a stored source path.
///
/// Both `/` and `\` are treated as separators. Returns `None` when the last
/// component is not a PDF file name.
pub fn pdf_file_name(source: &str) -> Option<&str> {
    let name = source.rsplit(['/', '\\']).next().unwrap_or(source);
    has_pdf_extension(name).then_some(name)
}

/// Read-only mapping from bare file name to curated description.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SourceMap {
    entries: BTreeMap<String, SourceEntry>,
}

impl SourceMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, filename: impl Into<String>, entry: SourceEntry) {
        self.entries.insert(filename.into(), entry);
    }

    pub fn get(&self, filename: &str) -> Option<&SourceEntry> {
        self.entries.get(filename)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in file-name order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &SourceEntry)> {
        self.entries.iter()
    }

    /// Resolve a raw stored source path into a displayable citation.
    ///
    /// Wider than a plain `/<name>.pdf` suffix match: a bare file name with
    /// no directory, `\` separators, and any case of `.pdf` are accepted too.
    pub fn resolve(&self, source: &str) -> ResolvedSource {
        let Some(filename) = pdf_file_name(source) else {
            return ResolvedSource {
                full_path: source.to_string(),
                ..ResolvedSource::default()
            };
        };

        let entry = self.get(filename);
        let url = entry.and_then(|e| e.url.clone()).unwrap_or_default();
        let human_readable = entry
            .and_then(|e| e.description.clone())
            .unwrap_or_else(|| filename.to_string());

        ResolvedSource {
            full_path: source.to_string(),
            filename: filename.to_string(),
            url,
            human_readable,
        }
    }
}

impl FromIterator<(String, SourceEntry)> for SourceMap {
    fn from_iter<I: IntoIterator<Item = (String, SourceEntry)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> SourceMap {
        let mut map = SourceMap::new();
        map.insert(
            "report.pdf",
            SourceEntry {
                url: Some("http://x".to_string()),
                description: Some("Report".to_string()),
            },
        );
        map.insert(
            "bare.pdf",
            SourceEntry {
                url: Some("http://bare".to_string()),
                description: None,
            },
        );
        map
    }

    #[test]
    fn test_resolves_mapped_file() {
        let r = table().resolve("dir/report.pdf");
        assert_eq!(
            r,
            ResolvedSource {
                full_path: "dir/report.pdf".to_string(),
                filename: "report.pdf".to_string(),
                url: "http://x".to_string(),
                human_readable: "Report".to_string(),
            }
        );
    }

    #[test]
    fn test_unmapped_file_falls_back_to_name() {
        let r = table().resolve("dir/unknown.pdf");
        assert_eq!(r.full_path, "dir/unknown.pdf");
        assert_eq!(r.filename, "unknown.pdf");
        assert_eq!(r.url, "");
        assert_eq!(r.human_readable, "unknown.pdf");
    }

    #[test]
    fn test_malformed_path_keeps_only_full_path() {
        let r = table().resolve("no-extension-here");
        assert_eq!(
            r,
            ResolvedSource {
                full_path: "no-extension-here".to_string(),
                ..ResolvedSource::default()
            }
        );
    }

    #[test]
    fn test_entry_without_description_uses_name() {
        let r = table().resolve("x/bare.pdf");
        assert_eq!(r.url, "http://bare");
        assert_eq!(r.human_readable, "bare.pdf");
    }

    #[test]
    fn test_windows_separator_and_case() {
        let r = table().resolve("newData\\Outdoor Watering.PDF");
        assert_eq!(r.filename, "Outdoor Watering.PDF");
        assert_eq!(r.human_readable, "Outdoor Watering.PDF");
    }

    #[test]
    fn test_pdf_file_name_edge_cases() {
        assert_eq!(pdf_file_name("report.pdf"), Some("report.pdf"));
        assert_eq!(pdf_file_name("dir/.pdf"), None);
        assert_eq!(pdf_file_name("dir/report.pdf/"), None);
        assert_eq!(pdf_file_name("dir/report.pdf.txt"), None);
        assert_eq!(pdf_file_name(""), None);
        assert_eq!(pdf_file_name("a/b/ñandú.pdf"), Some("ñandú.pdf"));
    }

    #[test]
    fn test_ends_with_pdf_accepts_bare_extension() {
        assert!(ends_with_pdf(".pdf"));
        assert!(ends_with_pdf(".PDF"));
        assert!(ends_with_pdf("Report.Pdf"));
        assert!(!ends_with_pdf("pdf"));
        assert!(!ends_with_pdf("notes.txt"));
        assert!(!has_pdf_extension(".pdf"));
        assert!(has_pdf_extension("a.pdf"));
    }

    #[test]
    fn test_deserializes_from_json_table() {
        let map: SourceMap = serde_json::from_str(
            r#"{"report.pdf": {"url": "http://x", "description": "Report"}}"#,
        )
        .unwrap();
        assert_eq!(map.len(), 1);
        assert_eq!(map.resolve("d/report.pdf").human_readable, "Report");
    }
}
