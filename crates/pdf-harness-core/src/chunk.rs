//! Overlapping, size-bounded text chunker.
//!
//! Splits a [`Document`]'s text into [`Chunk`]s of at most `max_chars`
//! characters, where each chunk after the first begins with the last
//! `overlap_chars` characters of its predecessor.
//!
//! # Algorithm
//!
//! 1. Open a window of `max_chars` chars at the current start.
//! 2. If the window reaches the end of the text, emit it and stop.
//! 3. Otherwise end the chunk just after the last `"\n\n"` in the window,
//!    falling back to `"\n"`, then `" "`, then a hard cut at the window end.
//!    A separator is only taken if the chunk stays longer than the overlap.
//! 4. Start the next window `overlap_chars` before the chunk end.
//!
//! Lengths are counted in chars, so multi-byte text never splits inside a
//! code point. Chunks are exact sub-slices of the input: dropping the first
//! `overlap_chars` chars of every chunk but the first and concatenating the
//! rest reproduces the document text.
//!
//! # Example
//!
//! ```rust
//! use pdf_harness_core::chunk::ChunkingPolicy;
//! use pdf_harness_core::models::Document;
//!
//! let policy = ChunkingPolicy::new(10, 2).unwrap();
//! let chunks = policy.split(&Document::new("abcdefghijklmnop"));
//! assert_eq!(chunks[0].text, "abcdefghij");
//! assert_eq!(chunks[1].text, "ijklmnop");
//! ```

use thiserror::Error;

use crate::models::{Chunk, Document};

/// Default maximum chunk length in chars.
pub const DEFAULT_MAX_CHARS: usize = 1500;
/// Default overlap between neighbouring chunks in chars.
pub const DEFAULT_OVERLAP_CHARS: usize = 150;

/// Preferred break points, coarsest first.
const SEPARATORS: [&str; 3] = ["\n\n", "\n", " "];

/// Invalid chunking configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PolicyError {
    #[error("max_chars must be > 0")]
    ZeroMax,
    #[error("overlap_chars ({overlap}) must be smaller than max_chars ({max})")]
    OverlapTooLarge { overlap: usize, max: usize },
}

/// Stateless chunking configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkingPolicy {
    max_chars: usize,
    overlap_chars: usize,
}

impl Default for ChunkingPolicy {
    fn default() -> Self {
        Self {
            max_chars: DEFAULT_MAX_CHARS,
            overlap_chars: DEFAULT_OVERLAP_CHARS,
        }
    }
}

impl ChunkingPolicy {
    pub fn new(max_chars: usize, overlap_chars: usize) -> Result<Self, PolicyError> {
        if max_chars == 0 {
            return Err(PolicyError::ZeroMax);
        }
        if overlap_chars >= max_chars {
            return Err(PolicyError::OverlapTooLarge {
                overlap: overlap_chars,
                max: max_chars,
            });
        }
        Ok(Self {
            max_chars,
            overlap_chars,
        })
    }

    pub fn max_chars(&self) -> usize {
        self.max_chars
    }

    pub fn overlap_chars(&self) -> usize {
        self.overlap_chars
    }

    /// Split a document into chunks, each with its own copy of the
    /// document's metadata.
    pub fn split(&self, doc: &Document) -> Vec<Chunk> {
        self.split_text(&doc.text)
            .into_iter()
            .enumerate()
            .map(|(index, (start, text))| Chunk {
                text: text.to_string(),
                metadata: doc.metadata.clone(),
                index,
                start,
            })
            .collect()
    }

    /// Split raw text into `(char_offset, slice)` spans.
    ///
    /// Returns an empty vector for empty input.
    pub fn split_text<'a>(&self, text: &'a str) -> Vec<(usize, &'a str)> {
        if text.is_empty() {
            return Vec::new();
        }

        // offsets[i] is the byte offset of char i; the last entry is text.len().
        let offsets: Vec<usize> = text
            .char_indices()
            .map(|(i, _)| i)
            .chain(std::iter::once(text.len()))
            .collect();
        let total = offsets.len() - 1;

        let mut spans = Vec::new();
        let mut start = 0;
        loop {
            let limit = (start + self.max_chars).min(total);
            let end = if limit == total {
                total
            } else {
                self.find_break(text, &offsets, start, limit)
            };
            spans.push((start, &text[offsets[start]..offsets[end]]));
            if end == total {
                break;
            }
            start = end - self.overlap_chars;
        }
        spans
    }

    /// Pick the chunk end (exclusive char index) for the window `[start, limit)`.
    fn find_break(&self, text: &str, offsets: &[usize], start: usize, limit: usize) -> usize {
        // The chunk must outgrow the overlap or the next window would not advance.
        let min_end = start + self.overlap_chars + 1;
        let window = &text[offsets[start]..offsets[limit]];

        for sep in SEPARATORS {
            if let Some(pos) = window.rfind(sep) {
                let byte_end = offsets[start] + pos + sep.len();
                let end = offsets.binary_search(&byte_end).unwrap_or_else(|i| i);
                if end >= min_end {
                    return end;
                }
            }
        }
        limit
    }
}
