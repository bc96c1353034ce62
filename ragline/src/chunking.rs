//! Document chunking strategies.
//!
//! This module provides the [`Chunker`] trait and two implementations:
//!
//! - [`FixedSizeChunker`] splits by character count with configurable overlap
//! - [`SeparatorChunker`] splits on a separator and packs the pieces into chunks
//!
//! Sizes are counted in characters (Unicode scalar values), so a chunk boundary
//! never falls inside a multi-byte code point.

use std::collections::VecDeque;

use crate::config::validate_chunking;
use crate::document::{Chunk, Document};
use crate::error::Result;

/// A strategy for splitting documents into chunks.
///
/// Implementations validate their parameters on construction, so chunking
/// itself cannot fail. Returned chunks are never empty and are ordered by
/// their position in the document.
pub trait Chunker: Send + Sync {
    /// Split a document into chunks.
    ///
    /// Returns an empty `Vec` if the document has empty text.
    fn chunk(&self, document: &Document) -> Vec<Chunk>;
}

/// Split `document` into `chunk_size`-character chunks overlapping by `overlap`.
///
/// Shorthand for [`FixedSizeChunker::new`] followed by [`Chunker::chunk`].
///
/// # Errors
///
/// Returns [`RagError::InvalidConfig`](crate::RagError::InvalidConfig) if
/// `chunk_size == 0` or `overlap >= chunk_size`.
pub fn split(document: &Document, chunk_size: usize, overlap: usize) -> Result<Vec<Chunk>> {
    Ok(FixedSizeChunker::new(chunk_size, overlap)?.chunk(document))
}

/// Splits text into fixed-size chunks by character count with configurable overlap.
///
/// Chunk `i` starts `i * (chunk_size - overlap)` characters into the document.
/// Splitting stops at the first chunk that reaches the end of the text, so the
/// last chunk may be shorter than `chunk_size` and a document no longer than
/// `chunk_size` yields exactly one chunk.
///
/// # Example
///
/// ```rust
/// use ragline::{Chunker, Document, FixedSizeChunker};
///
/// let chunker = FixedSizeChunker::new(6, 2).unwrap();
/// let chunks = chunker.chunk(&Document::new("doc", "AAAABBBBCCCC"));
/// let texts: Vec<_> = chunks.iter().map(|c| c.text.as_str()).collect();
/// assert_eq!(texts, ["AAAABB", "BBBBCC", "CCCC"]);
/// ```
#[derive(Debug, Clone)]
pub struct FixedSizeChunker {
    chunk_size: usize,
    chunk_overlap: usize,
}

impl FixedSizeChunker {
    /// Create a new `FixedSizeChunker`.
    ///
    /// # Arguments
    ///
    /// * `chunk_size` - maximum number of characters per chunk
    /// * `chunk_overlap` - number of overlapping characters between consecutive chunks
    ///
    /// # Errors
    ///
    /// Returns [`RagError::InvalidConfig`](crate::RagError::InvalidConfig) if
    /// `chunk_size == 0` or `chunk_overlap >= chunk_size`.
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Result<Self> {
        validate_chunking(chunk_size, chunk_overlap)?;
        Ok(Self { chunk_size, chunk_overlap })
    }

    /// Maximum number of characters per chunk.
    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Number of characters shared by consecutive chunks.
    pub fn chunk_overlap(&self) -> usize {
        self.chunk_overlap
    }
}

impl Chunker for FixedSizeChunker {
    fn chunk(&self, document: &Document) -> Vec<Chunk> {
        split_by_size(&document.text, self.chunk_size, self.chunk_overlap)
            .into_iter()
            .enumerate()
            .map(|(index, (start, text))| make_chunk(document, index, start, text))
            .collect()
    }
}

/// Byte offset of every char boundary in `text`, including `text.len()`.
fn char_boundaries(text: &str) -> Vec<usize> {
    text.char_indices().map(|(i, _)| i).chain(std::iter::once(text.len())).collect()
}

/// Character-based splitting with overlap. Returns `(char_offset, text)` pairs.
fn split_by_size(text: &str, chunk_size: usize, chunk_overlap: usize) -> Vec<(usize, String)> {
    if text.is_empty() {
        return Vec::new();
    }

    let bounds = char_boundaries(text);
    let len = bounds.len() - 1;
    let step = chunk_size - chunk_overlap;
    let mut chunks = Vec::with_capacity(len.saturating_sub(chunk_overlap).div_ceil(step));
    let mut start = 0;

    loop {
        let end = (start + chunk_size).min(len);
        chunks.push((start, text[bounds[start]..bounds[end]].to_string()));
        if end == len {
            break;
        }
        start += step;
    }

    chunks
}

fn make_chunk(document: &Document, index: usize, start: usize, text: String) -> Chunk {
    Chunk {
        document_id: document.id.clone(),
        index,
        start,
        text,
        metadata: document.metadata.clone(),
    }
}

/// Splits text on a separator, then packs consecutive pieces into chunks.
///
/// Pieces are trimmed and whitespace-only pieces are dropped. Consecutive
/// pieces are merged while the chunk stays within `chunk_size` characters.
/// When a chunk is full, its trailing pieces spanning at most `chunk_overlap`
/// characters are carried into the next chunk. A single piece longer than
/// `chunk_size` is split with [`FixedSizeChunker`] rules.
///
/// Every chunk is a contiguous slice of the document text.
///
/// # Example
///
/// ```rust
/// use ragline::{Chunker, Document, SeparatorChunker};
///
/// let chunker = SeparatorChunker::new(13, 0).unwrap();
/// let chunks = chunker.chunk(&Document::new("doc", "first\n\nsecond\n\nthird"));
/// assert_eq!(chunks.len(), 2);
/// assert_eq!(chunks[0].text, "first\n\nsecond");
/// ```
#[derive(Debug, Clone)]
pub struct SeparatorChunker {
    chunk_size: usize,
    chunk_overlap: usize,
    separator: String,
}

impl SeparatorChunker {
    /// The separator used unless [`with_separator`](Self::with_separator) overrides it.
    pub const DEFAULT_SEPARATOR: &'static str = "\n\n";

    /// Create a new `SeparatorChunker` splitting on blank lines.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::InvalidConfig`](crate::RagError::InvalidConfig) if
    /// `chunk_size == 0` or `chunk_overlap >= chunk_size`.
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Result<Self> {
        validate_chunking(chunk_size, chunk_overlap)?;
        Ok(Self { chunk_size, chunk_overlap, separator: Self::DEFAULT_SEPARATOR.to_string() })
    }

    /// Split on `separator` instead of blank lines. An empty separator is ignored.
    pub fn with_separator(mut self, separator: impl Into<String>) -> Self {
        let separator = separator.into();
        if !separator.is_empty() {
            self.separator = separator;
        }
        self
    }
}

/// A trimmed, non-empty piece of the document, in both byte and char offsets.
#[derive(Debug, Clone, Copy)]
struct Piece {
    byte_start: usize,
    byte_end: usize,
    char_start: usize,
    char_end: usize,
}

impl Piece {
    fn char_len(&self) -> usize {
        self.char_end - self.char_start
    }
}

fn split_pieces(text: &str, separator: &str) -> Vec<Piece> {
    let mut pieces = Vec::new();
    let mut byte_pos = 0;
    let mut char_pos = 0;

    for segment in text.split(separator) {
        let leading = segment.len() - segment.trim_start().len();
        let trimmed = segment.trim();
        if !trimmed.is_empty() {
            let byte_start = byte_pos + leading;
            let char_start = char_pos + segment[..leading].chars().count();
            pieces.push(Piece {
                byte_start,
                byte_end: byte_start + trimmed.len(),
                char_start,
                char_end: char_start + trimmed.chars().count(),
            });
        }
        byte_pos += segment.len() + separator.len();
        char_pos += segment.chars().count() + separator.chars().count();
    }

    pieces
}

/// Characters covered from the first to the last piece, separators included.
fn span(pieces: &VecDeque<Piece>) -> usize {
    match (pieces.front(), pieces.back()) {
        (Some(first), Some(last)) => last.char_end - first.char_start,
        _ => 0,
    }
}

impl Chunker for SeparatorChunker {
    fn chunk(&self, document: &Document) -> Vec<Chunk> {
        let text = &document.text;
        let mut chunks = Vec::new();
        let mut current: VecDeque<Piece> = VecDeque::new();

        let emit = |pieces: &VecDeque<Piece>, chunks: &mut Vec<Chunk>| {
            if let (Some(first), Some(last)) = (pieces.front(), pieces.back()) {
                let body = text[first.byte_start..last.byte_end].to_string();
                chunks.push(make_chunk(document, chunks.len(), first.char_start, body));
            }
        };

        for piece in split_pieces(text, &self.separator) {
            if piece.char_len() > self.chunk_size {
                emit(&current, &mut chunks);
                current.clear();
                let slice = &text[piece.byte_start..piece.byte_end];
                for (offset, body) in split_by_size(slice, self.chunk_size, self.chunk_overlap) {
                    let start = piece.char_start + offset;
                    chunks.push(make_chunk(document, chunks.len(), start, body));
                }
                continue;
            }

            let fits = |pieces: &VecDeque<Piece>| {
                pieces.front().is_none_or(|first| piece.char_end - first.char_start <= self.chunk_size)
            };

            if !fits(&current) {
                emit(&current, &mut chunks);
                while !current.is_empty() && (span(&current) > self.chunk_overlap || !fits(&current))
                {
                    current.pop_front();
                }
            }
            current.push_back(piece);
        }

        emit(&current, &mut chunks);
        chunks
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn multibyte_text_splits_on_char_boundaries() {
        let doc = Document::new("d", "héllo wörld");
        let chunks = FixedSizeChunker::new(4, 1).unwrap().chunk(&doc);
        let texts: Vec<_> = chunks.iter().map(|c| c.text.as_str()).collect();
        assert_eq!(texts, ["héll", "lo w", "wörl", "ld"]);
        assert_eq!(chunks[2].start, 6);
    }

    #[test]
    fn pieces_track_char_offsets() {
        let pieces = split_pieces("  ä\n\nb  \n\n \n\nc", "\n\n");
        assert_eq!(pieces.len(), 3);
        assert_eq!((pieces[0].char_start, pieces[0].char_end), (2, 3));
        assert_eq!((pieces[1].char_start, pieces[1].char_end), (5, 6));
        assert_eq!((pieces[2].char_start, pieces[2].char_end), (13, 14));
    }
}
