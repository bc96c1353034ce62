//! In-memory vector index using cosine similarity.
//!
//! [`VectorIndex`] is built once from `(Chunk, vector)` pairs and is immutable
//! afterwards. Queries are answered by an exhaustive linear scan, so rankings
//! are exact. To index a different corpus, build a new index.

use serde::Serialize;
use tracing::{debug, error};

use crate::document::{Chunk, RetrievalResult, ScoredChunk};
use crate::error::{RagError, Result};

/// A [`Chunk`] paired with its embedding vector.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct IndexEntry {
    /// The indexed chunk.
    pub chunk: Chunk,
    /// The chunk's embedding.
    pub vector: Vec<f32>,
}

/// An exact nearest-neighbour index over chunk embeddings.
///
/// All vectors share one dimensionality, fixed by the first entry. Entries
/// keep their insertion order, which is also the tie-break order for equal
/// similarity scores.
///
/// # Example
///
/// ```rust
/// use ragline::{Chunk, VectorIndex};
///
/// # fn chunk(text: &str) -> Chunk {
/// #     Chunk { document_id: "doc".into(), index: 0, start: 0, text: text.into(), metadata: Default::default() }
/// # }
/// let index = VectorIndex::build(vec![
///     (chunk("x"), vec![1.0, 0.0]),
///     (chunk("y"), vec![0.0, 1.0]),
/// ])?;
/// let results = index.query(&[1.0, 0.0], 1)?;
/// assert_eq!(results[0].chunk.text, "x");
/// # Ok::<(), ragline::RagError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct VectorIndex {
    entries: Vec<IndexEntry>,
    dimensions: Option<usize>,
}

impl VectorIndex {
    /// Build an index from chunks and their vectors, preserving their order.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::DimensionMismatch`] if a vector is empty or differs in
    /// length from the first non-empty vector. The error names the offending
    /// chunk and reports `expected: 0` only when no vector is non-empty.
    pub fn build(entries: Vec<(Chunk, Vec<f32>)>) -> Result<Self> {
        // The first non-empty vector fixes the dimensionality.
        let dimensions = entries.iter().map(|(_, vector)| vector.len()).find(|&len| len > 0);
        let mut indexed = Vec::with_capacity(entries.len());

        for (position, (chunk, vector)) in entries.into_iter().enumerate() {
            let expected = dimensions.unwrap_or_default();
            if vector.is_empty() || vector.len() != expected {
                let kind = if vector.is_empty() { "empty vector at entry" } else { "entry" };
                let context = format!(
                    "{kind} {position} (chunk {} of document '{}')",
                    chunk.index, chunk.document_id
                );
                error!(position, expected, actual = vector.len(), "dimension mismatch during index build");
                return Err(RagError::DimensionMismatch { expected, actual: vector.len(), context });
            }
            indexed.push(IndexEntry { chunk, vector });
        }

        debug!(entries = indexed.len(), dimensions, "built vector index");
        Ok(Self { entries: indexed, dimensions })
    }

    /// Return the `k` entries most similar to `vector`, most similar first.
    ///
    /// Returns every entry if the index holds fewer than `k`, and an empty
    /// result if the index is empty.
    ///
    /// # Errors
    ///
    /// - [`RagError::InvalidConfig`] if `k == 0`
    /// - [`RagError::DimensionMismatch`] if the index is non-empty and `vector`
    ///   has a different dimensionality
    pub fn query(&self, vector: &[f32], k: usize) -> Result<RetrievalResult> {
        if k == 0 {
            return Err(RagError::invalid_config("k must be greater than zero (requested k = 0)"));
        }
        let Some(dimensions) = self.dimensions else {
            return Ok(Vec::new());
        };
        if vector.len() != dimensions {
            error!(expected = dimensions, actual = vector.len(), "query dimension mismatch");
            return Err(RagError::DimensionMismatch {
                expected: dimensions,
                actual: vector.len(),
                context: "query vector".to_string(),
            });
        }

        let mut scored: Vec<(usize, f32)> = self
            .entries
            .iter()
            .enumerate()
            .map(|(position, entry)| (position, cosine_similarity(&entry.vector, vector)))
            .collect();

        // `sort_by` is stable, so equal scores keep insertion order.
        scored.sort_by(|a, b| b.1.total_cmp(&a.1));
        scored.truncate(k);

        Ok(scored
            .into_iter()
            .map(|(position, score)| ScoredChunk { chunk: self.entries[position].chunk.clone(), score })
            .collect())
    }

    /// Number of indexed entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the index holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Dimensionality shared by all vectors, or `None` for an empty index.
    pub fn dimensions(&self) -> Option<usize> {
        self.dimensions
    }

    /// The indexed entries in insertion order.
    pub fn entries(&self) -> &[IndexEntry] {
        &self.entries
    }
}

/// Compute cosine similarity between two vectors.
///
/// Returns 0.0 if either vector has zero magnitude. A NaN result (from NaN
/// components) is also mapped to 0.0 so rankings stay total.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    let score = dot / (norm_a * norm_b);
    if score.is_nan() { 0.0 } else { score }
}
