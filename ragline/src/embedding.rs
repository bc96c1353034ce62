//! Embedding provider trait for generating vector embeddings from text.

use async_trait::async_trait;

use crate::error::Result;

/// A provider that generates vector embeddings from text input.
///
/// Implementations wrap specific embedding backends behind a unified async
/// interface. Every vector a provider returns must have
/// [`dimensions()`](EmbeddingProvider::dimensions) elements. Failures should be
/// reported as [`RagError::CapabilityUnavailable`](crate::RagError::CapabilityUnavailable).
///
/// The default [`embed_batch`](EmbeddingProvider::embed_batch) implementation
/// calls [`embed`](EmbeddingProvider::embed) sequentially; backends that support
/// native batching should override it together with
/// [`max_batch_size`](EmbeddingProvider::max_batch_size).
///
/// # Example
///
/// ```rust,ignore
/// use ragline::EmbeddingProvider;
///
/// let provider = MyEmbeddingProvider::new();
/// let embedding = provider.embed("hello world").await?;
/// assert_eq!(embedding.len(), provider.dimensions());
/// ```
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Generate an embedding vector for a single text input.
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Generate embedding vectors for a batch of text inputs, in input order.
    ///
    /// The default implementation calls [`embed`](EmbeddingProvider::embed)
    /// sequentially for each input.
    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        let mut results = Vec::with_capacity(texts.len());
        for text in texts {
            results.push(self.embed(text).await?);
        }
        Ok(results)
    }

    /// The largest number of texts one [`embed_batch`](EmbeddingProvider::embed_batch)
    /// call should carry, so that one batch is one request to the backend.
    ///
    /// Defaults to 1, matching the sequential default `embed_batch`.
    fn max_batch_size(&self) -> usize {
        1
    }

    /// Return the dimensionality of embeddings produced by this provider.
    fn dimensions(&self) -> usize;

    /// A short name used in logs and error messages.
    fn name(&self) -> &str {
        "embedding"
    }
}
