//! Top-k retrieval over a [`VectorIndex`].

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, error};

use crate::document::RetrievalResult;
use crate::embedding::EmbeddingProvider;
use crate::error::{RagError, Result};
use crate::index::VectorIndex;

/// Embeds a query and looks up its nearest chunks in a [`VectorIndex`].
///
/// The embedder must be the one the index was built with; a disagreeing
/// dimensionality surfaces as [`RagError::DimensionMismatch`].
pub struct Retriever {
    embedder: Arc<dyn EmbeddingProvider>,
    index: Arc<VectorIndex>,
    timeout: Duration,
}

impl Retriever {
    /// Timeout applied to the query embedding unless overridden.
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

    /// Create a retriever over `index` that embeds queries with `embedder`.
    pub fn new(embedder: Arc<dyn EmbeddingProvider>, index: Arc<VectorIndex>) -> Self {
        Self { embedder, index, timeout: Self::DEFAULT_TIMEOUT }
    }

    /// Set the upper bound on the query embedding call.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Return a reference to the underlying index.
    pub fn index(&self) -> &Arc<VectorIndex> {
        &self.index
    }

    /// Return the `k` chunks most similar to `query_text`, most similar first.
    ///
    /// # Errors
    ///
    /// - [`RagError::InvalidConfig`] if `k == 0` (checked before embedding)
    /// - [`RagError::CapabilityUnavailable`] if embedding fails or times out
    /// - [`RagError::DimensionMismatch`] if the query embedding disagrees with the index
    pub async fn retrieve(&self, query_text: &str, k: usize) -> Result<RetrievalResult> {
        if k == 0 {
            return Err(RagError::invalid_config("k must be greater than zero (requested k = 0)"));
        }

        let provider = self.embedder.name().to_string();
        debug!(provider = %provider, query_len = query_text.len(), k, "embedding query");

        let vector = match tokio::time::timeout(self.timeout, self.embedder.embed(query_text)).await {
            Ok(result) => result.map_err(|e| {
                error!(provider = %provider, error = %e, "query embedding failed");
                e
            })?,
            Err(_) => {
                error!(provider = %provider, timeout = ?self.timeout, "query embedding timed out");
                return Err(RagError::embedding(
                    provider,
                    format!("query embedding timed out after {:?}", self.timeout),
                ));
            }
        };

        let results = self.index.query(&vector, k)?;
        debug!(k, result_count = results.len(), "retrieval completed");
        Ok(results)
    }
}
