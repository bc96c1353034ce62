//! RAG pipeline orchestrator.
//!
//! The pipeline has two phases. [`RagPipeline`] is the build phase: it chunks
//! and embeds a corpus into a [`VectorIndex`]. [`RagPipeline::index`] consumes
//! it and returns a [`QueryEngine`], the query phase, which answers questions
//! against that index. There is no way back from a `QueryEngine` to a
//! `RagPipeline`; indexing another corpus means building another pipeline.
//!
//! # Example
//!
//! ```rust,ignore
//! use ragline::{Document, RagConfig, RagPipeline};
//!
//! let engine = RagPipeline::builder()
//!     .config(RagConfig::default())
//!     .embedding_provider(Arc::new(my_embedder))
//!     .generation_provider(Arc::new(my_llm))
//!     .build()?
//!     .index(&[Document::from_path("data/sample.txt")?])
//!     .await?;
//!
//! let answer = engine.ask("What is FAISS?").await?;
//! ```

use std::sync::Arc;

use tracing::{error, info};

use crate::chunking::{Chunker, FixedSizeChunker};
use crate::config::RagConfig;
use crate::document::{Answer, Chunk, Document, RetrievalResult};
use crate::embedding::EmbeddingProvider;
use crate::error::{RagError, Result};
use crate::generation::GenerationProvider;
use crate::index::VectorIndex;
use crate::retriever::Retriever;
use crate::synthesizer::{AnswerSynthesizer, PromptTemplate};

/// The build phase of the pipeline.
///
/// Construct one via [`RagPipeline::builder()`], then call
/// [`index`](RagPipeline::index) with the corpus.
pub struct RagPipeline {
    config: RagConfig,
    embedding_provider: Arc<dyn EmbeddingProvider>,
    generation_provider: Arc<dyn GenerationProvider>,
    chunker: Arc<dyn Chunker>,
    template: PromptTemplate,
}

impl RagPipeline {
    /// Create a new [`RagPipelineBuilder`].
    pub fn builder() -> RagPipelineBuilder {
        RagPipelineBuilder::default()
    }

    /// Return a reference to the pipeline configuration.
    pub fn config(&self) -> &RagConfig {
        &self.config
    }

    /// Split every document into chunks, in document order.
    pub fn chunk_documents(&self, documents: &[Document]) -> Vec<Chunk> {
        documents.iter().flat_map(|document| self.chunker.chunk(document)).collect()
    }

    /// Build the index: chunk -> embed -> index.
    ///
    /// Chunks are embedded in batches of at most
    /// [`EmbeddingProvider::max_batch_size`] texts, each batch bounded by its
    /// own `request_timeout`.
    ///
    /// Consumes the pipeline and returns the [`QueryEngine`] for the indexed
    /// corpus. An empty corpus yields an empty index, which answers every
    /// question from no context.
    ///
    /// # Errors
    ///
    /// - [`RagError::CapabilityUnavailable`] if an embedding batch fails, times
    ///   out, or returns a different number of vectors than it was given
    /// - [`RagError::DimensionMismatch`] if the returned vectors disagree in length
    pub async fn index(self, documents: &[Document]) -> Result<QueryEngine> {
        let chunks = self.chunk_documents(documents);
        let provider = self.embedding_provider.name().to_string();

        let texts: Vec<&str> = chunks.iter().map(|c| c.text.as_str()).collect();
        let batch_size = self.embedding_provider.max_batch_size().max(1);
        let timeout = self.config.request_timeout;
        let mut vectors = Vec::with_capacity(chunks.len());

        for (batch_number, batch) in texts.chunks(batch_size).enumerate() {
            let embedded =
                match tokio::time::timeout(timeout, self.embedding_provider.embed_batch(batch)).await {
                    Ok(result) => result.map_err(|e| {
                        error!(provider = %provider, batch_number, batch_len = batch.len(), error = %e, "embedding failed during indexing");
                        e
                    })?,
                    Err(_) => {
                        error!(provider = %provider, batch_number, batch_len = batch.len(), ?timeout, "embedding timed out during indexing");
                        return Err(RagError::embedding(
                            provider,
                            format!(
                                "embedding batch {batch_number} ({} chunks) timed out after {timeout:?}",
                                batch.len()
                            ),
                        ));
                    }
                };

            if embedded.len() != batch.len() {
                error!(provider = %provider, batch_number, expected = batch.len(), actual = embedded.len(), "embedding count mismatch");
                return Err(RagError::embedding(
                    provider,
                    format!(
                        "expected {} embeddings for batch {batch_number}, received {}",
                        batch.len(),
                        embedded.len()
                    ),
                ));
            }
            vectors.extend(embedded);
        }

        let chunk_count = chunks.len();
        let index = VectorIndex::build(chunks.into_iter().zip(vectors).collect())?;
        info!(
            document_count = documents.len(),
            chunk_count,
            dimensions = index.dimensions(),
            "indexed corpus"
        );

        let index = Arc::new(index);
        let retriever = Retriever::new(self.embedding_provider, Arc::clone(&index))
            .with_timeout(self.config.request_timeout);
        let synthesizer = AnswerSynthesizer::new(self.generation_provider)
            .with_template(self.template)
            .with_timeout(self.config.request_timeout);

        Ok(QueryEngine { config: self.config, index, retriever, synthesizer })
    }
}

/// The query phase of the pipeline: retrieval plus answer synthesis over one
/// immutable index.
pub struct QueryEngine {
    config: RagConfig,
    index: Arc<VectorIndex>,
    retriever: Retriever,
    synthesizer: AnswerSynthesizer,
}

impl QueryEngine {
    /// Return a reference to the pipeline configuration.
    pub fn config(&self) -> &RagConfig {
        &self.config
    }

    /// Return a reference to the index.
    pub fn index(&self) -> &Arc<VectorIndex> {
        &self.index
    }

    /// Return the retrieval stage.
    pub fn retriever(&self) -> &Retriever {
        &self.retriever
    }

    /// Return the synthesis stage.
    pub fn synthesizer(&self) -> &AnswerSynthesizer {
        &self.synthesizer
    }

    /// Retrieve the configured `top_k` chunks for `question`.
    ///
    /// # Errors
    ///
    /// See [`Retriever::retrieve`].
    pub async fn retrieve(&self, question: &str) -> Result<RetrievalResult> {
        self.retriever.retrieve(question, self.config.top_k).await
    }

    /// Answer `question`: retrieve -> synthesize.
    ///
    /// # Errors
    ///
    /// See [`Retriever::retrieve`] and [`AnswerSynthesizer::answer`].
    pub async fn ask(&self, question: &str) -> Result<Answer> {
        let retrieval = self.retrieve(question).await?;
        info!(result_count = retrieval.len(), top_k = self.config.top_k, "query retrieved");
        self.synthesizer.answer(question, retrieval).await
    }
}

/// Builder for constructing a [`RagPipeline`].
///
/// `embedding_provider` and `generation_provider` are required. Without an
/// explicit chunker, a [`FixedSizeChunker`] sized from the config is used.
///
/// # Example
///
/// ```rust,ignore
/// let pipeline = RagPipeline::builder()
///     .config(RagConfig::default())
///     .embedding_provider(Arc::new(embedder))
///     .generation_provider(Arc::new(llm))
///     .chunker(Arc::new(SeparatorChunker::new(200, 0)?))  // optional
///     .build()?;
/// ```
#[derive(Default)]
pub struct RagPipelineBuilder {
    config: Option<RagConfig>,
    embedding_provider: Option<Arc<dyn EmbeddingProvider>>,
    generation_provider: Option<Arc<dyn GenerationProvider>>,
    chunker: Option<Arc<dyn Chunker>>,
    template: Option<PromptTemplate>,
}

impl RagPipelineBuilder {
    /// Set the pipeline configuration. Defaults to [`RagConfig::default()`].
    pub fn config(mut self, config: RagConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set the embedding provider.
    pub fn embedding_provider(mut self, provider: Arc<dyn EmbeddingProvider>) -> Self {
        self.embedding_provider = Some(provider);
        self
    }

    /// Set the generation provider.
    pub fn generation_provider(mut self, provider: Arc<dyn GenerationProvider>) -> Self {
        self.generation_provider = Some(provider);
        self
    }

    /// Set the document chunker.
    pub fn chunker(mut self, chunker: Arc<dyn Chunker>) -> Self {
        self.chunker = Some(chunker);
        self
    }

    /// Set the prompt template used for synthesis.
    pub fn prompt_template(mut self, template: PromptTemplate) -> Self {
        self.template = Some(template);
        self
    }

    /// Build the [`RagPipeline`], validating the config and required parts.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::InvalidConfig`] if the config is invalid or a
    /// provider is missing.
    pub fn build(self) -> Result<RagPipeline> {
        let config = self.config.unwrap_or_default();
        config.validate()?;
        let embedding_provider = self
            .embedding_provider
            .ok_or_else(|| RagError::invalid_config("embedding_provider is required"))?;
        let generation_provider = self
            .generation_provider
            .ok_or_else(|| RagError::invalid_config("generation_provider is required"))?;
        let chunker = match self.chunker {
            Some(chunker) => chunker,
            None => Arc::new(FixedSizeChunker::new(config.chunk_size, config.chunk_overlap)?),
        };

        Ok(RagPipeline {
            config,
            embedding_provider,
            generation_provider,
            chunker,
            template: self.template.unwrap_or_default(),
        })
    }
}
