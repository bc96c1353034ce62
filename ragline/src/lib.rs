//! # ragline
//!
//! A small Retrieval-Augmented Generation pipeline: chunk a corpus, embed the
//! chunks into an exact cosine-similarity index, then answer questions from
//! the top-k retrieved chunks and return those chunks as evidence.
//!
//! ## Overview
//!
//! - [`FixedSizeChunker`] / [`SeparatorChunker`] split [`Document`]s into [`Chunk`]s
//! - [`EmbeddingProvider`] turns text into vectors (external capability)
//! - [`VectorIndex`] stores chunk vectors and ranks them by cosine similarity
//! - [`Retriever`] embeds a query and asks the index for the top k
//! - [`AnswerSynthesizer`] prompts a [`GenerationProvider`] with the retrieved chunks
//! - [`RagPipeline`] / [`QueryEngine`] tie the stages together (build, then query)
//!
//! ## Feature flags
//!
//! - `openai`: [`openai::OpenAIEmbeddingProvider`] and
//!   [`openai::OpenAIGenerationProvider`] over `reqwest`

pub mod chunking;
pub mod config;
pub mod document;
pub mod embedding;
pub mod error;
pub mod generation;
pub mod index;
pub mod pipeline;
pub mod retriever;
pub mod synthesizer;

#[cfg(feature = "openai")]
pub mod openai;

pub use chunking::{Chunker, FixedSizeChunker, SeparatorChunker, split};
pub use config::{RagConfig, RagConfigBuilder};
pub use document::{Answer, Chunk, Document, RetrievalResult, ScoredChunk};
pub use embedding::EmbeddingProvider;
pub use error::{Capability, RagError, Result};
pub use generation::GenerationProvider;
pub use index::{IndexEntry, VectorIndex, cosine_similarity};
pub use pipeline::{QueryEngine, RagPipeline, RagPipelineBuilder};
pub use retriever::Retriever;
pub use synthesizer::{AnswerSynthesizer, PromptTemplate};
