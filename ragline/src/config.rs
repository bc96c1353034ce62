//! Configuration for the RAG pipeline.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{RagError, Result};

/// The embedding model used when none is configured.
pub const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-3-small";

/// The generation model used when none is configured.
pub const DEFAULT_GENERATION_MODEL: &str = "gpt-3.5-turbo";

/// Configuration parameters for the RAG pipeline.
///
/// Construct through [`RagConfig::builder()`] so the fields are validated;
/// [`RagConfig::validate`] re-checks a value obtained any other way
/// (for example deserialized from JSON).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RagConfig {
    /// Chunk size in characters.
    pub chunk_size: usize,
    /// Number of overlapping characters between consecutive chunks.
    pub chunk_overlap: usize,
    /// Number of passages retrieved per question.
    pub top_k: usize,
    /// Identifier of the embedding model.
    pub embedding_model: String,
    /// Identifier of the generation model.
    pub generation_model: String,
    /// Upper bound on every embedding or generation call.
    #[serde(with = "duration_secs")]
    pub request_timeout: Duration,
}

impl Default for RagConfig {
    fn default() -> Self {
        Self {
            chunk_size: 200,
            chunk_overlap: 0,
            top_k: 4,
            embedding_model: DEFAULT_EMBEDDING_MODEL.to_string(),
            generation_model: DEFAULT_GENERATION_MODEL.to_string(),
            request_timeout: Duration::from_secs(30),
        }
    }
}

impl RagConfig {
    /// Create a new builder for constructing a [`RagConfig`].
    pub fn builder() -> RagConfigBuilder {
        RagConfigBuilder::default()
    }

    /// Check that the parameters are consistent.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::InvalidConfig`] if:
    /// - `chunk_size == 0`
    /// - `chunk_overlap >= chunk_size`
    /// - `top_k == 0`
    /// - either model identifier is empty
    /// - `request_timeout` is zero
    pub fn validate(&self) -> Result<()> {
        validate_chunking(self.chunk_size, self.chunk_overlap)?;
        if self.top_k == 0 {
            return Err(RagError::invalid_config("top_k must be greater than zero"));
        }
        if self.embedding_model.trim().is_empty() {
            return Err(RagError::invalid_config("embedding_model must not be empty"));
        }
        if self.generation_model.trim().is_empty() {
            return Err(RagError::invalid_config("generation_model must not be empty"));
        }
        if self.request_timeout.is_zero() {
            return Err(RagError::invalid_config("request_timeout must be greater than zero"));
        }
        Ok(())
    }
}

pub(crate) fn validate_chunking(chunk_size: usize, chunk_overlap: usize) -> Result<()> {
    if chunk_size == 0 {
        return Err(RagError::invalid_config("chunk_size must be greater than zero"));
    }
    if chunk_overlap >= chunk_size {
        return Err(RagError::invalid_config(format!(
            "chunk_overlap ({chunk_overlap}) must be less than chunk_size ({chunk_size})"
        )));
    }
    Ok(())
}

/// Builder for constructing a validated [`RagConfig`].
#[derive(Debug, Clone, Default)]
pub struct RagConfigBuilder {
    config: RagConfig,
}

impl RagConfigBuilder {
    /// Set the chunk size in characters.
    pub fn chunk_size(mut self, size: usize) -> Self {
        self.config.chunk_size = size;
        self
    }

    /// Set the overlap between consecutive chunks in characters.
    pub fn chunk_overlap(mut self, overlap: usize) -> Self {
        self.config.chunk_overlap = overlap;
        self
    }

    /// Set the number of passages retrieved per question.
    pub fn top_k(mut self, k: usize) -> Self {
        self.config.top_k = k;
        self
    }

    /// Set the embedding model identifier.
    pub fn embedding_model(mut self, model: impl Into<String>) -> Self {
        self.config.embedding_model = model.into();
        self
    }

    /// Set the generation model identifier.
    pub fn generation_model(mut self, model: impl Into<String>) -> Self {
        self.config.generation_model = model.into();
        self
    }

    /// Set the timeout applied to each external call.
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.config.request_timeout = timeout;
        self
    }

    /// Build the [`RagConfig`], validating that parameters are consistent.
    ///
    /// # Errors
    ///
    /// See [`RagConfig::validate`].
    pub fn build(self) -> Result<RagConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

mod duration_secs {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(value.as_secs_f64())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let secs = f64::deserialize(deserializer)?;
        Duration::try_from_secs_f64(secs).map_err(serde::de::Error::custom)
    }
}
