//! Error types for the `ragline` crate.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// The external capability a [`RagError::CapabilityUnavailable`] refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    /// Text-to-vector embedding.
    Embedding,
    /// Prompt-to-text generation.
    Generation,
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Embedding => f.write_str("embedding"),
            Self::Generation => f.write_str("generation"),
        }
    }
}

/// Errors that can occur in RAG operations.
#[derive(Debug, Error)]
pub enum RagError {
    /// A caller-supplied parameter is out of range (chunk size, overlap, k, template).
    ///
    /// These are caller errors and are never retried.
    #[error("Invalid configuration: {message}")]
    InvalidConfig {
        /// What was wrong, including the offending value.
        message: String,
    },

    /// Two vectors that must share a dimensionality do not.
    #[error("Dimension mismatch for {context}: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// The dimensionality the index (or first entry) established.
        expected: usize,
        /// The dimensionality that was actually supplied.
        actual: usize,
        /// Which vector disagreed, e.g. a chunk or the query.
        context: String,
    },

    /// An embedding or generation call failed or timed out.
    ///
    /// The core never retries these; retry policy belongs to the caller.
    #[error("{capability} capability unavailable ({provider}): {message}")]
    CapabilityUnavailable {
        /// Which capability failed.
        capability: Capability,
        /// The provider that produced the error.
        provider: String,
        /// A description of the failure.
        message: String,
    },

    /// A document could not be read from disk.
    #[error("Failed to read document at {}: {source}", path.display())]
    Io {
        /// The path that was being read.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

impl RagError {
    pub(crate) fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig { message: message.into() }
    }

    pub(crate) fn embedding(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::CapabilityUnavailable {
            capability: Capability::Embedding,
            provider: provider.into(),
            message: message.into(),
        }
    }

    pub(crate) fn generation(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::CapabilityUnavailable {
            capability: Capability::Generation,
            provider: provider.into(),
            message: message.into(),
        }
    }
}

/// A convenience result type for RAG operations.
pub type Result<T> = std::result::Result<T, RagError>;
