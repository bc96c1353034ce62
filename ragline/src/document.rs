//! Data types for documents, chunks, retrieval results, and answers.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{RagError, Result};

/// A source document containing text content and metadata.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Document {
    /// Source identifier, typically the path the text was loaded from.
    pub id: String,
    /// The text content of the document.
    pub text: String,
    /// Key-value metadata copied onto every chunk of the document.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub metadata: HashMap<String, String>,
}

impl Document {
    /// Create a document with no metadata.
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self { id: id.into(), text: text.into(), metadata: HashMap::new() }
    }

    /// Attach a metadata entry.
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Load a UTF-8 text file. The document id is the path as given.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Io`] if the file cannot be read.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|source| RagError::Io { path: path.to_path_buf(), source })?;
        Ok(Self::new(path.display().to_string(), text)
            .with_metadata("source", path.display().to_string()))
    }

    /// Number of characters in the document text.
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }
}

/// A contiguous span of a [`Document`]'s text.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Chunk {
    /// The ID of the parent [`Document`].
    pub document_id: String,
    /// Position of this chunk within its document, starting at zero.
    pub index: usize,
    /// Character offset of the chunk's first character within the document.
    pub start: usize,
    /// The text content of the chunk. Never empty.
    pub text: String,
    /// Metadata inherited from the parent document.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub metadata: HashMap<String, String>,
}

impl Chunk {
    /// A stable identifier of the form `{document_id}_{index}`.
    pub fn id(&self) -> String {
        format!("{}_{}", self.document_id, self.index)
    }
}

/// A retrieved [`Chunk`] paired with its similarity score.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScoredChunk {
    /// The retrieved chunk.
    pub chunk: Chunk,
    /// Cosine similarity to the query (higher is more similar).
    pub score: f32,
}

/// Retrieved chunks, most similar first.
pub type RetrievalResult = Vec<ScoredChunk>;

/// A generated answer together with the evidence it was conditioned on.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Answer {
    /// The generated text.
    pub text: String,
    /// The chunks supplied to generation, in retrieval order.
    pub evidence: Vec<Chunk>,
}
