//! Generation provider trait for turning a prompt into text.

use async_trait::async_trait;

use crate::error::Result;

/// A language model that answers a single prompt with a single string.
///
/// The pipeline treats every call as one blocking request; streaming, tool
/// calls and chat history are outside its contract. Failures should be
/// reported as [`RagError::CapabilityUnavailable`](crate::RagError::CapabilityUnavailable).
#[async_trait]
pub trait GenerationProvider: Send + Sync {
    /// Generate a completion for `prompt`.
    async fn generate(&self, prompt: &str) -> Result<String>;

    /// A short name used in logs and error messages.
    fn name(&self) -> &str {
        "generation"
    }
}
