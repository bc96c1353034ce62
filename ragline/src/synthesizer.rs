//! Answer synthesis: one prompt from the question and the retrieved chunks,
//! one call to the language model.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, error, info};

use crate::document::{Answer, RetrievalResult};
use crate::error::{RagError, Result};
use crate::generation::GenerationProvider;

/// A prompt with `{context}` and `{question}` placeholders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTemplate {
    template: String,
}

impl PromptTemplate {
    /// Placeholder replaced by the retrieved chunk texts.
    pub const CONTEXT: &'static str = "{context}";
    /// Placeholder replaced by the question.
    pub const QUESTION: &'static str = "{question}";

    /// Create a template.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::InvalidConfig`] if either placeholder is missing.
    pub fn new(template: impl Into<String>) -> Result<Self> {
        let template = template.into();
        for placeholder in [Self::CONTEXT, Self::QUESTION] {
            if !template.contains(placeholder) {
                return Err(RagError::invalid_config(format!(
                    "prompt template is missing the {placeholder} placeholder"
                )));
            }
        }
        Ok(Self { template })
    }

    /// Fill in the placeholders.
    ///
    /// The question is substituted before the context so that placeholder-like
    /// text inside the retrieved chunks is left alone.
    pub fn render(&self, context: &str, question: &str) -> String {
        let (head, tail) = self
            .template
            .split_once(Self::CONTEXT)
            .unwrap_or((self.template.as_str(), ""));
        let head = head.replace(Self::QUESTION, question);
        let tail = tail.replace(Self::QUESTION, question);
        format!("{head}{context}{tail}")
    }
}

impl Default for PromptTemplate {
    fn default() -> Self {
        Self {
            template: "Use the following pieces of context to answer the question at the end. \
                       If you don't know the answer, just say that you don't know, don't try to \
                       make up an answer.\n\n{context}\n\nQuestion: {question}\nHelpful Answer:"
                .to_string(),
        }
    }
}

/// Turns a question plus retrieved chunks into an [`Answer`].
///
/// The evidence of the returned answer is exactly the chunks it was given, in
/// the same order. An empty retrieval result is not an error: the model is
/// asked anyway, with an empty context.
pub struct AnswerSynthesizer {
    generator: Arc<dyn GenerationProvider>,
    template: PromptTemplate,
    timeout: Duration,
}

impl AnswerSynthesizer {
    /// Timeout applied to the generation call unless overridden.
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

    /// Create a synthesizer backed by `generator` with the default template.
    pub fn new(generator: Arc<dyn GenerationProvider>) -> Self {
        Self { generator, template: PromptTemplate::default(), timeout: Self::DEFAULT_TIMEOUT }
    }

    /// Use a custom prompt template.
    pub fn with_template(mut self, template: PromptTemplate) -> Self {
        self.template = template;
        self
    }

    /// Set the upper bound on the generation call.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Build the prompt sent to the model.
    ///
    /// Chunk texts appear in the given order, separated by blank lines.
    pub fn build_prompt(&self, question: &str, retrieval: &RetrievalResult) -> String {
        let context =
            retrieval.iter().map(|scored| scored.chunk.text.as_str()).collect::<Vec<_>>().join("\n\n");
        self.template.render(&context, question)
    }

    /// Generate an answer to `question` grounded in `retrieval`.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::CapabilityUnavailable`] if generation fails or times out.
    pub async fn answer(&self, question: &str, retrieval: RetrievalResult) -> Result<Answer> {
        let prompt = self.build_prompt(question, &retrieval);
        let provider = self.generator.name().to_string();
        debug!(provider = %provider, prompt_len = prompt.len(), evidence = retrieval.len(), "generating answer");

        let text = match tokio::time::timeout(self.timeout, self.generator.generate(&prompt)).await {
            Ok(result) => result.map_err(|e| {
                error!(provider = %provider, error = %e, "generation failed");
                e
            })?,
            Err(_) => {
                error!(provider = %provider, timeout = ?self.timeout, "generation timed out");
                return Err(RagError::generation(
                    provider,
                    format!("generation timed out after {:?}", self.timeout),
                ));
            }
        };

        let evidence = retrieval.into_iter().map(|scored| scored.chunk).collect::<Vec<_>>();
        info!(answer_len = text.len(), evidence = evidence.len(), "answer synthesized");
        Ok(Answer { text, evidence })
    }
}
