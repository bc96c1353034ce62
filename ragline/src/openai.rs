//! OpenAI embedding and chat-completion providers.
//!
//! This module is only available when the `openai` feature is enabled. Both
//! providers call the REST API directly with `reqwest` and work with any
//! OpenAI-compatible server via `with_base_url`.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::config::{DEFAULT_EMBEDDING_MODEL, DEFAULT_GENERATION_MODEL};
use crate::embedding::EmbeddingProvider;
use crate::error::{RagError, Result};
use crate::generation::GenerationProvider;

/// The default OpenAI API base URL.
pub const OPENAI_API_BASE: &str = "https://api.openai.com/v1";

/// The default dimensionality for `text-embedding-3-small`.
const DEFAULT_DIMENSIONS: usize = 1536;

/// The embeddings endpoint rejects requests with more inputs than this.
pub const MAX_EMBEDDING_INPUTS: usize = 2048;

const PROVIDER: &str = "OpenAI";

fn api_key_from_env(capability: fn(&'static str, String) -> RagError) -> Result<String> {
    std::env::var("OPENAI_API_KEY")
        .map_err(|_| capability(PROVIDER, "OPENAI_API_KEY environment variable not set".into()))
}

fn embedding_error(provider: &'static str, message: String) -> RagError {
    RagError::embedding(provider, message)
}

fn generation_error(provider: &'static str, message: String) -> RagError {
    RagError::generation(provider, message)
}

fn build_client(
    timeout: Option<Duration>,
    capability: fn(&'static str, String) -> RagError,
) -> Result<reqwest::Client> {
    let mut builder = reqwest::Client::builder();
    if let Some(timeout) = timeout {
        builder = builder.timeout(timeout);
    }
    builder.build().map_err(|e| capability(PROVIDER, format!("failed to build HTTP client: {e}")))
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(Deserialize)]
struct ErrorDetail {
    message: String,
}

/// Send a JSON request and decode a JSON response, mapping every failure
/// through `capability`.
async fn post_json<Req: Serialize, Resp: for<'de> Deserialize<'de>>(
    client: &reqwest::Client,
    url: &str,
    api_key: &str,
    body: &Req,
    capability: fn(&'static str, String) -> RagError,
) -> Result<Resp> {
    let response = client.post(url).bearer_auth(api_key).json(body).send().await.map_err(|e| {
        error!(provider = PROVIDER, %url, error = %e, "request failed");
        capability(PROVIDER, format!("request failed: {e}"))
    })?;

    if !response.status().is_success() {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        let detail =
            serde_json::from_str::<ErrorResponse>(&body).map(|e| e.error.message).unwrap_or(body);

        error!(provider = PROVIDER, %status, %url, "API error");
        return Err(capability(PROVIDER, format!("API returned {status}: {detail}")));
    }

    response.json().await.map_err(|e| {
        error!(provider = PROVIDER, error = %e, "failed to parse response");
        capability(PROVIDER, format!("failed to parse response: {e}"))
    })
}

// ── Embeddings ─────────────────────────────────────────────────────

/// An [`EmbeddingProvider`] backed by the OpenAI embeddings API.
///
/// # Configuration
///
/// - `model` defaults to `text-embedding-3-small`.
/// - `dimensions` is an optional Matryoshka dimension override.
/// - `api_key` comes from the constructor or the `OPENAI_API_KEY` environment variable.
///
/// # Example
///
/// ```rust,ignore
/// use ragline::openai::OpenAIEmbeddingProvider;
///
/// let provider = OpenAIEmbeddingProvider::new("sk-...")?;
/// let embedding = provider.embed("hello world").await?;
/// ```
pub struct OpenAIEmbeddingProvider {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
    dimensions: usize,
    /// If set, passed to the API for Matryoshka dimension truncation.
    request_dimensions: Option<usize>,
}

impl OpenAIEmbeddingProvider {
    /// Create a new provider with the given API key.
    ///
    /// Uses the default model (`text-embedding-3-small`) and dimensions (1536).
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.is_empty() {
            return Err(embedding_error(PROVIDER, "API key must not be empty".into()));
        }

        Ok(Self {
            client: build_client(None, embedding_error)?,
            api_key,
            base_url: OPENAI_API_BASE.into(),
            model: DEFAULT_EMBEDDING_MODEL.into(),
            dimensions: DEFAULT_DIMENSIONS,
            request_dimensions: None,
        })
    }

    /// Create a new provider using the `OPENAI_API_KEY` environment variable.
    pub fn from_env() -> Result<Self> {
        Self::new(api_key_from_env(embedding_error)?)
    }

    /// Set the model name (e.g. `text-embedding-3-large`).
    ///
    /// Unless [`with_dimensions`](Self::with_dimensions) was used, the reported
    /// dimensions follow the model's native size when it is a known OpenAI model.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        if self.request_dimensions.is_none() {
            if let Some(dims) = native_dimensions(&self.model) {
                self.dimensions = dims;
            }
        }
        self
    }

    /// Set the output dimensions (Matryoshka support).
    ///
    /// When set, the API returns embeddings truncated to this size.
    /// This also updates the value returned by [`dimensions()`](EmbeddingProvider::dimensions).
    pub fn with_dimensions(mut self, dims: usize) -> Self {
        self.dimensions = dims;
        self.request_dimensions = Some(dims);
        self
    }

    /// Point the provider at an OpenAI-compatible server.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Bound every HTTP request by `timeout`.
    pub fn with_timeout(mut self, timeout: Duration) -> Result<Self> {
        self.client = build_client(Some(timeout), embedding_error)?;
        Ok(self)
    }
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: Vec<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    dimensions: Option<usize>,
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    #[serde(default)]
    index: usize,
    embedding: Vec<f32>,
}

/// Native output size of the OpenAI embedding models.
fn native_dimensions(model: &str) -> Option<usize> {
    match model {
        "text-embedding-3-small" | "text-embedding-ada-002" => Some(1536),
        "text-embedding-3-large" => Some(3072),
        _ => None,
    }
}

/// Split `texts` into request-sized slices, preserving order.
fn input_batches<'a, 'b>(texts: &'a [&'b str]) -> std::slice::Chunks<'a, &'b str> {
    texts.chunks(MAX_EMBEDDING_INPUTS)
}

impl OpenAIEmbeddingProvider {
    /// One `/embeddings` request for at most [`MAX_EMBEDDING_INPUTS`] texts.
    async fn request_embeddings(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        debug!(provider = PROVIDER, batch_size = texts.len(), model = %self.model, "embedding batch");

        let request_body = EmbeddingRequest {
            model: &self.model,
            input: texts.to_vec(),
            dimensions: self.request_dimensions,
        };
        let url = format!("{}/embeddings", self.base_url);
        let mut response: EmbeddingResponse =
            post_json(&self.client, &url, &self.api_key, &request_body, embedding_error).await?;

        // The API documents `data` in input order, but carries the index anyway.
        response.data.sort_by_key(|d| d.index);
        if response.data.len() != texts.len() {
            return Err(embedding_error(
                PROVIDER,
                format!("expected {} embeddings, received {}", texts.len(), response.data.len()),
            ));
        }
        Ok(response.data.into_iter().map(|d| d.embedding).collect())
    }
}

#[async_trait]
impl EmbeddingProvider for OpenAIEmbeddingProvider {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        debug!(provider = PROVIDER, text_len = text.len(), "embedding single text");

        let results = self.embed_batch(&[text]).await?;
        results
            .into_iter()
            .next()
            .ok_or_else(|| embedding_error(PROVIDER, "API returned empty response".into()))
    }

    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        let mut embeddings = Vec::with_capacity(texts.len());
        for batch in input_batches(texts) {
            embeddings.extend(self.request_embeddings(batch).await?);
        }
        Ok(embeddings)
    }

    fn max_batch_size(&self) -> usize {
        MAX_EMBEDDING_INPUTS
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn name(&self) -> &str {
        PROVIDER
    }
}

// ── Chat completions ───────────────────────────────────────────────

/// A [`GenerationProvider`] backed by the OpenAI chat-completions API.
///
/// Sends the prompt as a single user message and returns the first choice.
///
/// # Example
///
/// ```rust,ignore
/// use ragline::openai::OpenAIGenerationProvider;
///
/// let llm = OpenAIGenerationProvider::from_env()?.with_model("gpt-4o-mini");
/// let text = llm.generate("Say hello").await?;
/// ```
pub struct OpenAIGenerationProvider {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
    temperature: Option<f32>,
}

impl OpenAIGenerationProvider {
    /// Create a new provider with the given API key and the default model.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.is_empty() {
            return Err(generation_error(PROVIDER, "API key must not be empty".into()));
        }

        Ok(Self {
            client: build_client(None, generation_error)?,
            api_key,
            base_url: OPENAI_API_BASE.into(),
            model: DEFAULT_GENERATION_MODEL.into(),
            temperature: None,
        })
    }

    /// Create a new provider using the `OPENAI_API_KEY` environment variable.
    pub fn from_env() -> Result<Self> {
        Self::new(api_key_from_env(generation_error)?)
    }

    /// Set the model name (e.g. `gpt-4o-mini`).
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set the sampling temperature.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Point the provider at an OpenAI-compatible server.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Bound every HTTP request by `timeout`.
    pub fn with_timeout(mut self, timeout: Duration) -> Result<Self> {
        self.client = build_client(Some(timeout), generation_error)?;
        Ok(self)
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 1],
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

#[async_trait]
impl GenerationProvider for OpenAIGenerationProvider {
    async fn generate(&self, prompt: &str) -> Result<String> {
        debug!(provider = PROVIDER, model = %self.model, prompt_len = prompt.len(), "chat completion");

        let request_body = ChatRequest {
            model: &self.model,
            messages: [ChatMessage { role: "user", content: prompt }],
            temperature: self.temperature,
        };
        let url = format!("{}/chat/completions", self.base_url);
        let response: ChatResponse =
            post_json(&self.client, &url, &self.api_key, &request_body, generation_error).await?;

        response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| generation_error(PROVIDER, "API returned no completion".into()))
    }

    fn name(&self) -> &str {
        PROVIDER
    }
}
