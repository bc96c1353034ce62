//! Deterministic providers shared by the integration tests.

#![allow(dead_code)]

use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use ragline::{Capability, Chunk, EmbeddingProvider, GenerationProvider, RagError, Result};

/// Embeds text as keyword counts over a fixed vocabulary.
pub struct KeywordEmbedder {
    vocabulary: Vec<&'static str>,
}

impl KeywordEmbedder {
    pub fn new(vocabulary: &[&'static str]) -> Self {
        Self { vocabulary: vocabulary.to_vec() }
    }
}

#[async_trait]
impl EmbeddingProvider for KeywordEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let lower = text.to_lowercase();
        Ok(self.vocabulary.iter().map(|word| lower.matches(word).count() as f32).collect())
    }

    fn dimensions(&self) -> usize {
        self.vocabulary.len()
    }

    fn name(&self) -> &str {
        "keyword"
    }
}

/// Always returns a vector of the given length, regardless of input.
pub struct ConstantEmbedder(pub Vec<f32>);

#[async_trait]
impl EmbeddingProvider for ConstantEmbedder {
    async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
        Ok(self.0.clone())
    }

    fn dimensions(&self) -> usize {
        self.0.len()
    }
}

/// Returns vectors whose length depends on the text, which an index must reject.
pub struct RaggedEmbedder;

#[async_trait]
impl EmbeddingProvider for RaggedEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        Ok(vec![1.0; text.chars().count()])
    }

    fn dimensions(&self) -> usize {
        0
    }
}

/// Drops the last vector of every batch.
pub struct ShortBatchEmbedder;

#[async_trait]
impl EmbeddingProvider for ShortBatchEmbedder {
    async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
        Ok(vec![1.0, 0.0])
    }

    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        Ok(vec![vec![1.0, 0.0]; texts.len().saturating_sub(1)])
    }

    fn dimensions(&self) -> usize {
        2
    }
}

/// Natively batching embedder that records the size of every batch it sees.
pub struct BatchingEmbedder {
    max_batch_size: usize,
    batches: Mutex<Vec<usize>>,
}

impl BatchingEmbedder {
    pub fn new(max_batch_size: usize) -> Self {
        Self { max_batch_size, batches: Mutex::new(Vec::new()) }
    }

    pub fn batches(&self) -> Vec<usize> {
        self.batches.lock().unwrap().clone()
    }
}

#[async_trait]
impl EmbeddingProvider for BatchingEmbedder {
    async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
        Ok(vec![1.0, 0.0])
    }

    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        self.batches.lock().unwrap().push(texts.len());
        Ok(vec![vec![1.0, 0.0]; texts.len()])
    }

    fn max_batch_size(&self) -> usize {
        self.max_batch_size
    }

    fn dimensions(&self) -> usize {
        2
    }
}

/// Fails every call the way a provider with a dead network would.
pub struct FailingEmbedder;

#[async_trait]
impl EmbeddingProvider for FailingEmbedder {
    async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
        Err(RagError::CapabilityUnavailable {
            capability: Capability::Embedding,
            provider: "failing".into(),
            message: "connection refused".into(),
        })
    }

    fn dimensions(&self) -> usize {
        2
    }

    fn name(&self) -> &str {
        "failing"
    }
}

/// Sleeps before answering, to exercise timeouts under paused tokio time.
pub struct SlowEmbedder(pub Duration);

#[async_trait]
impl EmbeddingProvider for SlowEmbedder {
    async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
        tokio::time::sleep(self.0).await;
        Ok(vec![1.0, 0.0])
    }

    fn dimensions(&self) -> usize {
        2
    }

    fn name(&self) -> &str {
        "slow"
    }
}

/// Records every prompt and answers with a fixed reply.
#[derive(Default)]
pub struct RecordingGenerator {
    reply: String,
    prompts: Mutex<Vec<String>>,
}

impl RecordingGenerator {
    pub fn new(reply: impl Into<String>) -> Self {
        Self { reply: reply.into(), prompts: Mutex::new(Vec::new()) }
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl GenerationProvider for RecordingGenerator {
    async fn generate(&self, prompt: &str) -> Result<String> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        Ok(self.reply.clone())
    }

    fn name(&self) -> &str {
        "recording"
    }
}

/// Fails every generation call.
pub struct FailingGenerator;

#[async_trait]
impl GenerationProvider for FailingGenerator {
    async fn generate(&self, _prompt: &str) -> Result<String> {
        Err(RagError::CapabilityUnavailable {
            capability: Capability::Generation,
            provider: "failing".into(),
            message: "401 unauthorized".into(),
        })
    }
}

/// Sleeps before answering.
pub struct SlowGenerator(pub Duration);

#[async_trait]
impl GenerationProvider for SlowGenerator {
    async fn generate(&self, _prompt: &str) -> Result<String> {
        tokio::time::sleep(self.0).await;
        Ok("late".into())
    }

    fn name(&self) -> &str {
        "slow"
    }
}

pub fn chunk(document_id: &str, index: usize, text: &str) -> Chunk {
    Chunk {
        document_id: document_id.into(),
        index,
        start: 0,
        text: text.into(),
        metadata: Default::default(),
    }
}
