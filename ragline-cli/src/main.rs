//! `ragline`: load text files, index them, and answer a question from them.
//!
//! Requires `OPENAI_API_KEY` (read from the environment or a `.env` file).
//!
//! Run: `ragline --question "What is FAISS?" data/sample.txt`

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::Parser;
use ragline::openai::{OpenAIEmbeddingProvider, OpenAIGenerationProvider};
use ragline::{Answer, Document, RagConfig, RagPipeline, SeparatorChunker};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "ragline")]
#[command(about = "Answer a question from a set of text files", long_about = None)]
#[command(version)]
struct Cli {
    /// Text files making up the corpus.
    #[arg(default_value = "data/sample.txt")]
    files: Vec<PathBuf>,

    /// The question to answer.
    #[arg(short, long, default_value = "What is FAISS?")]
    question: String,

    /// JSON file with a `RagConfig`; flags below override its fields.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Chunk size in characters.
    #[arg(long)]
    chunk_size: Option<usize>,

    /// Overlap between consecutive chunks in characters.
    #[arg(long)]
    chunk_overlap: Option<usize>,

    /// Number of passages to retrieve.
    #[arg(short = 'k', long)]
    top_k: Option<usize>,

    /// Embedding model identifier.
    #[arg(long)]
    embedding_model: Option<String>,

    /// Generation model identifier.
    #[arg(long)]
    generation_model: Option<String>,

    /// Timeout for each embedding or generation request, in seconds.
    #[arg(long)]
    timeout_secs: Option<u64>,

    /// Split on blank lines before packing chunks, instead of fixed windows.
    #[arg(long)]
    paragraphs: bool,

    /// Base URL of an OpenAI-compatible API.
    #[arg(long, env = "OPENAI_BASE_URL")]
    base_url: Option<String>,

    /// Print the answer and its evidence as JSON.
    #[arg(long)]
    json: bool,
}

impl Cli {
    fn rag_config(&self) -> Result<RagConfig> {
        let mut builder = RagConfig::builder();
        if let Some(path) = &self.config {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read config {}", path.display()))?;
            let base: RagConfig = serde_json::from_str(&raw)
                .with_context(|| format!("failed to parse config {}", path.display()))?;
            builder = builder
                .chunk_size(base.chunk_size)
                .chunk_overlap(base.chunk_overlap)
                .top_k(base.top_k)
                .embedding_model(base.embedding_model)
                .generation_model(base.generation_model)
                .request_timeout(base.request_timeout);
        }
        if let Some(size) = self.chunk_size {
            builder = builder.chunk_size(size);
        }
        if let Some(overlap) = self.chunk_overlap {
            builder = builder.chunk_overlap(overlap);
        }
        if let Some(k) = self.top_k {
            builder = builder.top_k(k);
        }
        if let Some(model) = &self.embedding_model {
            builder = builder.embedding_model(model);
        }
        if let Some(model) = &self.generation_model {
            builder = builder.generation_model(model);
        }
        if let Some(secs) = self.timeout_secs {
            builder = builder.request_timeout(Duration::from_secs(secs));
        }
        Ok(builder.build()?)
    }
}

fn load_documents(paths: &[PathBuf]) -> Result<Vec<Document>> {
    if paths.is_empty() {
        bail!("no input files given");
    }
    paths
        .iter()
        .map(|path| {
            Document::from_path(path).with_context(|| format!("failed to load {}", path.display()))
        })
        .collect()
}

fn print_answer(question: &str, answer: &Answer) {
    println!("Question: {question}");
    println!("Answer: {}", answer.text.trim());
    println!("Sources:");
    for chunk in &answer.evidence {
        println!("- {}", chunk.text);
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();

    let cli = Cli::parse();
    let config = cli.rag_config()?;
    let documents = load_documents(&cli.files)?;
    info!(documents = documents.len(), ?config, "loaded corpus");

    let mut embedder = OpenAIEmbeddingProvider::from_env()?
        .with_model(&config.embedding_model)
        .with_timeout(config.request_timeout)?;
    let mut generator = OpenAIGenerationProvider::from_env()?
        .with_model(&config.generation_model)
        .with_timeout(config.request_timeout)?;
    if let Some(base_url) = &cli.base_url {
        embedder = embedder.with_base_url(base_url);
        generator = generator.with_base_url(base_url);
    }

    let mut builder = RagPipeline::builder()
        .config(config.clone())
        .embedding_provider(Arc::new(embedder))
        .generation_provider(Arc::new(generator));
    if cli.paragraphs {
        builder =
            builder.chunker(Arc::new(SeparatorChunker::new(config.chunk_size, config.chunk_overlap)?));
    }

    let engine = builder.build()?.index(&documents).await.context("failed to index corpus")?;
    let answer = engine.ask(&cli.question).await.context("failed to answer question")?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&answer)?);
    } else {
        print_answer(&cli.question, &answer);
    }
    Ok(())
}
