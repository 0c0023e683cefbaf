//! FileRaven CLI
//!
//! ```bash
//! fileraven chunk notes.md
//! fileraven ingest report.md
//! fileraven search "regional revenue" -n 5
//! ```

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use fileraven::providers::{EmbeddingProvider, LocalVectorStore, OllamaEmbedder};
use fileraven::storage::FileClerk;
use fileraven::{tokenizer, Chunker, IngestPipeline, RagConfig, Tokenizer};

/// Chunk, deduplicate and index converted documents
#[derive(Parser)]
#[command(name = "fileraven", version, about)]
struct Cli {
    /// TOML configuration file (defaults apply to anything it omits)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print a document's passages as JSON
    Chunk {
        /// Markdown or plain text file
        file: PathBuf,
    },
    /// Embed a document's passages, commit the new ones and keep the file
    Ingest {
        /// Markdown or plain text file
        file: PathBuf,
    },
    /// Print the passages nearest to a query
    Search {
        query: String,

        /// Maximum number of results to return
        #[arg(short = 'n', long, default_value = "3")]
        limit: usize,

        /// Output results as JSON
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs on stderr, results on stdout
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "fileraven=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = match &cli.config {
        Some(path) => RagConfig::from_file(path)
            .with_context(|| format!("Failed to load {}", path.display()))?,
        None => RagConfig::default(),
    };

    match cli.command {
        Command::Chunk { file } => {
            let text = read_text(&file).await?;
            let chunker = Chunker::new(config.chunking.clone(), load_tokenizer(&config)?)?;

            let passages = chunker.chunk_and_merge(&text, &file.to_string_lossy())?;
            println!("{}", serde_json::to_string_pretty(&passages)?);
        }
        Command::Ingest { file } => {
            let text = read_text(&file).await?;
            let filename = file
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_else(|| "upload".to_string());

            let pipeline = build_pipeline(&config).await?;
            let clerk = FileClerk::from_config(&config.storage);
            let stored = clerk.reserve(&filename);

            let report = pipeline.ingest(&text, &stored.source()).await?;
            clerk
                .save(&stored, text.as_bytes())
                .await
                .context("Failed to store upload")?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Command::Search { query, limit, json } => {
            let pipeline = build_pipeline(&config).await?;
            let hits = pipeline.search(&query, limit).await?;

            if json {
                println!("{}", serde_json::to_string_pretty(&hits)?);
            } else if hits.is_empty() {
                println!("No passages found for \"{}\"", query);
            } else {
                for (rank, hit) in hits.iter().enumerate() {
                    println!("{}. {} (distance {:.4})", rank + 1, hit.source, hit.distance);
                    println!("{}\n", hit.text);
                }
            }
        }
    }

    Ok(())
}

async fn read_text(path: &Path) -> Result<String> {
    let data = tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    String::from_utf8(data)
        .with_context(|| format!("{} is not UTF-8 text; convert it to markdown first", path.display()))
}

fn load_tokenizer(config: &RagConfig) -> Result<Arc<dyn Tokenizer>> {
    tokenizer::from_config(&config.tokenizer).context(
        "Failed to load tokenizer; set tokenizer.path to the embedding model's \
         tokenizer.json, or tokenizer.kind = \"word\" for a quick local run",
    )
}

async fn build_pipeline(config: &RagConfig) -> Result<IngestPipeline> {
    let chunker = Chunker::new(config.chunking.clone(), load_tokenizer(config)?)?;

    let embedder = OllamaEmbedder::new(&config.ollama, &config.embeddings)?;
    if !embedder.health_check().await? {
        tracing::warn!("Ollama not available at {}", config.ollama.base_url);
        tracing::warn!("  Start it with: ollama serve");
        tracing::warn!("  Pull the model: ollama pull {}", config.embeddings.model);
    }

    let store = LocalVectorStore::from_config(config).with_context(|| {
        format!(
            "Failed to open vector store at {}",
            config.vector_db.storage_path.display()
        )
    })?;

    Ok(IngestPipeline::new(
        chunker,
        Arc::new(embedder),
        Arc::new(store),
        &config.dedup,
    )?)
}
