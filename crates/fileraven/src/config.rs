//! Configuration for the ingestion pipeline
//!
//! Every section carries `#[serde(default)]`, so a TOML file only needs to
//! name the values it overrides.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::providers::DistanceMetric;

/// Main pipeline configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RagConfig {
    /// Chunking configuration
    pub chunking: ChunkingConfig,
    /// Near-duplicate filter configuration
    pub dedup: DedupConfig,
    /// Embedding configuration
    pub embeddings: EmbeddingConfig,
    /// Ollama connection settings
    pub ollama: OllamaConfig,
    /// Vector database configuration
    pub vector_db: VectorDbConfig,
    /// Uploaded file storage
    pub storage: StorageConfig,
    /// Tokenizer selection
    pub tokenizer: TokenizerConfig,
}

impl RagConfig {
    /// Load configuration from a TOML file, overriding defaults
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            Error::configuration(format!(
                "Failed to read config file {}: {}",
                path.display(),
                e
            ))
        })?;
        Self::from_toml_str(&raw)
    }

    /// Parse configuration from TOML text
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let config: RagConfig = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Check every section's invariants
    pub fn validate(&self) -> Result<()> {
        self.chunking.validate()?;
        self.dedup.validate()?;
        if self.embeddings.dimensions == 0 {
            return Err(Error::configuration("embeddings.dimensions must be positive"));
        }
        if self.tokenizer.kind == TokenizerKind::HuggingFace && self.tokenizer.path.is_none() {
            return Err(Error::configuration(
                "tokenizer.path is required when tokenizer.kind = \"huggingface\"",
            ));
        }
        Ok(())
    }
}

/// How document text is cut into passages
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ChunkingStrategy {
    /// Structure-aware splitting followed by overlap merging
    #[default]
    Semantic,
    /// Fixed token windows with a stride of `chunk_size - overlap_size`
    TokenWindow,
}

/// Text chunking configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkingConfig {
    /// Maximum tokens per chunk and per merged passage
    pub chunk_size: usize,
    /// Tokens shared between consecutive token windows
    pub overlap_size: usize,
    /// Chunking strategy
    pub strategy: ChunkingStrategy,
    /// Emit code blocks, tables and lists as standalone passages
    pub isolate_blocks: bool,
    /// Collapse runs of blank lines and horizontal whitespace before splitting
    pub normalize_whitespace: bool,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: 512,
            overlap_size: 64,
            strategy: ChunkingStrategy::Semantic,
            isolate_blocks: true,
            normalize_whitespace: true,
        }
    }
}

impl ChunkingConfig {
    /// Config with the given budget and overlap, other fields defaulted
    pub fn new(chunk_size: usize, overlap_size: usize) -> Result<Self> {
        let config = Self {
            chunk_size,
            overlap_size,
            ..Self::default()
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 {
            return Err(Error::configuration("chunking.chunk_size must be positive"));
        }
        if self.overlap_size >= self.chunk_size {
            return Err(Error::configuration(format!(
                "chunking.overlap_size ({}) must be smaller than chunking.chunk_size ({})",
                self.overlap_size, self.chunk_size
            )));
        }
        Ok(())
    }
}

/// What to do with a candidate when the store cannot be queried
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DedupFailurePolicy {
    /// Abort the whole batch with the store error
    #[default]
    FailBatch,
    /// Reject the candidate and keep going
    RejectCandidate,
}

/// Near-duplicate filter configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DedupConfig {
    /// Disable to commit every passage
    pub enabled: bool,
    /// Maximum store distance at which a passage counts as already present
    pub threshold: f32,
    /// Store failure handling
    pub failure_policy: DedupFailurePolicy,
}

impl Default for DedupConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            threshold: 1e-3,
            failure_policy: DedupFailurePolicy::FailBatch,
        }
    }
}

impl DedupConfig {
    pub fn validate(&self) -> Result<()> {
        if !self.threshold.is_finite() || self.threshold < 0.0 {
            return Err(Error::configuration(format!(
                "dedup.threshold must be a non-negative number, got {}",
                self.threshold
            )));
        }
        Ok(())
    }
}

/// Embedding configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    /// Model to use
    pub model: String,
    /// Embedding dimensions (384 for MiniLM, 768 for nomic-embed-text)
    pub dimensions: usize,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            model: "nomic-embed-text".to_string(),
            dimensions: 768,
        }
    }
}

/// Ollama server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OllamaConfig {
    /// Ollama base URL
    pub base_url: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Number of retries for failed requests
    pub max_retries: u32,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:11434".to_string(),
            timeout_secs: 60,
            max_retries: 2,
        }
    }
}

/// Vector database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VectorDbConfig {
    /// Snapshot file for the local store
    pub storage_path: PathBuf,
    /// Distance the store reports to the duplicate filter
    pub distance: DistanceMetric,
}

impl Default for VectorDbConfig {
    fn default() -> Self {
        Self {
            storage_path: data_dir().join("vectors.json"),
            distance: DistanceMetric::SquaredEuclidean,
        }
    }
}

/// Per-user data directory, `<data_local_dir>/fileraven`
fn data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from("/")))
        .join("fileraven")
}

/// Uploaded file storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Root directory for stored uploads
    pub base_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            base_dir: PathBuf::from("storage"),
        }
    }
}

/// Tokenizer backend
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TokenizerKind {
    /// HuggingFace `tokenizer.json` matching the embedding model
    #[default]
    #[serde(rename = "huggingface")]
    HuggingFace,
    /// Whitespace word tokenizer for tests and quick local runs
    ///
    /// Keeps a vocabulary of every word it has seen, so it is not meant for
    /// long-running processes.
    Word,
}

/// Tokenizer configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TokenizerConfig {
    pub kind: TokenizerKind,
    /// Path to `tokenizer.json` for the HuggingFace backend
    pub path: Option<PathBuf>,
}

impl Default for TokenizerConfig {
    fn default() -> Self {
        Self {
            kind: TokenizerKind::HuggingFace,
            path: Some(data_dir().join("tokenizer.json")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = RagConfig::default();
        config.validate().unwrap();
        assert_eq!(config.chunking.chunk_size, 512);
        assert_eq!(config.chunking.overlap_size, 64);
        assert!((config.dedup.threshold - 1e-3).abs() < f32::EPSILON);
    }

    #[test]
    fn test_overlap_must_be_smaller_than_chunk() {
        let err = ChunkingConfig::new(64, 64).unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
        assert!(ChunkingConfig::new(0, 0).is_err());
        assert!(ChunkingConfig::new(228, 32).is_ok());
    }

    #[test]
    fn test_partial_toml_overrides_only_named_values() {
        let config = RagConfig::from_toml_str(
            r#"
            [chunking]
            chunk_size = 228
            overlap_size = 32

            [dedup]
            failure_policy = "reject_candidate"
            "#,
        )
        .unwrap();

        assert_eq!(config.chunking.chunk_size, 228);
        assert_eq!(config.chunking.overlap_size, 32);
        assert!(config.chunking.isolate_blocks);
        assert_eq!(config.dedup.failure_policy, DedupFailurePolicy::RejectCandidate);
        assert_eq!(config.ollama.base_url, "http://localhost:11434");
    }

    #[test]
    fn test_invalid_toml_values_rejected() {
        let err = RagConfig::from_toml_str("[chunking]\nchunk_size = 10\noverlap_size = 20\n")
            .unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));

        let err = RagConfig::from_toml_str("[dedup]\nthreshold = -1.0\n").unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));

        let mut config = RagConfig::default();
        config.tokenizer.path = None;
        assert!(matches!(config.validate(), Err(Error::Configuration(_))));
    }

    #[test]
    fn test_model_tokenizer_is_the_default() {
        let config = RagConfig::default();
        assert_eq!(config.tokenizer.kind, TokenizerKind::HuggingFace);
        assert!(config.tokenizer.path.unwrap().ends_with("fileraven/tokenizer.json"));

        let word = RagConfig::from_toml_str("[tokenizer]\nkind = \"word\"\n").unwrap();
        assert_eq!(word.tokenizer.kind, TokenizerKind::Word);
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fileraven.toml");
        std::fs::write(&path, "[chunking]\nstrategy = \"token_window\"\n").unwrap();

        let config = RagConfig::from_file(&path).unwrap();
        assert_eq!(config.chunking.strategy, ChunkingStrategy::TokenWindow);

        let missing = RagConfig::from_file(dir.path().join("missing.toml")).unwrap_err();
        assert!(matches!(missing, Error::Configuration(_)));
    }
}
