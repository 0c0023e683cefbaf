//! Tokenizer adapters
//!
//! The splitters only ever see the [`Tokenizer`] trait, so the model
//! tokenizer is injected per pipeline instead of living in a global.

mod huggingface;
mod word;

use std::sync::Arc;

use crate::config::{TokenizerConfig, TokenizerKind};
use crate::error::{Error, Result};

pub use huggingface::HfTokenizer;
pub use word::WordTokenizer;

/// Token id type shared by all backends
pub type TokenId = u32;

/// Counts, encodes and decodes text into model tokens
///
/// Implementations must be deterministic, and re-encoding
/// `decode(encode(s))` must give the same number of tokens as `encode(s)`.
pub trait Tokenizer: Send + Sync {
    /// Encode text into token ids
    fn encode(&self, text: &str) -> Result<Vec<TokenId>>;

    /// Decode token ids back into text
    fn decode(&self, ids: &[TokenId]) -> Result<String>;

    /// Number of tokens in `text`
    fn token_count(&self, text: &str) -> Result<usize> {
        Ok(self.encode(text)?.len())
    }

    /// Backend name for logging
    fn name(&self) -> &str;
}

/// Build the tokenizer selected in the configuration
pub fn from_config(config: &TokenizerConfig) -> Result<Arc<dyn Tokenizer>> {
    match config.kind {
        TokenizerKind::Word => Ok(Arc::new(WordTokenizer::new())),
        TokenizerKind::HuggingFace => {
            let path = config.path.as_ref().ok_or_else(|| {
                Error::configuration("tokenizer.path is required for the huggingface tokenizer")
            })?;
            Ok(Arc::new(HfTokenizer::from_file(path)?))
        }
    }
}
