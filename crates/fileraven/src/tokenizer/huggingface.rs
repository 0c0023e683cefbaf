//! HuggingFace tokenizer backend
//!
//! Truncation and padding from `tokenizer.json` are switched off on load.
//! Counts must cover the whole text or oversized pieces would look like they
//! fit.

use std::path::Path;

use crate::error::{Error, Result};

use super::{TokenId, Tokenizer};

/// Tokenizer loaded from a HuggingFace `tokenizer.json`
pub struct HfTokenizer {
    inner: tokenizers::Tokenizer,
}

impl HfTokenizer {
    /// Load from a `tokenizer.json` file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        tracing::info!("Loading tokenizer from {}", path.display());

        let inner = tokenizers::Tokenizer::from_file(path).map_err(|e| {
            Error::external(
                "tokenizer",
                format!("Failed to load {}: {}", path.display(), e),
            )
        })?;

        Self::new(inner)
    }

    /// Wrap an already constructed tokenizer
    pub fn new(mut inner: tokenizers::Tokenizer) -> Result<Self> {
        if inner.get_truncation().is_some() {
            tracing::debug!("Disabling tokenizer truncation");
        }
        inner.with_truncation(None).map_err(|e| {
            Error::external("tokenizer", format!("Failed to disable truncation: {}", e))
        })?;
        inner.with_padding(None);

        Ok(Self { inner })
    }
}

impl Tokenizer for HfTokenizer {
    fn encode(&self, text: &str) -> Result<Vec<TokenId>> {
        let encoding = self
            .inner
            .encode(text, false)
            .map_err(|e| Error::external("tokenizer", format!("Tokenization failed: {}", e)))?;
        Ok(encoding.get_ids().to_vec())
    }

    fn decode(&self, ids: &[TokenId]) -> Result<String> {
        self.inner
            .decode(ids, true)
            .map_err(|e| Error::external("tokenizer", format!("Decoding failed: {}", e)))
    }

    fn name(&self) -> &str {
        "huggingface"
    }
}
