//! Whitespace word tokenizer
//!
//! One token per whitespace-separated word. Ids come from a vocabulary that
//! grows as new words are seen, so decoding any id this tokenizer produced is
//! lossless up to whitespace (words are re-joined with single spaces).
//!
//! The vocabulary is never pruned. Use it for tests and one-shot CLI runs;
//! long-lived pipelines should load the embedding model's tokenizer through
//! [`HfTokenizer`](super::HfTokenizer).

use parking_lot::RwLock;
use std::collections::HashMap;

use crate::error::{Error, Result};

use super::{TokenId, Tokenizer};

#[derive(Default)]
struct Vocabulary {
    ids: HashMap<String, TokenId>,
    words: Vec<String>,
}

/// Deterministic word-level tokenizer
#[derive(Default)]
pub struct WordTokenizer {
    vocab: RwLock<Vocabulary>,
}

impl WordTokenizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of distinct words seen so far
    pub fn vocab_size(&self) -> usize {
        self.vocab.read().words.len()
    }

    fn intern(&self, word: &str) -> TokenId {
        if let Some(id) = self.vocab.read().ids.get(word) {
            return *id;
        }

        let mut vocab = self.vocab.write();
        if let Some(id) = vocab.ids.get(word) {
            return *id;
        }
        let id = vocab.words.len() as TokenId;
        vocab.words.push(word.to_string());
        vocab.ids.insert(word.to_string(), id);
        id
    }
}

impl Tokenizer for WordTokenizer {
    fn encode(&self, text: &str) -> Result<Vec<TokenId>> {
        Ok(text.split_whitespace().map(|w| self.intern(w)).collect())
    }

    fn decode(&self, ids: &[TokenId]) -> Result<String> {
        let vocab = self.vocab.read();
        let mut words = Vec::with_capacity(ids.len());
        for id in ids {
            let word = vocab.words.get(*id as usize).ok_or_else(|| {
                Error::external("tokenizer", format!("unknown token id {}", id))
            })?;
            words.push(word.as_str());
        }
        Ok(words.join(" "))
    }

    fn token_count(&self, text: &str) -> Result<usize> {
        Ok(text.split_whitespace().count())
    }

    fn name(&self) -> &str {
        "word"
    }
}
