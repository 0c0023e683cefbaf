//! Fallback splitting for text with no usable structural boundary

use once_cell::sync::Lazy;
use regex::Regex;
use std::sync::Arc;

use crate::error::Result;
use crate::tokenizer::Tokenizer;
use crate::types::{AtomicChunk, ChunkKind};

static SENTENCE_END: Lazy<Regex> = Lazy::new(|| Regex::new(r"[.!?]\s+").unwrap());

/// Packs sentences up to the budget and cuts oversized sentences into fixed
/// token slices
///
/// Every emitted chunk has at most `chunk_size` tokens. Whitespace inside a
/// sliced sentence is whatever the tokenizer's decode produces.
pub struct EmergencySplitter {
    tokenizer: Arc<dyn Tokenizer>,
    chunk_size: usize,
}

impl EmergencySplitter {
    pub fn new(tokenizer: Arc<dyn Tokenizer>, chunk_size: usize) -> Self {
        Self {
            tokenizer,
            chunk_size,
        }
    }

    pub fn split(&self, text: &str, kind: ChunkKind) -> Result<Vec<AtomicChunk>> {
        let mut chunks = Vec::new();
        let mut pending: Vec<&str> = Vec::new();
        let mut pending_tokens = 0;

        for sentence in sentences(text) {
            let tokens = self.tokenizer.token_count(sentence)?;

            if tokens > self.chunk_size {
                flush(&mut chunks, &mut pending, &mut pending_tokens, kind);
                self.slice_tokens(sentence, kind, &mut chunks)?;
                continue;
            }

            if pending_tokens + tokens > self.chunk_size && !pending.is_empty() {
                flush(&mut chunks, &mut pending, &mut pending_tokens, kind);
            }

            pending.push(sentence);
            pending_tokens += tokens;
        }
        flush(&mut chunks, &mut pending, &mut pending_tokens, kind);

        tracing::trace!(chunks = chunks.len(), "Emergency split");
        Ok(chunks)
    }

    /// Cut a sentence's token stream into `chunk_size` slices
    fn slice_tokens(&self, sentence: &str, kind: ChunkKind, out: &mut Vec<AtomicChunk>) -> Result<()> {
        let ids = self.tokenizer.encode(sentence)?;
        for window in ids.chunks(self.chunk_size) {
            let decoded = self.tokenizer.decode(window)?;
            let decoded = decoded.trim();
            if !decoded.is_empty() {
                out.push(AtomicChunk::new(decoded, window.len(), kind));
            }
        }
        Ok(())
    }
}

fn flush(out: &mut Vec<AtomicChunk>, pending: &mut Vec<&str>, tokens: &mut usize, kind: ChunkKind) {
    if pending.is_empty() {
        return;
    }
    out.push(AtomicChunk::new(pending.join(" "), *tokens, kind));
    pending.clear();
    *tokens = 0;
}

fn sentences(text: &str) -> Vec<&str> {
    let mut out = Vec::new();
    let mut prev = 0;
    for m in SENTENCE_END.find_iter(text) {
        out.push(&text[prev..m.start() + 1]);
        prev = m.end();
    }
    out.push(&text[prev..]);
    out.into_iter()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}
