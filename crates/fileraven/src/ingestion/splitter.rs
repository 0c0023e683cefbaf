//! Recursive structure-aware splitting
//!
//! Text over budget is cut by the first [`StructuralRule`] that produces
//! more than one non-blank piece, and every piece is split again. Text that
//! no rule can cut goes to the [`EmergencySplitter`].

use std::sync::Arc;

use crate::error::Result;
use crate::tokenizer::Tokenizer;
use crate::types::{AtomicChunk, ChunkKind};

use super::emergency::EmergencySplitter;
use super::rules::StructuralRule;

/// Splits text into the smallest structure-respecting chunks within budget
pub struct SemanticSplitter {
    tokenizer: Arc<dyn Tokenizer>,
    chunk_size: usize,
    emergency: EmergencySplitter,
}

impl SemanticSplitter {
    pub fn new(tokenizer: Arc<dyn Tokenizer>, chunk_size: usize) -> Self {
        Self {
            emergency: EmergencySplitter::new(Arc::clone(&tokenizer), chunk_size),
            tokenizer,
            chunk_size,
        }
    }

    /// Split text into atomic chunks in document order
    pub fn split(&self, text: &str) -> Result<Vec<AtomicChunk>> {
        let mut chunks = Vec::new();
        self.split_into(text, ChunkKind::Text, &mut chunks)?;
        Ok(chunks)
    }

    fn split_into(&self, text: &str, kind: ChunkKind, out: &mut Vec<AtomicChunk>) -> Result<()> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(());
        }

        let tokens = self.tokenizer.token_count(text)?;
        if tokens <= self.chunk_size {
            out.push(AtomicChunk::new(text, tokens, kind));
            return Ok(());
        }

        for rule in StructuralRule::PRIORITY {
            let pieces: Vec<_> = rule
                .segments(text)
                .into_iter()
                .filter(|segment| !segment.is_blank())
                .collect();
            if pieces.len() < 2 {
                continue;
            }

            tracing::trace!(rule = rule.name(), pieces = pieces.len(), tokens, "Structural split");
            for piece in pieces {
                self.split_into(piece.text, piece.block.unwrap_or(kind), out)?;
            }
            return Ok(());
        }

        out.extend(self.emergency.split(text, kind)?);
        Ok(())
    }
}
