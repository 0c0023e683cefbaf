//! Chunk, passage and store entry types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Structural origin of an atomic chunk
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ChunkKind {
    /// Prose, headers and anything not inside a block
    #[default]
    Text,
    /// Fenced code block
    CodeBlock,
    /// Markdown table
    Table,
    /// Bullet or numbered list
    List,
}

impl ChunkKind {
    /// Code blocks, tables and lists are kept apart from surrounding prose
    pub fn is_block(&self) -> bool {
        !matches!(self, Self::Text)
    }
}

/// Smallest unit produced by the splitters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AtomicChunk {
    /// Trimmed chunk text
    pub text: String,
    /// Token count under the pipeline tokenizer
    pub token_count: usize,
    /// Structural origin
    pub kind: ChunkKind,
}

impl AtomicChunk {
    pub fn new(text: impl Into<String>, token_count: usize, kind: ChunkKind) -> Self {
        Self {
            text: text.into(),
            token_count,
            kind,
        }
    }
}

/// Final retrieval unit: one or more atomic chunks joined together
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Passage {
    /// Joined chunk text
    pub text: String,
    /// Sum of member chunk token counts
    pub token_count: usize,
    /// Identifier of the originating document
    pub source: String,
    /// Number of atomic chunks in this passage
    pub chunk_count: usize,
    /// First chunk repeats the last chunk of the previous passage
    pub starts_with_overlap: bool,
}

/// Committed passage with its embedding
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreEntry {
    /// Generated unique key
    pub id: Uuid,
    /// Passage text
    pub text: String,
    /// Embedding vector
    pub embedding: Vec<f32>,
    /// Identifier of the originating document
    pub source: String,
    /// Commit timestamp
    pub created_at: DateTime<Utc>,
}

impl StoreEntry {
    /// Create a new entry with a fresh key
    pub fn new(text: String, embedding: Vec<f32>, source: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            text,
            embedding,
            source,
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_kinds() {
        assert!(!ChunkKind::Text.is_block());
        assert!(ChunkKind::CodeBlock.is_block());
        assert!(ChunkKind::Table.is_block());
        assert!(ChunkKind::List.is_block());
    }

    #[test]
    fn test_store_entries_get_distinct_keys() {
        let a = StoreEntry::new("a".into(), vec![0.0], "doc".into());
        let b = StoreEntry::new("a".into(), vec![0.0], "doc".into());
        assert_ne!(a.id, b.id);
    }
}
