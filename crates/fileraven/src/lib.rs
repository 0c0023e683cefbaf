//! fileraven: ingestion core for document question answering
//!
//! Converted document text is cut into retrieval passages by a
//! structure-aware splitter (headers, code fences, tables, lists, paragraphs,
//! sentences, then token slices), merged with one-chunk overlap, embedded,
//! and filtered against near-duplicates already in the vector store before
//! it is committed.
//!
//! ```no_run
//! use std::sync::Arc;
//! use fileraven::{chunk_and_merge, ChunkingConfig, WordTokenizer};
//!
//! let config = ChunkingConfig::new(228, 32)?;
//! let passages = chunk_and_merge("# Notes\n\nSome text.", &config, Arc::new(WordTokenizer::new()))?;
//! assert_eq!(passages.len(), 1);
//! # Ok::<(), fileraven::Error>(())
//! ```

pub mod config;
pub mod dedup;
pub mod error;
pub mod ingestion;
pub mod providers;
pub mod storage;
pub mod tokenizer;
pub mod types;

#[cfg(test)]
mod test_utils;

pub use config::{ChunkingConfig, ChunkingStrategy, DedupConfig, DedupFailurePolicy, RagConfig};
pub use dedup::{filter_duplicates, Candidate, DuplicateFilter, FilterOutcome};
pub use error::{Error, Result};
pub use ingestion::{chunk_and_merge, Chunker, IngestPipeline, IngestReport};
pub use tokenizer::{HfTokenizer, Tokenizer, WordTokenizer};
pub use types::{AtomicChunk, ChunkKind, Passage, StoreEntry};
