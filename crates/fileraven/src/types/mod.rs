//! Core types for the pipeline

pub mod passage;

pub use passage::{AtomicChunk, ChunkKind, Passage, StoreEntry};
