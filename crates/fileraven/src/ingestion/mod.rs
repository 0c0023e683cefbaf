//! Document ingestion: cleaning, splitting, merging and the ingest pipeline

mod chunker;
mod cleaning;
mod emergency;
mod merger;
mod pipeline;
pub mod rules;
mod splitter;
mod window;

pub use chunker::{chunk_and_merge, Chunker};
pub use cleaning::normalize_whitespace;
pub use emergency::EmergencySplitter;
pub use merger::{OverlapMerger, CHUNK_SEPARATOR};
pub use pipeline::{IngestPipeline, IngestReport};
pub use rules::{Segment, StructuralRule};
pub use splitter::SemanticSplitter;
pub use window::TokenWindowChunker;
