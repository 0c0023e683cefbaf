//! Provider abstractions for embeddings and vector storage
//!
//! The pipeline only sees the traits, so the Ollama embedder and the local
//! store can be swapped for other backends or test fakes.

pub mod embedding;
pub mod local;
pub mod ollama;
pub mod vector_store;

pub use embedding::EmbeddingProvider;
pub use local::LocalVectorStore;
pub use ollama::OllamaEmbedder;
pub use vector_store::{DistanceMetric, Neighbor, SearchHit, VectorStoreProvider};
