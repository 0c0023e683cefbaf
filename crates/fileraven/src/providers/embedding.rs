//! Seam between the pipeline and whatever model turns passages into vectors

use async_trait::async_trait;

use crate::error::Result;

/// Turns text into fixed-length vectors
///
/// Every vector a provider returns has exactly [`dimensions`](Self::dimensions)
/// components. [`OllamaEmbedder`](super::OllamaEmbedder) is the production
/// backend.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// One vector per input, in input order
    ///
    /// Stops at the first failure.
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let mut embeddings = Vec::with_capacity(texts.len());
        for text in texts {
            embeddings.push(self.embed(text).await?);
        }
        Ok(embeddings)
    }

    /// Length of every returned vector
    fn dimensions(&self) -> usize;

    /// `Ok(false)` when the backend is down; `Err` only for local faults
    async fn health_check(&self) -> Result<bool>;

    fn name(&self) -> &str;
}
