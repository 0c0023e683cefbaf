//! Vector store provider trait for duplicate checks, commits and search

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::Result;
use crate::types::StoreEntry;

/// Distance a store reports between two embeddings; lower is closer
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DistanceMetric {
    /// Sum of squared component differences
    #[default]
    SquaredEuclidean,
    /// `1 - cosine similarity`
    Cosine,
}

impl DistanceMetric {
    /// Distance between two equal-length vectors
    pub fn distance(&self, a: &[f32], b: &[f32]) -> f32 {
        match self {
            Self::SquaredEuclidean => a
                .iter()
                .zip(b)
                .map(|(x, y)| (x - y) * (x - y))
                .sum(),
            Self::Cosine => {
                let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
                let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
                let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
                if norm_a == 0.0 || norm_b == 0.0 {
                    return 1.0;
                }
                1.0 - dot / (norm_a * norm_b)
            }
        }
    }
}

/// Nearest committed entry to a query embedding
#[derive(Debug, Clone, PartialEq)]
pub struct Neighbor {
    pub id: Uuid,
    /// Distance under the store's metric
    pub distance: f32,
    pub source: String,
}

/// Search result from the vector store
#[derive(Debug, Clone, Serialize)]
pub struct SearchHit {
    pub id: Uuid,
    /// Passage text
    pub text: String,
    pub source: String,
    /// Distance under the store's metric, ascending across results
    pub distance: f32,
}

/// Committed passages, queried by embedding distance
///
/// A failed [`commit`](Self::commit) must leave nothing behind: later
/// queries see either the whole batch or none of it.
#[async_trait]
pub trait VectorStoreProvider: Send + Sync {
    /// Single nearest committed entry, `None` when the store is empty
    async fn query_nearest(&self, embedding: &[f32]) -> Result<Option<Neighbor>>;

    /// Commit entries and return their keys in order
    async fn commit(&self, entries: &[StoreEntry]) -> Result<Vec<Uuid>>;

    /// Closest `top_k` entries, nearest first
    async fn search(&self, embedding: &[f32], top_k: usize) -> Result<Vec<SearchHit>>;

    /// Number of committed entries
    async fn len(&self) -> Result<usize>;

    async fn is_empty(&self) -> Result<bool> {
        Ok(self.len().await? == 0)
    }

    async fn health_check(&self) -> Result<bool>;

    fn name(&self) -> &str;
}
