//! Deterministic fakes and fixtures shared by the unit tests

use async_trait::async_trait;
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::providers::{EmbeddingProvider, Neighbor, SearchHit, VectorStoreProvider};
use crate::types::StoreEntry;

/// `"{prefix}0 {prefix}1 ... {prefix}{n-1}"`
pub(crate) fn words(prefix: &str, n: usize) -> String {
    (0..n)
        .map(|i| format!("{}{}", prefix, i))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Text with all whitespace removed
pub(crate) fn non_whitespace(text: &str) -> String {
    text.chars().filter(|c| !c.is_whitespace()).collect()
}

/// Header, a three-row table and `sentences` ten-word prose sentences
///
/// Returns the document and the exact table text.
pub(crate) fn quarterly_report(sentences: usize) -> (String, String) {
    let table = "| Region | Q1 | Q2 |\n|---|---|---|\n| North | 10 | 12 |\n| South | 8 | 9 |\n| East | 7 | 11 |";
    let prose = (0..sentences)
        .map(|i| format!("Sentence {} talks about regional revenue trends in some detail.", i))
        .collect::<Vec<_>>()
        .join(" ");
    (
        format!("# Quarterly Report\n\n{}\n\n{}", table, prose),
        table.to_string(),
    )
}

/// Bag-of-words embedder hashing each lowercased word into a bucket
///
/// Identical texts get identical unit vectors; texts with different word
/// sets land measurably apart.
pub(crate) struct HashEmbedder;

impl HashEmbedder {
    pub const DIMENSIONS: usize = 64;

    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl EmbeddingProvider for HashEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let mut vector = vec![0.0f32; Self::DIMENSIONS];
        for word in text.split_whitespace() {
            let digest = Sha256::digest(word.to_lowercase().as_bytes());
            let bucket = u16::from_be_bytes([digest[0], digest[1]]) as usize % Self::DIMENSIONS;
            vector[bucket] += 1.0;
        }

        let norm = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            vector.iter_mut().for_each(|x| *x /= norm);
        }
        Ok(vector)
    }

    fn dimensions(&self) -> usize {
        Self::DIMENSIONS
    }

    async fn health_check(&self) -> Result<bool> {
        Ok(true)
    }

    fn name(&self) -> &str {
        "hash"
    }
}

/// Embedder whose every call fails
pub(crate) struct FailingEmbedder;

#[async_trait]
impl EmbeddingProvider for FailingEmbedder {
    async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
        Err(Error::external("embedding", "model not loaded"))
    }

    fn dimensions(&self) -> usize {
        HashEmbedder::DIMENSIONS
    }

    async fn health_check(&self) -> Result<bool> {
        Ok(false)
    }

    fn name(&self) -> &str {
        "failing"
    }
}

/// Store that is never reachable
pub(crate) struct FailingStore;

fn unreachable_store() -> Error {
    Error::external("vector_store", "connection refused")
}

#[async_trait]
impl VectorStoreProvider for FailingStore {
    async fn query_nearest(&self, _embedding: &[f32]) -> Result<Option<Neighbor>> {
        Err(unreachable_store())
    }

    async fn commit(&self, _entries: &[StoreEntry]) -> Result<Vec<Uuid>> {
        Err(unreachable_store())
    }

    async fn search(&self, _embedding: &[f32], _top_k: usize) -> Result<Vec<SearchHit>> {
        Err(unreachable_store())
    }

    async fn len(&self) -> Result<usize> {
        Err(unreachable_store())
    }

    async fn health_check(&self) -> Result<bool> {
        Ok(false)
    }

    fn name(&self) -> &str {
        "failing"
    }
}
