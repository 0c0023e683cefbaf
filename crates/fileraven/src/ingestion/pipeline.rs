//! Ingestion pipeline orchestration
//!
//! chunk → embed → duplicate filter → commit, one document at a time and in
//! document order.

use serde::Serialize;
use sha2::{Digest, Sha256};
use std::sync::Arc;
use uuid::Uuid;

use crate::config::DedupConfig;
use crate::dedup::{Candidate, DuplicateFilter, FilterOutcome};
use crate::error::{Error, Result};
use crate::providers::{EmbeddingProvider, SearchHit, VectorStoreProvider};

use super::chunker::Chunker;

/// Summary of one ingested document
#[derive(Debug, Clone, Serialize)]
pub struct IngestReport {
    pub source: String,
    /// SHA-256 of the document text, hex encoded
    pub content_hash: String,
    /// Passages produced by chunking
    pub passages: usize,
    /// Passages committed to the store
    pub accepted: usize,
    /// Passages dropped as near-duplicates
    pub rejected: usize,
    /// Passages dropped because the duplicate check failed
    pub failed: usize,
    /// Keys of the committed entries, in document order
    pub keys: Vec<Uuid>,
}

/// Main ingestion pipeline
pub struct IngestPipeline {
    chunker: Chunker,
    embedder: Arc<dyn EmbeddingProvider>,
    store: Arc<dyn VectorStoreProvider>,
    /// `None` when deduplication is disabled
    dedup: Option<DuplicateFilter>,
}

impl IngestPipeline {
    /// Create a new ingestion pipeline
    pub fn new(
        chunker: Chunker,
        embedder: Arc<dyn EmbeddingProvider>,
        store: Arc<dyn VectorStoreProvider>,
        dedup: &DedupConfig,
    ) -> Result<Self> {
        let dedup = if dedup.enabled {
            Some(DuplicateFilter::new(dedup)?)
        } else {
            None
        };

        Ok(Self {
            chunker,
            embedder,
            store,
            dedup,
        })
    }

    pub fn chunker(&self) -> &Chunker {
        &self.chunker
    }

    /// Chunk, embed, filter and commit one document
    pub async fn ingest(&self, text: &str, source: &str) -> Result<IngestReport> {
        let content_hash = hex::encode(Sha256::digest(text.as_bytes()));
        let passages = self.chunker.chunk_and_merge(text, source)?;
        let passage_count = passages.len();

        let mut report = IngestReport {
            source: source.to_string(),
            content_hash,
            passages: passage_count,
            accepted: 0,
            rejected: 0,
            failed: 0,
            keys: Vec::new(),
        };
        if passages.is_empty() {
            tracing::info!("[{}] No content to ingest", source);
            return Ok(report);
        }

        let texts: Vec<String> = passages.into_iter().map(|p| p.text).collect();
        let embeddings = self.embedder.embed_batch(&texts).await?;
        if embeddings.len() != texts.len() {
            return Err(Error::external(
                self.embedder.name(),
                format!(
                    "Returned {} embeddings for {} passages",
                    embeddings.len(),
                    texts.len()
                ),
            ));
        }

        let candidates: Vec<Candidate> = texts
            .into_iter()
            .zip(embeddings)
            .map(|(text, embedding)| Candidate::new(text, embedding))
            .collect();

        let outcome = match &self.dedup {
            Some(filter) => filter.filter(candidates, self.store.as_ref()).await?,
            None => FilterOutcome {
                accepted: candidates,
                ..FilterOutcome::default()
            },
        };
        report.rejected = outcome.rejected;
        report.failed = outcome.failed;

        let entries = outcome.into_entries(source);
        report.accepted = entries.len();
        report.keys = self.store.commit(&entries).await?;

        tracing::info!(
            "[{}] Ingested {} passages: {} committed, {} duplicates, {} failed checks",
            source,
            passage_count,
            report.accepted,
            report.rejected,
            report.failed
        );
        Ok(report)
    }

    /// Embed a query and return the nearest committed passages
    pub async fn search(&self, query: &str, top_k: usize) -> Result<Vec<SearchHit>> {
        let embedding = self.embedder.embed(query).await?;
        self.store.search(&embedding, top_k).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ChunkingConfig, DedupFailurePolicy};
    use crate::providers::{DistanceMetric, LocalVectorStore};
    use crate::test_utils::{quarterly_report, FailingEmbedder, FailingStore, HashEmbedder};
    use crate::tokenizer::WordTokenizer;

    fn chunker() -> Chunker {
        Chunker::new(
            ChunkingConfig::new(228, 32).unwrap(),
            Arc::new(WordTokenizer::new()),
        )
        .unwrap()
    }

    fn local_store() -> Arc<LocalVectorStore> {
        Arc::new(LocalVectorStore::new(
            HashEmbedder::DIMENSIONS,
            DistanceMetric::SquaredEuclidean,
        ))
    }

    fn pipeline(store: Arc<LocalVectorStore>, dedup: &DedupConfig) -> IngestPipeline {
        IngestPipeline::new(chunker(), Arc::new(HashEmbedder::new()), store, dedup).unwrap()
    }

    #[tokio::test]
    async fn test_reupload_is_fully_deduplicated() {
        let store = local_store();
        let pipeline = pipeline(Arc::clone(&store), &DedupConfig::default());
        let (doc, _) = quarterly_report(40);

        let first = pipeline.ingest(&doc, "q1.md").await.unwrap();
        assert_eq!(first.passages, 4);
        assert_eq!(first.accepted, 4);
        assert_eq!(first.keys.len(), 4);

        let second = pipeline.ingest(&doc, "q1-copy.md").await.unwrap();
        assert_eq!(second.accepted, 0);
        assert_eq!(second.rejected, 4);
        assert!(second.keys.is_empty());
        assert_eq!(second.content_hash, first.content_hash);

        assert_eq!(store.len().await.unwrap(), 4);
    }

    #[tokio::test]
    async fn test_dedup_disabled_commits_everything() {
        let store = local_store();
        let config = DedupConfig {
            enabled: false,
            ..DedupConfig::default()
        };
        let pipeline = pipeline(Arc::clone(&store), &config);
        let (doc, _) = quarterly_report(40);

        pipeline.ingest(&doc, "a").await.unwrap();
        let second = pipeline.ingest(&doc, "b").await.unwrap();
        assert_eq!(second.accepted, 4);
        assert_eq!(second.rejected, 0);
        assert_eq!(store.len().await.unwrap(), 8);
    }

    #[tokio::test]
    async fn test_empty_document() {
        let pipeline = pipeline(local_store(), &DedupConfig::default());
        let report = pipeline.ingest("  \n\n ", "blank.txt").await.unwrap();

        assert_eq!(report.passages, 0);
        assert_eq!(report.accepted, 0);
        assert_eq!(
            report.content_hash,
            hex::encode(Sha256::digest("  \n\n ".as_bytes()))
        );
    }

    #[tokio::test]
    async fn test_embedding_failure_propagates() {
        let store = local_store();
        let pipeline = IngestPipeline::new(
            chunker(),
            Arc::new(FailingEmbedder),
            Arc::clone(&store) as Arc<dyn VectorStoreProvider>,
            &DedupConfig::default(),
        )
        .unwrap();

        let err = pipeline.ingest("Some text.", "doc").await.unwrap_err();
        assert!(err.is_external());
        assert_eq!(store.len().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_unreachable_store_fails_batch() {
        let config = DedupConfig {
            failure_policy: DedupFailurePolicy::FailBatch,
            ..DedupConfig::default()
        };
        let pipeline = IngestPipeline::new(
            chunker(),
            Arc::new(HashEmbedder::new()),
            Arc::new(FailingStore),
            &config,
        )
        .unwrap();

        assert!(pipeline.ingest("Some text.", "doc").await.unwrap_err().is_external());
    }

    #[tokio::test]
    async fn test_search_finds_committed_passage() {
        let pipeline = pipeline(local_store(), &DedupConfig::default());
        let (doc, table) = quarterly_report(40);
        pipeline.ingest(&doc, "q1.md").await.unwrap();

        let hits = pipeline.search(&table, 3).await.unwrap();
        assert_eq!(hits.len(), 3);
        assert_eq!(hits[0].text, table);
        assert_eq!(hits[0].source, "q1.md");
        assert!(hits[0].distance < 1e-6);
    }
}
