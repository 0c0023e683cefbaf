//! Local vector store: brute-force nearest neighbour over in-memory entries
//!
//! Entries can be persisted to a JSON snapshot that is rewritten after every
//! commit and loaded again by [`LocalVectorStore::open`]. A commit becomes
//! visible to queries only once its snapshot has been written.

use async_trait::async_trait;
use parking_lot::RwLock;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::config::RagConfig;
use crate::error::{Error, Result};
use crate::types::StoreEntry;

use super::vector_store::{DistanceMetric, Neighbor, SearchHit, VectorStoreProvider};

const SERVICE: &str = "vector_store";

/// In-process vector store
pub struct LocalVectorStore {
    entries: RwLock<Vec<StoreEntry>>,
    /// Serializes commits so snapshot writes land in commit order
    commit_lock: Mutex<()>,
    dimensions: usize,
    metric: DistanceMetric,
    /// Snapshot file, `None` for a purely in-memory store
    snapshot: Option<PathBuf>,
}

impl LocalVectorStore {
    /// Create an empty in-memory store
    pub fn new(dimensions: usize, metric: DistanceMetric) -> Self {
        Self {
            entries: RwLock::new(Vec::new()),
            commit_lock: Mutex::new(()),
            dimensions,
            metric,
            snapshot: None,
        }
    }

    /// Open a store backed by a snapshot file, loading it if present
    pub fn open(path: impl AsRef<Path>, dimensions: usize, metric: DistanceMetric) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        let entries: Vec<StoreEntry> = if path.exists() {
            let raw = std::fs::read_to_string(&path)?;
            serde_json::from_str(&raw)?
        } else {
            Vec::new()
        };

        if let Some(bad) = entries.iter().find(|e| e.embedding.len() != dimensions) {
            return Err(Error::external(
                SERVICE,
                format!(
                    "Snapshot {} holds a {}-dimensional entry, expected {}",
                    path.display(),
                    bad.embedding.len(),
                    dimensions
                ),
            ));
        }

        tracing::info!("Loaded {} entries from {}", entries.len(), path.display());

        Ok(Self {
            entries: RwLock::new(entries),
            commit_lock: Mutex::new(()),
            dimensions,
            metric,
            snapshot: Some(path),
        })
    }

    /// Open the store described by the configuration
    pub fn from_config(config: &RagConfig) -> Result<Self> {
        Self::open(
            &config.vector_db.storage_path,
            config.embeddings.dimensions,
            config.vector_db.distance,
        )
    }

    pub fn metric(&self) -> DistanceMetric {
        self.metric
    }

    fn check_dimensions(&self, embedding: &[f32]) -> Result<()> {
        if embedding.is_empty() {
            return Err(Error::external(SERVICE, "Empty embedding"));
        }
        if embedding.len() != self.dimensions {
            return Err(Error::external(
                SERVICE,
                format!(
                    "Dimension mismatch: got {}, store holds {}",
                    embedding.len(),
                    self.dimensions
                ),
            ));
        }
        Ok(())
    }

    /// Write the current entries followed by `pending` to the snapshot
    ///
    /// Must be called with `commit_lock` held.
    async fn persist(&self, pending: &[StoreEntry]) -> Result<()> {
        let Some(path) = &self.snapshot else {
            return Ok(());
        };

        let json = {
            let entries = self.entries.read();
            let all: Vec<&StoreEntry> = entries.iter().chain(pending).collect();
            serde_json::to_string(&all)?
        };

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, json).await?;
        tokio::fs::rename(&tmp, path).await?;
        Ok(())
    }
}

#[async_trait]
impl VectorStoreProvider for LocalVectorStore {
    async fn query_nearest(&self, embedding: &[f32]) -> Result<Option<Neighbor>> {
        self.check_dimensions(embedding)?;

        let entries = self.entries.read();
        let nearest = entries
            .iter()
            .map(|entry| (entry, self.metric.distance(embedding, &entry.embedding)))
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(entry, distance)| Neighbor {
                id: entry.id,
                distance,
                source: entry.source.clone(),
            });
        Ok(nearest)
    }

    async fn commit(&self, entries: &[StoreEntry]) -> Result<Vec<Uuid>> {
        for entry in entries {
            self.check_dimensions(&entry.embedding)?;
        }
        if entries.is_empty() {
            return Ok(Vec::new());
        }

        let keys: Vec<Uuid> = entries.iter().map(|e| e.id).collect();
        let _guard = self.commit_lock.lock().await;
        self.persist(entries).await?;
        self.entries.write().extend_from_slice(entries);

        tracing::debug!("Committed {} entries to {}", keys.len(), self.name());
        Ok(keys)
    }

    async fn search(&self, embedding: &[f32], top_k: usize) -> Result<Vec<SearchHit>> {
        self.check_dimensions(embedding)?;

        let entries = self.entries.read();
        let mut hits: Vec<SearchHit> = entries
            .iter()
            .map(|entry| SearchHit {
                id: entry.id,
                text: entry.text.clone(),
                source: entry.source.clone(),
                distance: self.metric.distance(embedding, &entry.embedding),
            })
            .collect();
        hits.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        hits.truncate(top_k);
        Ok(hits)
    }

    async fn len(&self) -> Result<usize> {
        Ok(self.entries.read().len())
    }

    async fn health_check(&self) -> Result<bool> {
        Ok(true)
    }

    fn name(&self) -> &str {
        "local"
    }
}
