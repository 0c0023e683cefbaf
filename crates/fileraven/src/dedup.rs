//! Near-duplicate filtering against the committed store
//!
//! Every candidate is checked on its own against what is already in the
//! store. Candidates from the same batch are never compared with each other,
//! so two identical passages in one upload are both accepted.

use crate::config::{DedupConfig, DedupFailurePolicy};
use crate::error::Result;
use crate::providers::VectorStoreProvider;
use crate::types::StoreEntry;

/// Passage text with its embedding, awaiting the duplicate check
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub text: String,
    pub embedding: Vec<f32>,
}

impl Candidate {
    pub fn new(text: impl Into<String>, embedding: Vec<f32>) -> Self {
        Self {
            text: text.into(),
            embedding,
        }
    }
}

/// Result of filtering one batch
#[derive(Debug, Clone, Default)]
pub struct FilterOutcome {
    /// Candidates to commit, in input order
    pub accepted: Vec<Candidate>,
    /// Candidates within the threshold of an existing entry
    pub rejected: usize,
    /// Candidates dropped because the store could not be queried
    pub failed: usize,
}

impl FilterOutcome {
    /// Turn accepted candidates into store entries with fresh keys
    pub fn into_entries(self, source: &str) -> Vec<StoreEntry> {
        self.accepted
            .into_iter()
            .map(|c| StoreEntry::new(c.text, c.embedding, source.to_string()))
            .collect()
    }
}

/// Rejects candidates whose nearest committed neighbour is within `threshold`
#[derive(Debug, Clone)]
pub struct DuplicateFilter {
    threshold: f32,
    policy: DedupFailurePolicy,
}

impl DuplicateFilter {
    pub fn new(config: &DedupConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            threshold: config.threshold,
            policy: config.failure_policy,
        })
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    pub async fn filter(
        &self,
        candidates: Vec<Candidate>,
        store: &dyn VectorStoreProvider,
    ) -> Result<FilterOutcome> {
        let mut outcome = FilterOutcome::default();

        for candidate in candidates {
            let nearest = match store.query_nearest(&candidate.embedding).await {
                Ok(nearest) => nearest,
                Err(e) => match self.policy {
                    DedupFailurePolicy::FailBatch => return Err(e),
                    DedupFailurePolicy::RejectCandidate => {
                        tracing::warn!("Duplicate check failed, rejecting candidate: {}", e);
                        outcome.failed += 1;
                        continue;
                    }
                },
            };

            match nearest {
                Some(neighbor) if neighbor.distance <= self.threshold => {
                    tracing::debug!(
                        "Rejected duplicate of {} from {} (distance {:.2e})",
                        neighbor.id,
                        neighbor.source,
                        neighbor.distance
                    );
                    outcome.rejected += 1;
                }
                _ => outcome.accepted.push(candidate),
            }
        }

        Ok(outcome)
    }
}

/// Filter with the default threshold and return entries ready to commit
pub async fn filter_duplicates(
    candidates: Vec<Candidate>,
    store: &dyn VectorStoreProvider,
    source: &str,
) -> Result<Vec<StoreEntry>> {
    let filter = DuplicateFilter::new(&DedupConfig::default())?;
    let outcome = filter.filter(candidates, store).await?;
    Ok(outcome.into_entries(source))
}
