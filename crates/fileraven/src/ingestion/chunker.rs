//! Chunking entry point
//!
//! [`Chunker`] ties the configured strategy together: whitespace cleaning,
//! then either semantic splitting plus overlap merging, or fixed token
//! windows.

use std::sync::Arc;

use crate::config::{ChunkingConfig, ChunkingStrategy};
use crate::error::Result;
use crate::tokenizer::Tokenizer;
use crate::types::{AtomicChunk, Passage};

use super::cleaning::normalize_whitespace;
use super::merger::OverlapMerger;
use super::splitter::SemanticSplitter;
use super::window::TokenWindowChunker;

/// Document chunker with a fixed configuration and tokenizer
///
/// Holds no per-call state, so one instance can serve many documents
/// concurrently.
pub struct Chunker {
    config: ChunkingConfig,
    tokenizer: Arc<dyn Tokenizer>,
    splitter: SemanticSplitter,
    merger: OverlapMerger,
    window: TokenWindowChunker,
}

impl Chunker {
    /// Create a chunker, rejecting invalid budgets
    pub fn new(config: ChunkingConfig, tokenizer: Arc<dyn Tokenizer>) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            splitter: SemanticSplitter::new(Arc::clone(&tokenizer), config.chunk_size),
            merger: OverlapMerger::new(config.chunk_size, config.isolate_blocks),
            window: TokenWindowChunker::new(
                Arc::clone(&tokenizer),
                config.chunk_size,
                config.overlap_size,
            ),
            tokenizer,
            config,
        })
    }

    pub fn config(&self) -> &ChunkingConfig {
        &self.config
    }

    /// Split text into atomic chunks without merging
    pub fn split(&self, text: &str) -> Result<Vec<AtomicChunk>> {
        let text = self.prepare(text);
        self.splitter.split(&text)
    }

    /// Cut a document into ordered passages tagged with `source`
    pub fn chunk_and_merge(&self, text: &str, source: &str) -> Result<Vec<Passage>> {
        let text = self.prepare(text);
        if text.trim().is_empty() {
            tracing::debug!("[{}] Empty document, no passages", source);
            return Ok(Vec::new());
        }

        let passages = match self.config.strategy {
            ChunkingStrategy::Semantic => {
                let chunks = self.splitter.split(&text)?;
                tracing::debug!(
                    "[{}] Split into {} atomic chunks using {} tokenizer",
                    source,
                    chunks.len(),
                    self.tokenizer.name()
                );
                self.merger.merge(&chunks, source)
            }
            ChunkingStrategy::TokenWindow => self.window.chunk(&text, source)?,
        };

        tracing::debug!(
            "[{}] Produced {} passages (chunk_size={}, strategy={:?})",
            source,
            passages.len(),
            self.config.chunk_size,
            self.config.strategy
        );
        Ok(passages)
    }

    fn prepare(&self, text: &str) -> String {
        if self.config.normalize_whitespace {
            normalize_whitespace(text)
        } else {
            text.to_string()
        }
    }
}

/// Chunk a document and return only the passage texts
pub fn chunk_and_merge(
    text: &str,
    config: &ChunkingConfig,
    tokenizer: Arc<dyn Tokenizer>,
) -> Result<Vec<String>> {
    let chunker = Chunker::new(config.clone(), tokenizer)?;
    Ok(chunker
        .chunk_and_merge(text, "")?
        .into_iter()
        .map(|p| p.text)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::test_utils::{quarterly_report, words};
    use crate::tokenizer::WordTokenizer;
    use crate::types::ChunkKind;

    fn chunker(config: ChunkingConfig) -> Chunker {
        Chunker::new(config, Arc::new(WordTokenizer::new())).unwrap()
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = ChunkingConfig {
            chunk_size: 32,
            overlap_size: 32,
            ..ChunkingConfig::default()
        };
        let result = Chunker::new(config, Arc::new(WordTokenizer::new()));
        assert!(matches!(result, Err(Error::Configuration(_))));
    }

    #[test]
    fn test_empty_document_yields_no_passages() {
        let chunker = chunker(ChunkingConfig::default());
        assert!(chunker.chunk_and_merge("", "doc").unwrap().is_empty());
        assert!(chunker.chunk_and_merge("\n\n  \t\n", "doc").unwrap().is_empty());
    }

    #[test]
    fn test_report_table_isolated_and_prose_overlaps() {
        let chunker = chunker(ChunkingConfig::new(228, 32).unwrap());
        let (doc, table) = quarterly_report(40);
        let passages = chunker.chunk_and_merge(&doc, "reports/q1.md").unwrap();

        assert_eq!(passages.len(), 4);
        assert_eq!(passages[0].text, "# Quarterly Report");
        assert_eq!(passages[1].text, table);
        assert!(!passages[1].starts_with_overlap);

        let prose = &passages[2..];
        assert!(prose[0].text.starts_with("Sentence 0 "));
        assert!(prose[0].text.ends_with("Sentence 21 talks about regional revenue trends in some detail."));
        assert!(prose[1].starts_with_overlap);
        assert!(prose[1].text.starts_with("Sentence 21 talks"));
        assert!(prose[1].text.ends_with("Sentence 39 talks about regional revenue trends in some detail."));
        assert!(passages.iter().all(|p| p.source == "reports/q1.md"));
    }

    #[test]
    fn test_long_sentence_sliced_into_three_chunks() {
        let chunker = chunker(ChunkingConfig::new(228, 32).unwrap());
        let text = words("w", 500);

        let chunks = chunker.split(&text).unwrap();
        let counts: Vec<usize> = chunks.iter().map(|c| c.token_count).collect();
        assert_eq!(counts, vec![228, 228, 44]);
        assert!(chunks.iter().all(|c| c.kind == ChunkKind::Text));

        let passages = chunker.chunk_and_merge(&text, "doc").unwrap();
        assert_eq!(passages.len(), 3);
        assert!(passages.iter().all(|p| p.token_count <= 228 + 228));
    }

    #[test]
    fn test_overlap_chunk_is_byte_identical() {
        let chunker = chunker(ChunkingConfig {
            chunk_size: 50,
            overlap_size: 8,
            isolate_blocks: false,
            ..ChunkingConfig::default()
        });
        let text = (0..30)
            .map(|i| format!("Point {} covers {}.", i, words("topic", i % 5 + 3)))
            .collect::<Vec<_>>()
            .join(" ");

        let chunks = chunker.split(&text).unwrap();
        let passages = chunker.chunk_and_merge(&text, "doc").unwrap();
        assert!(passages.len() > 1);
        assert!(chunks.iter().all(|c| c.token_count <= 50));

        for pair in passages.windows(2) {
            let prev_last = pair[0].text.rsplit("\n\n").next().unwrap();
            let next_first = pair[1].text.split("\n\n").next().unwrap();
            assert_eq!(prev_last.as_bytes(), next_first.as_bytes());
        }
    }

    #[test]
    fn test_token_window_strategy() {
        let chunker = chunker(ChunkingConfig {
            chunk_size: 100,
            overlap_size: 20,
            strategy: ChunkingStrategy::TokenWindow,
            ..ChunkingConfig::default()
        });
        let passages = chunker.chunk_and_merge(&words("w", 250), "doc").unwrap();

        let counts: Vec<usize> = passages.iter().map(|p| p.token_count).collect();
        assert_eq!(counts, vec![100, 100, 90]);
        assert!(passages[1].text.starts_with("w80 "));
    }

    #[test]
    fn test_free_function_returns_texts() {
        let config = ChunkingConfig::new(228, 32).unwrap();
        let texts = chunk_and_merge(
            "# Title\n\nShort body.",
            &config,
            Arc::new(WordTokenizer::new()),
        )
        .unwrap();
        assert_eq!(texts, vec!["# Title\n\nShort body."]);
    }
}
