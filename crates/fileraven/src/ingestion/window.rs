//! Fixed-size token windows with overlap

use std::sync::Arc;

use crate::error::Result;
use crate::tokenizer::Tokenizer;
use crate::types::Passage;

/// Sliding token window chunker
///
/// Windows hold `chunk_size` tokens and advance by
/// `chunk_size - overlap_size`, so consecutive passages share
/// `overlap_size` tokens. Document structure is ignored.
pub struct TokenWindowChunker {
    tokenizer: Arc<dyn Tokenizer>,
    /// Window size in tokens
    chunk_size: usize,
    /// Tokens shared by consecutive windows
    overlap_size: usize,
}

impl TokenWindowChunker {
    /// `overlap_size` must be smaller than `chunk_size`
    pub fn new(tokenizer: Arc<dyn Tokenizer>, chunk_size: usize, overlap_size: usize) -> Self {
        Self {
            tokenizer,
            chunk_size,
            overlap_size,
        }
    }

    pub fn chunk(&self, text: &str, source: &str) -> Result<Vec<Passage>> {
        let ids = self.tokenizer.encode(text)?;
        let stride = self.chunk_size - self.overlap_size;

        let mut passages = Vec::new();
        let mut start = 0;
        while start < ids.len() {
            let end = (start + self.chunk_size).min(ids.len());
            let window = &ids[start..end];
            let decoded = self.tokenizer.decode(window)?;
            let decoded = decoded.trim();

            if !decoded.is_empty() {
                passages.push(Passage {
                    text: decoded.to_string(),
                    token_count: window.len(),
                    source: source.to_string(),
                    chunk_count: 1,
                    starts_with_overlap: start > 0,
                });
            }

            // Last window reached the end
            if end == ids.len() {
                break;
            }
            start += stride;
        }

        tracing::debug!(
            tokens = ids.len(),
            windows = passages.len(),
            stride,
            "Token window chunking"
        );
        Ok(passages)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::words;
    use crate::tokenizer::WordTokenizer;

    fn chunker(chunk_size: usize, overlap: usize) -> TokenWindowChunker {
        TokenWindowChunker::new(Arc::new(WordTokenizer::new()), chunk_size, overlap)
    }

    #[test]
    fn test_windows_advance_by_stride() {
        let text = words("t", 10);
        let passages = chunker(4, 1).chunk(&text, "doc").unwrap();

        let texts: Vec<&str> = passages.iter().map(|p| p.text.as_str()).collect();
        assert_eq!(texts, vec!["t0 t1 t2 t3", "t3 t4 t5 t6", "t6 t7 t8 t9"]);
        assert!(!passages[0].starts_with_overlap);
        assert!(passages[1].starts_with_overlap);
    }

    #[test]
    fn test_no_trailing_window_inside_previous() {
        let text = words("t", 5);
        let passages = chunker(4, 2).chunk(&text, "doc").unwrap();

        let counts: Vec<usize> = passages.iter().map(|p| p.token_count).collect();
        assert_eq!(counts, vec![4, 3]);
        assert_eq!(passages[1].text, "t2 t3 t4");
    }

    #[test]
    fn test_short_and_empty_text() {
        let passages = chunker(512, 64).chunk("just a few words", "doc").unwrap();
        assert_eq!(passages.len(), 1);
        assert_eq!(passages[0].token_count, 4);

        assert!(chunker(512, 64).chunk("", "doc").unwrap().is_empty());
    }
}
