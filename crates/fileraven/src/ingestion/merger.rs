//! Overlap merging of atomic chunks into passages

use crate::types::{AtomicChunk, Passage};

/// Separator placed between chunks inside a passage
pub const CHUNK_SEPARATOR: &str = "\n\n";

/// Groups atomic chunks into passages of up to `chunk_size` tokens
///
/// When a group overflows, the next group starts with the last chunk of the
/// emitted one, so every passage after the first repeats its predecessor's
/// tail. Oversized chunks are grouped as-is, never re-split.
///
/// With `isolate_blocks`, each code, table or list chunk becomes a passage of
/// its own and ends the carry chain: the text passage that follows it starts
/// fresh. The carry rule still holds inside each run of text passages.
#[derive(Debug, Clone)]
pub struct OverlapMerger {
    chunk_size: usize,
    isolate_blocks: bool,
}

impl OverlapMerger {
    pub fn new(chunk_size: usize, isolate_blocks: bool) -> Self {
        Self {
            chunk_size,
            isolate_blocks,
        }
    }

    pub fn merge(&self, chunks: &[AtomicChunk], source: &str) -> Vec<Passage> {
        let mut passages = Vec::new();
        let mut group: Vec<&AtomicChunk> = Vec::new();
        let mut total = 0;
        let mut carried = false;

        for chunk in chunks {
            if self.isolate_blocks && chunk.kind.is_block() {
                if !group.is_empty() {
                    passages.push(build_passage(&group, source, carried));
                    group.clear();
                }
                passages.push(build_passage(&[chunk], source, false));
                total = 0;
                carried = false;
                continue;
            }

            if total + chunk.token_count > self.chunk_size {
                if let Some(&last) = group.last() {
                    passages.push(build_passage(&group, source, carried));
                    group.clear();
                    group.push(last);
                    total = last.token_count;
                    carried = true;
                }
            }

            group.push(chunk);
            total += chunk.token_count;
        }

        if !group.is_empty() {
            passages.push(build_passage(&group, source, carried));
        }

        tracing::debug!(
            chunks = chunks.len(),
            passages = passages.len(),
            "Merged chunks into passages"
        );
        passages
    }
}

fn build_passage(group: &[&AtomicChunk], source: &str, starts_with_overlap: bool) -> Passage {
    let text = group
        .iter()
        .map(|c| c.text.as_str())
        .collect::<Vec<_>>()
        .join(CHUNK_SEPARATOR);

    Passage {
        text,
        token_count: group.iter().map(|c| c.token_count).sum(),
        source: source.to_string(),
        chunk_count: group.len(),
        starts_with_overlap,
    }
}
