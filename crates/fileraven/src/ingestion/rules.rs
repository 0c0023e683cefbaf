//! Structural split rules for markdown-flavored text
//!
//! Each rule cuts a text into ordered [`Segment`]s. Atomic rules (code
//! fences, tables, lists) return their matched blocks as standalone segments
//! tagged with a [`ChunkKind`]; the remaining rules only mark split points.
//! Block boundaries come from a CommonMark parse with GFM tables enabled.

use once_cell::sync::Lazy;
use pulldown_cmark::{CodeBlockKind, Event, Options, Parser, Tag};
use regex::Regex;
use std::ops::Range;

use crate::types::ChunkKind;

static PARAGRAPH_BREAK: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n(?:[ \t]*\n)+").unwrap());
static SENTENCE_END: Lazy<Regex> = Lazy::new(|| Regex::new(r"[.!?;:]\s+").unwrap());

/// A piece of text produced by a rule
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment<'a> {
    pub text: &'a str,
    /// Set for blocks matched by an atomic rule
    pub block: Option<ChunkKind>,
}

impl<'a> Segment<'a> {
    fn plain(text: &'a str) -> Self {
        Self { text, block: None }
    }

    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// Structural boundaries, listed from coarsest to finest
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StructuralRule {
    Header,
    CodeFence,
    Table,
    List,
    Paragraph,
    Sentence,
}

impl StructuralRule {
    /// Order in which the splitter tries the rules
    pub const PRIORITY: [StructuralRule; 6] = [
        StructuralRule::Header,
        StructuralRule::CodeFence,
        StructuralRule::Table,
        StructuralRule::List,
        StructuralRule::Paragraph,
        StructuralRule::Sentence,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Header => "header",
            Self::CodeFence => "code_fence",
            Self::Table => "table",
            Self::List => "list",
            Self::Paragraph => "paragraph",
            Self::Sentence => "sentence",
        }
    }

    /// Whether matched blocks become their own segments
    pub fn is_atomic(&self) -> bool {
        self.block_kind().is_some()
    }

    pub fn block_kind(&self) -> Option<ChunkKind> {
        match self {
            Self::CodeFence => Some(ChunkKind::CodeBlock),
            Self::Table => Some(ChunkKind::Table),
            Self::List => Some(ChunkKind::List),
            _ => None,
        }
    }

    /// Cut `text` into ordered segments; a single segment means no match
    pub fn segments<'a>(&self, text: &'a str) -> Vec<Segment<'a>> {
        match self {
            Self::Header => split_before_headers(text),
            Self::CodeFence => split_around_blocks(text, &blocks(text).code, ChunkKind::CodeBlock),
            Self::Table => split_around_blocks(text, &blocks(text).tables, ChunkKind::Table),
            Self::List => split_around_blocks(text, &blocks(text).lists, ChunkKind::List),
            Self::Paragraph => split_at_matches(text, &PARAGRAPH_BREAK, false),
            Self::Sentence => split_at_matches(text, &SENTENCE_END, true),
        }
    }
}

/// Top-level block spans found by the markdown parser
#[derive(Debug, Default)]
struct Blocks {
    /// Start of every line holding an ATX header
    headers: Vec<usize>,
    code: Vec<Range<usize>>,
    tables: Vec<Range<usize>>,
    lists: Vec<Range<usize>>,
}

fn blocks(text: &str) -> Blocks {
    let mut found = Blocks::default();
    let parser = Parser::new_ext(text, Options::ENABLE_TABLES);

    for (event, range) in parser.into_offset_iter() {
        let Event::Start(tag) = event else { continue };
        match tag {
            Tag::Heading { .. } => {
                let line_start = text[..range.start].rfind('\n').map_or(0, |i| i + 1);
                if is_header(&text[line_start..]) {
                    found.headers.push(line_start);
                }
            }
            Tag::CodeBlock(CodeBlockKind::Fenced(_)) => push_outermost(&mut found.code, text, range),
            Tag::Table(_) => push_outermost(&mut found.tables, text, range),
            Tag::List(_) => {
                push_outermost(&mut found.lists, text, range);
                merge_adjacent(&mut found.lists, text);
            }
            _ => {}
        }
    }
    found
}

/// 1-6 `#` followed by whitespace or the end of the line
fn is_header(line: &str) -> bool {
    let hashes = line.chars().take_while(|c| *c == '#').count();
    (1..=6).contains(&hashes)
        && line[hashes..]
            .chars()
            .next()
            .map_or(true, char::is_whitespace)
}

/// Record `range` with surrounding whitespace dropped, unless it is nested in
/// the previous block
fn push_outermost(spans: &mut Vec<Range<usize>>, text: &str, range: Range<usize>) {
    if spans.last().is_some_and(|last| range.start < last.end) {
        return;
    }
    let raw = &text[range.clone()];
    let start = range.start + (raw.len() - raw.trim_start().len());
    let end = range.start + raw.trim_end().len();
    if start < end {
        spans.push(start..end);
    }
}

/// Lists separated only by blank lines form one block, even when the marker
/// type changes between them
fn merge_adjacent(spans: &mut Vec<Range<usize>>, text: &str) {
    if spans.len() < 2 {
        return;
    }
    let last = spans[spans.len() - 1].clone();
    let len = spans.len();
    let prev = &mut spans[len - 2];
    if text[prev.end..last.start].trim().is_empty() {
        prev.end = last.end;
        spans.pop();
    }
}

fn split_before_headers(text: &str) -> Vec<Segment<'_>> {
    let cuts: Vec<usize> = blocks(text)
        .headers
        .into_iter()
        .filter(|&start| start > 0)
        .collect();

    let mut segments = Vec::with_capacity(cuts.len() + 1);
    let mut prev = 0;
    for cut in cuts {
        segments.push(Segment::plain(&text[prev..cut]));
        prev = cut;
    }
    segments.push(Segment::plain(&text[prev..]));
    segments
}

fn split_around_blocks<'a>(text: &'a str, spans: &[Range<usize>], kind: ChunkKind) -> Vec<Segment<'a>> {
    let mut segments = Vec::with_capacity(spans.len() * 2 + 1);
    let mut prev = 0;
    for &Range { start, end } in spans {
        if start > prev {
            segments.push(Segment::plain(&text[prev..start]));
        }
        segments.push(Segment {
            text: &text[start..end],
            block: Some(kind),
        });
        prev = end;
    }
    if prev < text.len() || segments.is_empty() {
        segments.push(Segment::plain(&text[prev..]));
    }
    segments
}

/// Split at every regex match; `keep_first` keeps the match's first char
/// (the punctuation) with the preceding piece
fn split_at_matches<'a>(text: &'a str, pattern: &Regex, keep_first: bool) -> Vec<Segment<'a>> {
    let mut segments = Vec::new();
    let mut prev = 0;
    for m in pattern.find_iter(text) {
        let end = if keep_first { m.start() + 1 } else { m.start() };
        segments.push(Segment::plain(&text[prev..end]));
        prev = m.end();
    }
    segments.push(Segment::plain(&text[prev..]));
    segments
}
