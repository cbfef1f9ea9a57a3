//! Text segmentation helpers shared by the detectors.

use serde::{Deserialize, Serialize};
use unicode_segmentation::UnicodeSegmentation;

/// Half-open byte range into a text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn slice<'a>(&self, text: &'a str) -> &'a str {
        &text[self.start..self.end]
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// Splits text into sentences.
///
/// Returned spans are non-overlapping, ordered, non-empty and trimmed of
/// surrounding whitespace.
pub trait SentenceSplitter: Send + Sync {
    fn split(&self, text: &str) -> Vec<Span>;
}

/// Splits on runs of `.`, `!` and `?`. Terminators are not part of the span.
#[derive(Debug, Default, Clone, Copy)]
pub struct PunctuationSplitter;

impl SentenceSplitter for PunctuationSplitter {
    fn split(&self, text: &str) -> Vec<Span> {
        let mut spans = Vec::new();
        let mut segment_start = 0usize;
        let mut in_terminator = false;

        for (idx, ch) in text.char_indices() {
            let terminator = matches!(ch, '.' | '!' | '?');
            if terminator && !in_terminator {
                push_trimmed(text, segment_start, idx, &mut spans);
                in_terminator = true;
            } else if !terminator && in_terminator {
                segment_start = idx;
                in_terminator = false;
            }
        }
        if !in_terminator {
            push_trimmed(text, segment_start, text.len(), &mut spans);
        }
        spans
    }
}

/// UAX #29 sentence boundaries.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnicodeSplitter;

impl SentenceSplitter for UnicodeSplitter {
    fn split(&self, text: &str) -> Vec<Span> {
        let mut spans = Vec::new();
        for (offset, sentence) in text.split_sentence_bound_indices() {
            push_trimmed(text, offset, offset + sentence.len(), &mut spans);
        }
        spans
    }
}

fn push_trimmed(text: &str, start: usize, end: usize, spans: &mut Vec<Span>) {
    if let Some(span) = trim_span(text, start, end) {
        spans.push(span);
    }
}

/// Shrinks `start..end` to exclude leading and trailing whitespace.
pub fn trim_span(text: &str, start: usize, end: usize) -> Option<Span> {
    let slice = &text[start..end];
    let leading = slice.len() - slice.trim_start().len();
    let trimmed = slice.trim();
    if trimmed.is_empty() {
        return None;
    }
    let s = start + leading;
    Some(Span::new(s, s + trimmed.len()))
}

/// Whitespace-separated tokens.
pub fn count_words(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Lowercases, trims and collapses inner whitespace.
pub fn normalize_phrase(text: &str) -> String {
    text.split_whitespace()
        .map(|w| w.to_lowercase())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Applies the casing of `original` to `replacement`: all-caps stays all-caps,
/// a leading capital stays a leading capital.
pub fn match_case(original: &str, replacement: &str) -> String {
    let letters: Vec<char> = original.chars().filter(|c| c.is_alphabetic()).collect();
    if letters.len() > 1 && letters.iter().all(|c| c.is_uppercase()) {
        return replacement.to_uppercase();
    }
    match original.chars().next() {
        Some(first) if first.is_uppercase() => capitalize_first(replacement),
        _ => replacement.to_string(),
    }
}

pub fn capitalize_first(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Location metadata in 1-based line/column coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub line: usize,
    pub column: usize,
}

pub fn byte_to_location(text: &str, byte_offset: usize) -> Location {
    let byte_offset = byte_offset.min(text.len());
    let mut line = 1;
    let mut last_newline = 0;
    for (idx, ch) in text.char_indices() {
        if idx >= byte_offset {
            break;
        }
        if ch == '\n' {
            line += 1;
            last_newline = idx + 1;
        }
    }
    let column = text
        .get(last_newline..byte_offset)
        .map(|s| s.chars().count())
        .unwrap_or(0)
        + 1;
    Location { line, column }
}
