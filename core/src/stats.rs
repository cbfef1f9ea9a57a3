//! Document counts and reading-time estimate.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::text::count_words;

static SENTENCE_END_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[.!?]+").expect("static regex"));
static PARAGRAPH_BREAK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\n[ \t\r]*\n").expect("static regex"));

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StatisticsSettings {
    pub words_per_minute: usize,
}

impl Default for StatisticsSettings {
    fn default() -> Self {
        Self {
            words_per_minute: 200,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct TextStatistics {
    pub word_count: usize,
    /// Unicode scalar values.
    pub character_count: usize,
    pub character_count_no_spaces: usize,
    pub sentence_count: usize,
    pub paragraph_count: usize,
    pub average_sentence_length: f64,
    pub reading_time_minutes: usize,
}

pub fn count_sentences(text: &str) -> usize {
    SENTENCE_END_RE.find_iter(text).count()
}

/// Blank-line separated blocks with content. Any non-blank text is at least
/// one paragraph.
pub fn count_paragraphs(text: &str) -> usize {
    if text.trim().is_empty() {
        return 0;
    }
    PARAGRAPH_BREAK_RE
        .split(text)
        .filter(|block| !block.trim().is_empty())
        .count()
        .max(1)
}

pub fn reading_time_minutes(words: usize, words_per_minute: usize) -> usize {
    if words == 0 {
        return 0;
    }
    words.div_ceil(words_per_minute.max(1))
}

pub fn calculate_statistics(text: &str) -> TextStatistics {
    statistics_with(text, &StatisticsSettings::default())
}

pub fn statistics_with(text: &str, settings: &StatisticsSettings) -> TextStatistics {
    let word_count = count_words(text);
    let sentence_count = count_sentences(text);
    let average_sentence_length = if sentence_count == 0 {
        0.0
    } else {
        (word_count as f64 / sentence_count as f64 * 10.0).round() / 10.0
    };
    TextStatistics {
        word_count,
        character_count: text.chars().count(),
        character_count_no_spaces: text.chars().filter(|c| !c.is_whitespace()).count(),
        sentence_count,
        paragraph_count: count_paragraphs(text),
        average_sentence_length,
        reading_time_minutes: reading_time_minutes(word_count, settings.words_per_minute),
    }
}
