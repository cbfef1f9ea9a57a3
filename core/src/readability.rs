//! Readability scoring using the Flesch-Kincaid grade level.
//!
//! Formula: `0.39 * (words/sentences) + 11.8 * (syllables/words) - 15.59`

use serde::{Deserialize, Serialize};

use crate::issue::{Category, Finding, IdGenerator, Issue, Severity};
use crate::text::{count_words, PunctuationSplitter, SentenceSplitter};

/// Thresholds for readability findings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReadabilitySettings {
    /// Sentences with more words than this are flagged.
    pub difficult_sentence_words: usize,
    /// Average word length above which the vocabulary is called complex.
    pub complex_word_length: f64,
}

impl Default for ReadabilitySettings {
    fn default() -> Self {
        Self {
            difficult_sentence_words: 25,
            complex_word_length: 6.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReadabilityMetrics {
    pub flesch_kincaid_grade: f64,
    pub education_level: String,
    pub average_sentence_length: f64,
    pub average_word_length: f64,
    pub difficult_sentences: Vec<usize>,
}

impl Default for ReadabilityMetrics {
    fn default() -> Self {
        Self {
            flesch_kincaid_grade: 0.0,
            education_level: get_education_level(0.0).to_string(),
            average_sentence_length: 0.0,
            average_word_length: 0.0,
            difficult_sentences: Vec::new(),
        }
    }
}

const EDUCATION_LEVELS: [&str; 17] = [
    "Grade 1",
    "Grade 2",
    "Grade 3",
    "Grade 4",
    "Grade 5",
    "Grade 6",
    "Grade 7",
    "Grade 8",
    "High School Freshman",
    "High School Sophomore",
    "High School Junior",
    "High School Senior",
    "College Freshman",
    "College Sophomore",
    "College Junior",
    "College Senior",
    "Graduate Level",
];

fn is_vowel(c: char) -> bool {
    matches!(c, 'a' | 'e' | 'i' | 'o' | 'u' | 'y')
}

/// Heuristic vowel-group syllable counter.
pub fn count_syllables(word: &str) -> usize {
    let letters: Vec<char> = word
        .chars()
        .filter(|c| c.is_alphabetic())
        .flat_map(char::to_lowercase)
        .collect();
    if letters.is_empty() {
        return 0;
    }
    if letters.len() <= 3 {
        return 1;
    }

    let mut count = 0usize;
    let mut previous_vowel = false;
    for &c in &letters {
        let vowel = is_vowel(c);
        if vowel && !previous_vowel {
            count += 1;
        }
        previous_vowel = vowel;
    }

    let n = letters.len();
    if letters[n - 1] == 'e' && count > 1 {
        count -= 1;
    }
    if letters[n - 2] == 'l' && letters[n - 1] == 'e' && !is_vowel(letters[n - 3]) {
        count += 1;
    }
    count.max(1)
}

fn total_syllables(text: &str) -> usize {
    text.split_whitespace().map(count_syllables).sum()
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

pub fn calculate_flesch_kincaid_grade(text: &str) -> f64 {
    flesch_kincaid_grade_with(text, &PunctuationSplitter)
}

pub fn flesch_kincaid_grade_with(text: &str, splitter: &dyn SentenceSplitter) -> f64 {
    let words = count_words(text);
    let sentences = splitter.split(text).len();
    if words == 0 || sentences == 0 {
        return 0.0;
    }
    let syllables = total_syllables(text);
    let words_per_sentence = words as f64 / sentences as f64;
    let syllables_per_word = syllables as f64 / words as f64;
    round1(0.39 * words_per_sentence + 11.8 * syllables_per_word - 15.59)
}

pub fn get_education_level(grade: f64) -> &'static str {
    let rounded = if grade.is_finite() { grade.round() } else { 1.0 };
    let index = rounded.clamp(1.0, 17.0) as usize - 1;
    EDUCATION_LEVELS[index]
}

/// Indices of sentences longer than 25 words.
pub fn find_difficult_sentences(text: &str) -> Vec<usize> {
    difficult_sentences_with(text, &PunctuationSplitter, ReadabilitySettings::default().difficult_sentence_words)
}

pub fn difficult_sentences_with(
    text: &str,
    splitter: &dyn SentenceSplitter,
    max_words: usize,
) -> Vec<usize> {
    splitter
        .split(text)
        .iter()
        .enumerate()
        .filter(|(_, span)| count_words(span.slice(text)) > max_words)
        .map(|(idx, _)| idx)
        .collect()
}

/// Mean count of alphanumeric characters per word, punctuation excluded.
pub fn average_word_length(text: &str) -> f64 {
    let mut words = 0usize;
    let mut chars = 0usize;
    for token in text.split_whitespace() {
        let len = token.chars().filter(|c| c.is_alphanumeric()).count();
        if len > 0 {
            words += 1;
            chars += len;
        }
    }
    if words == 0 {
        0.0
    } else {
        chars as f64 / words as f64
    }
}

pub fn analyze_readability(text: &str) -> ReadabilityMetrics {
    readability_metrics(text, &PunctuationSplitter, &ReadabilitySettings::default())
}

pub fn readability_metrics(
    text: &str,
    splitter: &dyn SentenceSplitter,
    settings: &ReadabilitySettings,
) -> ReadabilityMetrics {
    let grade = flesch_kincaid_grade_with(text, splitter);
    let sentences = splitter.split(text).len();
    let words = count_words(text);
    let average_sentence_length = if sentences == 0 {
        0.0
    } else {
        round1(words as f64 / sentences as f64)
    };
    ReadabilityMetrics {
        flesch_kincaid_grade: grade,
        education_level: get_education_level(grade).to_string(),
        average_sentence_length,
        average_word_length: round1(average_word_length(text)),
        difficult_sentences: difficult_sentences_with(
            text,
            splitter,
            settings.difficult_sentence_words,
        ),
    }
}

/// Long sentences become clarity warnings; a high average word length adds
/// one whole-text suggestion.
pub fn readability_issues(
    text: &str,
    splitter: &dyn SentenceSplitter,
    settings: &ReadabilitySettings,
    ids: &dyn IdGenerator,
) -> Vec<Issue> {
    let mut issues = Vec::new();
    for span in splitter.split(text) {
        let words = count_words(span.slice(text));
        if words <= settings.difficult_sentence_words {
            continue;
        }
        let finding = Finding {
            category: Category::Clarity,
            severity: Severity::Warning,
            start: span.start,
            end: span.end,
            message: format!(
                "Sentence has {} words; aim for {} or fewer.",
                words, settings.difficult_sentence_words
            ),
            description: "Long sentences are hard to follow. Split it into shorter ones.".into(),
            suggestions: Vec::new(),
            rule: "long-sentence".into(),
        };
        issues.push(finding.into_issue(text, ids));
    }

    let average = average_word_length(text);
    if !text.is_empty() && average > settings.complex_word_length {
        let finding = Finding {
            category: Category::Clarity,
            severity: Severity::Suggestion,
            start: 0,
            end: text.len(),
            message: format!("Average word length is {:.1} characters.", average),
            description: "Simpler, shorter words make the text easier to read.".into(),
            suggestions: Vec::new(),
            rule: "complex-vocabulary".into(),
        };
        issues.push(finding.into_issue(text, ids));
    }
    issues
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::issue::SequentialIds;

    fn sentence_of(words: usize) -> String {
        let body = vec!["word"; words].join(" ");
        format!("{body}.")
    }

    #[test]
    fn syllables_for_short_and_empty_words() {
        assert_eq!(count_syllables(""), 0);
        assert_eq!(count_syllables("42"), 0);
        assert_eq!(count_syllables("the"), 1);
        assert_eq!(count_syllables("a"), 1);
    }

    #[test]
    fn syllables_handle_silent_e_and_le() {
        assert_eq!(count_syllables("make"), 1);
        assert_eq!(count_syllables("table"), 2);
        assert_eq!(count_syllables("little"), 2);
        assert_eq!(count_syllables("whole"), 1);
        assert_eq!(count_syllables("reading"), 2);
        assert_eq!(count_syllables("Beautiful,"), 3);
    }

    #[test]
    fn grade_is_zero_for_empty_text() {
        assert_eq!(calculate_flesch_kincaid_grade(""), 0.0);
        assert_eq!(calculate_flesch_kincaid_grade("   "), 0.0);
    }

    #[test]
    fn grade_matches_formula() {
        let text = "The cat sat on the mat. The dog ran fast.";
        let words: f64 = 10.0;
        let sentences: f64 = 2.0;
        let syllables: f64 = 10.0;
        let expected =
            ((0.39 * (words / sentences) + 11.8 * (syllables / words) - 15.59) * 10.0).round()
                / 10.0;
        assert_eq!(calculate_flesch_kincaid_grade(text), expected);
    }

    #[test]
    fn education_levels_are_clamped() {
        assert_eq!(get_education_level(-3.0), "Grade 1");
        assert_eq!(get_education_level(7.6), "Grade 8");
        assert_eq!(get_education_level(9.0), "High School Freshman");
        assert_eq!(get_education_level(16.2), "College Senior");
        assert_eq!(get_education_level(40.0), "Graduate Level");
    }

    #[test]
    fn difficult_sentence_threshold() {
        assert_eq!(find_difficult_sentences(&sentence_of(30)), vec![0]);
        assert!(find_difficult_sentences(&sentence_of(20)).is_empty());
        assert!(find_difficult_sentences(&sentence_of(25)).is_empty());
        let text = format!("{} {}", sentence_of(5), sentence_of(26));
        assert_eq!(find_difficult_sentences(&text), vec![1]);
    }

    #[test]
    fn issues_span_long_sentences() {
        let text = format!("Short one. {}", sentence_of(30));
        let issues = readability_issues(
            &text,
            &PunctuationSplitter,
            &ReadabilitySettings::default(),
            &SequentialIds::default(),
        );
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].rule, "long-sentence");
        assert_eq!(issues[0].severity, Severity::Warning);
        assert_eq!(&text[issues[0].start..issues[0].end], issues[0].original_text);
        assert!(issues[0].original_text.starts_with("word word"));
    }

    #[test]
    fn complex_vocabulary_spans_whole_text() {
        let text = "Institutional bureaucratization complicates implementation.";
        let issues = readability_issues(
            text,
            &PunctuationSplitter,
            &ReadabilitySettings::default(),
            &SequentialIds::default(),
        );
        let complex: Vec<_> = issues
            .iter()
            .filter(|i| i.rule == "complex-vocabulary")
            .collect();
        assert_eq!(complex.len(), 1);
        assert_eq!(complex[0].start, 0);
        assert_eq!(complex[0].end, text.len());
        assert_eq!(complex[0].severity, Severity::Suggestion);
    }

    #[test]
    fn average_word_length_ignores_punctuation() {
        assert_eq!(average_word_length("ab, cd!"), 2.0);
        assert_eq!(average_word_length("-- !!"), 0.0);
    }

    #[test]
    fn metrics_for_empty_text_are_zero() {
        let metrics = analyze_readability("");
        assert_eq!(metrics.flesch_kincaid_grade, 0.0);
        assert_eq!(metrics.average_sentence_length, 0.0);
        assert!(metrics.difficult_sentences.is_empty());
    }
}
