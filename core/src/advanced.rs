//! Second-tier checks: passive voice, redundant phrases, clichés and mixed
//! number formatting.

use aho_corasick::{AhoCorasick, AhoCorasickBuilder};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::issue::{sort_issues, Category, Correction, Finding, IdGenerator, Issue, Severity};
use crate::rules::PhraseTable;
use crate::text::{match_case, PunctuationSplitter, SentenceSplitter};

static PASSIVE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(?:am|is|are|was|were|be|been|being)\s+(?:\w+ly\s+)?(?:\w+ed|known|seen|given|taken|written|done|made|built|found|shown|told|sent|held|kept|left|paid|brought|bought|caught|taught|thought|chosen|driven|eaten|fallen|forgotten|gotten|hidden|broken|spoken|stolen|torn|worn|beaten|begun|drawn|flown|grown|thrown|ridden|shaken|sold|won|lost|put|set|read)\b",
    )
    .expect("static regex")
});

static NUMBER_TOKEN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b\d+(?:[.,:/]\d+)*\b").expect("static regex"));

const NUMBER_WORDS: [&str; 20] = [
    "one", "two", "three", "four", "five", "six", "seven", "eight", "nine", "ten", "eleven",
    "twelve", "thirteen", "fourteen", "fifteen", "sixteen", "seventeen", "eighteen", "nineteen",
    "twenty",
];

static NUMBER_WORD_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"(?i)\b(?:{})\b", NUMBER_WORDS.join("|"))).expect("static regex")
});

const REDUNDANT_PHRASES: PhraseTable = &[
    ("absolutely essential", &["essential"]),
    ("basic fundamentals", &["fundamentals", "basics"]),
    ("completely finished", &["finished"]),
    ("end result", &["result"]),
    ("past history", &["history"]),
    ("each and every", &["each", "every"]),
    ("first and foremost", &["first"]),
    ("future plans", &["plans"]),
    ("free gift", &["gift"]),
    ("added bonus", &["bonus"]),
    ("advance planning", &["planning"]),
    ("it is important to note that", &["note that", "notably,"]),
    ("the reason why is because", &["because"]),
    ("with regard to", &["about", "regarding"]),
    ("in the near future", &["soon"]),
    ("on a daily basis", &["daily"]),
    ("whether or not", &["whether"]),
    ("at the present time", &["now", "currently"]),
    ("make a decision", &["decide"]),
];

const CLICHES: PhraseTable = &[
    ("avoid it like the plague", &["avoid it at all costs", "steer clear of it"]),
    ("bite the bullet", &["accept the hardship", "face it"]),
    ("cut to the chase", &["get to the point"]),
    ("piece of cake", &["easy", "simple"]),
    ("the calm before the storm", &["a quiet moment before trouble"]),
    ("only time will tell", &["the outcome is uncertain"]),
    ("in the nick of time", &["just in time", "at the last moment"]),
    ("last but not least", &["finally", "lastly"]),
    ("a blessing in disguise", &["an unexpected benefit"]),
    ("every cloud has a silver lining", &["there is some good in this"]),
    ("better late than never", &["late, but welcome"]),
    ("hit the ground running", &["start quickly", "start at full speed"]),
    ("the tip of the iceberg", &["a small part of the problem"]),
    ("think on your feet", &["adapt quickly"]),
    ("back to square one", &["starting over"]),
];

static REDUNDANT_MATCHER: Lazy<AhoCorasick> = Lazy::new(|| table_matcher(REDUNDANT_PHRASES));
static CLICHE_MATCHER: Lazy<AhoCorasick> = Lazy::new(|| table_matcher(CLICHES));

fn table_matcher(table: PhraseTable) -> AhoCorasick {
    AhoCorasickBuilder::new()
        .ascii_case_insensitive(true)
        .build(table.iter().map(|(phrase, _)| *phrase))
}

/// Copula plus past participle, matched sentence by sentence.
pub fn detect_passive_voice(
    text: &str,
    splitter: &dyn SentenceSplitter,
    ids: &dyn IdGenerator,
) -> Vec<Issue> {
    let mut issues = Vec::new();
    for span in splitter.split(text) {
        for mat in PASSIVE_RE.find_iter(span.slice(text)) {
            let finding = Finding {
                category: Category::Delivery,
                severity: Severity::Suggestion,
                start: span.start + mat.start(),
                end: span.start + mat.end(),
                message: format!("Passive voice: `{}`", mat.as_str()),
                description: "Active voice is usually more direct.".into(),
                suggestions: vec![Correction::new(mat.as_str(), 0.5)
                    .with_description("Rephrase actively so the subject performs the action")],
                rule: "passive-voice-nlp".into(),
            };
            issues.push(finding.into_issue(text, ids));
        }
    }
    issues
}

fn is_word_bounded(text: &str, start: usize, end: usize) -> bool {
    let before = text[..start].chars().next_back();
    let after = text[end..].chars().next();
    !before.is_some_and(char::is_alphanumeric) && !after.is_some_and(char::is_alphanumeric)
}

/// Every non-overlapping, whole-word occurrence of each table phrase,
/// scanned left to right per phrase.
fn scan_phrase_table(
    text: &str,
    matcher: &AhoCorasick,
    table: PhraseTable,
    template: &PhraseFinding,
    ids: &dyn IdGenerator,
) -> Vec<Issue> {
    let mut resume_at = vec![0usize; table.len()];
    let mut issues = Vec::new();
    for mat in matcher.find_overlapping_iter(text) {
        let pattern = mat.pattern();
        if mat.start() < resume_at[pattern] || !is_word_bounded(text, mat.start(), mat.end()) {
            continue;
        }
        resume_at[pattern] = mat.end();
        let matched = &text[mat.start()..mat.end()];
        let (_, alternatives) = table[pattern];
        let suggestions = alternatives
            .iter()
            .enumerate()
            .map(|(rank, alt)| {
                let confidence = (template.confidence - 0.1 * rank as f32).max(0.7);
                Correction::new(match_case(matched, alt), confidence)
            })
            .collect();
        let finding = Finding {
            category: template.category,
            severity: Severity::Suggestion,
            start: mat.start(),
            end: mat.end(),
            message: format!("{}: `{}`", template.label, matched),
            description: template.description.into(),
            suggestions,
            rule: template.rule.into(),
        };
        issues.push(finding.into_issue(text, ids));
    }
    sort_issues(&mut issues);
    issues
}

struct PhraseFinding {
    category: Category,
    rule: &'static str,
    label: &'static str,
    description: &'static str,
    confidence: f32,
}

pub fn detect_redundant_phrases(text: &str, ids: &dyn IdGenerator) -> Vec<Issue> {
    let template = PhraseFinding {
        category: Category::Clarity,
        rule: "redundant-phrase",
        label: "Wordy phrase",
        description: "This phrase can be shortened without losing meaning.",
        confidence: 0.9,
    };
    scan_phrase_table(text, &REDUNDANT_MATCHER, REDUNDANT_PHRASES, &template, ids)
}

pub fn detect_cliches(text: &str, ids: &dyn IdGenerator) -> Vec<Issue> {
    let template = PhraseFinding {
        category: Category::Engagement,
        rule: "cliche",
        label: "Cliché",
        description: "Familiar phrases lose their impact. Say it in your own words.",
        confidence: 0.8,
    };
    scan_phrase_table(text, &CLICHE_MATCHER, CLICHES, &template, ids)
}

fn number_word_value(word: &str) -> Option<usize> {
    let lower = word.to_ascii_lowercase();
    NUMBER_WORDS.iter().position(|w| *w == lower).map(|i| i + 1)
}

/// When both `1`-`20` digits and their spelled-out forms appear, flags the
/// less frequent form. Ties flag the digits.
pub fn detect_inconsistent_number_formatting(text: &str, ids: &dyn IdGenerator) -> Vec<Issue> {
    let digits: Vec<(usize, usize, usize)> = NUMBER_TOKEN_RE
        .find_iter(text)
        .filter_map(|m| {
            let value: usize = m.as_str().parse().ok()?;
            (1..=20)
                .contains(&value)
                .then_some((m.start(), m.end(), value))
        })
        .collect();
    let words: Vec<(usize, usize, usize)> = NUMBER_WORD_RE
        .find_iter(text)
        .filter_map(|m| number_word_value(m.as_str()).map(|v| (m.start(), m.end(), v)))
        .collect();

    if digits.is_empty() || words.is_empty() {
        return Vec::new();
    }

    let flag_digits = digits.len() <= words.len();
    let (minority, to_form) = if flag_digits {
        (&digits, "words")
    } else {
        (&words, "digits")
    };

    minority
        .iter()
        .map(|&(start, end, value)| {
            let original = &text[start..end];
            let replacement = if flag_digits {
                NUMBER_WORDS[value - 1].to_string()
            } else {
                value.to_string()
            };
            Finding {
                category: Category::Delivery,
                severity: Severity::Suggestion,
                start,
                end,
                message: format!("Inconsistent number format: `{original}`"),
                description: format!("Most numbers in this text are written as {to_form}."),
                suggestions: vec![Correction::new(replacement, 0.8)
                    .with_description(format!("Write the number as {to_form}"))],
                rule: "inconsistent-numbers".into(),
            }
            .into_issue(text, ids)
        })
        .collect()
}

/// All advanced checks with the default splitter.
pub fn run_advanced_checks(text: &str, ids: &dyn IdGenerator) -> Vec<Issue> {
    run_advanced_checks_with(text, &PunctuationSplitter, &AdvancedChecks::default(), ids)
}

/// Toggles for the individual advanced checks.
#[derive(Debug, Clone, Copy)]
pub struct AdvancedChecks {
    pub passive_voice: bool,
    pub redundant_phrases: bool,
    pub cliches: bool,
    pub number_formatting: bool,
}

impl Default for AdvancedChecks {
    fn default() -> Self {
        Self {
            passive_voice: true,
            redundant_phrases: true,
            cliches: true,
            number_formatting: true,
        }
    }
}

pub fn run_advanced_checks_with(
    text: &str,
    splitter: &dyn SentenceSplitter,
    checks: &AdvancedChecks,
    ids: &dyn IdGenerator,
) -> Vec<Issue> {
    let mut issues = Vec::new();
    if checks.passive_voice {
        issues.extend(detect_passive_voice(text, splitter, ids));
    }
    if checks.redundant_phrases {
        issues.extend(detect_redundant_phrases(text, ids));
    }
    if checks.cliches {
        issues.extend(detect_cliches(text, ids));
    }
    if checks.number_formatting {
        issues.extend(detect_inconsistent_number_formatting(text, ids));
    }
    sort_issues(&mut issues);
    issues
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::issue::SequentialIds;

    fn ids() -> SequentialIds {
        SequentialIds::default()
    }

    #[test]
    fn passive_voice_is_flagged_with_rule_id() {
        let text = "The report was written by the team. We shipped it.";
        let issues = detect_passive_voice(text, &PunctuationSplitter, &ids());
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].original_text, "was written");
        assert_eq!(issues[0].rule, "passive-voice-nlp");
        assert_eq!(issues[0].category, Category::Delivery);
        assert_eq!(issues[0].severity, Severity::Suggestion);
        assert!(!issues[0].suggestions.is_empty());
    }

    #[test]
    fn passive_voice_allows_adverb() {
        let text = "The bug was quickly fixed.";
        let issues = detect_passive_voice(text, &PunctuationSplitter, &ids());
        assert_eq!(issues[0].original_text, "was quickly fixed");
    }

    #[test]
    fn redundant_phrases_find_every_occurrence() {
        let text = "The end result matters. The END RESULT is all. End result.";
        let issues = detect_redundant_phrases(text, &ids());
        assert_eq!(issues.len(), 3);
        assert_eq!(issues[1].original_text, "END RESULT");
        assert_eq!(issues[1].suggestions[0].text, "RESULT");
        assert!(issues.windows(2).all(|w| w[0].end <= w[1].start));
    }

    #[test]
    fn cliches_are_engagement_suggestions() {
        let text = "Last but not least, it was a piece of cake.";
        let issues = detect_cliches(text, &ids());
        assert_eq!(issues.len(), 2);
        assert!(issues.iter().all(|i| i.category == Category::Engagement));
        assert_eq!(issues[0].suggestions[0].text, "Finally");
        for issue in &issues {
            for s in &issue.suggestions {
                assert!((0.7..=0.9).contains(&s.confidence));
            }
        }
    }

    #[test]
    fn mixed_numbers_flag_digits_on_tie() {
        let text = "I have 5 apples and three oranges.";
        let issues = detect_inconsistent_number_formatting(text, &ids());
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].original_text, "5");
        assert_eq!(issues[0].suggestions[0].text, "five");
    }

    #[test]
    fn mixed_numbers_flag_minority_words() {
        let text = "Buy 2 pens, 4 pads and seven clips.";
        let issues = detect_inconsistent_number_formatting(text, &ids());
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].original_text, "seven");
        assert_eq!(issues[0].suggestions[0].text, "7");
    }

    #[test]
    fn single_format_emits_nothing() {
        assert!(detect_inconsistent_number_formatting("I have 5 apples and 3 oranges.", &ids()).is_empty());
        assert!(detect_inconsistent_number_formatting("One or two.", &ids()).is_empty());
    }

    #[test]
    fn digits_inside_words_are_not_numbers() {
        let text = "She finished 5th out of three runners.";
        assert!(detect_inconsistent_number_formatting(text, &ids()).is_empty());
        let text = "Print on A4 paper, 3rd floor, for two people.";
        assert!(detect_inconsistent_number_formatting(text, &ids()).is_empty());
    }

    #[test]
    fn phrases_inside_longer_words_are_skipped() {
        assert!(detect_redundant_phrases("The trend results are in.", &ids()).is_empty());
        let issues = detect_redundant_phrases("Trend results aside, the end result held.", &ids());
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].original_text, "end result");
    }

    #[test]
    fn large_and_decimal_numbers_are_ignored() {
        let text = "We sold 1,500 units at 2.5 each to three buyers.";
        assert!(detect_inconsistent_number_formatting(text, &ids()).is_empty());
    }

    #[test]
    fn aggregate_is_sorted() {
        let text = "First and foremost, the cake was eaten in the nick of time by 3 of the five kids.";
        let issues = run_advanced_checks(text, &ids());
        assert!(issues.len() >= 4);
        assert!(issues.windows(2).all(|w| w[0].start <= w[1].start));
        for issue in &issues {
            assert_eq!(&text[issue.start..issue.end], issue.original_text);
        }
    }
}
