//! Lexicon-based tone scoring and sentence-level consistency checks.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::issue::{Category, Finding, IdGenerator, Issue, Severity};
use crate::rules::phrase_pattern;
use crate::text::{PunctuationSplitter, SentenceSplitter};

/// Tone types in tie-break order.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum ToneType {
    Formal,
    Informal,
    Confident,
    Neutral,
    Friendly,
}

impl ToneType {
    pub const ALL: [ToneType; 5] = [
        ToneType::Formal,
        ToneType::Informal,
        ToneType::Confident,
        ToneType::Neutral,
        ToneType::Friendly,
    ];

    fn index(self) -> usize {
        match self {
            ToneType::Formal => 0,
            ToneType::Informal => 1,
            ToneType::Confident => 2,
            ToneType::Neutral => 3,
            ToneType::Friendly => 4,
        }
    }
}

impl std::fmt::Display for ToneType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ToneType::Formal => "formal",
            ToneType::Informal => "informal",
            ToneType::Confident => "confident",
            ToneType::Neutral => "neutral",
            ToneType::Friendly => "friendly",
        };
        f.write_str(name)
    }
}

const FORMAL: &[&str] = &[
    "therefore",
    "furthermore",
    "moreover",
    "consequently",
    "nevertheless",
    "hence",
    "thus",
    "accordingly",
    "regarding",
    "pursuant",
    "herein",
    "whereas",
    "notwithstanding",
    "subsequently",
    "henceforth",
    "sincerely",
    "respectfully",
    "in addition",
    "with respect to",
    "shall",
];

const INFORMAL: &[&str] = &[
    "hey",
    "gonna",
    "wanna",
    "gotta",
    "yeah",
    "yep",
    "nope",
    "cool",
    "awesome",
    "stuff",
    "kinda",
    "sorta",
    "lol",
    "btw",
    "you know",
    "guys",
    "okay",
    "ok",
    "totally",
    "super",
];

const CONFIDENT: &[&str] = &[
    "definitely",
    "certainly",
    "clearly",
    "undoubtedly",
    "absolutely",
    "without a doubt",
    "guarantee",
    "guaranteed",
    "proven",
    "confident",
    "assured",
    "unquestionably",
    "no doubt",
    "we will deliver",
];

const FRIENDLY: &[&str] = &[
    "thanks",
    "thank you",
    "please",
    "appreciate",
    "glad",
    "happy",
    "welcome",
    "hope",
    "enjoy",
    "wonderful",
    "delighted",
    "feel free",
    "looking forward",
    "cheers",
    "kind",
    "warm",
];

static LEXICONS: Lazy<Vec<(ToneType, Regex)>> = Lazy::new(|| {
    [
        (ToneType::Formal, FORMAL),
        (ToneType::Informal, INFORMAL),
        (ToneType::Confident, CONFIDENT),
        (ToneType::Friendly, FRIENDLY),
    ]
    .into_iter()
    .map(|(tone, terms)| (tone, phrase_pattern(terms).expect("static regex")))
    .collect()
});

/// Raw indicator counts per tone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ToneScores([u32; 5]);

impl ToneScores {
    pub fn get(&self, tone: ToneType) -> u32 {
        self.0[tone.index()]
    }

    pub fn total(&self) -> u32 {
        self.0.iter().sum()
    }
}

/// Percentages per tone; always sums to exactly 100.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct ToneBreakdown {
    pub formal: u32,
    pub informal: u32,
    pub confident: u32,
    pub neutral: u32,
    pub friendly: u32,
}

impl ToneBreakdown {
    fn from_array(values: [u32; 5]) -> Self {
        Self {
            formal: values[0],
            informal: values[1],
            confident: values[2],
            neutral: values[3],
            friendly: values[4],
        }
    }

    pub fn all_neutral() -> Self {
        Self::from_array([0, 0, 0, 100, 0])
    }

    pub fn get(&self, tone: ToneType) -> u32 {
        match tone {
            ToneType::Formal => self.formal,
            ToneType::Informal => self.informal,
            ToneType::Confident => self.confident,
            ToneType::Neutral => self.neutral,
            ToneType::Friendly => self.friendly,
        }
    }

    pub fn total(&self) -> u32 {
        ToneType::ALL.iter().map(|t| self.get(*t)).sum()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToneInconsistency {
    pub start: usize,
    pub end: usize,
    pub detected_tone: ToneType,
    pub expected_tone: ToneType,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToneAnalysis {
    pub dominant: ToneType,
    pub breakdown: ToneBreakdown,
    pub is_consistent: bool,
    pub inconsistencies: Vec<ToneInconsistency>,
}

impl Default for ToneAnalysis {
    fn default() -> Self {
        Self {
            dominant: ToneType::Neutral,
            breakdown: ToneBreakdown::all_neutral(),
            is_consistent: true,
            inconsistencies: Vec::new(),
        }
    }
}

/// Counts whole-word indicator hits per lexicon. Neutral scores 1 only when
/// nothing else matched.
pub fn calculate_tone_scores(text: &str) -> ToneScores {
    let mut scores = [0u32; 5];
    for (tone, regex) in LEXICONS.iter() {
        scores[tone.index()] = regex.find_iter(text).count() as u32;
    }
    if scores.iter().sum::<u32>() == 0 {
        scores[ToneType::Neutral.index()] = 1;
    }
    ToneScores(scores)
}

/// First tone with the strictly highest score, in [`ToneType::ALL`] order.
pub fn get_dominant_tone(scores: &ToneScores) -> ToneType {
    let mut best = ToneType::ALL[0];
    for tone in ToneType::ALL {
        if scores.get(tone) > scores.get(best) {
            best = tone;
        }
    }
    best
}

/// Scales scores to percentages. The rounding remainder goes to the largest
/// bucket so the sum is exactly 100.
pub fn normalize_to_percentages(scores: &ToneScores) -> ToneBreakdown {
    let total = scores.total();
    if total == 0 {
        return ToneBreakdown::all_neutral();
    }
    let mut rounded = [0i64; 5];
    for tone in ToneType::ALL {
        let share = f64::from(scores.get(tone)) * 100.0 / f64::from(total);
        rounded[tone.index()] = share.round() as i64;
    }
    let remainder = 100 - rounded.iter().sum::<i64>();
    let largest = get_dominant_tone(scores);
    rounded[largest.index()] += remainder;

    let mut values = [0u32; 5];
    for (slot, value) in values.iter_mut().zip(rounded) {
        *slot = value.max(0) as u32;
    }
    ToneBreakdown::from_array(values)
}

pub fn analyze_tone(text: &str) -> ToneAnalysis {
    analyze_tone_with(text, &PunctuationSplitter)
}

pub fn analyze_tone_with(text: &str, splitter: &dyn SentenceSplitter) -> ToneAnalysis {
    if text.trim().is_empty() {
        return ToneAnalysis::default();
    }
    let scores = calculate_tone_scores(text);
    let dominant = get_dominant_tone(&scores);
    let breakdown = normalize_to_percentages(&scores);

    let mut inconsistencies = Vec::new();
    if dominant != ToneType::Neutral {
        for span in splitter.split(text) {
            let sentence_scores = calculate_tone_scores(span.slice(text));
            let detected = get_dominant_tone(&sentence_scores);
            if detected != dominant
                && detected != ToneType::Neutral
                && sentence_scores.get(detected) > sentence_scores.get(dominant)
            {
                inconsistencies.push(ToneInconsistency {
                    start: span.start,
                    end: span.end,
                    detected_tone: detected,
                    expected_tone: dominant,
                });
            }
        }
    }

    ToneAnalysis {
        dominant,
        breakdown,
        is_consistent: inconsistencies.is_empty(),
        inconsistencies,
    }
}

/// One delivery suggestion per inconsistent sentence.
pub fn tone_issues(text: &str, analysis: &ToneAnalysis, ids: &dyn IdGenerator) -> Vec<Issue> {
    analysis
        .inconsistencies
        .iter()
        .map(|inc| {
            Finding {
                category: Category::Delivery,
                severity: Severity::Suggestion,
                start: inc.start,
                end: inc.end,
                message: format!(
                    "Sentence sounds {} while the text is mostly {}.",
                    inc.detected_tone, inc.expected_tone
                ),
                description: "Keep a consistent tone throughout the text.".into(),
                suggestions: Vec::new(),
                rule: "tone-inconsistency".into(),
            }
            .into_issue(text, ids)
        })
        .collect()
}
