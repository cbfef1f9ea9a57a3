//! Proofread core analysis engine.
//! Detects spelling, grammar, clarity, engagement and delivery issues in
//! plain text, scores the result, and supports correction with re-analysis.

pub mod advanced;
pub mod correction;
pub mod dismissal;
pub mod engine;
pub mod issue;
pub mod readability;
pub mod rules;
pub mod score;
pub mod stats;
pub mod text;
pub mod tone;

use anyhow::Context;
use serde::{Deserialize, Serialize};

pub use correction::{
    adjust_issue_positions, apply_correction_from_issue, apply_text_correction,
    calculate_position_delta, validate_correction, CorrectionError, CorrectionHandler,
    CorrectionOutcome,
};
pub use dismissal::{DismissalManager, DismissalSettings, DismissalState, DismissedPattern};
pub use engine::{
    analyze_after_correction, analyze_text, create_empty_analysis_result, AnalysisEngine,
    AnalysisResult, Analyzer, CorrectedAnalysis,
};
pub use issue::{Category, Correction, IdGenerator, Issue, SequentialIds, Severity, UuidIds};
pub use readability::{ReadabilityMetrics, ReadabilitySettings};
pub use score::WritingScore;
pub use stats::{StatisticsSettings, TextStatistics};
pub use text::{PunctuationSplitter, SentenceSplitter, Span, UnicodeSplitter};
pub use tone::{ToneAnalysis, ToneBreakdown, ToneType};

/// Sentence segmentation strategy.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum SplitterKind {
    #[default]
    Punctuation,
    Unicode,
}

/// Per-detector switches. Everything is on by default.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Checks {
    pub typos: bool,
    pub contractions: bool,
    pub confusables: bool,
    pub mechanics: bool,
    pub wordy_constructions: bool,
    pub overused_expressions: bool,
    pub weak_adjectives: bool,
    pub readability: bool,
    pub tone: bool,
    pub passive_voice: bool,
    pub redundant_phrases: bool,
    pub cliches: bool,
    pub number_formatting: bool,
}

impl Default for Checks {
    fn default() -> Self {
        Self {
            typos: true,
            contractions: true,
            confusables: true,
            mechanics: true,
            wordy_constructions: true,
            overused_expressions: true,
            weak_adjectives: true,
            readability: true,
            tone: true,
            passive_voice: true,
            redundant_phrases: true,
            cliches: true,
            number_formatting: true,
        }
    }
}

impl Checks {
    pub const NAMES: [&'static str; 13] = [
        "typos",
        "contractions",
        "confusables",
        "mechanics",
        "wordy-constructions",
        "overused-expressions",
        "weak-adjectives",
        "readability",
        "tone",
        "passive-voice",
        "redundant-phrases",
        "cliches",
        "number-formatting",
    ];

    /// Looks a switch up by its kebab-case or snake_case name.
    pub fn flag_mut(&mut self, name: &str) -> Option<&mut bool> {
        let flag = match name.trim().replace('_', "-").as_str() {
            "typos" => &mut self.typos,
            "contractions" => &mut self.contractions,
            "confusables" => &mut self.confusables,
            "mechanics" => &mut self.mechanics,
            "wordy-constructions" => &mut self.wordy_constructions,
            "overused-expressions" => &mut self.overused_expressions,
            "weak-adjectives" => &mut self.weak_adjectives,
            "readability" => &mut self.readability,
            "tone" => &mut self.tone,
            "passive-voice" => &mut self.passive_voice,
            "redundant-phrases" => &mut self.redundant_phrases,
            "cliches" => &mut self.cliches,
            "number-formatting" => &mut self.number_formatting,
            _ => return None,
        };
        Some(flag)
    }

    /// Turns every check off except the named ones.
    pub fn only<'a>(&mut self, names: impl IntoIterator<Item = &'a str>) -> anyhow::Result<()> {
        let mut selected = Checks::none();
        for name in names {
            *selected
                .flag_mut(name)
                .with_context(|| format!("unknown check `{name}`"))? = true;
        }
        *self = selected;
        Ok(())
    }

    pub fn disable<'a>(&mut self, names: impl IntoIterator<Item = &'a str>) -> anyhow::Result<()> {
        for name in names {
            *self
                .flag_mut(name)
                .with_context(|| format!("unknown check `{name}`"))? = false;
        }
        Ok(())
    }

    fn none() -> Self {
        Self {
            typos: false,
            contractions: false,
            confusables: false,
            mechanics: false,
            wordy_constructions: false,
            overused_expressions: false,
            weak_adjectives: false,
            readability: false,
            tone: false,
            passive_voice: false,
            redundant_phrases: false,
            cliches: false,
            number_formatting: false,
        }
    }
}

/// Phrases that never produce issues, compared case-insensitively.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Whitelist {
    pub allowed_phrases: Vec<String>,
}

/// User-supplied rule compiled alongside the built-in tables.
/// Patterns are regexes matched case-insensitively.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CustomRule {
    pub id: String,
    pub pattern: String,
    pub category: Category,
    pub severity: Severity,
    pub message: String,
    pub description: String,
    pub replacements: Vec<String>,
}

impl Default for CustomRule {
    fn default() -> Self {
        Self {
            id: String::new(),
            pattern: String::new(),
            category: Category::Clarity,
            severity: Severity::Suggestion,
            message: String::new(),
            description: String::new(),
            replacements: Vec::new(),
        }
    }
}

/// Overall score below which a document fails.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreThresholds {
    pub fail_below: u32,
}

impl Default for ScoreThresholds {
    fn default() -> Self {
        Self { fail_below: 60 }
    }
}

/// Top-level configuration for the analyzer.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub splitter: SplitterKind,
    pub readability: ReadabilitySettings,
    pub statistics: StatisticsSettings,
    pub dismissals: DismissalSettings,
    pub checks: Checks,
    pub whitelist: Whitelist,
    pub custom_rules: Vec<CustomRule>,
    pub scores: ScoreThresholds,
}

impl Config {
    pub fn from_yaml_str(raw: &str) -> anyhow::Result<Self> {
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(raw).context("invalid proofread configuration")
    }
}
