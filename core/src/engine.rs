//! Orchestrator: runs every detector, scores the result, and drives the
//! correct / re-analyse / dismiss loop.

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use anyhow::Context;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::advanced::{run_advanced_checks_with, AdvancedChecks};
use crate::correction::{apply_text_correction, CorrectionError};
use crate::dismissal::{DismissalManager, DismissalState, DismissedPattern};
use crate::issue::{sort_issues, Category, IdGenerator, Issue, UuidIds};
use crate::readability::{readability_issues, readability_metrics, ReadabilityMetrics};
use crate::rules::{self, analyze_with_rules, Rule, Suggest};
use crate::score::{calculate_writing_score, WritingScore};
use crate::stats::{statistics_with, TextStatistics};
use crate::text::{normalize_phrase, PunctuationSplitter, SentenceSplitter, UnicodeSplitter};
use crate::tone::{analyze_tone_with, tone_issues, ToneAnalysis};
use crate::{Config, SplitterKind};

/// Immutable snapshot produced by one analysis pass.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnalysisResult {
    pub issues: Vec<Issue>,
    pub score: WritingScore,
    pub readability: ReadabilityMetrics,
    pub tone: ToneAnalysis,
    pub statistics: TextStatistics,
}

impl AnalysisResult {
    pub fn category_counts(&self) -> BTreeMap<Category, usize> {
        let mut counts: BTreeMap<Category, usize> =
            Category::ALL.iter().map(|c| (*c, 0)).collect();
        for issue in &self.issues {
            *counts.entry(issue.category).or_default() += 1;
        }
        counts
    }
}

impl Default for AnalysisResult {
    fn default() -> Self {
        create_empty_analysis_result()
    }
}

/// No issues, perfect scores, zero statistics, neutral tone.
pub fn create_empty_analysis_result() -> AnalysisResult {
    AnalysisResult {
        issues: Vec::new(),
        score: WritingScore::default(),
        readability: ReadabilityMetrics::default(),
        tone: ToneAnalysis::default(),
        statistics: TextStatistics::default(),
    }
}

/// Corrected text with its fresh analysis.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CorrectedAnalysis {
    pub text: String,
    pub result: AnalysisResult,
}

/// Compiled rule tables and settings, reusable across documents.
pub struct Analyzer {
    config: Config,
    rules: Vec<Rule>,
    allow_phrase_set: HashSet<String>,
    splitter: Box<dyn SentenceSplitter>,
    ids: Arc<dyn IdGenerator>,
}

impl std::fmt::Debug for Analyzer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Analyzer")
            .field("rules", &self.rules.len())
            .field("splitter", &self.config.splitter)
            .finish_non_exhaustive()
    }
}

impl Default for Analyzer {
    fn default() -> Self {
        Self::with_rules(Config::default(), Vec::new())
    }
}

impl Analyzer {
    /// Compiles built-in tables plus any configured custom rules.
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let mut custom = Vec::new();
        for rule in &config.custom_rules {
            let id = rule.id.trim();
            if id.is_empty() || rule.pattern.trim().is_empty() {
                continue;
            }
            let pattern = Regex::new(&format!("(?i){}", rule.pattern))
                .with_context(|| format!("invalid pattern in custom rule `{id}`"))?;
            let suggest = if rule.replacements.is_empty() {
                Suggest::None
            } else {
                Suggest::Alternatives(rule.replacements.clone())
            };
            let message = if rule.message.is_empty() {
                format!("Flagged by `{id}`: `{{text}}`")
            } else {
                rule.message.clone()
            };
            custom.push(
                Rule::new(id, rule.category, rule.severity, pattern, message, rule.description.clone())
                    .with_suggest(suggest),
            );
        }
        Ok(Self::with_rules(config, custom))
    }

    fn with_rules(config: Config, custom: Vec<Rule>) -> Self {
        let checks = &config.checks;
        let groups: [(bool, fn() -> Vec<Rule>); 7] = [
            (checks.typos, rules::typo_rules),
            (checks.contractions, rules::contraction_rules),
            (checks.confusables, rules::confusable_rules),
            (checks.mechanics, rules::mechanics_rules),
            (checks.wordy_constructions, rules::wordy_construction_rules),
            (checks.overused_expressions, rules::overused_expression_rules),
            (checks.weak_adjectives, rules::weak_adjective_rules),
        ];
        let mut compiled: Vec<Rule> = groups
            .into_iter()
            .filter(|(enabled, _)| *enabled)
            .flat_map(|(_, build)| build())
            .collect();
        compiled.extend(custom);

        let allow_phrase_set = config
            .whitelist
            .allowed_phrases
            .iter()
            .map(|p| normalize_phrase(p))
            .collect();
        let splitter: Box<dyn SentenceSplitter> = match config.splitter {
            SplitterKind::Punctuation => Box::new(PunctuationSplitter),
            SplitterKind::Unicode => Box::new(UnicodeSplitter),
        };

        Self {
            config,
            rules: compiled,
            allow_phrase_set,
            splitter,
            ids: Arc::new(UuidIds),
        }
    }

    pub fn with_id_generator(mut self, ids: Arc<dyn IdGenerator>) -> Self {
        self.ids = ids;
        self
    }

    pub fn with_splitter(mut self, splitter: Box<dyn SentenceSplitter>) -> Self {
        self.splitter = splitter;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    #[tracing::instrument(skip_all, fields(text_len = text.len()))]
    pub fn analyze(&self, text: &str) -> AnalysisResult {
        let ids = self.ids.as_ref();
        let splitter = self.splitter.as_ref();
        let checks = &self.config.checks;

        let mut issues = analyze_with_rules(text, &self.rules, ids);
        debug!(count = issues.len(), "rule engine");

        if checks.readability {
            let found = readability_issues(text, splitter, &self.config.readability, ids);
            debug!(count = found.len(), "readability");
            issues.extend(found);
        }

        let tone = analyze_tone_with(text, splitter);
        if checks.tone {
            let found = tone_issues(text, &tone, ids);
            debug!(count = found.len(), "tone");
            issues.extend(found);
        }

        let advanced = AdvancedChecks {
            passive_voice: checks.passive_voice,
            redundant_phrases: checks.redundant_phrases,
            cliches: checks.cliches,
            number_formatting: checks.number_formatting,
        };
        let found = run_advanced_checks_with(text, splitter, &advanced, ids);
        debug!(count = found.len(), "advanced checks");
        issues.extend(found);

        if !self.allow_phrase_set.is_empty() {
            issues.retain(|issue| {
                !self
                    .allow_phrase_set
                    .contains(&normalize_phrase(&issue.original_text))
            });
        }
        sort_issues(&mut issues);

        AnalysisResult {
            score: calculate_writing_score(&issues),
            readability: readability_metrics(text, splitter, &self.config.readability),
            tone,
            statistics: statistics_with(text, &self.config.statistics),
            issues,
        }
    }

    /// Substitutes the range, then analyses the new text from scratch.
    pub fn analyze_after_correction(
        &self,
        text: &str,
        start: usize,
        end: usize,
        correction: &str,
    ) -> Result<CorrectedAnalysis, CorrectionError> {
        let updated = apply_text_correction(text, start, end, correction)?;
        let result = self.analyze(&updated);
        Ok(CorrectedAnalysis {
            text: updated,
            result,
        })
    }
}

static DEFAULT_ANALYZER: Lazy<Analyzer> = Lazy::new(Analyzer::default);

/// Analyses `text` with the built-in configuration.
pub fn analyze_text(text: &str) -> AnalysisResult {
    DEFAULT_ANALYZER.analyze(text)
}

pub fn analyze_after_correction(
    text: &str,
    start: usize,
    end: usize,
    correction: &str,
) -> Result<CorrectedAnalysis, CorrectionError> {
    DEFAULT_ANALYZER.analyze_after_correction(text, start, end, correction)
}

/// Per-document state: current text, its analysis, and dismissal memory.
/// Results exposed by the engine never contain dismissed issues.
#[derive(Debug)]
pub struct AnalysisEngine {
    analyzer: Arc<Analyzer>,
    text: String,
    raw: AnalysisResult,
    result: AnalysisResult,
    dismissals: DismissalManager,
}

impl Default for AnalysisEngine {
    fn default() -> Self {
        Self::new(Analyzer::default())
    }
}

impl AnalysisEngine {
    pub fn new(analyzer: impl Into<Arc<Analyzer>>) -> Self {
        let analyzer = analyzer.into();
        let dismissals = DismissalManager::with_capacity(analyzer.config().dismissals.capacity);
        Self {
            analyzer,
            text: String::new(),
            raw: create_empty_analysis_result(),
            result: create_empty_analysis_result(),
            dismissals,
        }
    }

    pub fn analyze_immediate(&mut self, text: impl Into<String>) -> &AnalysisResult {
        self.text = text.into();
        self.raw = self.analyzer.analyze(&self.text);
        self.refresh();
        &self.result
    }

    /// Applies the substitution and re-analyses. State is untouched on error.
    pub fn apply_correction(
        &mut self,
        start: usize,
        end: usize,
        correction: &str,
    ) -> Result<&AnalysisResult, CorrectionError> {
        let corrected = self
            .analyzer
            .analyze_after_correction(&self.text, start, end, correction)?;
        debug!(start, end, replacement_len = correction.len(), "engine correction");
        self.text = corrected.text;
        self.raw = corrected.result;
        self.refresh();
        Ok(&self.result)
    }

    pub fn dismiss_issue(&mut self, issue: &Issue) -> String {
        let key = self.dismissals.dismiss(issue);
        self.refresh();
        key
    }

    pub fn undismiss_issue(&mut self, issue: &Issue) -> bool {
        let removed = self.dismissals.undismiss(issue);
        if removed {
            self.refresh();
        }
        removed
    }

    /// Clears text, result and dismissal memory together.
    pub fn reset(&mut self) {
        self.text.clear();
        self.raw = create_empty_analysis_result();
        self.result = create_empty_analysis_result();
        self.dismissals.reset();
    }

    pub fn result(&self) -> &AnalysisResult {
        &self.result
    }

    pub fn analyzer(&self) -> &Analyzer {
        &self.analyzer
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn dismissed_patterns(&self) -> Vec<&DismissedPattern> {
        self.dismissals.dismissed_patterns()
    }

    pub fn export_dismissals(&self) -> DismissalState {
        self.dismissals.export_state()
    }

    pub fn import_dismissals(&mut self, state: DismissalState) {
        self.dismissals.import_state(state);
        self.refresh();
    }

    fn refresh(&mut self) {
        self.result = AnalysisResult {
            issues: self.dismissals.filter_issues(&self.raw.issues),
            score: self
                .dismissals
                .calculate_score_excluding_dismissed(&self.raw.issues),
            ..self.raw.clone()
        };
    }
}
