//! Session-scoped memory of dismissed issue patterns.
//!
//! A pattern is the rule id plus the normalized flagged text, so dismissing
//! one issue hides every issue from the same rule on the same wording,
//! wherever it appears.

use std::collections::{HashMap, VecDeque};
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::Context;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::issue::Issue;
use crate::score::{calculate_writing_score, WritingScore};
use crate::text::normalize_phrase;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DismissalSettings {
    pub capacity: usize,
}

impl Default for DismissalSettings {
    fn default() -> Self {
        Self { capacity: 1000 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DismissedPattern {
    pub rule: String,
    pub text: String,
    /// Milliseconds since the Unix epoch.
    pub timestamp: u64,
}

impl DismissedPattern {
    pub fn key(&self) -> String {
        format!("{}:{}", self.rule, self.text)
    }
}

/// Serializable snapshot, oldest pattern first.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct DismissalState {
    pub patterns: Vec<DismissedPattern>,
}

impl DismissalState {
    pub fn from_json(raw: &str) -> anyhow::Result<Self> {
        serde_json::from_str(raw).context("invalid dismissal state")
    }

    pub fn to_json(&self) -> anyhow::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// `rule:lowercased-trimmed-text`.
pub fn pattern_key(issue: &Issue) -> String {
    format!("{}:{}", issue.rule, normalize_phrase(&issue.original_text))
}

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default()
}

/// Bounded pattern set with oldest-first eviction.
#[derive(Debug, Clone)]
pub struct DismissalManager {
    patterns: HashMap<String, DismissedPattern>,
    order: VecDeque<String>,
    capacity: usize,
}

impl Default for DismissalManager {
    fn default() -> Self {
        Self::with_capacity(DismissalSettings::default().capacity)
    }
}

impl DismissalManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            patterns: HashMap::new(),
            order: VecDeque::new(),
            capacity: capacity.max(1),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Records the issue's pattern, refreshing it if already present.
    pub fn dismiss(&mut self, issue: &Issue) -> String {
        let pattern = DismissedPattern {
            rule: issue.rule.clone(),
            text: normalize_phrase(&issue.original_text),
            timestamp: now_millis(),
        };
        let key = pattern.key();
        self.insert(key.clone(), pattern);
        debug!(key = %key, total = self.patterns.len(), "dismissed pattern");
        key
    }

    fn insert(&mut self, key: String, pattern: DismissedPattern) {
        if self.patterns.insert(key.clone(), pattern).is_some() {
            self.order.retain(|k| k != &key);
        }
        self.order.push_back(key);
        while self.patterns.len() > self.capacity {
            let Some(oldest) = self.order.pop_front() else {
                break;
            };
            self.patterns.remove(&oldest);
            debug!(key = %oldest, "evicted oldest dismissal");
        }
    }

    pub fn is_dismissed(&self, issue: &Issue) -> bool {
        self.patterns.contains_key(&pattern_key(issue))
    }

    pub fn is_key_dismissed(&self, key: &str) -> bool {
        self.patterns.contains_key(key)
    }

    pub fn undismiss(&mut self, issue: &Issue) -> bool {
        self.undismiss_by_key(&pattern_key(issue))
    }

    pub fn undismiss_by_key(&mut self, key: &str) -> bool {
        if self.patterns.remove(key).is_some() {
            self.order.retain(|k| k != key);
            true
        } else {
            false
        }
    }

    pub fn reset(&mut self) {
        self.patterns.clear();
        self.order.clear();
    }

    /// Patterns from oldest to newest.
    pub fn dismissed_patterns(&self) -> Vec<&DismissedPattern> {
        self.order
            .iter()
            .filter_map(|key| self.patterns.get(key))
            .collect()
    }

    pub fn filter_issues(&self, issues: &[Issue]) -> Vec<Issue> {
        issues
            .iter()
            .filter(|issue| !self.is_dismissed(issue))
            .cloned()
            .collect()
    }

    pub fn calculate_score_excluding_dismissed(&self, issues: &[Issue]) -> WritingScore {
        calculate_writing_score(&self.filter_issues(issues))
    }

    pub fn export_state(&self) -> DismissalState {
        DismissalState {
            patterns: self.dismissed_patterns().into_iter().cloned().collect(),
        }
    }

    /// Replaces the current patterns with the snapshot.
    pub fn import_state(&mut self, state: DismissalState) {
        self.reset();
        for pattern in state.patterns {
            self.insert(pattern.key(), pattern);
        }
        debug!(total = self.patterns.len(), "imported dismissal state");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::issue::{Category, Severity};

    fn issue(rule: &str, text: &str, start: usize) -> Issue {
        Issue {
            id: format!("{rule}-{start}"),
            category: Category::Correctness,
            severity: Severity::Error,
            start,
            end: start + text.len(),
            original_text: text.into(),
            message: String::new(),
            description: String::new(),
            suggestions: Vec::new(),
            rule: rule.into(),
        }
    }

    #[test]
    fn dismissal_matches_pattern_not_position() {
        let mut manager = DismissalManager::new();
        let key = manager.dismiss(&issue("common-typo", "Alot", 0));
        assert_eq!(key, "common-typo:alot");
        assert!(manager.is_dismissed(&issue("common-typo", "alot", 40)));
        assert!(manager.is_dismissed(&issue("common-typo", "  ALOT ", 7)));
        assert!(!manager.is_dismissed(&issue("other-rule", "alot", 0)));
        assert!(!manager.is_dismissed(&issue("common-typo", "teh", 0)));
    }

    #[test]
    fn undismiss_and_reset() {
        let mut manager = DismissalManager::new();
        let a = issue("r", "a", 0);
        let b = issue("r", "b", 0);
        manager.dismiss(&a);
        manager.dismiss(&b);
        assert!(manager.undismiss(&a));
        assert!(!manager.undismiss(&a));
        assert!(!manager.is_dismissed(&a));
        assert!(manager.undismiss_by_key("r:b"));
        manager.dismiss(&a);
        manager.reset();
        assert!(manager.is_empty());
        assert!(!manager.is_dismissed(&a));
    }

    #[test]
    fn evicts_oldest_when_full() {
        let mut manager = DismissalManager::with_capacity(2);
        manager.dismiss(&issue("r", "one", 0));
        manager.dismiss(&issue("r", "two", 0));
        manager.dismiss(&issue("r", "one", 5));
        manager.dismiss(&issue("r", "three", 0));
        assert_eq!(manager.len(), 2);
        assert!(!manager.is_key_dismissed("r:two"));
        assert!(manager.is_key_dismissed("r:one"));
        assert!(manager.is_key_dismissed("r:three"));
    }

    #[test]
    fn default_capacity_is_one_thousand() {
        let mut manager = DismissalManager::new();
        for n in 0..1005 {
            manager.dismiss(&issue("r", &format!("w{n}"), 0));
        }
        assert_eq!(manager.len(), 1000);
        assert!(!manager.is_key_dismissed("r:w0"));
        assert!(manager.is_key_dismissed("r:w1004"));
    }

    #[test]
    fn score_excludes_dismissed_issues() {
        let issues = vec![issue("a", "x", 0), issue("b", "y", 2), issue("a", "x", 4)];
        let mut manager = DismissalManager::new();
        manager.dismiss(&issues[0]);
        let expected = calculate_writing_score(&[issues[1].clone()]);
        assert_eq!(manager.calculate_score_excluding_dismissed(&issues), expected);
    }

    #[test]
    fn export_import_round_trip() {
        let mut manager = DismissalManager::new();
        manager.dismiss(&issue("a", "first", 0));
        manager.dismiss(&issue("b", "Second Thing", 0));
        let json = manager.export_state().to_json().unwrap();

        let mut restored = DismissalManager::new();
        restored.import_state(DismissalState::from_json(&json).unwrap());
        assert_eq!(restored.export_state(), manager.export_state());
        assert!(restored.is_key_dismissed("b:second thing"));
    }

    #[test]
    fn rejects_malformed_state() {
        assert!(DismissalState::from_json("{\"patterns\": 3}").is_err());
        assert_eq!(DismissalState::from_json("{\"patterns\": []}").unwrap(), DismissalState::default());
    }

    #[test]
    fn import_respects_capacity() {
        let mut source = DismissalManager::new();
        for word in ["a", "b", "c"] {
            source.dismiss(&issue("r", word, 0));
        }
        let mut small = DismissalManager::with_capacity(2);
        small.import_state(source.export_state());
        assert_eq!(small.len(), 2);
        assert!(!small.is_key_dismissed("r:a"));
    }

    #[test]
    fn managers_do_not_share_state() {
        let mut first = DismissalManager::new();
        let second = DismissalManager::new();
        first.dismiss(&issue("a", "x", 0));
        assert!(!second.is_dismissed(&issue("a", "x", 0)));
    }
}
