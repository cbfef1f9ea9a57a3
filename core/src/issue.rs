//! Issue data model shared by every detector.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

/// Closed classification of every issue.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Ord, PartialOrd)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    Correctness,
    Clarity,
    Engagement,
    Delivery,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Correctness,
        Category::Clarity,
        Category::Engagement,
        Category::Delivery,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Category::Correctness => "Correctness",
            Category::Clarity => "Clarity",
            Category::Engagement => "Engagement",
            Category::Delivery => "Delivery",
        }
    }

    /// Underline color used by renderers. The analysis never reads it.
    pub fn color(self) -> &'static str {
        match self {
            Category::Correctness => "#ef4444",
            Category::Clarity => "#3b82f6",
            Category::Engagement => "#22c55e",
            Category::Delivery => "#a855f7",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Category::Correctness => "correctness",
            Category::Clarity => "clarity",
            Category::Engagement => "engagement",
            Category::Delivery => "delivery",
        };
        f.write_str(name)
    }
}

/// Issue priority. `Ord` follows declaration order, so `Error` sorts first.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Ord, PartialOrd)]
#[serde(rename_all = "kebab-case")]
pub enum Severity {
    Error,
    Warning,
    Suggestion,
}

impl Severity {
    /// Penalty weight applied by the score calculator.
    pub fn weight(self) -> u32 {
        match self {
            Severity::Error => 3,
            Severity::Warning => 2,
            Severity::Suggestion => 1,
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Suggestion => "suggestion",
        };
        f.write_str(name)
    }
}

/// Suggested replacement for the flagged text.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Correction {
    pub text: String,
    pub confidence: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Correction {
    pub fn new(text: impl Into<String>, confidence: f32) -> Self {
        Self {
            text: text.into(),
            confidence: confidence.clamp(0.0, 1.0),
            description: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// A single detected problem.
///
/// `start..end` are byte offsets into the analysed text and always satisfy
/// `&text[start..end] == original_text`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Issue {
    pub id: String,
    pub category: Category,
    pub severity: Severity,
    pub start: usize,
    pub end: usize,
    pub original_text: String,
    pub message: String,
    pub description: String,
    pub suggestions: Vec<Correction>,
    pub rule: String,
}

impl Issue {
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// True when `start..end` shares at least one byte with this issue.
    pub fn overlaps(&self, start: usize, end: usize) -> bool {
        self.start < end && start < self.end
    }
}

/// Positional and descriptive fields of an issue before an id is assigned.
#[derive(Debug, Clone)]
pub(crate) struct Finding {
    pub category: Category,
    pub severity: Severity,
    pub start: usize,
    pub end: usize,
    pub message: String,
    pub description: String,
    pub suggestions: Vec<Correction>,
    pub rule: String,
}

impl Finding {
    pub fn into_issue(self, text: &str, ids: &dyn IdGenerator) -> Issue {
        Issue {
            id: ids.next_id(),
            category: self.category,
            severity: self.severity,
            start: self.start,
            end: self.end,
            original_text: text[self.start..self.end].to_string(),
            message: self.message,
            description: self.description,
            suggestions: self.suggestions,
            rule: self.rule,
        }
    }
}

/// Source of opaque issue identifiers.
pub trait IdGenerator: Send + Sync {
    fn next_id(&self) -> String;
}

/// Random v4 UUIDs. Holds no state, so one value can be shared freely.
#[derive(Debug, Default, Clone, Copy)]
pub struct UuidIds;

impl IdGenerator for UuidIds {
    fn next_id(&self) -> String {
        uuid::Uuid::new_v4().to_string()
    }
}

/// Monotonic `prefix-N` identifiers scoped to one generator instance.
#[derive(Debug)]
pub struct SequentialIds {
    prefix: String,
    next: AtomicU64,
}

impl SequentialIds {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            next: AtomicU64::new(1),
        }
    }
}

impl Default for SequentialIds {
    fn default() -> Self {
        Self::new("issue")
    }
}

impl IdGenerator for SequentialIds {
    fn next_id(&self) -> String {
        let n = self.next.fetch_add(1, Ordering::Relaxed);
        format!("{}-{}", self.prefix, n)
    }
}

/// Stable sort by start offset; ties keep detection order.
pub fn sort_issues(issues: &mut [Issue]) {
    issues.sort_by_key(|issue| issue.start);
}
