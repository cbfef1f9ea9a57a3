//! Text substitution, offset remapping and undo history.

use std::ops::Range;

use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use crate::issue::Issue;

/// Classified reasons a correction range is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum CorrectionError {
    #[error("negative index")]
    NegativeIndex,
    #[error("exceeds text length")]
    ExceedsTextLength,
    #[error("start greater than end")]
    StartGreaterThanEnd,
    #[error("mismatch")]
    Mismatch,
    #[error("not a character boundary")]
    NotCharBoundary,
}

fn check_range(text: &str, start: usize, end: usize) -> Result<Range<usize>, CorrectionError> {
    if end > text.len() {
        return Err(CorrectionError::ExceedsTextLength);
    }
    if start > end {
        return Err(CorrectionError::StartGreaterThanEnd);
    }
    if !text.is_char_boundary(start) || !text.is_char_boundary(end) {
        return Err(CorrectionError::NotCharBoundary);
    }
    Ok(start..end)
}

/// Checks signed offsets from an outer boundary and returns the byte range.
/// When `expected` is given, the range must currently hold exactly that text.
pub fn validate_correction(
    text: &str,
    start: isize,
    end: isize,
    expected: Option<&str>,
) -> Result<Range<usize>, CorrectionError> {
    if start < 0 || end < 0 {
        return Err(CorrectionError::NegativeIndex);
    }
    let range = check_range(text, start as usize, end as usize)?;
    if let Some(expected) = expected {
        if &text[range.clone()] != expected {
            return Err(CorrectionError::Mismatch);
        }
    }
    Ok(range)
}

/// Replaces `text[start..end]` with `replacement`, keeping prefix and suffix.
pub fn apply_text_correction(
    text: &str,
    start: usize,
    end: usize,
    replacement: &str,
) -> Result<String, CorrectionError> {
    let range = check_range(text, start, end)?;
    let mut out = String::with_capacity(text.len() - range.len() + replacement.len());
    out.push_str(&text[..range.start]);
    out.push_str(replacement);
    out.push_str(&text[range.end..]);
    Ok(out)
}

pub fn calculate_position_delta(original_length: usize, correction_length: usize) -> isize {
    correction_length as isize - original_length as isize
}

/// Keeps issues before the corrected range, shifts issues after it by
/// `delta`, and drops anything overlapping it.
pub fn adjust_issue_positions(
    issues: &[Issue],
    correction_start: usize,
    correction_end: usize,
    delta: isize,
) -> Vec<Issue> {
    issues
        .iter()
        .filter_map(|issue| {
            if issue.end <= correction_start {
                Some(issue.clone())
            } else if issue.start >= correction_end {
                let mut shifted = issue.clone();
                shifted.start = shift(issue.start, delta);
                shifted.end = shift(issue.end, delta);
                Some(shifted)
            } else {
                None
            }
        })
        .collect()
}

fn shift(offset: usize, delta: isize) -> usize {
    offset.checked_add_signed(delta).unwrap_or(0)
}

/// Result of a correction attempt. On failure `text` is the unchanged input.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrectionOutcome {
    pub success: bool,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<CorrectionError>,
}

impl CorrectionOutcome {
    fn applied(text: String) -> Self {
        Self {
            success: true,
            text,
            error: None,
        }
    }

    fn rejected(text: &str, error: CorrectionError) -> Self {
        Self {
            success: false,
            text: text.to_string(),
            error: Some(error),
        }
    }
}

/// Applies `replacement` at the issue's offsets after confirming the issue's
/// text is still there.
pub fn apply_correction_from_issue(text: &str, issue: &Issue, replacement: &str) -> CorrectionOutcome {
    let checked = check_range(text, issue.start, issue.end).and_then(|range| {
        if text[range.clone()] == issue.original_text {
            Ok(range)
        } else {
            Err(CorrectionError::Mismatch)
        }
    });
    match checked.and_then(|range| apply_text_correction(text, range.start, range.end, replacement)) {
        Ok(updated) => CorrectionOutcome::applied(updated),
        Err(error) => CorrectionOutcome::rejected(text, error),
    }
}

#[derive(Debug, Clone)]
struct Snapshot {
    text: String,
    issues: Vec<Issue>,
}

/// Current text plus an undo stack of earlier states.
#[derive(Debug, Clone, Default)]
pub struct CorrectionHandler {
    text: String,
    issues: Vec<Issue>,
    history: Vec<Snapshot>,
}

impl CorrectionHandler {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            issues: Vec::new(),
            history: Vec::new(),
        }
    }

    /// Tracks `issues` so successful corrections remap them.
    pub fn with_issues(text: impl Into<String>, issues: Vec<Issue>) -> Self {
        Self {
            text: text.into(),
            issues,
            history: Vec::new(),
        }
    }

    pub fn apply_correction(&mut self, issue: &Issue, replacement: &str) -> CorrectionOutcome {
        let outcome = apply_correction_from_issue(&self.text, issue, replacement);
        if !outcome.success {
            debug!(rule = %issue.rule, error = ?outcome.error, "correction rejected");
            return outcome;
        }
        let delta = calculate_position_delta(issue.len(), replacement.len());
        let remapped = adjust_issue_positions(&self.issues, issue.start, issue.end, delta);
        let previous = Snapshot {
            text: std::mem::replace(&mut self.text, outcome.text.clone()),
            issues: std::mem::replace(&mut self.issues, remapped),
        };
        self.history.push(previous);
        debug!(rule = %issue.rule, delta, history = self.history.len(), "correction applied");
        outcome
    }

    /// Restores the most recent snapshot and returns its text.
    pub fn undo(&mut self) -> Option<String> {
        let snapshot = self.history.pop()?;
        self.text = snapshot.text;
        self.issues = snapshot.issues;
        Some(self.text.clone())
    }

    pub fn can_undo(&self) -> bool {
        !self.history.is_empty()
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn issues(&self) -> &[Issue] {
        &self.issues
    }

    pub fn history_size(&self) -> usize {
        self.history.len()
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
    }
}
