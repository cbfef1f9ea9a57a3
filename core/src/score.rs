//! Composite writing score derived from an issue set.

use serde::{Deserialize, Serialize};

use crate::issue::{Category, Issue};

/// Points deducted per unit of severity weight.
const PENALTY_PER_WEIGHT: f64 = 5.0;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct WritingScore {
    pub overall: u32,
    pub correctness: u32,
    pub clarity: u32,
    pub engagement: u32,
    pub delivery: u32,
}

impl Default for WritingScore {
    fn default() -> Self {
        Self {
            overall: 100,
            correctness: 100,
            clarity: 100,
            engagement: 100,
            delivery: 100,
        }
    }
}

impl WritingScore {
    pub fn category(&self, category: Category) -> u32 {
        match category {
            Category::Correctness => self.correctness,
            Category::Clarity => self.clarity,
            Category::Engagement => self.engagement,
            Category::Delivery => self.delivery,
        }
    }
}

/// Rounds into `0..=100`. Non-finite input becomes 0.
pub fn clamp_score(value: f64) -> u32 {
    if !value.is_finite() {
        return 0;
    }
    value.clamp(0.0, 100.0).round() as u32
}

fn category_weight(category: Category) -> f64 {
    match category {
        Category::Correctness => 0.40,
        Category::Clarity => 0.25,
        Category::Engagement => 0.20,
        Category::Delivery => 0.15,
    }
}

pub fn calculate_category_score(issues: &[Issue], category: Category) -> u32 {
    let weight: u32 = issues
        .iter()
        .filter(|issue| issue.category == category)
        .map(|issue| issue.severity.weight())
        .sum();
    clamp_score(100.0 - PENALTY_PER_WEIGHT * f64::from(weight))
}

pub fn calculate_writing_score(issues: &[Issue]) -> WritingScore {
    let correctness = calculate_category_score(issues, Category::Correctness);
    let clarity = calculate_category_score(issues, Category::Clarity);
    let engagement = calculate_category_score(issues, Category::Engagement);
    let delivery = calculate_category_score(issues, Category::Delivery);

    let overall = Category::ALL
        .iter()
        .zip([correctness, clarity, engagement, delivery])
        .map(|(cat, score)| category_weight(*cat) * f64::from(score))
        .sum::<f64>();

    WritingScore {
        overall: clamp_score(overall),
        correctness,
        clarity,
        engagement,
        delivery,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::issue::Severity;

    fn issue(category: Category, severity: Severity) -> Issue {
        Issue {
            id: "t".into(),
            category,
            severity,
            start: 0,
            end: 1,
            original_text: "x".into(),
            message: String::new(),
            description: String::new(),
            suggestions: Vec::new(),
            rule: "test".into(),
        }
    }

    #[test]
    fn empty_set_scores_one_hundred() {
        assert_eq!(calculate_writing_score(&[]), WritingScore::default());
    }

    #[test]
    fn penalties_follow_severity_weights() {
        let issues = vec![
            issue(Category::Correctness, Severity::Error),
            issue(Category::Correctness, Severity::Warning),
            issue(Category::Clarity, Severity::Suggestion),
        ];
        let score = calculate_writing_score(&issues);
        assert_eq!(score.correctness, 75);
        assert_eq!(score.clarity, 95);
        assert_eq!(score.engagement, 100);
        assert_eq!(score.delivery, 100);
        // 0.40*75 + 0.25*95 + 0.20*100 + 0.15*100 = 88.75
        assert_eq!(score.overall, 89);
    }

    #[test]
    fn category_scores_floor_at_zero() {
        let issues: Vec<Issue> = (0..40)
            .map(|_| issue(Category::Delivery, Severity::Error))
            .collect();
        let score = calculate_writing_score(&issues);
        assert_eq!(score.delivery, 0);
        assert_eq!(score.overall, 85);
    }

    #[test]
    fn clamp_handles_non_finite() {
        assert_eq!(clamp_score(f64::NAN), 0);
        assert_eq!(clamp_score(f64::INFINITY), 0);
        assert_eq!(clamp_score(f64::NEG_INFINITY), 0);
        assert_eq!(clamp_score(-4.0), 0);
        assert_eq!(clamp_score(140.0), 100);
        assert_eq!(clamp_score(49.5), 50);
    }
}
