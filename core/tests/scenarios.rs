use std::sync::Arc;

use proofread_core::advanced::detect_inconsistent_number_formatting;
use proofread_core::readability::find_difficult_sentences;
use proofread_core::rules::{analyze_with_rules, base_rules};
use proofread_core::stats::calculate_statistics;
use proofread_core::{
    analyze_after_correction, analyze_text, AnalysisEngine, Analyzer, Category, Config,
    CorrectionError, CorrectionHandler, Issue, SequentialIds, Severity, TextStatistics, ToneType,
};

fn engine() -> AnalysisEngine {
    AnalysisEngine::new(Analyzer::default().with_id_generator(Arc::new(SequentialIds::new("t"))))
}

fn issues_for<'a>(issues: &'a [Issue], rule: &str) -> Vec<&'a Issue> {
    issues.iter().filter(|i| i.rule == rule).collect()
}

fn sentence_of(words: usize) -> String {
    let mut text = vec!["word"; words].join(" ");
    text.push('.');
    text
}

#[test]
fn alot_is_found_corrected_and_gone_after_reanalysis() {
    let text = "I have alot of work.";
    let result = analyze_text(text);
    let typo = issues_for(&result.issues, "common-typo");
    assert_eq!(typo.len(), 1, "issues: {:#?}", result.issues);
    let typo = typo[0];
    assert_eq!(typo.original_text, "alot");
    assert_eq!((typo.start, typo.end), (7, 11));
    assert_eq!(typo.category, Category::Correctness);
    assert_eq!(typo.suggestions[0].text, "a lot");

    let corrected = analyze_after_correction(text, typo.start, typo.end, &typo.suggestions[0].text)
        .expect("valid range");
    assert_eq!(corrected.text, "I have a lot of work.");
    assert!(issues_for(&corrected.result.issues, "common-typo").is_empty());
}

#[test]
fn statistics_of_empty_text_are_zero() {
    let stats = calculate_statistics("");
    assert_eq!(stats, TextStatistics::default());
    assert_eq!(stats.word_count, 0);
    assert_eq!(stats.character_count, 0);
    assert_eq!(stats.character_count_no_spaces, 0);
    assert_eq!(stats.sentence_count, 0);
    assert_eq!(stats.paragraph_count, 0);
    assert_eq!(stats.reading_time_minutes, 0);
}

#[test]
fn long_sentences_are_difficult() {
    assert_eq!(find_difficult_sentences(&sentence_of(30)), vec![0]);
    assert!(find_difficult_sentences(&sentence_of(20)).is_empty());
}

#[test]
fn mixed_number_formats_are_flagged() {
    let ids = SequentialIds::default();
    assert!(!detect_inconsistent_number_formatting("I have 5 apples and three oranges.", &ids).is_empty());
    assert!(detect_inconsistent_number_formatting("I have 5 apples and 3 oranges.", &ids).is_empty());
}

#[test]
fn detectors_are_total_over_odd_input() {
    for text in ["", "   ", "\n\n\t", "...", "!?!", "é ü ñ", "12345", "a"] {
        let result = analyze_text(text);
        for issue in &result.issues {
            assert_eq!(&text[issue.start..issue.end], issue.original_text);
        }
        let total: u32 = result.tone.breakdown.total();
        assert_eq!(total, 100);
    }
}

#[test]
fn whitespace_only_text_is_neutral_and_clean() {
    let result = analyze_text("   \n ");
    assert!(result.issues.is_empty());
    assert_eq!(result.tone.dominant, ToneType::Neutral);
    assert_eq!(result.score.overall, 100);
}

#[test]
fn issue_ids_are_unique_per_analysis() {
    let result = analyze_text("Alot of teh stuff, dont worry. Alot more.");
    let mut ids: Vec<&str> = result.issues.iter().map(|i| i.id.as_str()).collect();
    let before = ids.len();
    ids.sort_unstable();
    ids.dedup();
    assert_eq!(ids.len(), before);
}

#[test]
fn handler_walks_through_analysis_issues() {
    let text = "We dont see teh point.";
    let issues = analyze_with_rules(text, &base_rules(), &SequentialIds::default());
    let mut handler = CorrectionHandler::with_issues(text, issues.clone());

    let contraction = issues_for(&issues, "missing-apostrophe")[0].clone();
    assert!(handler.apply_correction(&contraction, "don't").success);

    let typo = handler
        .issues()
        .iter()
        .find(|i| i.rule == "common-typo")
        .cloned()
        .expect("typo remapped");
    assert_eq!(&handler.text()[typo.start..typo.end], "teh");
    assert!(handler.apply_correction(&typo, "the").success);
    assert_eq!(handler.text(), "We don't see the point.");
    assert_eq!(handler.history_size(), 2);

    handler.undo();
    handler.undo();
    assert_eq!(handler.text(), text);
    assert!(!handler.can_undo());
}

#[test]
fn invalid_correction_leaves_engine_untouched() {
    let mut engine = engine();
    engine.analyze_immediate("Short text.");
    let snapshot = engine.result().clone();
    assert_eq!(
        engine.apply_correction(4, 400, "x").unwrap_err(),
        CorrectionError::ExceedsTextLength
    );
    assert_eq!(engine.text(), "Short text.");
    assert_eq!(engine.result(), &snapshot);
}

#[test]
fn dismissal_memory_is_per_engine_and_cleared_by_reset() {
    let mut first = engine();
    let mut second = engine();
    let text = "Alot of rain. Alot of sun.";

    let typo = issues_for(&first.analyze_immediate(text).issues, "common-typo")[0].clone();
    first.dismiss_issue(&typo);
    assert!(issues_for(&first.result().issues, "common-typo").is_empty());
    assert_eq!(first.dismissed_patterns()[0].key(), "common-typo:alot");

    assert_eq!(issues_for(&second.analyze_immediate(text).issues, "common-typo").len(), 2);

    first.reset();
    assert!(first.dismissed_patterns().is_empty());
    assert_eq!(issues_for(&first.analyze_immediate(text).issues, "common-typo").len(), 2);
}

#[test]
fn dismissal_state_carries_between_engines() {
    let mut first = engine();
    let typo = issues_for(&first.analyze_immediate("Teh end.").issues, "common-typo")[0].clone();
    first.dismiss_issue(&typo);
    let json = serde_json::to_string(&first.export_dismissals()).unwrap();

    let mut second = engine();
    second.import_dismissals(serde_json::from_str(&json).unwrap());
    let result = second.analyze_immediate("And teh start.");
    assert!(issues_for(&result.issues, "common-typo").is_empty());
}

#[test]
fn long_sentence_produces_clarity_warning() {
    let result = analyze_text(&sentence_of(30));
    let long = issues_for(&result.issues, "long-sentence");
    assert_eq!(long.len(), 1);
    assert_eq!(long[0].category, Category::Clarity);
    assert_eq!(long[0].severity, Severity::Warning);
    assert_eq!(result.readability.difficult_sentences, vec![0]);
}

#[test]
fn config_from_yaml_drives_the_analyzer() {
    let config = Config::from_yaml_str(
        "checks:\n  typos: false\nreadability:\n  difficult_sentence_words: 10\n",
    )
    .unwrap();
    let analyzer = Analyzer::new(config).unwrap();
    let result = analyzer.analyze(&sentence_of(12).replacen("word", "Alot", 1));
    assert!(issues_for(&result.issues, "common-typo").is_empty());
    assert_eq!(issues_for(&result.issues, "long-sentence").len(), 1);
}

#[test]
fn result_serializes_for_renderers() {
    let result = analyze_text("I has alot of work.");
    let value = serde_json::to_value(&result).unwrap();
    assert!(value["issues"].as_array().is_some_and(|a| !a.is_empty()));
    assert!(value["score"]["overall"].as_u64().is_some());
    assert_eq!(Category::Correctness.color(), "#ef4444");
}

#[test]
fn wordy_proximity_phrase_is_reported_once() {
    let text = "Park in close proximity to the gate.";
    let result = analyze_text(text);
    let wordy = issues_for(&result.issues, "wordy-construction");
    assert_eq!(wordy.len(), 1, "issues: {:#?}", result.issues);
    assert_eq!(wordy[0].original_text, "in close proximity to");
    assert!(issues_for(&result.issues, "redundant-phrase").is_empty());
}
