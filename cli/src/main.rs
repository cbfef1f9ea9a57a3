use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::Context;
use clap::{ArgAction, Parser};
use console::{style, Style};
use globset::{Glob, GlobSet, GlobSetBuilder};
use proofread_core::{
    text::{byte_to_location, Location},
    AnalysisEngine, AnalysisResult, Analyzer, Category, Config, DismissalState, Issue, Severity,
    WritingScore,
};
use serde::Serialize;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;
use walkdir::WalkDir;

/// Minimum confidence for a suggestion to be applied by `--fix`.
const FIX_CONFIDENCE: f32 = 0.9;

/// Proofread CLI entry point.
#[derive(Debug, Parser)]
#[command(name = "proofread", about = "Check prose for spelling, grammar and style issues.")]
struct Args {
    /// Path to config file (YAML). Defaults to proofread.yml if present.
    #[arg(long, default_value = "proofread.yml")]
    config: PathBuf,

    /// Emit JSON output for automation.
    #[arg(long, action = ArgAction::SetTrue)]
    json: bool,

    /// Strict mode: exit non-zero when any error-severity issue remains.
    #[arg(long, action = ArgAction::SetTrue)]
    strict: bool,

    /// Only print the summary line.
    #[arg(long, action = ArgAction::SetTrue)]
    quiet: bool,

    /// Apply high-confidence fixes for error-severity issues in place.
    #[arg(long, action = ArgAction::SetTrue)]
    fix: bool,

    /// Debug logging on stderr (RUST_LOG overrides).
    #[arg(long, short, action = ArgAction::SetTrue)]
    verbose: bool,

    /// JSON file with previously dismissed patterns.
    #[arg(long, value_name = "FILE")]
    dismissals: Option<PathBuf>,

    /// Enable only these checks (comma-separated). Implies disabling others.
    #[arg(long, value_delimiter = ',', value_name = "CHECK[,CHECK]")]
    only: Vec<String>,

    /// Disable checks (comma-separated).
    #[arg(long, value_delimiter = ',', value_name = "CHECK[,CHECK]")]
    disable: Vec<String>,

    /// Glob patterns to skip while walking directories.
    #[arg(long = "ignore", value_name = "GLOB")]
    ignore: Vec<String>,

    /// Files or directories to check.
    #[arg(value_name = "PATH", default_value = ".", num_args = 0..)]
    paths: Vec<PathBuf>,
}

#[derive(Debug, Serialize)]
struct IssueView<'a> {
    #[serde(flatten)]
    issue: &'a Issue,
    location: Location,
}

#[derive(Debug, Serialize)]
struct FileResult<'a> {
    path: String,
    word_count: usize,
    score: WritingScore,
    category_counts: BTreeMap<Category, usize>,
    issues: Vec<IssueView<'a>>,
    readability_grade: f64,
    education_level: &'a str,
    tone: String,
    fixes_applied: usize,
}

#[derive(Debug, Serialize)]
struct OutputReport<'a> {
    files: Vec<FileResult<'a>>,
    total_word_count: usize,
    total_issues: usize,
    average_score: u32,
}

struct Checked {
    path: PathBuf,
    text: String,
    result: AnalysisResult,
    fixes_applied: usize,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);
    run(args)
}

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if verbose { "debug" } else { "warn" }));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn run(args: Args) -> anyhow::Result<()> {
    let mut cfg = load_config(&args.config)?;
    if !args.only.is_empty() {
        cfg.checks.only(args.only.iter().map(String::as_str))?;
    }
    cfg.checks.disable(args.disable.iter().map(String::as_str))?;
    let fail_below = cfg.scores.fail_below;
    let analyzer = Arc::new(Analyzer::new(cfg)?);
    let dismissals = load_dismissals(args.dismissals.as_deref())?;

    let ignore = build_ignore_set(&args.ignore)?;
    let mut files = collect_files(&args.paths, ignore.as_ref())?;
    files.sort();
    info!(files = files.len(), "checking");

    let mut checked = Vec::with_capacity(files.len());
    for path in files {
        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let mut engine = AnalysisEngine::new(Arc::clone(&analyzer));
        if let Some(state) = &dismissals {
            engine.import_dismissals(state.clone());
        }
        engine.analyze_immediate(content);

        let fixes_applied = if args.fix { apply_fixes(&mut engine) } else { 0 };
        if fixes_applied > 0 {
            fs::write(&path, engine.text())
                .with_context(|| format!("Failed to write {}", path.display()))?;
            debug!(path = %path.display(), fixes_applied, "wrote fixes");
        }

        checked.push(Checked {
            path,
            text: engine.text().to_string(),
            result: engine.result().clone(),
            fixes_applied,
        });
    }

    let mut exit_due_to_threshold = false;
    for file in &checked {
        if file.result.score.overall < fail_below {
            exit_due_to_threshold = true;
        }
        if args.strict && file.result.issues.iter().any(|i| i.severity == Severity::Error) {
            exit_due_to_threshold = true;
        }
    }

    let total_words: usize = checked.iter().map(|f| f.result.statistics.word_count).sum();
    let total_issues: usize = checked.iter().map(|f| f.result.issues.len()).sum();
    let average_score = if checked.is_empty() {
        100
    } else {
        let sum: u32 = checked.iter().map(|f| f.result.score.overall).sum();
        (f64::from(sum) / checked.len() as f64).round() as u32
    };

    if args.json {
        let output = OutputReport {
            files: checked.iter().map(file_result).collect(),
            total_word_count: total_words,
            total_issues,
            average_score,
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        if !args.quiet {
            for file in &checked {
                print_human_report(file);
            }
        }
        println!(
            "\n{} files, {} words, {} issues, average score {}",
            checked.len(),
            total_words,
            total_issues,
            average_score
        );
    }

    if exit_due_to_threshold {
        std::process::exit(1);
    }

    Ok(())
}

fn fixable(issue: &Issue) -> Option<&str> {
    if issue.severity != Severity::Error {
        return None;
    }
    let first = issue.suggestions.first()?;
    (first.confidence >= FIX_CONFIDENCE && first.text != issue.original_text)
        .then_some(first.text.as_str())
}

/// Applies the first suggestion of each fixable issue, re-analysing after
/// every edit. Issues whose fix is rejected are dismissed so the loop ends.
fn apply_fixes(engine: &mut AnalysisEngine) -> usize {
    let budget = engine.result().issues.len();
    let mut applied = 0;
    for _ in 0..budget {
        let Some((issue, replacement)) = engine
            .result()
            .issues
            .iter()
            .find_map(|i| fixable(i).map(|r| (i.clone(), r.to_string())))
        else {
            break;
        };
        match engine.apply_correction(issue.start, issue.end, &replacement) {
            Ok(_) => applied += 1,
            Err(err) => {
                debug!(rule = %issue.rule, error = %err, "fix rejected");
                engine.dismiss_issue(&issue);
            }
        }
    }
    applied
}

fn file_result(file: &Checked) -> FileResult<'_> {
    FileResult {
        path: file.path.to_string_lossy().to_string(),
        word_count: file.result.statistics.word_count,
        score: file.result.score,
        category_counts: file.result.category_counts(),
        issues: file
            .result
            .issues
            .iter()
            .map(|issue| IssueView {
                issue,
                location: byte_to_location(&file.text, issue.start),
            })
            .collect(),
        readability_grade: file.result.readability.flesch_kincaid_grade,
        education_level: &file.result.readability.education_level,
        tone: file.result.tone.dominant.to_string(),
        fixes_applied: file.fixes_applied,
    }
}

fn category_style(category: Category) -> Style {
    match category {
        Category::Correctness => Style::new().red(),
        Category::Clarity => Style::new().blue(),
        Category::Engagement => Style::new().green(),
        Category::Delivery => Style::new().magenta(),
    }
}

fn print_human_report(file: &Checked) {
    let result = &file.result;
    println!(
        "{} ({} words, score {}, grade {:.1}, tone {})",
        style(file.path.to_string_lossy()).bold(),
        result.statistics.word_count,
        result.score.overall,
        result.readability.flesch_kincaid_grade,
        result.tone.dominant
    );
    if file.fixes_applied > 0 {
        println!("  {} {} fixes applied", style("fixed").green(), file.fixes_applied);
    }
    if result.issues.is_empty() {
        println!("  {}", style("clean").green());
        return;
    }
    for issue in &result.issues {
        let location = byte_to_location(&file.text, issue.start);
        println!(
            "  [{}] {} {}:{} {} ({})",
            category_style(issue.category).apply_to(issue.category.label()),
            issue.severity,
            location.line,
            location.column,
            issue.message,
            style(&issue.rule).dim()
        );
        if let Some(suggestion) = issue.suggestions.first() {
            println!("      → {}", suggestion.text);
        }
    }
}

fn build_ignore_set(patterns: &[String]) -> anyhow::Result<Option<GlobSet>> {
    if patterns.is_empty() {
        return Ok(None);
    }
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        builder.add(Glob::new(pattern).with_context(|| format!("invalid glob `{pattern}`"))?);
    }
    Ok(Some(builder.build()?))
}

fn collect_files(paths: &[PathBuf], ignore: Option<&GlobSet>) -> anyhow::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for path in paths {
        if path.is_dir() {
            let mut walker = WalkDir::new(path).into_iter();
            while let Some(entry_res) = walker.next() {
                let entry = entry_res?;
                let entry_path = entry.path();
                if ignore.is_some_and(|set| set.is_match(entry_path)) {
                    if entry.file_type().is_dir() {
                        walker.skip_current_dir();
                    }
                    continue;
                }
                if entry.file_type().is_file() && is_supported(entry_path) {
                    files.push(entry_path.to_path_buf());
                }
            }
        } else if path.is_file() && is_supported(path) {
            if ignore.is_some_and(|set| set.is_match(path)) {
                continue;
            }
            files.push(path.clone());
        }
    }
    Ok(files)
}

fn is_supported(path: &Path) -> bool {
    match path.extension().and_then(|s| s.to_str()) {
        Some(ext) => matches!(ext.to_lowercase().as_str(), "md" | "markdown" | "txt" | "rst"),
        None => false,
    }
}

fn load_config(path: &Path) -> anyhow::Result<Config> {
    if !path.exists() {
        return Ok(Config::default());
    }
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    Config::from_yaml_str(&text).with_context(|| format!("Invalid config {}", path.display()))
}

fn load_dismissals(path: Option<&Path>) -> anyhow::Result<Option<DismissalState>> {
    let Some(path) = path else {
        return Ok(None);
    };
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read dismissals {}", path.display()))?;
    let state = DismissalState::from_json(&text)
        .with_context(|| format!("Invalid dismissals file {}", path.display()))?;
    debug!(patterns = state.patterns.len(), "loaded dismissals");
    Ok(Some(state))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proofread_core::Correction;

    fn issue(severity: Severity, original: &str, suggestion: &str, confidence: f32) -> Issue {
        Issue {
            id: "t".into(),
            category: Category::Correctness,
            severity,
            start: 0,
            end: original.len(),
            original_text: original.into(),
            message: String::new(),
            description: String::new(),
            suggestions: vec![Correction::new(suggestion, confidence)],
            rule: "test".into(),
        }
    }

    #[test]
    fn only_confident_error_fixes_qualify() {
        assert_eq!(fixable(&issue(Severity::Error, "teh", "the", 0.95)), Some("the"));
        assert_eq!(fixable(&issue(Severity::Error, "teh", "the", 0.5)), None);
        assert_eq!(fixable(&issue(Severity::Warning, "teh", "the", 0.95)), None);
        assert_eq!(fixable(&issue(Severity::Error, "same", "same", 0.95)), None);
    }

    #[test]
    fn fixes_are_applied_until_clean() {
        let mut engine = AnalysisEngine::default();
        engine.analyze_immediate("We dont see teh point, alot of it.");
        let applied = apply_fixes(&mut engine);
        assert_eq!(applied, 3);
        assert_eq!(engine.text(), "We don't see the point, a lot of it.");
        assert!(engine.result().issues.iter().all(|i| fixable(i).is_none()));
    }

    #[test]
    fn supported_extensions() {
        assert!(is_supported(Path::new("notes.md")));
        assert!(is_supported(Path::new("README.TXT")));
        assert!(!is_supported(Path::new("main.rs")));
    }
}
