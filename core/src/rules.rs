//! Declarative rule tables and the generic matcher that runs them.
//!
//! Every rule is a regex plus the metadata copied onto each issue it emits.
//! Word-list rules are built from `(phrase, alternatives)` tables so new
//! entries never touch the matching code.

use regex::Regex;

use crate::issue::{sort_issues, Category, Correction, Finding, IdGenerator, Issue, Severity};
use crate::text::{match_case, normalize_phrase};

/// Phrase to replacement alternatives. Keys are lowercase with single spaces.
pub type PhraseTable = &'static [(&'static str, &'static [&'static str])];

/// How a rule turns a match into corrections.
#[derive(Debug, Clone)]
pub enum Suggest {
    None,
    /// Look the normalized match up in a phrase table.
    Lookup(PhraseTable),
    /// Replace the match with fixed text.
    Replace {
        text: String,
        description: String,
    },
    /// Uppercase the first letter of the match.
    Capitalize,
    /// Offer the same alternatives for every match.
    Alternatives(Vec<String>),
}

/// A compiled rule. The optional capture group named `m` narrows the flagged
/// span inside a wider match.
#[derive(Clone)]
pub struct Rule {
    pub id: String,
    pub category: Category,
    pub severity: Severity,
    pub pattern: Regex,
    /// `{text}` is replaced with the matched text.
    pub message: String,
    pub description: String,
    pub confidence: f32,
    pub suggest: Suggest,
    /// Rejects a match by looking at the text around its flagged span.
    pub guard: Option<fn(&str, usize, usize) -> bool>,
}

impl std::fmt::Debug for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rule")
            .field("id", &self.id)
            .field("category", &self.category)
            .field("severity", &self.severity)
            .field("pattern", &self.pattern.as_str())
            .field("confidence", &self.confidence)
            .field("guarded", &self.guard.is_some())
            .finish_non_exhaustive()
    }
}

impl Rule {
    pub fn new(
        id: impl Into<String>,
        category: Category,
        severity: Severity,
        pattern: Regex,
        message: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            category,
            severity,
            pattern,
            message: message.into(),
            description: description.into(),
            confidence: 0.8,
            suggest: Suggest::None,
            guard: None,
        }
    }

    pub fn with_guard(mut self, guard: fn(&str, usize, usize) -> bool) -> Self {
        self.guard = Some(guard);
        self
    }

    pub fn with_suggest(mut self, suggest: Suggest) -> Self {
        self.suggest = suggest;
        self
    }

    pub fn with_confidence(mut self, confidence: f32) -> Self {
        self.confidence = confidence;
        self
    }

    pub fn suggestions(&self, matched: &str, _full_text: &str) -> Vec<Correction> {
        match &self.suggest {
            Suggest::None => Vec::new(),
            Suggest::Lookup(table) => {
                let key = normalize_phrase(matched);
                table
                    .iter()
                    .find(|(phrase, _)| *phrase == key)
                    .map(|(_, alternatives)| self.ranked(matched, alternatives.iter().copied()))
                    .unwrap_or_default()
            }
            Suggest::Replace { text, description } => {
                vec![Correction::new(text.clone(), self.confidence).with_description(description.clone())]
            }
            Suggest::Capitalize => {
                vec![Correction::new(crate::text::capitalize_first(matched), self.confidence)]
            }
            Suggest::Alternatives(alternatives) => {
                self.ranked(matched, alternatives.iter().map(String::as_str))
            }
        }
    }

    fn ranked<'a>(&self, matched: &str, alternatives: impl Iterator<Item = &'a str>) -> Vec<Correction> {
        alternatives
            .enumerate()
            .map(|(rank, alt)| {
                let confidence = (self.confidence - 0.1 * rank as f32).max(0.5);
                Correction::new(match_case(matched, alt), confidence)
            })
            .collect()
    }

    pub fn message_for(&self, matched: &str) -> String {
        self.message.replace("{text}", matched)
    }
}

/// Runs every rule over `text` and returns issues ordered by start offset.
///
/// Overlapping matches from different rules are all kept.
pub fn analyze_with_rules(text: &str, rules: &[Rule], ids: &dyn IdGenerator) -> Vec<Issue> {
    let mut issues = Vec::new();
    for rule in rules {
        for caps in rule.pattern.captures_iter(text) {
            let Some(mat) = caps.name("m").or_else(|| caps.get(0)) else {
                continue;
            };
            if mat.start() == mat.end() {
                continue;
            }
            if rule.guard.is_some_and(|accept| !accept(text, mat.start(), mat.end())) {
                continue;
            }
            let matched = mat.as_str();
            let finding = Finding {
                category: rule.category,
                severity: rule.severity,
                start: mat.start(),
                end: mat.end(),
                message: rule.message_for(matched),
                description: rule.description.clone(),
                suggestions: rule.suggestions(matched, text),
                rule: rule.id.clone(),
            };
            issues.push(finding.into_issue(text, ids));
        }
    }
    sort_issues(&mut issues);
    issues
}

/// Builds a case-insensitive, word-bounded alternation over the table keys.
/// Longer phrases come first so they win over their own prefixes.
pub fn phrase_pattern(phrases: &[&str]) -> Result<Regex, regex::Error> {
    let mut sorted: Vec<&str> = phrases.to_vec();
    sorted.sort_by(|a, b| b.len().cmp(&a.len()));
    let body = sorted
        .iter()
        .map(|p| {
            p.split_whitespace()
                .map(regex::escape)
                .collect::<Vec<_>>()
                .join(r"\s+")
        })
        .collect::<Vec<_>>()
        .join("|");
    Regex::new(&format!(r"(?i)\b(?:{body})\b"))
}

fn table_rule(
    id: &str,
    category: Category,
    severity: Severity,
    table: PhraseTable,
    message: &str,
    description: &str,
    confidence: f32,
) -> Rule {
    let keys: Vec<&str> = table.iter().map(|(k, _)| *k).collect();
    let pattern = phrase_pattern(&keys).expect("static regex");
    Rule::new(id, category, severity, pattern, message, description)
        .with_suggest(Suggest::Lookup(table))
        .with_confidence(confidence)
}

const TYPOS: PhraseTable = &[
    ("alot", &["a lot"]),
    ("recieve", &["receive"]),
    ("recieved", &["received"]),
    ("definately", &["definitely"]),
    ("seperate", &["separate"]),
    ("occured", &["occurred"]),
    ("occurence", &["occurrence"]),
    ("untill", &["until"]),
    ("wich", &["which"]),
    ("teh", &["the"]),
    ("thier", &["their"]),
    ("beleive", &["believe"]),
    ("goverment", &["government"]),
    ("accomodate", &["accommodate"]),
    ("neccessary", &["necessary"]),
    ("tommorow", &["tomorrow"]),
    ("tommorrow", &["tomorrow"]),
    ("wierd", &["weird"]),
    ("acheive", &["achieve"]),
    ("begining", &["beginning"]),
    ("calender", &["calendar"]),
    ("existance", &["existence"]),
    ("enviroment", &["environment"]),
    ("publically", &["publicly"]),
    ("truely", &["truly"]),
    ("arguement", &["argument"]),
    ("independant", &["independent"]),
    ("persue", &["pursue"]),
    ("embarass", &["embarrass"]),
    ("foward", &["forward"]),
];

const CONTRACTIONS: PhraseTable = &[
    ("dont", &["don't"]),
    ("doesnt", &["doesn't"]),
    ("didnt", &["didn't"]),
    ("cant", &["can't"]),
    ("couldnt", &["couldn't"]),
    ("shouldnt", &["shouldn't"]),
    ("wouldnt", &["wouldn't"]),
    ("isnt", &["isn't"]),
    ("wasnt", &["wasn't"]),
    ("arent", &["aren't"]),
    ("werent", &["weren't"]),
    ("havent", &["haven't"]),
    ("hasnt", &["hasn't"]),
    ("hadnt", &["hadn't"]),
    ("youre", &["you're"]),
    ("theyre", &["they're"]),
    ("im", &["I'm"]),
    ("ive", &["I've"]),
    ("youve", &["you've"]),
    ("theyve", &["they've"]),
    ("weve", &["we've"]),
    ("thats", &["that's"]),
    ("whats", &["what's"]),
    ("wouldve", &["would've"]),
    ("couldve", &["could've"]),
    ("shouldve", &["should've"]),
];

const CONFUSABLES: PhraseTable = &[
    ("could of", &["could have"]),
    ("should of", &["should have"]),
    ("would of", &["would have"]),
    ("must of", &["must have"]),
    ("might of", &["might have"]),
    ("your welcome", &["you're welcome"]),
    ("irregardless", &["regardless"]),
    ("supposably", &["supposedly"]),
    ("for all intensive purposes", &["for all intents and purposes"]),
    ("nip it in the butt", &["nip it in the bud"]),
    ("one in the same", &["one and the same"]),
    ("case and point", &["case in point"]),
    ("less people", &["fewer people"]),
    ("more then", &["more than"]),
    ("less then", &["less than"]),
    ("better then", &["better than"]),
    ("rather then", &["rather than"]),
    ("each others", &["each other's"]),
];

const WORDY_CONSTRUCTIONS: PhraseTable = &[
    ("in order to", &["to"]),
    ("due to the fact that", &["because", "since"]),
    ("at this point in time", &["now", "currently"]),
    ("in the event that", &["if"]),
    ("for the purpose of", &["to", "for"]),
    ("has the ability to", &["can"]),
    ("have the ability to", &["can"]),
    ("a large number of", &["many"]),
    ("in spite of the fact that", &["although", "even though"]),
    ("with the exception of", &["except"]),
    ("in close proximity to", &["near"]),
    ("is able to", &["can"]),
];

const OVERUSED_EXPRESSIONS: PhraseTable = &[
    ("think outside the box", &["be creative", "think creatively"]),
    ("low-hanging fruit", &["easy wins", "quick wins"]),
    ("at the end of the day", &["ultimately", "in the end"]),
    ("move the needle", &["make a difference"]),
    ("touch base", &["talk", "check in"]),
    ("going forward", &["from now on", "next"]),
];

const WEAK_ADJECTIVES: PhraseTable = &[
    ("very good", &["excellent", "great"]),
    ("very bad", &["terrible", "awful"]),
    ("very big", &["huge", "enormous"]),
    ("very small", &["tiny", "minute"]),
    ("very happy", &["delighted", "thrilled"]),
    ("very sad", &["miserable", "heartbroken"]),
    ("very tired", &["exhausted"]),
    ("very important", &["crucial", "essential"]),
    ("very hard", &["difficult", "arduous"]),
    ("very easy", &["effortless", "simple"]),
    ("very old", &["ancient"]),
    ("very fast", &["rapid", "swift"]),
    ("very scared", &["terrified"]),
    ("very clean", &["spotless"]),
    ("really good", &["excellent", "great"]),
    ("really bad", &["terrible", "awful"]),
];

pub fn typo_rules() -> Vec<Rule> {
    vec![table_rule(
        "common-typo",
        Category::Correctness,
        Severity::Error,
        TYPOS,
        "Possible spelling mistake: `{text}`",
        "This word is commonly misspelled.",
        0.95,
    )]
}

pub fn contraction_rules() -> Vec<Rule> {
    vec![table_rule(
        "missing-apostrophe",
        Category::Correctness,
        Severity::Error,
        CONTRACTIONS,
        "Missing apostrophe in contraction: `{text}`",
        "Contractions need an apostrophe where letters were dropped.",
        0.9,
    )]
}

pub fn confusable_rules() -> Vec<Rule> {
    vec![table_rule(
        "confused-words",
        Category::Correctness,
        Severity::Warning,
        CONFUSABLES,
        "Commonly confused wording: `{text}`",
        "These words sound alike but mean different things.",
        0.85,
    )]
}

pub fn mechanics_rules() -> Vec<Rule> {
    vec![
        Rule::new(
            "lowercase-i",
            Category::Correctness,
            Severity::Error,
            Regex::new(r"\b(?P<m>i)\b").expect("static regex"),
            "The pronoun `I` is always capitalized.",
            "Capitalize the first-person pronoun.",
        )
        .with_suggest(Suggest::Capitalize)
        .with_guard(standalone_pronoun)
        .with_confidence(0.95),
        Rule::new(
            "double-space",
            Category::Correctness,
            Severity::Suggestion,
            Regex::new(r"\S(?P<m> {2,})").expect("static regex"),
            "Multiple spaces in a row.",
            "Use a single space between words and sentences.",
        )
        .with_suggest(Suggest::Replace {
            text: " ".into(),
            description: "Use a single space".into(),
        })
        .with_confidence(0.9),
        Rule::new(
            "space-before-punctuation",
            Category::Correctness,
            Severity::Warning,
            Regex::new(r"\w(?P<m>[ \t]+)[,.;:!?]").expect("static regex"),
            "Space before punctuation.",
            "Punctuation attaches directly to the preceding word.",
        )
        .with_suggest(Suggest::Replace {
            text: String::new(),
            description: "Remove the space".into(),
        })
        .with_confidence(0.9),
    ]
}

/// A lone `i` that is not part of `i.e.`, `i-th` or a dotted/slashed token.
fn standalone_pronoun(text: &str, start: usize, end: usize) -> bool {
    let bytes = text.as_bytes();
    let before = start.checked_sub(1).and_then(|i| bytes.get(i).copied());
    if matches!(before, Some(b'.' | b'-' | b'/' | b'\'')) {
        return false;
    }
    match bytes.get(end).copied() {
        Some(b'-' | b'/') => false,
        Some(b'.') => !bytes.get(end + 1).is_some_and(u8::is_ascii_alphabetic),
        _ => true,
    }
}

pub fn wordy_construction_rules() -> Vec<Rule> {
    vec![table_rule(
        "wordy-construction",
        Category::Clarity,
        Severity::Suggestion,
        WORDY_CONSTRUCTIONS,
        "Wordy construction: `{text}`",
        "A shorter phrasing says the same thing.",
        0.85,
    )]
}

pub fn overused_expression_rules() -> Vec<Rule> {
    vec![table_rule(
        "overused-expression",
        Category::Engagement,
        Severity::Suggestion,
        OVERUSED_EXPRESSIONS,
        "Overused expression: `{text}`",
        "Stock business phrases dull the writing.",
        0.75,
    )]
}

pub fn weak_adjective_rules() -> Vec<Rule> {
    vec![table_rule(
        "weak-adjective",
        Category::Engagement,
        Severity::Suggestion,
        WEAK_ADJECTIVES,
        "Weak intensifier: `{text}`",
        "A single precise adjective is stronger than an intensifier.",
        0.75,
    )]
}

/// Every built-in table, in detection order.
pub fn base_rules() -> Vec<Rule> {
    let mut rules = typo_rules();
    rules.extend(contraction_rules());
    rules.extend(confusable_rules());
    rules.extend(mechanics_rules());
    rules.extend(wordy_construction_rules());
    rules.extend(overused_expression_rules());
    rules.extend(weak_adjective_rules());
    rules
}
