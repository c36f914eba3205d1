//! Parses the agent's free-text task into identifiers, path-like tokens, an
//! intent classification, negative mentions and three query views (§4.6.1).
//!
//! The token classifiers here are the same heuristics a hybrid search engine
//! uses to decide whether a query is an identifier, a path or a conceptual
//! phrase; recon reuses them to decide which harvester each view feeds.

const STOPWORDS: &[&str] = &[
    "a", "an", "and", "are", "as", "at", "be", "by", "for", "from", "how", "in", "is", "it", "of",
    "on", "or", "that", "the", "this", "to", "what", "when", "where", "why", "with", "not",
    "related", "relevant", "unrelated", "ignore", "ignoring", "except", "excluding",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    Edit,
    Understand,
    Debug,
    TestDriven,
    StacktraceDriven,
    Other,
}

#[derive(Debug, Clone)]
pub struct QueryViews {
    /// The full task text, unmodified.
    pub full_text: String,
    /// Identifiers only, space-joined, for the term-match and lexical harvesters.
    pub identifiers_only: String,
    /// A normalised imperative clause: stopwords and punctuation stripped.
    pub imperative: String,
}

#[derive(Debug, Clone)]
pub struct ParsedTask {
    pub raw: String,
    pub identifiers: Vec<String>,
    pub path_tokens: Vec<String>,
    pub intent: Intent,
    pub negative_mentions: Vec<String>,
    pub views: QueryViews,
}

fn has_file_extension(token: &str) -> bool {
    let Some((_, ext)) = token.rsplit_once('.') else { return false };
    !ext.is_empty() && ext.len() <= 6 && ext.chars().all(|c| c.is_ascii_alphanumeric())
}

fn is_path_token(token: &str) -> bool {
    token.contains('/') || token.contains('\\') || token.contains("::") || has_file_extension(token)
}

fn is_identifier_like(token: &str) -> bool {
    if token.is_empty() || token.contains(' ') {
        return false;
    }
    let has_snake = token.contains('_');
    let has_digits = token.chars().any(|c| c.is_ascii_digit());
    let has_mixed_case =
        token.chars().any(|c| c.is_ascii_lowercase()) && token.chars().any(|c| c.is_ascii_uppercase());
    has_snake || has_digits || has_mixed_case
}

fn strip_punct(token: &str) -> &str {
    token.trim_matches(|c: char| {
        !c.is_ascii_alphanumeric() && c != '_' && c != ':' && c != '/' && c != '.' && c != '\\'
    })
}

fn is_stopword(token: &str) -> bool {
    STOPWORDS.iter().any(|w| w.eq_ignore_ascii_case(token))
}

fn classify_intent(lower: &str) -> Intent {
    const STACKTRACE_MARKERS: &[&str] = &["panicked at", "traceback (most recent", "exception in thread", "   at "];
    const EDIT_MARKERS: &[&str] =
        &["fix", "add ", "implement", "refactor", "update", "change", "rename", "remove", "delete"];
    const TEST_MARKERS: &[&str] = &["failing test", "flaky test", "test is", "tests are", "assertion"];
    const DEBUG_MARKERS: &[&str] = &["debug", "why does", "why is", "broken", "crashes", "fails with"];
    const UNDERSTAND_MARKERS: &[&str] = &["how does", "how do", "explain", "what is", "what does", "understand"];

    if STACKTRACE_MARKERS.iter().any(|m| lower.contains(m)) {
        Intent::StacktraceDriven
    } else if TEST_MARKERS.iter().any(|m| lower.contains(m)) {
        Intent::TestDriven
    } else if DEBUG_MARKERS.iter().any(|m| lower.contains(m)) {
        Intent::Debug
    } else if EDIT_MARKERS.iter().any(|m| lower.contains(m)) {
        Intent::Edit
    } else if UNDERSTAND_MARKERS.iter().any(|m| lower.contains(m)) {
        Intent::Understand
    } else {
        Intent::Other
    }
}

/// Splits off a trailing "not related to X" / "ignoring X" / "except X" clause.
/// Returns the leading clause (still to be parsed normally) and the negative
/// mentions found, as bare tokens.
fn split_negative_mentions(raw: &str) -> (String, Vec<String>) {
    const MARKERS: &[&str] = &["not related to", "not about", "ignoring", "ignore", "except for", "except", "excluding"];
    let lower = raw.to_ascii_lowercase();
    for marker in MARKERS {
        if let Some(pos) = lower.find(marker) {
            let (head, tail) = raw.split_at(pos);
            let clause = &tail[marker.len()..];
            let mentions: Vec<String> = clause
                .split(|c: char| c == ',' || c == ';' || c == '.')
                .next()
                .unwrap_or("")
                .split_whitespace()
                .map(strip_punct)
                .filter(|t| !t.is_empty() && !is_stopword(t))
                .map(str::to_string)
                .collect();
            if !mentions.is_empty() {
                return (head.to_string(), mentions);
            }
        }
    }
    (raw.to_string(), Vec::new())
}

pub fn parse(task: &str) -> ParsedTask {
    let (head, negative_mentions) = split_negative_mentions(task);
    let lower = task.to_ascii_lowercase();
    let intent = classify_intent(&lower);

    let mut identifiers = Vec::new();
    let mut path_tokens = Vec::new();
    let mut imperative_words = Vec::new();

    for raw_token in head.split_whitespace() {
        let token = strip_punct(raw_token);
        if token.is_empty() {
            continue;
        }
        if is_path_token(token) {
            path_tokens.push(token.to_string());
        } else if is_identifier_like(token) {
            identifiers.push(token.to_string());
        }
        if !is_stopword(token) {
            imperative_words.push(token.to_ascii_lowercase());
        }
    }
    identifiers.dedup();
    path_tokens.dedup();

    let views = QueryViews {
        full_text: task.to_string(),
        identifiers_only: identifiers.join(" "),
        imperative: imperative_words.join(" "),
    };

    ParsedTask { raw: task.to_string(), identifiers, path_tokens, intent, negative_mentions, views }
}
