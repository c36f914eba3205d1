//! Occurrence-finding for `refactor_edit` (SPEC §4.7 steps 2-5): exact scan,
//! hint-range filtering, and a whitespace-normalised fuzzy fallback.

use nucleo_matcher::pattern::{CaseMatching, Normalization, Pattern};
use nucleo_matcher::{Config, Matcher, Utf32Str};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Occurrence {
    pub start_line: usize,
    pub byte_start: usize,
    pub byte_end: usize,
}

/// Every byte-offset occurrence of `needle` in `content`, in order.
pub fn find_exact(content: &str, needle: &str) -> Vec<Occurrence> {
    if needle.is_empty() {
        return Vec::new();
    }
    let mut occurrences = Vec::new();
    let mut cursor = 0;
    while let Some(pos) = content[cursor..].find(needle) {
        let byte_start = cursor + pos;
        let byte_end = byte_start + needle.len();
        let start_line = content[..byte_start].matches('\n').count() + 1;
        occurrences.push(Occurrence { start_line, byte_start, byte_end });
        cursor = byte_start + 1;
    }
    occurrences
}

/// Retains only occurrences whose start line falls within `[hint_start,
/// hint_end]` (SPEC §4.7 step 4).
pub fn filter_by_hint(occurrences: &[Occurrence], hint_start: usize, hint_end: usize) -> Vec<Occurrence> {
    occurrences.iter().filter(|o| o.start_line >= hint_start && o.start_line <= hint_end).cloned().collect()
}

fn normalize_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Slides a window the same height as `needle` over `content` (or just the
/// hinted span, if one is given), comparing whitespace-normalised text
/// first; only when that yields nothing does it fall back to
/// `nucleo_matcher` fuzzy scoring, and even then only a window that beats
/// every other window is accepted (SPEC §4.7 step 5: "a unique fuzzy match
/// replaces; otherwise fail").
pub fn find_fuzzy(content: &str, needle: &str, hint: Option<(usize, usize)>) -> Vec<Occurrence> {
    let lines: Vec<&str> = content.lines().collect();
    if lines.is_empty() {
        return Vec::new();
    }
    let needle_lines = needle.lines().count().max(1);
    let normalized_needle = normalize_whitespace(needle);

    let (hint_start, hint_end) = hint.unwrap_or((1, lines.len()));
    let range_start = hint_start.saturating_sub(1).min(lines.len());
    let range_end = hint_end.min(lines.len());

    let mut windows = Vec::new();
    let mut i = range_start;
    while i + needle_lines <= range_end.max(range_start) && i + needle_lines <= lines.len() {
        windows.push((i, lines[i..i + needle_lines].join("\n")));
        i += 1;
    }

    let exact_normalized: Vec<&(usize, String)> =
        windows.iter().filter(|(_, window)| normalize_whitespace(window) == normalized_needle).collect();
    if exact_normalized.len() == 1 {
        let (line_idx, window) = exact_normalized[0];
        return vec![occurrence_for_window(&lines, *line_idx, window)];
    }
    if exact_normalized.len() > 1 {
        return exact_normalized.iter().map(|(line_idx, window)| occurrence_for_window(&lines, *line_idx, window)).collect();
    }

    fuzzy_rank(&windows, &normalized_needle, &lines)
}

fn fuzzy_rank(windows: &[(usize, String)], normalized_needle: &str, lines: &[&str]) -> Vec<Occurrence> {
    let mut matcher = Matcher::new(Config::DEFAULT);
    let pattern = Pattern::parse(normalized_needle, CaseMatching::Smart, Normalization::Smart);

    let mut scored: Vec<(u32, usize, &str)> = Vec::new();
    for (line_idx, window) in windows {
        let normalized_window = normalize_whitespace(window);
        let mut buf = Vec::new();
        if let Some(score) = pattern.score(Utf32Str::new(&normalized_window, &mut buf), &mut matcher) {
            scored.push((score, *line_idx, window.as_str()));
        }
    }
    scored.sort_by(|a, b| b.0.cmp(&a.0));

    match scored.len() {
        0 => Vec::new(),
        1 => vec![occurrence_for_window(lines, scored[0].1, scored[0].2)],
        _ if scored[0].0 > scored[1].0 => vec![occurrence_for_window(lines, scored[0].1, scored[0].2)],
        _ => Vec::new(),
    }
}

fn occurrence_for_window(lines: &[&str], line_idx: usize, window: &str) -> Occurrence {
    let byte_start: usize = lines[..line_idx].iter().map(|l| l.len() + 1).sum();
    Occurrence { start_line: line_idx + 1, byte_start, byte_end: byte_start + window.len() }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_every_exact_occurrence_with_correct_line_numbers() {
        let content = "fn a() {}\nfn b() {}\nfn a() {}\n";
        let found = find_exact(content, "fn a() {}");
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].start_line, 1);
        assert_eq!(found[1].start_line, 3);
    }

    #[test]
    fn hint_range_narrows_ambiguous_matches_to_one() {
        let content = "fn a() {}\nfn b() {}\nfn a() {}\n";
        let found = find_exact(content, "fn a() {}");
        let narrowed = filter_by_hint(&found, 3, 3);
        assert_eq!(narrowed.len(), 1);
        assert_eq!(narrowed[0].start_line, 3);
    }

    #[test]
    fn fuzzy_match_tolerates_whitespace_differences() {
        let content = "struct Foo {\n    bar:   i32,\n}\n";
        let needle = "struct Foo {\nbar: i32,\n}";
        let found = find_fuzzy(content, needle, None);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].start_line, 1);
    }

    #[test]
    fn fuzzy_match_is_empty_when_nothing_resembles_the_needle() {
        let content = "struct Foo {\n    bar: i32,\n}\n";
        let found = find_fuzzy(content, "completely unrelated text block", None);
        assert!(found.is_empty());
    }

    #[test]
    fn fuzzy_match_respects_the_hinted_span() {
        let content = "struct Foo {\n    bar:   i32,\n}\nstruct Foo {\n    bar:   i32,\n}\n";
        let needle = "struct Foo {\nbar: i32,\n}";
        let found = find_fuzzy(content, needle, Some((4, 6)));
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].start_line, 4);
    }
}
