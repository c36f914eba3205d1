//! Tree-sitter plumbing shared by every `LanguagePack`: span conversion,
//! doc-comment scan-back, and a same-file identifier walk that seeds the
//! resolver's `resolve_same_file` pass (full cross-file resolution happens
//! in `codeplane-storage`/`codeplane-indexer`, against the committed index).

use std::collections::HashSet;

use codeplane_protocol::{RefFact, RefRole, RefTier, Span};
use tree_sitter::Node;

pub fn span_of(node: Node) -> Span {
    let start = node.start_position();
    let end = node.end_position();
    Span {
        start_line: start.row as u32 + 1,
        start_col: start.column as u32 + 1,
        end_line: end.row as u32 + 1,
        end_col: end.column as u32 + 1,
    }
}

pub fn text_of<'a>(source: &'a str, node: Node) -> &'a str {
    &source[node.start_byte()..node.end_byte()]
}

/// First line of a node's text, trimmed — used as the definition's
/// signature text when there's no dedicated signature node to target.
pub fn signature_line(source: &str, node: Node) -> String {
    text_of(source, node).lines().next().unwrap_or("").trim().to_string()
}

/// Scan backwards from a node's start line collecting contiguous doc-comment
/// lines, the way editors show "hover docs" for a symbol.
pub fn doc_comment_before(source: &str, node: Node, prefixes: &[&str]) -> Option<String> {
    if prefixes.is_empty() {
        return None;
    }
    let lines: Vec<&str> = source.lines().collect();
    let start_row = node.start_position().row;
    if start_row == 0 {
        return None;
    }
    let mut collected = Vec::new();
    let mut idx = start_row;
    while idx > 0 {
        idx -= 1;
        let trimmed = lines[idx].trim();
        if trimmed.is_empty() {
            if collected.is_empty() {
                continue;
            }
            break;
        }
        if prefixes.iter().any(|p| trimmed.starts_with(p)) {
            collected.push(lines[idx]);
        } else {
            break;
        }
    }
    if collected.is_empty() {
        return None;
    }
    collected.reverse();
    Some(collected.join("\n"))
}

/// Find the first child node whose kind is one of `name_kinds` — the common
/// "identifier child gives the symbol name" pattern across grammars.
pub fn first_named_child<'a>(node: Node<'a>, name_kinds: &[&str]) -> Option<Node<'a>> {
    let mut cursor = node.walk();
    let found = node.children(&mut cursor).find(|c| name_kinds.contains(&c.kind()));
    found
}

/// Walk the whole tree collecting identifier-like tokens that match a known
/// definition name, skipping the definer's own name node. Role is inferred
/// from the immediate parent node kind. This is a same-file pass only —
/// `RefTier` starts at `Unknown` and the resolver raises it.
pub fn collect_same_file_refs(
    source: &str,
    root: Node,
    file_id: i64,
    created_epoch: u64,
    identifier_kinds: &[&str],
    call_parent_kinds: &[&str],
    write_parent_kinds: &[&str],
    def_name_nodes: &HashSet<usize>,
    known_names: &HashSet<String>,
) -> (Vec<RefFact>, Vec<String>) {
    let mut refs = Vec::new();
    let mut candidate_names = Vec::new();
    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        if identifier_kinds.contains(&node.kind()) && !def_name_nodes.contains(&node.id()) {
            let text = text_of(source, node);
            if known_names.contains(text) {
                let parent_kind = node.parent().map(|p| p.kind()).unwrap_or("");
                let role = if call_parent_kinds.contains(&parent_kind) {
                    RefRole::Call
                } else if write_parent_kinds.contains(&parent_kind) {
                    RefRole::Write
                } else {
                    RefRole::Read
                };
                refs.push(RefFact {
                    file_id,
                    token: text.to_string(),
                    span: span_of(node),
                    role,
                    tier: RefTier::Unknown,
                    certainty: 1.0,
                    target_def_uid: None,
                    created_epoch,
                });
                candidate_names.push(text.to_string());
            }
        }
        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            stack.push(child);
        }
    }
    (refs, candidate_names)
}
