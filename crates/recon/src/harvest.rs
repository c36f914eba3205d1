//! Independent candidate sources (§4.6.2). Each harvester is blind to the
//! others; `merge` unions their output by `(path, def_uid)` without summing
//! scores yet — that happens in the scoring stage, which needs the sources
//! kept separate to apply view-aware weights.

use std::collections::HashMap;

use codeplane_storage::{DefVectorStore, FileVectorStore, LexicalIndex, RelationalStore};

use crate::error::Result;
use crate::task::{ParsedTask, QueryViews};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HarvestSource {
    Explicit,
    Lexical,
    TermMatch,
    DefEmbedding,
    FileEmbedding,
}

#[derive(Debug, Clone)]
pub struct HarvestCandidate {
    pub def_uid: Option<String>,
    pub path: String,
    pub score: f32,
    pub source: HarvestSource,
    pub evidence: Vec<String>,
}

/// Literally-mentioned paths and identifiers (§4.6.2.1). Highest-confidence
/// source: an exact path match or an exact def-name match.
pub fn harvest_explicit(task: &ParsedTask, store: &RelationalStore) -> Result<Vec<HarvestCandidate>> {
    let mut out = Vec::new();
    let all_files = store.all_files()?;

    for path_token in &task.path_tokens {
        for file in all_files
            .iter()
            .filter(|f| f.repo_relative_path.ends_with(path_token.as_str()) || f.repo_relative_path == *path_token)
        {
            out.push(HarvestCandidate {
                def_uid: None,
                path: file.repo_relative_path.clone(),
                score: 1.0,
                source: HarvestSource::Explicit,
                evidence: vec![format!("path literally mentions `{path_token}`")],
            });
        }
    }

    for ident in &task.identifiers {
        for def in store.definitions_by_name(ident)? {
            if let Some(file) = all_files.iter().find(|f| f.id == def.file_id) {
                out.push(HarvestCandidate {
                    def_uid: Some(def.def_uid.clone()),
                    path: file.repo_relative_path.clone(),
                    score: 1.0,
                    source: HarvestSource::Explicit,
                    evidence: vec![format!("identifier `{ident}` literally mentioned")],
                });
            }
        }
    }

    Ok(out)
}

/// BM25 against the lexical index, run once per query view (§4.6.2.2).
pub fn harvest_lexical(views: &QueryViews, lexical: &LexicalIndex, limit: usize) -> Result<Vec<HarvestCandidate>> {
    let mut out = Vec::new();
    for (view_name, text) in [("full_text", &views.full_text), ("imperative", &views.imperative)] {
        if text.trim().is_empty() {
            continue;
        }
        for hit in lexical.search(text, limit)? {
            out.push(HarvestCandidate {
                def_uid: None,
                path: hit.path,
                score: hit.score,
                source: HarvestSource::Lexical,
                evidence: vec![format!("lexical match on {view_name} view")],
            });
        }
    }
    Ok(out)
}

/// SQL LIKE over definition names for extracted identifiers (§4.6.2.3).
pub fn harvest_term_match(
    identifiers: &[String],
    store: &RelationalStore,
    limit: usize,
) -> Result<Vec<HarvestCandidate>> {
    let mut out = Vec::new();
    let all_files = store.all_files()?;
    for ident in identifiers {
        let pattern = format!("%{}%", ident.replace('%', "\\%").replace('_', "\\_"));
        for def in store.definitions_like(&pattern, limit)? {
            if let Some(file) = all_files.iter().find(|f| f.id == def.file_id) {
                out.push(HarvestCandidate {
                    def_uid: Some(def.def_uid.clone()),
                    path: file.repo_relative_path.clone(),
                    score: 0.6,
                    source: HarvestSource::TermMatch,
                    evidence: vec![format!("definition name matches `{ident}`")],
                });
            }
        }
    }
    Ok(out)
}

/// Definition-embedding search (§4.5.2), aggregated over every query view.
pub fn harvest_def_embedding(
    views: &QueryViews,
    defs: &DefVectorStore,
    store: &RelationalStore,
    k: usize,
) -> Result<Vec<HarvestCandidate>> {
    let mut out = Vec::new();
    let all_files = store.all_files()?;
    for (view_name, text) in [("full_text", &views.full_text), ("identifiers_only", &views.identifiers_only)] {
        if text.trim().is_empty() {
            continue;
        }
        for (def_uid, score) in defs.search_text(text, k)? {
            let Some(def) = store.definition(&def_uid)? else { continue };
            let Some(file) = all_files.iter().find(|f| f.id == def.file_id) else { continue };
            out.push(HarvestCandidate {
                def_uid: Some(def_uid),
                path: file.repo_relative_path.clone(),
                score,
                source: HarvestSource::DefEmbedding,
                evidence: vec![format!("definition embedding match on {view_name} view")],
            });
        }
    }
    Ok(out)
}

/// File-embedding search (§4.5.3), max-pooled over a file's two chunks.
pub fn harvest_file_embedding(views: &QueryViews, files: &FileVectorStore, k: usize) -> Result<Vec<HarvestCandidate>> {
    let mut best: HashMap<String, f32> = HashMap::new();
    if !views.full_text.trim().is_empty() {
        for (chunk_key, score) in files.search_text(&views.full_text, k)? {
            let path = chunk_key.split('\u{0}').next().unwrap_or(&chunk_key).to_string();
            best.entry(path).and_modify(|s| *s = s.max(score)).or_insert(score);
        }
    }
    Ok(best
        .into_iter()
        .map(|(path, score)| HarvestCandidate {
            def_uid: None,
            path,
            score,
            source: HarvestSource::FileEmbedding,
            evidence: vec!["file embedding match".to_string()],
        })
        .collect())
}

/// Union by `(path, def_uid)`. Scores from different sources are kept as
/// separate entries in the returned map's value list, not summed.
pub fn merge(groups: Vec<Vec<HarvestCandidate>>) -> HashMap<(String, Option<String>), Vec<HarvestCandidate>> {
    let mut merged: HashMap<(String, Option<String>), Vec<HarvestCandidate>> = HashMap::new();
    for candidate in groups.into_iter().flatten() {
        let key = (candidate.path.clone(), candidate.def_uid.clone());
        merged.entry(key).or_default().push(candidate);
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_unions_by_path_and_def_uid() {
        let a = HarvestCandidate {
            def_uid: None,
            path: "a.rs".into(),
            score: 1.0,
            source: HarvestSource::Explicit,
            evidence: vec![],
        };
        let b = HarvestCandidate {
            def_uid: None,
            path: "a.rs".into(),
            score: 0.5,
            source: HarvestSource::Lexical,
            evidence: vec![],
        };
        let merged = merge(vec![vec![a], vec![b]]);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged.values().next().unwrap().len(), 2);
    }
}
