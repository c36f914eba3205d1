//! Orchestrates the full recon pipeline (§4.6.1 – §4.6.9) against a live
//! `Storage` handle.

use std::path::Path;

use codeplane_protocol::ToolNextAction;
use codeplane_storage::Storage;
use serde_json::json;

use crate::assemble::{self, AssemblyResult};
use crate::cutoff;
use crate::enrich;
use crate::error::{ReconError, Result};
use crate::expansion;
use crate::harvest;
use crate::score;
use crate::task::{self, ParsedTask};
use crate::tier;

#[derive(Debug, Clone)]
pub struct ReconConfig {
    pub max_bytes: usize,
    pub harvest_limit: usize,
    pub tool_name: String,
}

impl Default for ReconConfig {
    fn default() -> Self {
        Self { max_bytes: 20_000, harvest_limit: 20, tool_name: "recon".to_string() }
    }
}

#[derive(Debug, Clone)]
pub struct ReconOutcome {
    pub assembled: AssemblyResult,
    pub next_actions: Vec<ToolNextAction>,
}

fn failure_menu(parsed: &ParsedTask) -> Vec<ToolNextAction> {
    vec![
        ToolNextAction {
            tool: "lexical_search".to_string(),
            args: json!({"query": parsed.views.imperative}),
            reason: "no recon candidates survived scoring; try a direct lexical search with the extracted terms".to_string(),
        },
        ToolNextAction {
            tool: "map_repo".to_string(),
            args: json!({}),
            reason: "get an overview of the repository layout before narrowing down".to_string(),
        },
        ToolNextAction {
            tool: "read_source".to_string(),
            args: json!({"paths": parsed.path_tokens}),
            reason: "read the explicitly mentioned paths directly".to_string(),
        },
        ToolNextAction {
            tool: "recon".to_string(),
            args: json!({"task": parsed.raw}),
            reason: "rephrase the task and call recon again".to_string(),
        },
    ]
}

pub fn run(repo_root: &Path, storage: &Storage, task_text: &str, config: &ReconConfig) -> Result<ReconOutcome> {
    if task_text.trim().is_empty() {
        return Err(ReconError::EmptyTask);
    }

    let parsed = task::parse(task_text);
    let epoch = storage.current_epoch();

    let relational = storage.relational.read().expect("relational store lock poisoned");
    let lexical = storage.lexical.read().expect("lexical index lock poisoned");
    let def_vectors = storage.def_vectors.read().expect("def vector store lock poisoned");
    let file_vectors = storage.file_vectors.read().expect("file vector store lock poisoned");

    let explicit = harvest::harvest_explicit(&parsed, &relational)?;
    let lexical_hits = harvest::harvest_lexical(&parsed.views, &lexical, config.harvest_limit)?;
    let term_hits = harvest::harvest_term_match(&parsed.identifiers, &relational, config.harvest_limit)?;
    let def_hits = harvest::harvest_def_embedding(&parsed.views, &def_vectors, &relational, config.harvest_limit)?;
    let file_hits = harvest::harvest_file_embedding(&parsed.views, &file_vectors, config.harvest_limit)?;

    let merged = harvest::merge(vec![explicit, lexical_hits, term_hits, def_hits, file_hits]);

    if merged.is_empty() {
        return Ok(ReconOutcome { assembled: AssemblyResult { files: vec![], cursor: None }, next_actions: failure_menu(&parsed) });
    }

    let mut enriched = Vec::with_capacity(merged.len());
    for ((path, def_uid), sources) in merged {
        enriched.push(enrich::enrich(&path, def_uid.as_deref(), sources, &relational)?);
    }

    let mut scored = score::score_candidates(&enriched, parsed.intent);
    score::sort_descending(&mut scored);

    let seed_size = cutoff::seed_set_size(&scored, &parsed.path_tokens);
    let seeds = scored.into_iter().take(seed_size).collect::<Vec<_>>();

    let graph = codeplane_graph::build(&relational)?;
    let seed_file_ids: Vec<i64> = seeds.iter().filter_map(|s| s.file_id).collect();
    let expansion_adds = expansion::expand_seeds(&graph, &seed_file_ids);

    let all_files = relational.all_files()?;
    let path_for = |file_id: i64| all_files.iter().find(|f| f.id == file_id).map(|f| f.repo_relative_path.clone());

    let mut tiered = tier::assign_seed_tiers(&seeds);
    tiered.extend(tier::assign_expansion_tiers(&expansion_adds, path_for));

    let assembled = assemble::assemble(repo_root, tiered, &relational, config.max_bytes, epoch, task_text, &config.tool_name)?;

    Ok(ReconOutcome { assembled, next_actions: Vec::new() })
}

#[cfg(test)]
mod tests {
    use super::*;
    use codeplane_storage::{HashEmbedder, Storage};
    use codeplane_protocol::{ArtifactKind, Context, FileRecord, LanguageFamily, ProbeStatus};
    use std::sync::Arc;
    use tempfile::tempdir;

    #[test]
    fn empty_task_is_rejected() {
        let storage = Storage::open_in_memory(Arc::new(HashEmbedder::new(16))).unwrap();
        let result = run(Path::new("."), &storage, "   ", &ReconConfig::default());
        assert!(matches!(result, Err(ReconError::EmptyTask)));
    }

    #[test]
    fn no_candidates_returns_a_failure_menu() {
        let storage = Storage::open_in_memory(Arc::new(HashEmbedder::new(16))).unwrap();
        let outcome = run(Path::new("."), &storage, "explain the quantum flux capacitor", &ReconConfig::default()).unwrap();
        assert!(outcome.assembled.files.is_empty());
        assert!(!outcome.next_actions.is_empty());
    }

    #[test]
    fn explicit_path_mention_surfaces_the_file() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("widget.rs"), "pub fn widget() {}\n").unwrap();

        let storage = Storage::open_in_memory(Arc::new(HashEmbedder::new(16))).unwrap();
        {
            let relational = storage.relational.write().unwrap();
            let ctx_id = relational
                .upsert_context(&Context {
                    id: 0,
                    root_path: dir.path().to_string_lossy().to_string(),
                    language_family: LanguageFamily::Rust,
                    include_glob: vec![],
                    exclude_glob: vec![],
                    probe_status: ProbeStatus::Ok,
                })
                .unwrap();
            relational
                .upsert_file(
                    &FileRecord {
                        id: 0,
                        repo_relative_path: "widget.rs".into(),
                        language_family: LanguageFamily::Rust,
                        content_hash: "h".into(),
                        size: 20,
                        context_id: ctx_id,
                        present: true,
                    },
                    ArtifactKind::Production,
                )
                .unwrap();
        }

        let outcome = run(dir.path(), &storage, "fix widget.rs", &ReconConfig::default()).unwrap();
        assert!(outcome.assembled.files.iter().any(|f| f.path == "widget.rs"));
    }
}
