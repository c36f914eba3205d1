//! Assembly with byte budget (§4.6.8): walks files in tier/score order,
//! renders each tier's payload and stops once the cumulative UTF-8 JSON size
//! would exceed the configured budget, emitting a pagination cursor for
//! whatever didn't fit.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::path::Path;

use codeplane_protocol::PaginationCursorV1;
use codeplane_storage::RelationalStore;

use crate::error::Result;
use crate::tier::{Tier, TieredFile};

#[derive(Debug, Clone)]
pub struct AssembledFile {
    pub path: String,
    pub tier: Tier,
    pub payload: String,
}

#[derive(Debug, Clone)]
pub struct AssemblyResult {
    pub files: Vec<AssembledFile>,
    pub cursor: Option<PaginationCursorV1>,
}

fn tier_rank(tier: Tier) -> u8 {
    match tier {
        Tier::FullFile => 0,
        Tier::MinScaffold => 1,
        Tier::SummaryOnly => 2,
    }
}

fn render_full(repo_root: &Path, path: &str) -> Result<String> {
    Ok(std::fs::read_to_string(repo_root.join(path))?)
}

fn render_scaffold(path: &str, file_id: Option<i64>, store: &RelationalStore) -> Result<String> {
    let Some(file_id) = file_id else { return Ok(format!("// {path}\n")) };
    let defs = store.definitions_by_file(file_id)?;
    let mut out = format!("// {path} (scaffold: {} definitions)\n", defs.len());
    for def in defs {
        let sig = def.signature_text.unwrap_or(def.name.clone());
        out.push_str(&format!("{:?} {} -> {}\n", def.kind, def.lexical_path, sig));
    }
    Ok(out)
}

fn render_summary(path: &str, file_id: Option<i64>, store: &RelationalStore) -> Result<String> {
    let Some(file_id) = file_id else { return Ok(format!("{path}\n")) };
    let imports = store.imports_by_file(file_id)?;
    Ok(format!("{path} — {} imports, content omitted\n", imports.len()))
}

fn render(repo_root: &Path, file: &TieredFile, store: &RelationalStore) -> Result<String> {
    match file.tier {
        Tier::FullFile => render_full(repo_root, &file.path),
        Tier::MinScaffold => render_scaffold(&file.path, file.file_id, store),
        Tier::SummaryOnly => render_summary(&file.path, file.file_id, store),
    }
}

fn query_hash(task_raw: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    task_raw.hash(&mut hasher);
    hasher.finish()
}

pub fn assemble(
    repo_root: &Path,
    mut tiered: Vec<TieredFile>,
    store: &RelationalStore,
    max_bytes: usize,
    epoch: u64,
    task_raw: &str,
    tool_name: &str,
) -> Result<AssemblyResult> {
    tiered.sort_by(|a, b| {
        tier_rank(a.tier).cmp(&tier_rank(b.tier)).then_with(|| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal))
    });

    let mut files = Vec::new();
    let mut used_bytes = 0usize;
    let mut truncated_at = None;

    for (idx, file) in tiered.iter().enumerate() {
        let payload = match render(repo_root, file, store) {
            Ok(p) => p,
            Err(err) => {
                tracing::warn!(path = %file.path, %err, "skipping file during assembly");
                continue;
            }
        };
        let byte_len = payload.len();
        if used_bytes + byte_len > max_bytes && !files.is_empty() {
            truncated_at = Some(idx);
            break;
        }
        used_bytes += byte_len;
        files.push(AssembledFile { path: file.path.clone(), tier: file.tier, payload });
    }

    let cursor = truncated_at.map(|offset| PaginationCursorV1 {
        offset: offset as u64,
        epoch,
        query_hash: query_hash(task_raw),
        tool_name: tool_name.to_string(),
    });

    Ok(AssemblyResult { files, cursor })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_hash_is_stable_for_the_same_task() {
        assert_eq!(query_hash("fix the bug"), query_hash("fix the bug"));
        assert_ne!(query_hash("fix the bug"), query_hash("fix another bug"));
    }
}
