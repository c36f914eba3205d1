//! Builds a `FileGraph` from the relational store's files + imports
//! (SPEC §4.6.6: "immediate structural neighbours... strongly linked via
//! import facts").

use codeplane_protocol::ArtifactKind;
use codeplane_storage::RelationalStore;

use crate::types::{FileGraph, FileNode};
use crate::Result;

pub fn build(store: &RelationalStore) -> Result<FileGraph> {
    let mut graph = FileGraph::new();
    let files = store.all_files()?;

    for file in &files {
        let artifact_kind = store.file_artifact_kind(file.id)?.unwrap_or(ArtifactKind::Production);
        graph.add_file(FileNode { file_id: file.id, path: file.repo_relative_path.clone(), artifact_kind });
    }

    for file in &files {
        for import in store.imports_by_file(file.id)? {
            let Some(target_path) = import.resolved_target_path else { continue };
            let Some(target) = store.file_by_path(&target_path)? else { continue };
            graph.add_import(file.id, target.id, import.is_star);
        }
    }

    Ok(graph)
}

#[cfg(test)]
mod tests {
    use super::*;
    use codeplane_protocol::{Context, FileRecord, ImportFact, LanguageFamily, ProbeStatus};

    fn ctx(store: &RelationalStore) -> i64 {
        store
            .upsert_context(&Context {
                id: 0,
                root_path: "".to_string(),
                language_family: LanguageFamily::Rust,
                include_glob: vec![],
                exclude_glob: vec![],
                probe_status: ProbeStatus::Ok,
            })
            .unwrap()
    }

    #[test]
    fn resolved_imports_become_edges() {
        let mut store = RelationalStore::open_in_memory().unwrap();
        let ctx_id = ctx(&store);
        let a = store
            .upsert_file(
                &FileRecord { id: 0, repo_relative_path: "a.rs".into(), language_family: LanguageFamily::Rust, content_hash: "h".into(), size: 1, context_id: ctx_id, present: true },
                ArtifactKind::Production,
            )
            .unwrap();
        let b = store
            .upsert_file(
                &FileRecord { id: 0, repo_relative_path: "b.rs".into(), language_family: LanguageFamily::Rust, content_hash: "h".into(), size: 1, context_id: ctx_id, present: true },
                ArtifactKind::Production,
            )
            .unwrap();
        store
            .replace_imports(a, &[ImportFact { file_id: a, kind: "use".into(), source_literal: "b".into(), resolved_target_path: Some("b.rs".into()), is_star: false }])
            .unwrap();

        let graph = build(&store).unwrap();
        assert_eq!(graph.len(), 2);
        assert!(graph.node(b).is_some());
    }
}
