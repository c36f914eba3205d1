//! Resolves a merged candidate's missing fields by joining against the
//! definition table (§4.6.3). Test/barrel flags feed the scoring and
//! tier-assignment stages.

use codeplane_protocol::{ArtifactKind, DefKind};
use codeplane_storage::RelationalStore;

use crate::harvest::HarvestCandidate;
use crate::error::Result;

#[derive(Debug, Clone)]
pub struct EnrichedCandidate {
    pub path: String,
    pub def_uid: Option<String>,
    pub file_id: Option<i64>,
    pub signature: Option<String>,
    pub kind: Option<DefKind>,
    pub is_test: bool,
    pub is_barrel: bool,
    pub sources: Vec<HarvestCandidate>,
}

pub fn enrich(
    path: &str,
    def_uid: Option<&str>,
    sources: Vec<HarvestCandidate>,
    store: &RelationalStore,
) -> Result<EnrichedCandidate> {
    let file = store.file_by_path(path)?;
    let file_id = file.as_ref().map(|f| f.id);

    let def = match def_uid {
        Some(uid) => store.definition(uid)?,
        None => None,
    };

    let artifact_kind = match file_id {
        Some(id) => store.file_artifact_kind(id)?.unwrap_or(ArtifactKind::Production),
        None => ArtifactKind::Production,
    };

    Ok(EnrichedCandidate {
        path: path.to_string(),
        def_uid: def_uid.map(str::to_string),
        file_id,
        signature: def.as_ref().and_then(|d| d.signature_text.clone()),
        kind: def.as_ref().map(|d| d.kind),
        is_test: artifact_kind == ArtifactKind::Test,
        is_barrel: artifact_kind == ArtifactKind::Barrel,
        sources,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::harvest::HarvestSource;
    use codeplane_protocol::{Context, FileRecord, LanguageFamily, ProbeStatus};

    #[test]
    fn flags_a_test_file_as_is_test() {
        let store = RelationalStore::open_in_memory().unwrap();
        let ctx_id = store
            .upsert_context(&Context {
                id: 0,
                root_path: "".into(),
                language_family: LanguageFamily::Rust,
                include_glob: vec![],
                exclude_glob: vec![],
                probe_status: ProbeStatus::Ok,
            })
            .unwrap();
        store
            .upsert_file(
                &FileRecord {
                    id: 0,
                    repo_relative_path: "tests/it.rs".into(),
                    language_family: LanguageFamily::Rust,
                    content_hash: "h".into(),
                    size: 1,
                    context_id: ctx_id,
                    present: true,
                },
                ArtifactKind::Test,
            )
            .unwrap();

        let candidate = HarvestCandidate {
            def_uid: None,
            path: "tests/it.rs".into(),
            score: 1.0,
            source: HarvestSource::Explicit,
            evidence: vec![],
        };
        let enriched = enrich("tests/it.rs", None, vec![candidate], &store).unwrap();
        assert!(enriched.is_test);
        assert!(!enriched.is_barrel);
    }
}
