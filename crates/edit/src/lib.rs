//! Edit engine (SPEC §4.7): `refactor_edit`'s span-safe find-and-replace.
//!
//! ```text
//! expected_file_sha256 == current sha256? ──no──> CONTENT_MISMATCH
//!     │ yes
//!     ▼
//! exact occurrences of old_text
//!     │
//!   0 ─────────────────────────┐        1 ──────> replace
//!     │                        │
//!     ▼                        ▼
//! fuzzy (whitespace-norm.   >1, hint given? ──no──> AMBIGUOUS_MATCH
//! windows, nucleo fallback)     │ yes
//!     │                        ▼
//!   1 match ──> replace    exactly one left? ──yes──> replace
//!   else ──> NO_MATCH           │ no
//!                               ▼
//!                         AMBIGUOUS_MATCH
//! ```
//!
//! On success the new content is persisted, before/after hashes go to the
//! `EditLedger`, and the indexer's `Pipeline` re-runs the changed path
//! through the normal batch path so the next recon/search sees it.

mod error;
mod hash;
mod ledger;
mod resolve;

pub use error::{EditError, Result};
pub use ledger::{EditLedger, LedgerEntry};
pub use resolve::Occurrence;

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use codeplane_indexer::{ChangeKind, FileChangeEvent, Pipeline};
use codeplane_storage::Storage;

#[derive(Debug, Clone)]
pub struct RefactorEditRequest {
    /// Repo-relative path, e.g. `src/lib.rs`.
    pub path: PathBuf,
    pub old_text: String,
    pub new_text: String,
    pub hint_start_line: Option<usize>,
    pub hint_end_line: Option<usize>,
    pub expected_file_sha256: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchKind {
    Exact,
    HintDisambiguated,
    Fuzzy,
}

#[derive(Debug, Clone)]
pub struct RefactorEditResult {
    pub before_sha256: String,
    pub after_sha256: String,
    pub replaced_at_line: usize,
    pub match_kind: MatchKind,
}

/// One `EditEngine` per served repo. Owns the `Pipeline` used to notify the
/// indexer and the `EditLedger` used to record what changed.
pub struct EditEngine {
    repo_root: PathBuf,
    pipeline: Mutex<Pipeline>,
    ledger: EditLedger,
}

impl EditEngine {
    pub fn new(repo_root: PathBuf, storage: Arc<Storage>, ledger_path: PathBuf) -> Result<Self> {
        let pipeline = Pipeline::new(repo_root.clone(), storage)?;
        let ledger = EditLedger::open(ledger_path)?;
        Ok(Self { repo_root, pipeline: Mutex::new(pipeline), ledger })
    }

    pub fn apply(&self, request: RefactorEditRequest) -> Result<RefactorEditResult> {
        let absolute = self.repo_root.join(&request.path);
        let before_bytes = std::fs::read(&absolute)?;
        let before_sha256 = hash::sha256_hex(&before_bytes);
        if before_sha256 != request.expected_file_sha256 {
            return Err(EditError::ContentMismatch);
        }

        let content = String::from_utf8_lossy(&before_bytes).into_owned();
        let (chosen, match_kind) = self.resolve_occurrence(&content, &request)?;

        let mut new_content = String::with_capacity(content.len() - (chosen.byte_end - chosen.byte_start) + request.new_text.len());
        new_content.push_str(&content[..chosen.byte_start]);
        new_content.push_str(&request.new_text);
        new_content.push_str(&content[chosen.byte_end..]);

        std::fs::write(&absolute, new_content.as_bytes())?;
        let after_sha256 = hash::sha256_hex(new_content.as_bytes());

        self.ledger.record(&request.path, &before_sha256, &after_sha256)?;

        let mut pipeline = self.pipeline.lock().unwrap();
        pipeline.run_batch(&[FileChangeEvent { path: absolute, kind: ChangeKind::Modified }])?;

        Ok(RefactorEditResult { before_sha256, after_sha256, replaced_at_line: chosen.start_line, match_kind })
    }

    fn resolve_occurrence(&self, content: &str, request: &RefactorEditRequest) -> Result<(Occurrence, MatchKind)> {
        let exact = resolve::find_exact(content, &request.old_text);
        match exact.len() {
            1 => return Ok((exact[0].clone(), MatchKind::Exact)),
            0 => {}
            _ => {
                if let (Some(start), Some(end)) = (request.hint_start_line, request.hint_end_line) {
                    let narrowed = resolve::filter_by_hint(&exact, start, end);
                    if narrowed.len() == 1 {
                        return Ok((narrowed[0].clone(), MatchKind::HintDisambiguated));
                    }
                }
                return Err(EditError::AmbiguousMatch {
                    count: exact.len(),
                    lines: exact.iter().map(|o| o.start_line).collect(),
                });
            }
        }

        let hint = request.hint_start_line.zip(request.hint_end_line);
        let fuzzy = resolve::find_fuzzy(content, &request.old_text, hint);
        if fuzzy.len() == 1 {
            return Ok((fuzzy[0].clone(), MatchKind::Fuzzy));
        }
        Err(EditError::NoMatch { path: request.path.display().to_string() })
    }

    pub fn ledger(&self) -> &EditLedger {
        &self.ledger
    }
}

/// Current sha256 of a repo-relative file, as a caller would compute it
/// client-side before issuing `expected_file_sha256`.
pub fn current_sha256(repo_root: &Path, repo_relative_path: &Path) -> Result<String> {
    let bytes = std::fs::read(repo_root.join(repo_relative_path))?;
    Ok(hash::sha256_hex(&bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use codeplane_storage::HashEmbedder;

    fn engine(repo_root: PathBuf) -> EditEngine {
        let index_dir = tempfile::tempdir().unwrap().into_path();
        let storage = Arc::new(Storage::open(&index_dir, Arc::new(HashEmbedder::new(8))).unwrap());
        EditEngine::new(repo_root, storage, index_dir.join("edit_ledger.jsonl")).unwrap()
    }

    #[test]
    fn exact_single_match_is_replaced_and_ledgered() {
        let repo = tempfile::tempdir().unwrap();
        let file = repo.path().join("a.txt");
        std::fs::write(&file, "hello world\n").unwrap();
        let expected = current_sha256(repo.path(), Path::new("a.txt")).unwrap();

        let edit = engine(repo.path().to_path_buf());
        let result = edit
            .apply(RefactorEditRequest {
                path: PathBuf::from("a.txt"),
                old_text: "world".into(),
                new_text: "there".into(),
                hint_start_line: None,
                hint_end_line: None,
                expected_file_sha256: expected,
            })
            .unwrap();

        assert_eq!(result.match_kind, MatchKind::Exact);
        assert_eq!(std::fs::read_to_string(&file).unwrap(), "hello there\n");
        assert_eq!(edit.ledger().read_all().unwrap().len(), 1);
    }

    #[test]
    fn stale_expected_hash_is_rejected_without_touching_the_file() {
        let repo = tempfile::tempdir().unwrap();
        let file = repo.path().join("a.txt");
        std::fs::write(&file, "hello world\n").unwrap();

        let edit = engine(repo.path().to_path_buf());
        let err = edit
            .apply(RefactorEditRequest {
                path: PathBuf::from("a.txt"),
                old_text: "world".into(),
                new_text: "there".into(),
                hint_start_line: None,
                hint_end_line: None,
                expected_file_sha256: "0".repeat(64),
            })
            .unwrap_err();

        assert!(matches!(err, EditError::ContentMismatch));
        assert_eq!(std::fs::read_to_string(&file).unwrap(), "hello world\n");
    }

    #[test]
    fn ambiguous_match_without_a_disambiguating_hint_fails() {
        let repo = tempfile::tempdir().unwrap();
        let file = repo.path().join("a.txt");
        std::fs::write(&file, "dup\ndup\n").unwrap();
        let expected = current_sha256(repo.path(), Path::new("a.txt")).unwrap();

        let edit = engine(repo.path().to_path_buf());
        let err = edit
            .apply(RefactorEditRequest {
                path: PathBuf::from("a.txt"),
                old_text: "dup".into(),
                new_text: "single".into(),
                hint_start_line: None,
                hint_end_line: None,
                expected_file_sha256: expected,
            })
            .unwrap_err();

        match err {
            EditError::AmbiguousMatch { count, lines } => {
                assert_eq!(count, 2);
                assert_eq!(lines, vec![1, 2]);
            }
            other => panic!("expected AmbiguousMatch, got {other:?}"),
        }
    }

    #[test]
    fn hint_range_disambiguates_a_multi_match() {
        let repo = tempfile::tempdir().unwrap();
        let file = repo.path().join("a.txt");
        std::fs::write(&file, "dup\ndup\n").unwrap();
        let expected = current_sha256(repo.path(), Path::new("a.txt")).unwrap();

        let edit = engine(repo.path().to_path_buf());
        let result = edit
            .apply(RefactorEditRequest {
                path: PathBuf::from("a.txt"),
                old_text: "dup".into(),
                new_text: "second".into(),
                hint_start_line: Some(2),
                hint_end_line: Some(2),
                expected_file_sha256: expected,
            })
            .unwrap();

        assert_eq!(result.match_kind, MatchKind::HintDisambiguated);
        assert_eq!(std::fs::read_to_string(&file).unwrap(), "dup\nsecond\n");
    }

    #[test]
    fn no_match_anywhere_fails_with_no_match() {
        let repo = tempfile::tempdir().unwrap();
        let file = repo.path().join("a.txt");
        std::fs::write(&file, "hello world\n").unwrap();
        let expected = current_sha256(repo.path(), Path::new("a.txt")).unwrap();

        let edit = engine(repo.path().to_path_buf());
        let err = edit
            .apply(RefactorEditRequest {
                path: PathBuf::from("a.txt"),
                old_text: "nonexistent phrase".into(),
                new_text: "x".into(),
                hint_start_line: None,
                hint_end_line: None,
                expected_file_sha256: expected,
            })
            .unwrap_err();

        assert!(matches!(err, EditError::NoMatch { .. }));
    }
}
