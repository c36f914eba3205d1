//! Operation ledger (SPEC §4.7 step 6): an append-only, newline-delimited
//! JSON record of every `refactor_edit` applied, so a caller can audit what
//! changed and when without re-deriving it from git history.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::Result;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub path: String,
    pub before_sha256: String,
    pub after_sha256: String,
    pub applied_at_unix: u64,
}

pub struct EditLedger {
    path: PathBuf,
}

impl EditLedger {
    /// `path` is typically `<index_path>/edit_ledger.jsonl`. Its parent
    /// directory is created on open; the file itself is created lazily on
    /// the first `record`.
    pub fn open(path: PathBuf) -> Result<Self> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        Ok(Self { path })
    }

    pub fn record(&self, repo_relative_path: &Path, before_sha256: &str, after_sha256: &str) -> Result<()> {
        let entry = LedgerEntry {
            path: repo_relative_path.to_string_lossy().replace('\\', "/"),
            before_sha256: before_sha256.to_string(),
            after_sha256: after_sha256.to_string(),
            applied_at_unix: SystemTime::now().duration_since(UNIX_EPOCH).map(|d| d.as_secs()).unwrap_or(0),
        };
        let mut file = OpenOptions::new().create(true).append(true).open(&self.path)?;
        writeln!(file, "{}", serde_json::to_string(&entry)?)?;
        Ok(())
    }

    pub fn read_all(&self) -> Result<Vec<LedgerEntry>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let raw = fs::read_to_string(&self.path)?;
        raw.lines().filter(|line| !line.is_empty()).map(|line| Ok(serde_json::from_str(line)?)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn records_round_trip_through_the_ledger_file() {
        let dir = tempfile::tempdir().unwrap();
        let ledger = EditLedger::open(dir.path().join("edit_ledger.jsonl")).unwrap();

        ledger.record(Path::new("src/lib.rs"), "before1", "after1").unwrap();
        ledger.record(Path::new("src/main.rs"), "before2", "after2").unwrap();

        let entries = ledger.read_all().unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].path, "src/lib.rs");
        assert_eq!(entries[1].before_sha256, "before2");
    }

    #[test]
    fn reading_a_ledger_that_was_never_written_to_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let ledger = EditLedger::open(dir.path().join("nested/edit_ledger.jsonl")).unwrap();
        assert!(ledger.read_all().unwrap().is_empty());
    }
}
