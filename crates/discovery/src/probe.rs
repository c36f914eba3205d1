//! Phase D: probe each context against a handful of sample files so the
//! indexer can skip contexts whose language pack can't even read its own
//! source (SPEC §4.3).

use std::path::Path;

use codeplane_protocol::ProbeStatus;
use globset::{Glob, GlobSetBuilder};
use ignore::WalkBuilder;

use crate::CandidateContext;

const SAMPLE_SIZE: usize = 5;

/// Mark `ctx.probe_status` by sampling up to `SAMPLE_SIZE` matching files
/// under `repo_root` and checking they're readable, non-empty UTF-8. This
/// only catches gross context mis-detection (e.g. a binary masquerading
/// under a source extension); it does not run the full extraction pack.
pub fn probe(repo_root: &Path, ctx: &mut CandidateContext) {
    let mut builder = GlobSetBuilder::new();
    for pattern in &ctx.include_glob {
        if let Ok(glob) = Glob::new(pattern) {
            builder.add(glob);
        }
    }
    let Ok(include) = builder.build() else {
        ctx.probe_status = ProbeStatus::Broken;
        return;
    };

    let root = repo_root.join(&ctx.root_path);
    let mut sampled = 0usize;
    let mut readable = 0usize;

    let walker = WalkBuilder::new(&root).hidden(false).git_ignore(true).build();
    for entry in walker {
        if sampled >= SAMPLE_SIZE {
            break;
        }
        let Ok(entry) = entry else { continue };
        if !entry.file_type().map(|ft| ft.is_file()).unwrap_or(false) {
            continue;
        }
        let rel = entry.path().strip_prefix(repo_root).unwrap_or(entry.path());
        let rel_str = rel.to_string_lossy().replace('\\', "/");
        if !include.is_match(&rel_str) {
            continue;
        }
        sampled += 1;
        if std::fs::read_to_string(entry.path()).is_ok() {
            readable += 1;
        }
    }

    ctx.probe_status = if sampled == 0 {
        ProbeStatus::Unprobed
    } else if readable == sampled {
        ProbeStatus::Ok
    } else {
        ProbeStatus::Broken
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use codeplane_protocol::LanguageFamily;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn readable_source_files_probe_ok() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("main.rs"), "fn main() {}\n").unwrap();
        let mut ctx = CandidateContext::new(String::new(), LanguageFamily::Rust);
        ctx.include_glob = vec!["**/*.rs".to_string()];
        probe(dir.path(), &mut ctx);
        assert_eq!(ctx.probe_status, ProbeStatus::Ok);
    }

    #[test]
    fn empty_context_is_unprobed() {
        let dir = tempdir().unwrap();
        let mut ctx = CandidateContext::new(String::new(), LanguageFamily::Go);
        ctx.include_glob = vec!["**/*.go".to_string()];
        probe(dir.path(), &mut ctx);
        assert_eq!(ctx.probe_status, ProbeStatus::Unprobed);
    }
}
