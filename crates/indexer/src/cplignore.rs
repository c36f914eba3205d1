//! Ignore filter: a gitignore-style matcher built from the repo's
//! `.cplignore` plus the union of every context's exclude spec (SPEC §4.4).
//! Edits to `.cplignore` force a reload; SPEC_FULL §C.3 additionally debounces
//! that reload so a burst of saves (an editor writing a temp file then
//! renaming it over `.cplignore`) doesn't rebuild the matcher on every event.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use ignore::gitignore::{Gitignore, GitignoreBuilder};

use crate::Result;

const RELOAD_DEBOUNCE: Duration = Duration::from_millis(500);

pub struct IgnoreFilter {
    repo_root: PathBuf,
    cplignore_path: PathBuf,
    matcher: Gitignore,
    last_mtime: Option<std::time::SystemTime>,
    pending_reload_since: Option<Instant>,
}

impl IgnoreFilter {
    pub fn load(repo_root: &Path, extra_excludes: &[String]) -> Result<Self> {
        let cplignore_path = repo_root.join(".cplignore");
        let matcher = build_matcher(repo_root, &cplignore_path, extra_excludes)?;
        Ok(Self {
            repo_root: repo_root.to_path_buf(),
            cplignore_path,
            matcher,
            last_mtime: std::fs::metadata(repo_root.join(".cplignore")).ok().and_then(|m| m.modified().ok()),
            pending_reload_since: None,
        })
    }

    /// Called whenever a file-change event touches `.cplignore` itself.
    /// Queues a reload rather than performing it immediately, so a burst of
    /// edits within `RELOAD_DEBOUNCE` collapses to one rebuild.
    pub fn notify_cplignore_changed(&mut self) {
        self.pending_reload_since = Some(Instant::now());
    }

    /// Apply any pending reload whose debounce window has elapsed. Returns
    /// `true` if the matcher was rebuilt (callers should re-check files that
    /// were previously filtered).
    pub fn apply_pending_reload(&mut self, extra_excludes: &[String]) -> Result<bool> {
        let Some(since) = self.pending_reload_since else { return Ok(false) };
        if since.elapsed() < RELOAD_DEBOUNCE {
            return Ok(false);
        }
        self.matcher = build_matcher(&self.repo_root, &self.cplignore_path, extra_excludes)?;
        self.last_mtime = std::fs::metadata(&self.cplignore_path).ok().and_then(|m| m.modified().ok());
        self.pending_reload_since = None;
        Ok(true)
    }

    pub fn is_ignored(&self, repo_relative_path: &str) -> bool {
        self.matcher.matched(repo_relative_path, false).is_ignore()
    }
}

fn build_matcher(repo_root: &Path, cplignore_path: &Path, extra_excludes: &[String]) -> Result<Gitignore> {
    let mut builder = GitignoreBuilder::new(repo_root);
    for pattern in codeplane_discovery::UNIVERSAL_EXCLUDES {
        builder.add_line(None, pattern).ok();
    }
    for pattern in extra_excludes {
        builder.add_line(None, pattern).ok();
    }
    if cplignore_path.is_file() {
        let _ = builder.add(cplignore_path);
    }
    Ok(builder.build()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn cplignore_patterns_are_honoured() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join(".cplignore"), "*.generated.rs\n").unwrap();
        let filter = IgnoreFilter::load(dir.path(), &[]).unwrap();
        assert!(filter.is_ignored("src/schema.generated.rs"));
        assert!(!filter.is_ignored("src/lib.rs"));
    }

    #[test]
    fn reload_is_debounced_until_the_window_elapses() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join(".cplignore"), "*.log\n").unwrap();
        let mut filter = IgnoreFilter::load(dir.path(), &[]).unwrap();
        filter.notify_cplignore_changed();
        assert!(!filter.apply_pending_reload(&[]).unwrap());
    }
}
