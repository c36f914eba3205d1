//! Discovery (SPEC §4.3): scan the repo for language-family markers,
//! resolve membership/hole-punch between nested contexts, probe each one's
//! language pack, and route individual files to the deepest owning context.
//!
//! ```text
//! scan()  -> candidate contexts (one per marker file, plus the Other fallback)
//!   │
//! authority filter  -> identity here: every marker maps to exactly one family
//!   │
//! resolve_membership()  -> hole-punch nested same-family contexts
//!   │
//! probe()  -> ProbeStatus per context
//!   │
//! Router::route(path)  -> &CandidateContext
//! ```

mod error;
pub mod membership;
mod probe;
mod router;
mod scanner;

use std::path::Path;

use codeplane_protocol::{LanguageFamily, ProbeStatus};

pub use error::{DiscoveryError, Result};
pub use membership::is_inside;
pub use probe::probe;
pub use router::Router;
pub use scanner::{default_universal_excludes, include_glob_for, scan, UNIVERSAL_EXCLUDES};

/// A candidate context before it's committed to storage as a `Context`
/// (which needs an `id` and knows nothing about probing).
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateContext {
    pub root_path: String,
    pub language_family: LanguageFamily,
    pub include_glob: Vec<String>,
    pub exclude_glob: Vec<String>,
    pub probe_status: ProbeStatus,
}

impl CandidateContext {
    pub fn new(root_path: String, language_family: LanguageFamily) -> Self {
        Self {
            root_path,
            language_family,
            include_glob: Vec::new(),
            exclude_glob: Vec::new(),
            probe_status: ProbeStatus::Unprobed,
        }
    }
}

/// Run discovery phases A through D over `repo_root`. Phase E (routing) is
/// exposed separately via `Router` since indexer calls it per-file, not once
/// for the whole repo.
pub fn discover(repo_root: &Path) -> Result<Vec<CandidateContext>> {
    let candidates = scan(repo_root)?;
    let universal = default_universal_excludes();

    let mut by_family: std::collections::HashMap<LanguageFamily, Vec<CandidateContext>> = std::collections::HashMap::new();
    for c in candidates {
        by_family.entry(c.language_family).or_default().push(c);
    }

    let mut resolved = Vec::new();
    for (_family, group) in by_family {
        resolved.extend(membership::resolve_membership(group, &universal));
    }

    for ctx in &mut resolved {
        probe::probe(repo_root, ctx);
    }

    Ok(resolved)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn discover_end_to_end_on_a_small_repo() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("Cargo.toml"), "[package]\n").unwrap();
        fs::create_dir_all(dir.path().join("src")).unwrap();
        fs::write(dir.path().join("src/main.rs"), "fn main() {}\n").unwrap();

        let contexts = discover(dir.path()).unwrap();
        let rust_ctx = contexts.iter().find(|c| c.language_family == LanguageFamily::Rust).unwrap();
        assert_eq!(rust_ctx.probe_status, ProbeStatus::Ok);

        let router = Router::new(&contexts);
        let routed = router.route("src/main.rs").unwrap();
        assert_eq!(routed.language_family, LanguageFamily::Rust);
    }
}
