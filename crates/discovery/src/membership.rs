//! Phase B/C: authority filter and membership/hole-punch (SPEC §4.3).
//!
//! `is_inside` is segment-safe per SPEC_FULL §C.4: `apps/` does not contain
//! `apps-legacy/` — ported from the original implementation's
//! `membership.py::is_inside`, used here and by recon's barrel detection and
//! the edit engine's path validation.

use crate::CandidateContext;

/// Segment-safe path containment: `root_path == ""` is the repo root and
/// contains everything; otherwise `file_path` must equal `root_path` or
/// start with `root_path` followed by a `/`.
pub fn is_inside(path: &str, root_path: &str) -> bool {
    if root_path.is_empty() {
        return true;
    }
    path == root_path || path.starts_with(&format!("{root_path}/"))
}

fn relative_to(path: &str, root: &str) -> String {
    if root.is_empty() {
        return path.to_string();
    }
    if path == root {
        return String::new();
    }
    path.strip_prefix(&format!("{root}/")).unwrap_or(path).to_string()
}

/// Sort contexts of one language family shallowest-first and punch a hole in
/// each ancestor's exclude spec for every descendant of the same family
/// (SPEC §4.3 Phase C). Contexts of different families never punch each
/// other — only same-name nesting creates ambiguity over file ownership.
pub fn resolve_membership(mut contexts: Vec<CandidateContext>, universal_excludes: &[String]) -> Vec<CandidateContext> {
    contexts.sort_by_key(|c| c.root_path.matches('/').count());

    for i in 0..contexts.len() {
        let mut excludes = universal_excludes.to_vec();
        for j in (i + 1)..contexts.len() {
            if contexts[j].language_family != contexts[i].language_family {
                continue;
            }
            if is_inside(&contexts[j].root_path, &contexts[i].root_path) && contexts[j].root_path != contexts[i].root_path {
                let rel = relative_to(&contexts[j].root_path, &contexts[i].root_path);
                if !rel.is_empty() {
                    excludes.push(format!("{rel}/**"));
                }
            }
        }
        contexts[i].exclude_glob = excludes;
    }

    contexts
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_is_inside_everything() {
        assert!(is_inside("apps/web/src/lib.rs", ""));
    }

    #[test]
    fn sibling_with_shared_prefix_is_not_inside() {
        assert!(!is_inside("apps-legacy/main.py", "apps"));
    }

    #[test]
    fn exact_and_nested_paths_are_inside() {
        assert!(is_inside("apps", "apps"));
        assert!(is_inside("apps/web", "apps"));
        assert!(!is_inside("appsx", "apps"));
    }

    #[test]
    fn nested_same_family_context_punches_a_hole_in_parent() {
        let contexts = vec![
            CandidateContext::new("".to_string(), codeplane_protocol::LanguageFamily::Python),
            CandidateContext::new("services/worker".to_string(), codeplane_protocol::LanguageFamily::Python),
        ];
        let resolved = resolve_membership(contexts, &[".git/**".to_string()]);
        let root = resolved.iter().find(|c| c.root_path.is_empty()).unwrap();
        assert!(root.exclude_glob.contains(&"services/worker/**".to_string()));
    }
}
