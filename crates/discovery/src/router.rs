//! Phase E: route one file path to the deepest context that claims it
//! (SPEC §4.3).

use globset::{Glob, GlobSet, GlobSetBuilder};

use crate::membership::is_inside;
use crate::CandidateContext;

struct CompiledContext<'a> {
    ctx: &'a CandidateContext,
    include: GlobSet,
    exclude: GlobSet,
}

fn compile(glob_set: &[String]) -> GlobSet {
    let mut builder = GlobSetBuilder::new();
    for pattern in glob_set {
        if let Ok(glob) = Glob::new(pattern) {
            builder.add(glob);
        }
    }
    builder.build().unwrap_or_else(|_| GlobSetBuilder::new().build().unwrap())
}

pub struct Router<'a> {
    compiled: Vec<CompiledContext<'a>>,
}

impl<'a> Router<'a> {
    pub fn new(contexts: &'a [CandidateContext]) -> Self {
        let compiled = contexts
            .iter()
            .map(|ctx| CompiledContext { ctx, include: compile(&ctx.include_glob), exclude: compile(&ctx.exclude_glob) })
            .collect();
        Self { compiled }
    }

    /// The deepest context whose include globs match `path` and whose
    /// exclude globs do not, falling back to the shallowest (root) context
    /// that matches if no deeper one does.
    pub fn route(&self, path: &str) -> Option<&'a CandidateContext> {
        let mut best: Option<&CompiledContext<'a>> = None;
        for candidate in &self.compiled {
            if !is_inside(path, &candidate.ctx.root_path) {
                continue;
            }
            if !candidate.include.is_match(path) || candidate.exclude.is_match(path) {
                continue;
            }
            let deeper = match best {
                Some(current) => candidate.ctx.root_path.len() > current.ctx.root_path.len(),
                None => true,
            };
            if deeper {
                best = Some(candidate);
            }
        }
        best.map(|c| c.ctx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use codeplane_protocol::LanguageFamily;

    fn ctx(root: &str, family: LanguageFamily, include: &[&str], exclude: &[&str]) -> CandidateContext {
        let mut c = CandidateContext::new(root.to_string(), family);
        c.include_glob = include.iter().map(|s| s.to_string()).collect();
        c.exclude_glob = exclude.iter().map(|s| s.to_string()).collect();
        c
    }

    #[test]
    fn routes_to_deepest_matching_context() {
        let contexts = vec![
            ctx("", LanguageFamily::Python, &["**/*.py"], &["services/worker/**"]),
            ctx("services/worker", LanguageFamily::Python, &["**/*.py"], &[]),
        ];
        let router = Router::new(&contexts);
        let routed = router.route("services/worker/main.py").unwrap();
        assert_eq!(routed.root_path, "services/worker");
    }

    #[test]
    fn excluded_path_falls_through_to_no_context() {
        let contexts = vec![ctx("", LanguageFamily::Rust, &["**/*.rs"], &["target/**"])];
        let router = Router::new(&contexts);
        assert!(router.route("target/debug/build.rs").is_none());
    }
}
