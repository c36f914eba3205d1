//! Reference resolution (SPEC §4.2, §3 tier invariant, SPEC_FULL §C.1).
//!
//! A `RefFact` starts life at `RefTier::Unknown` the moment the parser emits
//! it. Resolution only ever raises the tier — `RefFact::upgrade_tier` enforces
//! that at the type level — so passes can run in any order and re-run safely.
//!
//! Within one file, a name can resolve against the file's own defs cheaply
//! (`resolve_same_file`). Cross-file resolution needs the batch's committed
//! definition index, which isn't available until after the relational write
//! — that's what the deferred queue is for (SPEC §9 "cyclic references in
//! the resolver"): a ref to a def defined later in the same batch, or in a
//! file that hasn't been parsed yet, gets queued and drained once the whole
//! batch is durable.

use std::collections::HashMap;

use codeplane_protocol::{DefFact, RefFact, RefTier};

/// Looks up a resolved `(def_uid, tier)` for a candidate name. Implemented by
/// `codeplane-storage` over the relational definition index; kept generic
/// here so this crate stays storage-agnostic.
pub trait DefLookup {
    fn lookup(&self, candidate_name: &str) -> Option<(String, RefTier)>;
}

/// A plain in-memory lookup, useful for resolving within a single file's
/// defs before they've been written to storage, and in tests.
pub struct LocalDefIndex {
    by_name: HashMap<String, Vec<String>>,
}

impl LocalDefIndex {
    pub fn from_defs(defs: &[DefFact]) -> Self {
        let mut by_name: HashMap<String, Vec<String>> = HashMap::new();
        for def in defs {
            by_name.entry(def.name.clone()).or_default().push(def.def_uid.clone());
        }
        Self { by_name }
    }
}

impl DefLookup for LocalDefIndex {
    fn lookup(&self, candidate_name: &str) -> Option<(String, RefTier)> {
        let uids = self.by_name.get(candidate_name)?;
        match uids.len() {
            // A unique same-file name match is a strong signal but not proof
            // (the call could bind to an import, a shadowing local, etc.).
            1 => Some((uids[0].clone(), RefTier::Strong)),
            // Ambiguous — an import resolver or type-aware pass still has
            // something to contribute, so stay at Anchored rather than guess.
            _ => Some((uids[0].clone(), RefTier::Anchored)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct DeferredRef {
    pub r#ref: RefFact,
    pub candidate_name: String,
}

#[derive(Default)]
pub struct Resolver {
    deferred: Vec<DeferredRef>,
}

impl Resolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pass over `refs`, raising tiers for anything `lookup` can resolve.
    /// Anything it can't resolve yet is queued rather than left at
    /// `Unknown` permanently.
    pub fn resolve<L: DefLookup>(&mut self, refs: &mut [RefFact], candidate_names: &[String], lookup: &L) {
        for (r, candidate_name) in refs.iter_mut().zip(candidate_names) {
            match lookup.lookup(candidate_name) {
                Some((def_uid, tier)) => r.upgrade_tier(tier, def_uid),
                None => self.defer(r.clone(), candidate_name.clone()),
            }
        }
    }

    pub fn defer(&mut self, r: RefFact, candidate_name: String) {
        self.deferred.push(DeferredRef { r#ref: r, candidate_name });
    }

    pub fn deferred_count(&self) -> usize {
        self.deferred.len()
    }

    /// Drain the deferred queue against a now-durable index, raising tiers
    /// wherever possible. Entries still unresolved after this call stay at
    /// whatever tier they last reached — they are not re-queued, since the
    /// index they're checked against is the full batch-committed one.
    pub fn drain_deferred<L: DefLookup>(&mut self, lookup: &L) -> Vec<RefFact> {
        std::mem::take(&mut self.deferred)
            .into_iter()
            .map(|mut d| {
                if let Some((def_uid, tier)) = lookup.lookup(&d.candidate_name) {
                    d.r#ref.upgrade_tier(tier, def_uid);
                }
                d.r#ref
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use codeplane_protocol::{DefKind, LanguageFamily, RefRole, Span};

    fn span() -> Span {
        Span { start_line: 1, start_col: 1, end_line: 1, end_col: 1 }
    }

    fn def(name: &str, uid: &str) -> DefFact {
        DefFact {
            def_uid: uid.to_string(),
            file_id: 1,
            unit: LanguageFamily::Rust,
            kind: DefKind::Function,
            name: name.to_string(),
            lexical_path: name.to_string(),
            qualified_path: None,
            span: span(),
            signature_hash: "h".to_string(),
            signature_text: None,
            docstring: None,
            decorators: vec![],
            return_type: None,
            created_epoch: 1,
        }
    }

    fn r#ref(token: &str) -> RefFact {
        RefFact {
            file_id: 1,
            token: token.to_string(),
            span: span(),
            role: RefRole::Call,
            tier: RefTier::Unknown,
            certainty: 1.0,
            target_def_uid: None,
            created_epoch: 1,
        }
    }

    #[test]
    fn unique_name_resolves_to_strong() {
        let defs = vec![def("helper", "uid-1")];
        let index = LocalDefIndex::from_defs(&defs);
        let mut refs = vec![r#ref("helper")];
        let names = vec!["helper".to_string()];
        let mut resolver = Resolver::new();
        resolver.resolve(&mut refs, &names, &index);
        assert_eq!(refs[0].tier, RefTier::Strong);
        assert_eq!(refs[0].target_def_uid.as_deref(), Some("uid-1"));
    }

    #[test]
    fn unresolved_ref_is_deferred_not_dropped() {
        let defs = vec![def("helper", "uid-1")];
        let index = LocalDefIndex::from_defs(&defs);
        let mut refs = vec![r#ref("not_defined_yet")];
        let names = vec!["not_defined_yet".to_string()];
        let mut resolver = Resolver::new();
        resolver.resolve(&mut refs, &names, &index);
        assert_eq!(refs[0].tier, RefTier::Unknown);
        assert_eq!(resolver.deferred_count(), 1);
    }

    #[test]
    fn deferred_ref_resolves_once_target_lands_in_batch() {
        let mut resolver = Resolver::new();
        resolver.defer(r#ref("late_fn"), "late_fn".to_string());

        let defs = vec![def("late_fn", "uid-late")];
        let index = LocalDefIndex::from_defs(&defs);
        let drained = resolver.drain_deferred(&index);

        assert_eq!(drained.len(), 1);
        assert_eq!(drained[0].tier, RefTier::Strong);
        assert_eq!(resolver.deferred_count(), 0);
    }

    #[test]
    fn tier_never_downgrades() {
        let mut r = r#ref("helper");
        r.upgrade_tier(RefTier::Proven, "uid-1".to_string());
        r.upgrade_tier(RefTier::Anchored, "uid-2".to_string());
        assert_eq!(r.tier, RefTier::Proven);
        assert_eq!(r.target_def_uid.as_deref(), Some("uid-1"));
    }
}
