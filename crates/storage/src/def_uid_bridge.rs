//! Bridges `codeplane_extraction::resolver::DefLookup` to the relational
//! store so a deferred reference can be re-resolved once its target has
//! landed anywhere in the index, not just the same file (SPEC_FULL §C.1).

use codeplane_extraction::DefLookup;
use codeplane_protocol::RefTier;

use crate::relational::RelationalStore;

pub struct RelationalDefLookup<'a> {
    store: &'a RelationalStore,
}

impl<'a> RelationalDefLookup<'a> {
    pub fn new(store: &'a RelationalStore) -> Self {
        Self { store }
    }
}

impl DefLookup for RelationalDefLookup<'_> {
    fn lookup(&self, candidate_name: &str) -> Option<(String, RefTier)> {
        let matches = self.store.definitions_by_name(candidate_name).ok()?;
        match matches.len() {
            0 => None,
            1 => Some((matches[0].def_uid.clone(), RefTier::Strong)),
            _ => Some((matches[0].def_uid.clone(), RefTier::Anchored)),
        }
    }
}
