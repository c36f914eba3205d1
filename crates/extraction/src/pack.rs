//! `LanguagePack`: the per-family structural extraction contract. Each pack
//! turns one file's bytes into the facts SPEC §3 stores relationally —
//! definitions, references, imports, lexical scopes.

use codeplane_protocol::{DefFact, ImportFact, LanguageFamily, RefFact, Scope};

use crate::Result;

#[derive(Debug, Default, Clone)]
pub struct ExtractionResult {
    pub defs: Vec<DefFact>,
    pub refs: Vec<RefFact>,
    pub imports: Vec<ImportFact>,
    pub scopes: Vec<Scope>,
}

/// Input a pack needs beyond raw bytes: the `file_id`/`context_id` defs are
/// minted against, and the epoch they're being created under.
pub struct ExtractionInput<'a> {
    pub file_id: i64,
    pub context_id: i64,
    pub source: &'a str,
    pub created_epoch: u64,
}

pub trait LanguagePack: Send + Sync {
    fn family(&self) -> LanguageFamily;

    fn extract(&self, input: &ExtractionInput<'_>) -> Result<ExtractionResult>;
}

/// Returns the structural pack for `family`, or `None` for families with no
/// tree-sitter grammar (lexical-only — see `language::supports_ast`).
pub fn pack_for(family: LanguageFamily) -> Option<Box<dyn LanguagePack>> {
    match family {
        LanguageFamily::Rust => Some(Box::new(crate::packs::rust::RustPack::new().ok()?)),
        LanguageFamily::Python => Some(Box::new(crate::packs::python::PythonPack::new().ok()?)),
        LanguageFamily::JavaScript => {
            Some(Box::new(crate::packs::javascript::JavaScriptPack::new(false).ok()?))
        }
        LanguageFamily::TypeScript => {
            Some(Box::new(crate::packs::javascript::JavaScriptPack::new(true).ok()?))
        }
        _ => None,
    }
}
