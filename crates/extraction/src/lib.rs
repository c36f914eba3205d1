//! Parsing & extraction (SPEC §4.2): turns one file's bytes into the
//! structural facts the storage layer commits — `DefFact`, `RefFact`,
//! `ImportFact`, `Scope` — plus the artifact classification and reference
//! resolution machinery that operate over them.
//!
//! ```text
//! bytes
//!   │
//!   ├──> language::detect_family  (extension → LanguageFamily)
//!   │
//!   ├──> pack::pack_for(family)   (tree-sitter grammar present?)
//!   │     ├─ Some(pack) -> pack.extract() -> ExtractionResult
//!   │     └─ None       -> lexical-only registration, no structural facts
//!   │
//!   └──> resolver::Resolver        (same-file resolution + deferred queue)
//! ```
//!
//! Four families have a `LanguagePack`: Rust, Python, JavaScript, TypeScript
//! — the grammars present in this workspace. Every other family in
//! `LanguageFamily` is still recognised by `language::detect_family` and
//! still gets a `Context`/`FileRecord` in discovery; it just has no
//! structural extraction, matching the parse-failure fallback policy.

mod def_uid;
mod error;
mod language;
mod pack;
mod packs;
mod resolver;

pub mod artifact;

pub use error::{ExtractionError, Result};
pub use language::{detect_family, doc_comment_prefixes, supports_ast, tree_sitter_language};
pub use pack::{pack_for, ExtractionInput, ExtractionResult, LanguagePack};
pub use resolver::{DefLookup, DeferredRef, LocalDefIndex, Resolver};
