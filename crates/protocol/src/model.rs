//! Core data-model types shared by every CodePlane crate.
//!
//! These are the entities of SPEC §3. Kept dependency-free (only serde/schemars)
//! so every downstream crate (extraction, storage, discovery, indexer, recon,
//! edit, mcp) can depend on `codeplane-protocol` without a cycle.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A language family recognised by discovery and extraction. Closed sum type
/// per the REDESIGN FLAGS note — one variant per family, no open registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum LanguageFamily {
    Python,
    JavaScript,
    TypeScript,
    Go,
    Rust,
    Java,
    C,
    Cpp,
    CSharp,
    Ruby,
    Php,
    /// Extension-routed fallback context (discovery Phase E).
    Other,
}

impl LanguageFamily {
    pub fn as_str(self) -> &'static str {
        match self {
            LanguageFamily::Python => "python",
            LanguageFamily::JavaScript => "javascript",
            LanguageFamily::TypeScript => "typescript",
            LanguageFamily::Go => "go",
            LanguageFamily::Rust => "rust",
            LanguageFamily::Java => "java",
            LanguageFamily::C => "c",
            LanguageFamily::Cpp => "cpp",
            LanguageFamily::CSharp => "csharp",
            LanguageFamily::Ruby => "ruby",
            LanguageFamily::Php => "php",
            LanguageFamily::Other => "other",
        }
    }
}

/// Kind of a definition-level symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum DefKind {
    Function,
    Method,
    Class,
    Struct,
    Enum,
    Interface,
    Trait,
    Module,
    Constant,
    Variable,
}

/// Span in 1-indexed (line, col) coordinates, end-exclusive on neither axis
/// (both endpoints are inclusive — matches how agents quote line ranges back).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Span {
    pub start_line: u32,
    pub start_col: u32,
    pub end_line: u32,
    pub end_col: u32,
}

impl Span {
    pub fn line_count(&self) -> u32 {
        self.end_line.saturating_sub(self.start_line) + 1
    }
}

/// A definition fact extracted from source (SPEC §3 `DefFact`).
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct DefFact {
    /// Stable hash of (owning context, lexical_path, kind, signature_hash).
    pub def_uid: String,
    pub file_id: i64,
    pub unit: LanguageFamily,
    pub kind: DefKind,
    pub name: String,
    /// `.`-joined chain of enclosing named scopes, e.g. `Foo.bar.inner`.
    pub lexical_path: String,
    /// Fully-qualified path if the language distinguishes it from `lexical_path`.
    pub qualified_path: Option<String>,
    pub span: Span,
    pub signature_hash: String,
    pub signature_text: Option<String>,
    pub docstring: Option<String>,
    pub decorators: Vec<String>,
    pub return_type: Option<String>,
    /// Epoch this fact was created/last touched in; readers never see a fact
    /// whose creation epoch exceeds the epoch pinned at query start.
    pub created_epoch: u64,
}

/// Resolution tier for a reference. Forms a total order — a resolver may only
/// upgrade, never downgrade (SPEC §3 invariant, tested in §8.8).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum RefTier {
    Unknown = 0,
    Anchored = 1,
    Strong = 2,
    Proven = 3,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum RefRole {
    Call,
    Read,
    Write,
}

/// A reference fact (SPEC §3 `RefFact`).
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct RefFact {
    pub file_id: i64,
    pub token: String,
    pub span: Span,
    pub role: RefRole,
    pub tier: RefTier,
    /// Higher certainty strengthens fusion scoring; independent of tier.
    pub certainty: f32,
    pub target_def_uid: Option<String>,
    pub created_epoch: u64,
}

impl RefFact {
    /// A resolver may only raise a reference's tier, never lower it (SPEC §3, §8.8).
    pub fn upgrade_tier(&mut self, candidate: RefTier, target_def_uid: String) {
        if candidate > self.tier {
            self.tier = candidate;
            self.target_def_uid = Some(target_def_uid);
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ImportFact {
    pub file_id: i64,
    /// Language-specific kind, e.g. `from_import`, `require`, `use`.
    pub kind: String,
    pub source_literal: String,
    pub resolved_target_path: Option<String>,
    pub is_star: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ScopeKind {
    Function,
    Class,
    Block,
    Module,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Scope {
    pub file_id: i64,
    pub kind: ScopeKind,
    pub span: Span,
    pub parent: Option<u64>,
    pub scope_id: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ExportSurface {
    pub unit: String,
    pub exported_symbols: Vec<String>,
}

/// A set of definitions that must co-locate, e.g. an import barrel's re-exports.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct AnchorGroup {
    pub unit: String,
    pub def_uids: Vec<String>,
}

/// A discovered, non-overlapping sub-tree of the repo owned by one language
/// family (SPEC §3, §4.3).
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Context {
    pub id: i64,
    /// "" means the repo root.
    pub root_path: String,
    pub language_family: LanguageFamily,
    pub include_glob: Vec<String>,
    pub exclude_glob: Vec<String>,
    pub probe_status: ProbeStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ProbeStatus {
    Unprobed,
    Ok,
    Broken,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct FileRecord {
    pub id: i64,
    pub repo_relative_path: String,
    pub language_family: LanguageFamily,
    pub content_hash: String,
    pub size: u64,
    pub context_id: i64,
    pub present: bool,
}

/// A monotonically increasing publication of a consistent index snapshot
/// (SPEC §3, §4.1). `files_indexed` is the batch size that produced it.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Epoch {
    pub id: u64,
    pub publish_time_unix_ms: u64,
    pub commit_hash: Option<String>,
    pub files_indexed: u64,
}

/// Shape of an MCP pagination cursor (SPEC §3, §4.8.3). Encoding lives in
/// `codeplane-mcp::cursor` so this stays dependency-free.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct PaginationCursorV1 {
    pub offset: u64,
    pub epoch: u64,
    pub query_hash: u64,
    pub tool_name: String,
}

/// Artifact classification shared by the resolver's star-import pass and
/// recon's edit-likelihood scoring (SPEC_FULL §C.2 — one classifier, two
/// call sites, not two ad hoc heuristics).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKind {
    Production,
    Test,
    Barrel,
    Generated,
    Doc,
    Config,
}

/// Free-form extension map for error context (SPEC §7 "heterogeneous context map").
pub type ErrorContext = BTreeMap<String, serde_json::Value>;
