//! Tool registry and dispatch (SPEC §4.8.1 step 3/6).

pub mod lexical_search;
pub mod recon;
pub mod refactor_edit;

use std::sync::Arc;

use codeplane_edit::EditEngine;
use codeplane_storage::Storage;
use serde_json::Value;

use crate::error::{McpError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolCategory {
    Read,
    Search,
    Edit,
    Test,
    Meta,
    GitRead,
    GitWrite,
}

/// The subset of categories that contributes to pattern detection (SPEC
/// §4.8.1 step 3). `Meta` tools (health, capabilities) never count toward a
/// read-spiral or scatter-read pattern.
pub const ACTION_CATEGORIES: &[ToolCategory] =
    &[ToolCategory::Read, ToolCategory::Search, ToolCategory::Edit, ToolCategory::Test, ToolCategory::GitRead, ToolCategory::GitWrite];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolName {
    Recon,
    LexicalSearch,
    RefactorEdit,
}

impl ToolName {
    pub fn parse(raw: &str) -> Result<Self> {
        match raw {
            "recon" => Ok(Self::Recon),
            "lexical_search" => Ok(Self::LexicalSearch),
            "refactor_edit" => Ok(Self::RefactorEdit),
            other => Err(McpError::UnknownTool(other.to_string())),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Recon => "recon",
            Self::LexicalSearch => "lexical_search",
            Self::RefactorEdit => "refactor_edit",
        }
    }

    pub fn category(self) -> ToolCategory {
        match self {
            Self::Recon => ToolCategory::Search,
            Self::LexicalSearch => ToolCategory::Search,
            Self::RefactorEdit => ToolCategory::Edit,
        }
    }
}

/// Runs a tool and reports whether the result was empty, for the pattern
/// detector (SPEC §4.8.2's zero-result-search-cluster trigger).
pub struct ToolOutcome {
    pub result: Value,
    pub empty: bool,
}

pub fn dispatch(
    tool: ToolName,
    repo_root: &std::path::Path,
    storage: &Arc<Storage>,
    edit: &EditEngine,
    params: &Value,
) -> Result<ToolOutcome> {
    match tool {
        ToolName::Recon => recon::run(repo_root, storage, params),
        ToolName::LexicalSearch => lexical_search::run(storage, params),
        ToolName::RefactorEdit => refactor_edit::run(edit, params),
    }
}
