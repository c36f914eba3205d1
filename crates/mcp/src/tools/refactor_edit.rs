//! `refactor_edit` tool (SPEC §4.7): span-safe find-and-replace, wired
//! straight to `codeplane_edit::EditEngine`.

use std::path::PathBuf;

use codeplane_edit::{EditEngine, RefactorEditRequest};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::{McpError, Result};
use crate::tools::ToolOutcome;

#[derive(Debug, Deserialize)]
struct RefactorEditParams {
    path: PathBuf,
    old_text: String,
    new_text: String,
    #[serde(default)]
    hint_start_line: Option<usize>,
    #[serde(default)]
    hint_end_line: Option<usize>,
    expected_file_sha256: String,
}

pub fn run(edit: &EditEngine, params: &Value) -> Result<ToolOutcome> {
    let params: RefactorEditParams =
        serde_json::from_value(params.clone()).map_err(|err| McpError::InvalidParams(format!("refactor_edit: {err}")))?;

    let result = edit.apply(RefactorEditRequest {
        path: params.path,
        old_text: params.old_text,
        new_text: params.new_text,
        hint_start_line: params.hint_start_line,
        hint_end_line: params.hint_end_line,
        expected_file_sha256: params.expected_file_sha256,
    })?;

    Ok(ToolOutcome {
        result: json!({
            "before_sha256": result.before_sha256,
            "after_sha256": result.after_sha256,
            "replaced_at_line": result.replaced_at_line,
            "match_kind": match result.match_kind {
                codeplane_edit::MatchKind::Exact => "exact",
                codeplane_edit::MatchKind::HintDisambiguated => "hint_disambiguated",
                codeplane_edit::MatchKind::Fuzzy => "fuzzy",
            },
        }),
        empty: false,
    })
}
