//! `recon` tool (SPEC §4.6): wraps `codeplane_recon::run`.

use std::path::Path;
use std::sync::Arc;

use codeplane_storage::Storage;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::{McpError, Result};
use crate::tools::ToolOutcome;

#[derive(Debug, Deserialize)]
struct ReconParams {
    task: String,
    #[serde(default)]
    max_bytes: Option<usize>,
}

pub fn run(repo_root: &Path, storage: &Arc<Storage>, params: &Value) -> Result<ToolOutcome> {
    let params: ReconParams = serde_json::from_value(params.clone())
        .map_err(|err| McpError::InvalidParams(format!("recon: {err}")))?;

    let mut config = codeplane_recon::ReconConfig::default();
    if let Some(max_bytes) = params.max_bytes {
        config.max_bytes = max_bytes;
    }

    let outcome = codeplane_recon::run(repo_root, storage, &params.task, &config)?;

    let empty = outcome.assembled.files.is_empty();
    let result = json!({
        "files": outcome.assembled.files.iter().map(|f| json!({
            "path": f.path,
            "tier": f.tier,
            "payload": f.payload,
        })).collect::<Vec<_>>(),
        "cursor": outcome.assembled.cursor,
        "next_actions": outcome.next_actions,
    });

    Ok(ToolOutcome { result, empty })
}
