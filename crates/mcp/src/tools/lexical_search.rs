//! `lexical_search` tool: direct BM25 query against the lexical index,
//! for callers that already know the term they want (bypassing recon's
//! full harvest/score/cutoff pipeline).

use std::sync::Arc;

use codeplane_storage::Storage;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::{McpError, Result};
use crate::tools::ToolOutcome;

#[derive(Debug, Deserialize)]
struct LexicalSearchParams {
    query: String,
    #[serde(default = "default_limit")]
    limit: usize,
}

fn default_limit() -> usize {
    20
}

pub fn run(storage: &Arc<Storage>, params: &Value) -> Result<ToolOutcome> {
    let params: LexicalSearchParams = serde_json::from_value(params.clone())
        .map_err(|err| McpError::InvalidParams(format!("lexical_search: {err}")))?;

    let lexical = storage.lexical.read().expect("lexical index lock poisoned");
    let hits = lexical.search(&params.query, params.limit)?;
    let empty = hits.is_empty();

    let result = json!({
        "hits": hits.into_iter().map(|hit| json!({
            "path": hit.path,
            "file_id": hit.file_id,
            "score": hit.score,
        })).collect::<Vec<_>>(),
    });

    Ok(ToolOutcome { result, empty })
}
