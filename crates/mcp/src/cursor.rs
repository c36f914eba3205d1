//! Pagination cursor validation (SPEC §4.8.3). Cursors are opaque,
//! base64-encoded `PaginationCursorV1` records; the host decodes and
//! checks them against the request before resuming.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use codeplane_protocol::PaginationCursorV1;

use crate::error::{McpError, Result};

pub fn decode(raw: &str) -> Result<PaginationCursorV1> {
    let bytes = URL_SAFE_NO_PAD.decode(raw.as_bytes()).map_err(|err| McpError::InvalidCursor(err.to_string()))?;
    serde_json::from_slice(&bytes).map_err(|err| McpError::InvalidCursor(err.to_string()))
}

pub fn encode(cursor: &PaginationCursorV1) -> String {
    let bytes = serde_json::to_vec(cursor).expect("cursor always serializes");
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Validates a resumed cursor against the current epoch and the request's
/// tool/query identity, returning the offset to resume from on success.
pub fn validate(cursor: &PaginationCursorV1, current_epoch: u64, tool_name: &str, query_hash: u64) -> Result<u64> {
    if cursor.epoch != current_epoch {
        return Err(McpError::CursorStale);
    }
    if cursor.tool_name != tool_name || cursor.query_hash != query_hash {
        return Err(McpError::InvalidCursor("cursor does not match this tool/query".to_string()));
    }
    Ok(cursor.offset)
}
