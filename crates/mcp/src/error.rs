//! Internal error taxonomy, translated to `codeplane_protocol::CodePlaneError`
//! at the HTTP boundary (SPEC §7) — nothing in here crosses the wire raw.

use codeplane_protocol::{CodePlaneError, ErrorCode};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, McpError>;

#[derive(Error, Debug)]
pub enum McpError {
    #[error("unknown tool: {0}")]
    UnknownTool(String),
    #[error("invalid params: {0}")]
    InvalidParams(String),
    #[error("gate required: {0}")]
    GateRequired(String),
    #[error("cursor stale")]
    CursorStale,
    #[error("invalid cursor: {0}")]
    InvalidCursor(String),
    #[error("recon error: {0}")]
    Recon(#[from] codeplane_recon::ReconError),
    #[error("storage error: {0}")]
    Storage(#[from] codeplane_storage::StorageError),
    #[error("edit error: {0}")]
    Edit(#[from] codeplane_edit::EditError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("internal error: {0}")]
    Internal(String),
}

impl McpError {
    pub fn into_envelope(self) -> CodePlaneError {
        match self {
            McpError::UnknownTool(name) => CodePlaneError::new(
                ErrorCode::InvalidParams,
                format!("unknown tool `{name}`"),
                "check the tool name against the server's capabilities listing",
            ),
            McpError::InvalidParams(msg) => {
                CodePlaneError::new(ErrorCode::InvalidParams, msg, "fix the request parameters and retry")
            }
            McpError::GateRequired(msg) => {
                CodePlaneError::new(ErrorCode::GateRequired, msg, "retry with gate_token and a sufficiently long gate_reason")
            }
            McpError::CursorStale => CodePlaneError::new(
                ErrorCode::CursorStale,
                "the index has moved past this cursor's epoch",
                "restart pagination from offset 0",
            ),
            McpError::InvalidCursor(msg) => {
                CodePlaneError::new(ErrorCode::InvalidCursor, msg, "discard this cursor and restart pagination")
            }
            McpError::Recon(err) => {
                CodePlaneError::new(ErrorCode::InternalError, err.to_string(), "retry; if this persists, re-index the repository")
            }
            McpError::Storage(err) => {
                CodePlaneError::new(ErrorCode::InternalError, err.to_string(), "retry; if this persists, re-index the repository")
            }
            McpError::Edit(err) => match err {
                codeplane_edit::EditError::ContentMismatch => CodePlaneError::new(
                    ErrorCode::ContentMismatch,
                    "expected_file_sha256 does not match the file's current contents",
                    "re-read the file, recompute its sha256, and retry with the current hash",
                ),
                codeplane_edit::EditError::AmbiguousMatch { count, lines } => CodePlaneError::new(
                    ErrorCode::AmbiguousMatch,
                    format!("old_text occurs {count} times"),
                    "narrow with hint_start_line/hint_end_line, or make old_text more specific",
                )
                .with_context("lines", serde_json::json!(lines)),
                codeplane_edit::EditError::NoMatch { path } => CodePlaneError::new(
                    ErrorCode::AnchorNotFound,
                    format!("no occurrence of old_text found in {path}"),
                    "re-read the file to confirm old_text still matches its current contents",
                ),
                other => CodePlaneError::new(ErrorCode::InternalError, other.to_string(), "retry; if this persists, re-index the repository"),
            },
            McpError::Io(err) => CodePlaneError::new(ErrorCode::IoError, err.to_string(), "check the repository path and file permissions"),
            McpError::Json(err) => CodePlaneError::new(ErrorCode::InternalError, err.to_string(), "retry; report if this persists"),
            McpError::Internal(msg) => CodePlaneError::new(ErrorCode::InternalError, msg, "retry; report if this persists"),
        }
    }
}
