//! Typed error taxonomy for the MCP tool boundary (SPEC §7).
//!
//! Agents branch on `code`, never on `message`. Internal error types
//! (`StorageError`, `IndexerError`, ...) are translated into a `CodePlaneError`
//! at the tool boundary in `codeplane-mcp`; they never cross it raw.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::model::ErrorContext;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // Validation
    AnchorNotFound,
    AnchorAmbiguous,
    AmbiguousMatch,
    InvalidParams,
    InvalidRange,
    // State
    ContentMismatch,
    FileModified,
    HashMismatch,
    DryRunExpired,
    CursorStale,
    InvalidCursor,
    // File
    FileNotFound,
    FileExists,
    PermissionDenied,
    EncodingError,
    // Gate
    GateRequired,
    ConfirmationRequired,
    DuplicateFullRead,
    // Resource
    BudgetExceeded,
    ScopeExpired,
    ResourceEvicted,
    // System
    IoError,
    InternalError,
}

impl ErrorCode {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCode::AnchorNotFound => "ANCHOR_NOT_FOUND",
            ErrorCode::AnchorAmbiguous => "ANCHOR_AMBIGUOUS",
            ErrorCode::AmbiguousMatch => "AMBIGUOUS_MATCH",
            ErrorCode::InvalidParams => "INVALID_PARAMS",
            ErrorCode::InvalidRange => "INVALID_RANGE",
            ErrorCode::ContentMismatch => "CONTENT_MISMATCH",
            ErrorCode::FileModified => "FILE_MODIFIED",
            ErrorCode::HashMismatch => "HASH_MISMATCH",
            ErrorCode::DryRunExpired => "DRY_RUN_EXPIRED",
            ErrorCode::CursorStale => "CURSOR_STALE",
            ErrorCode::InvalidCursor => "INVALID_CURSOR",
            ErrorCode::FileNotFound => "FILE_NOT_FOUND",
            ErrorCode::FileExists => "FILE_EXISTS",
            ErrorCode::PermissionDenied => "PERMISSION_DENIED",
            ErrorCode::EncodingError => "ENCODING_ERROR",
            ErrorCode::GateRequired => "GATE_REQUIRED",
            ErrorCode::ConfirmationRequired => "CONFIRMATION_REQUIRED",
            ErrorCode::DuplicateFullRead => "DUPLICATE_FULL_READ",
            ErrorCode::BudgetExceeded => "BUDGET_EXCEEDED",
            ErrorCode::ScopeExpired => "SCOPE_EXPIRED",
            ErrorCode::ResourceEvicted => "RESOURCE_EVICTED",
            ErrorCode::IoError => "IO_ERROR",
            ErrorCode::InternalError => "INTERNAL_ERROR",
        }
    }
}

/// The typed error every MCP tool response surfaces on failure. Never a raw
/// stack trace (SPEC §7).
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CodePlaneError {
    pub code: ErrorCode,
    pub message: String,
    pub remediation: String,
    pub path: Option<String>,
    #[serde(default)]
    pub context: ErrorContext,
}

impl CodePlaneError {
    pub fn new(code: ErrorCode, message: impl Into<String>, remediation: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            remediation: remediation.into(),
            path: None,
            context: ErrorContext::new(),
        }
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn with_context(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.context.insert(key.into(), value);
        self
    }
}

impl std::fmt::Display for CodePlaneError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code.as_str(), self.message)
    }
}

impl std::error::Error for CodePlaneError {}
