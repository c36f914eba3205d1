use thiserror::Error;

pub type Result<T> = std::result::Result<T, EditError>;

#[derive(Error, Debug)]
pub enum EditError {
    #[error("content mismatch: current file hash does not match expected_file_sha256")]
    ContentMismatch,

    #[error("no occurrence of old_text found in {path}")]
    NoMatch { path: String },

    #[error("ambiguous match: {count} occurrences of old_text at lines {lines:?}")]
    AmbiguousMatch { count: usize, lines: Vec<usize> },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("ledger serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("indexer error: {0}")]
    Indexer(#[from] codeplane_indexer::IndexerError),
}
