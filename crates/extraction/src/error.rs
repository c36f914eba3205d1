use thiserror::Error;

/// Result type for extraction operations.
pub type Result<T> = std::result::Result<T, ExtractionError>;

#[derive(Error, Debug)]
pub enum ExtractionError {
    #[error("parse error: {0}")]
    Parse(String),

    /// Family is recognised (appears in `LanguageFamily`) but has no
    /// tree-sitter grammar wired up — callers fall back to lexical-only
    /// registration rather than treating this as fatal.
    #[error("no grammar available for {0:?}")]
    NoGrammar(codeplane_protocol::LanguageFamily),

    #[error("tree-sitter error: {0}")]
    TreeSitter(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
