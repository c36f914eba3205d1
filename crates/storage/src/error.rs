use thiserror::Error;

pub type Result<T> = std::result::Result<T, StorageError>;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("relational store error: {0}")]
    Relational(#[from] rusqlite::Error),

    #[error("lexical index error: {0}")]
    Lexical(String),

    #[error("vector index error: {0}")]
    Vector(String),

    #[error("embedding error: {0}")]
    Embedding(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("invalid vector dimension: expected {expected}, got {actual}")]
    InvalidDimension { expected: usize, actual: usize },

    #[error("epoch {requested} has not been published yet (current {current})")]
    EpochNotYetPublished { requested: u64, current: u64 },
}

impl From<tantivy::TantivyError> for StorageError {
    fn from(e: tantivy::TantivyError) -> Self {
        StorageError::Lexical(e.to_string())
    }
}
