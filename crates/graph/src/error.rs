use thiserror::Error;

pub type Result<T> = std::result::Result<T, GraphError>;

#[derive(Error, Debug)]
pub enum GraphError {
    #[error("storage error: {0}")]
    Storage(#[from] codeplane_storage::StorageError),

    #[error("file not found in graph: {0}")]
    UnknownFile(i64),
}
