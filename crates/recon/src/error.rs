use thiserror::Error;

pub type Result<T> = std::result::Result<T, ReconError>;

#[derive(Error, Debug)]
pub enum ReconError {
    #[error("storage error: {0}")]
    Storage(#[from] codeplane_storage::StorageError),

    #[error("graph error: {0}")]
    Graph(#[from] codeplane_graph::GraphError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("empty task")]
    EmptyTask,
}
