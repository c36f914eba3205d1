use thiserror::Error;

pub type Result<T> = std::result::Result<T, IndexerError>;

#[derive(Error, Debug)]
pub enum IndexerError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("extraction error: {0}")]
    Extraction(#[from] codeplane_extraction::ExtractionError),

    #[error("storage error: {0}")]
    Storage(#[from] codeplane_storage::StorageError),

    #[error("discovery error: {0}")]
    Discovery(#[from] codeplane_discovery::DiscoveryError),

    #[error("invalid project path: {0}")]
    InvalidPath(String),

    #[error("ignore pattern error: {0}")]
    IgnorePattern(#[from] ignore::Error),
}
