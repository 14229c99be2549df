// src/utils/error.rs
use thiserror::Error;

/// Fatal conditions only. Undecodable images, missing faces and corrupt
/// templates are ordinary outcomes and never reach this type.
#[derive(Debug, Error)]
pub enum NodeError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Subject not found: {0}")]
    SubjectNotFound(uuid::Uuid),

    #[error("Dataset error: {0}")]
    Dataset(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, NodeError>;
