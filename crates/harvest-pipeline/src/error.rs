//! Pipeline error types.

use thiserror::Error;

pub type PipelineResult<T> = Result<T, PipelineError>;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Source error: {0}")]
    Source(#[from] harvest_source::SourceError),

    #[error("Storage error: {0}")]
    Storage(#[from] harvest_storage::StorageError),

    #[error("Media error: {0}")]
    Media(#[from] harvest_media::MediaError),

    #[error("Run log error: {0}")]
    RunLog(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl PipelineError {
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }
}
