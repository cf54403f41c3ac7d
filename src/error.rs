//! Error type shared by the scheduler, the stores and the persistence layer.
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StudyError {
    #[error("Invalid grade: {0} (expected 0-5)")]
    InvalidGrade(u8),

    #[error("Invalid score: {0} (expected 0-100)")]
    InvalidScore(u8),

    #[error("Storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, StudyError>;
