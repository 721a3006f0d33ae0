//! Error types for atelier

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AtelierError {
    #[error("Invalid color: {0}")]
    InvalidColor(String),
    #[error("Recording not found: {0}")]
    RecordingNotFound(u64),
    #[error("Buffer size mismatch: expected {expected} bytes, got {actual}")]
    BufferSize { expected: usize, actual: usize },
}

pub type Result<T> = std::result::Result<T, AtelierError>;
