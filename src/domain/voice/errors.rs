//! Voice Context - Errors

use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum VoiceError {
    #[error("Voice not found: {0}")]
    NotFound(String),

    #[error("Voice already exists: {0}")]
    AlreadyExists(String),

    #[error("Invalid voice name: {0}")]
    InvalidName(String),

    #[error("Unsupported audio format: {0} (expected wav or mp3)")]
    UnsupportedFormat(String),

    #[error("Timed out after {0:?} waiting for the voice registry lock")]
    LockTimeout(Duration),

    #[error("Voice registry index is corrupt: {0}")]
    CorruptIndex(String),

    #[error("Storage error: {0}")]
    StorageError(String),
}

impl From<std::io::Error> for VoiceError {
    fn from(err: std::io::Error) -> Self {
        VoiceError::StorageError(err.to_string())
    }
}
