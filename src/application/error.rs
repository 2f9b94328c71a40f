//! 应用层错误定义
//!
//! 统一的命令/查询错误类型

use thiserror::Error;

use crate::application::pipeline::PipelineError;
use crate::application::ports::{ExtractError, TrackStorageError, TtsError};
use crate::domain::voice::VoiceError;
use crate::domain::ChunkError;

/// 应用层错误
#[derive(Debug, Error)]
pub enum ApplicationError {
    /// 参数无效
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// 资源未找到
    #[error("{resource_type} not found: {id}")]
    NotFound {
        resource_type: &'static str,
        id: String,
    },

    /// 资源已存在
    #[error("Conflict: {0}")]
    Conflict(String),

    /// 获取注册表锁超时
    #[error("Lock timeout: {0}")]
    LockTimeout(String),

    /// 某个片段合成失败（序号从 1 开始）
    #[error("Synthesis failed at segment {index}: {reason}")]
    SynthesisFailure { index: usize, reason: String },

    /// 存储错误
    #[error("Storage error: {0}")]
    StorageFailure(String),

    /// 已取消
    #[error("Operation cancelled")]
    Cancelled,

    /// 外部服务错误
    #[error("External service error: {0}")]
    ExternalService(String),
}

impl ApplicationError {
    /// 创建 NotFound 错误
    pub fn not_found(resource_type: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            resource_type,
            id: id.into(),
        }
    }

    /// 创建参数错误
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    /// 创建存储错误
    pub fn storage(message: impl Into<String>) -> Self {
        Self::StorageFailure(message.into())
    }
}

impl From<VoiceError> for ApplicationError {
    fn from(err: VoiceError) -> Self {
        match err {
            VoiceError::NotFound(name) => Self::not_found("Voice", name),
            VoiceError::AlreadyExists(_) => Self::Conflict(err.to_string()),
            VoiceError::InvalidName(_) | VoiceError::UnsupportedFormat(_) => {
                Self::InvalidInput(err.to_string())
            }
            VoiceError::LockTimeout(_) => Self::LockTimeout(err.to_string()),
            VoiceError::CorruptIndex(_) | VoiceError::StorageError(_) => {
                Self::StorageFailure(err.to_string())
            }
        }
    }
}

impl From<ChunkError> for ApplicationError {
    fn from(err: ChunkError) -> Self {
        Self::InvalidInput(err.to_string())
    }
}

impl From<PipelineError> for ApplicationError {
    fn from(err: PipelineError) -> Self {
        match err {
            PipelineError::EmptyInput => Self::InvalidInput(err.to_string()),
            PipelineError::Synthesis { index, source } => Self::SynthesisFailure {
                index,
                reason: source.to_string(),
            },
            PipelineError::InvalidAudio { index, source } => Self::SynthesisFailure {
                index,
                reason: source.to_string(),
            },
            PipelineError::Cancelled { .. } => Self::Cancelled,
        }
    }
}

impl From<TtsError> for ApplicationError {
    fn from(err: TtsError) -> Self {
        Self::ExternalService(err.to_string())
    }
}

impl From<ExtractError> for ApplicationError {
    fn from(err: ExtractError) -> Self {
        match err {
            ExtractError::IoError(_) => Self::StorageFailure(err.to_string()),
            ExtractError::UnsupportedType(_) | ExtractError::InvalidEncoding(_) => {
                Self::InvalidInput(err.to_string())
            }
        }
    }
}

impl From<TrackStorageError> for ApplicationError {
    fn from(err: TrackStorageError) -> Self {
        match err {
            TrackStorageError::NotFound(name) => Self::not_found("Track", name),
            TrackStorageError::InvalidName(_) => Self::InvalidInput(err.to_string()),
            TrackStorageError::IoError(_) => Self::StorageFailure(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_voice_error_mapping() {
        let err: ApplicationError = VoiceError::NotFound("Alice".into()).into();
        assert!(matches!(err, ApplicationError::NotFound { resource_type: "Voice", .. }));

        let err: ApplicationError = VoiceError::AlreadyExists("Alice".into()).into();
        assert!(matches!(err, ApplicationError::Conflict(_)));

        let err: ApplicationError = VoiceError::LockTimeout(Duration::from_millis(100)).into();
        assert!(matches!(err, ApplicationError::LockTimeout(_)));

        let err: ApplicationError = VoiceError::CorruptIndex("bad json".into()).into();
        assert!(matches!(err, ApplicationError::StorageFailure(_)));
    }

    #[test]
    fn test_pipeline_error_keeps_segment_index() {
        let err: ApplicationError = PipelineError::Synthesis {
            index: 3,
            source: TtsError::Timeout,
        }
        .into();
        match err {
            ApplicationError::SynthesisFailure { index, reason } => {
                assert_eq!(index, 3);
                assert_eq!(reason, "Request timeout");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
