//! TTS Engine Port - 语音合成抽象
//!
//! 合成器是外部协作者：给定文本、可选的参考音频和合成参数，返回 16 位 PCM WAV。
//! 具体实现在 infrastructure/adapters 层。调用必须可安全重试。

use async_trait::async_trait;
use std::path::PathBuf;
use thiserror::Error;

use crate::domain::voice::VoiceParams;

/// TTS 错误
#[derive(Debug, Error)]
pub enum TtsError {
    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Request timeout")]
    Timeout,

    #[error("Service error: {0}")]
    ServiceError(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Reference audio unreadable: {0}")]
    ReferenceAudio(String),
}

/// TTS 推理请求
#[derive(Debug, Clone)]
pub struct InferRequest {
    /// 要合成的文本内容
    pub text: String,
    /// 参考音频路径，None 表示使用模型内置音色
    pub reference_audio: Option<PathBuf>,
    /// 合成参数
    pub params: VoiceParams,
}

/// TTS 推理响应
#[derive(Debug, Clone)]
pub struct InferResponse {
    /// WAV 音频数据
    pub audio_data: Vec<u8>,
}

/// TTS Engine Port
#[async_trait]
pub trait TtsEnginePort: Send + Sync {
    /// 合成单个片段
    async fn infer(&self, request: InferRequest) -> Result<InferResponse, TtsError>;

    /// 检查 TTS 服务是否可用
    async fn health_check(&self) -> bool {
        true
    }
}
