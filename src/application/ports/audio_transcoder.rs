//! Audio Transcoder Port - 音频转码抽象
//!
//! 把上传的参考音频统一转成 16 位 PCM WAV。
//! 转码是纯 CPU 工作，在音色注册表的锁内同步调用，因此接口是同步的。

use thiserror::Error;

use crate::domain::voice::AudioFormat;

/// 转码错误
#[derive(Debug, Error)]
pub enum TranscodeError {
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("Decoding error: {0}")]
    DecodingError(String),

    #[error("Empty audio stream")]
    EmptyStream,
}

/// Audio Transcoder Port
pub trait AudioTranscoderPort: Send + Sync {
    /// 解码任意受支持格式并重新编码为 WAV
    fn to_wav(&self, data: &[u8], format: AudioFormat) -> Result<Vec<u8>, TranscodeError>;
}
