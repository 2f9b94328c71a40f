//! Fake TTS Client - 离线/测试用的 TTS 客户端
//!
//! 不调用任何外部服务，为每个片段生成固定时长的正弦音 WAV。
//! 可以配置在第 N 次调用时失败，并记录收到的每个请求。

use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Mutex;

use crate::application::ports::{InferRequest, InferResponse, TtsEnginePort, TtsError};
use crate::domain::{AudioBuffer, AudioSpec};

/// Fake TTS Client 配置
#[derive(Debug, Clone)]
pub struct FakeTtsClientConfig {
    /// 每个片段返回的音频时长（毫秒）
    pub segment_ms: u64,
    /// 采样率
    pub sample_rate: u32,
    /// 第几次调用失败（从 1 开始）
    pub fail_at: Option<usize>,
    /// 模拟推理延迟（毫秒）
    pub latency_ms: u64,
}

impl Default for FakeTtsClientConfig {
    fn default() -> Self {
        Self {
            segment_ms: 1000,
            sample_rate: 24000,
            fail_at: None,
            latency_ms: 0,
        }
    }
}

#[derive(Debug, Default)]
struct Recorded {
    texts: Vec<String>,
    last_reference: Option<PathBuf>,
}

/// Fake TTS Client
pub struct FakeTtsClient {
    config: FakeTtsClientConfig,
    recorded: Mutex<Recorded>,
}

impl FakeTtsClient {
    pub fn new(config: FakeTtsClientConfig) -> Self {
        tracing::info!(
            segment_ms = config.segment_ms,
            sample_rate = config.sample_rate,
            "FakeTtsClient initialized"
        );
        Self {
            config,
            recorded: Mutex::new(Recorded::default()),
        }
    }

    /// 使用默认配置创建
    pub fn with_defaults() -> Self {
        Self::new(FakeTtsClientConfig::default())
    }

    fn recorded(&self) -> std::sync::MutexGuard<'_, Recorded> {
        self.recorded.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// 按调用顺序返回收到的文本
    pub fn calls(&self) -> Vec<String> {
        self.recorded().texts.clone()
    }

    /// 最近一次请求携带的参考音频
    pub fn last_reference(&self) -> Option<PathBuf> {
        self.recorded().last_reference.clone()
    }

    fn render(&self) -> Vec<u8> {
        let spec = AudioSpec {
            sample_rate: self.config.sample_rate,
            channels: 1,
        };
        let frames = (self.config.segment_ms * self.config.sample_rate as u64 / 1000) as usize;
        let step = 2.0 * std::f32::consts::PI * 220.0 / self.config.sample_rate as f32;
        let samples: Vec<f32> = (0..frames).map(|n| (n as f32 * step).sin() * 0.2).collect();
        AudioBuffer::from_f32(spec, &samples).to_wav()
    }
}

#[async_trait]
impl TtsEnginePort for FakeTtsClient {
    async fn infer(&self, request: InferRequest) -> Result<InferResponse, TtsError> {
        let call = {
            let mut recorded = self.recorded();
            recorded.texts.push(request.text.clone());
            recorded.last_reference = request.reference_audio.clone();
            recorded.texts.len()
        };

        tracing::debug!(
            call,
            text_len = request.text.len(),
            "FakeTtsClient: rendering fixed tone"
        );

        if self.config.latency_ms > 0 {
            tokio::time::sleep(tokio::time::Duration::from_millis(self.config.latency_ms)).await;
        }

        if self.config.fail_at == Some(call) {
            return Err(TtsError::ServiceError(format!(
                "fake failure on call {}",
                call
            )));
        }

        Ok(InferResponse {
            audio_data: self.render(),
        })
    }
}
