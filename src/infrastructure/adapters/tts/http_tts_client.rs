//! HTTP TTS Client - 调用外部语音克隆 TTS 服务
//!
//! 外部 TTS API:
//! POST {base_url}/api/tts/generate
//! Request: {"text", "reference_audio", "exaggeration", "cfg_weight", "temperature"}  (JSON)
//! Response: audio/wav binary
//!
//! `reference_audio` 为 null 时服务使用模型内置音色

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;

use crate::application::ports::{InferRequest, InferResponse, TtsEnginePort, TtsError};

/// TTS 生成请求体 (JSON)
#[derive(Debug, Serialize)]
struct TtsHttpRequest<'a> {
    text: &'a str,
    reference_audio: Option<String>,
    exaggeration: f32,
    cfg_weight: f32,
    temperature: f32,
}

/// HTTP TTS 客户端配置
#[derive(Debug, Clone)]
pub struct HttpTtsClientConfig {
    /// TTS 服务基础 URL
    pub base_url: String,
    /// 请求超时时间（秒）
    pub timeout_secs: u64,
    /// 网络错误/超时的重试次数
    pub max_retries: u32,
}

impl Default for HttpTtsClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            timeout_secs: 120,
            max_retries: 0,
        }
    }
}

impl HttpTtsClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    pub fn with_retries(mut self, retries: u32) -> Self {
        self.max_retries = retries;
        self
    }
}

/// HTTP TTS 客户端
pub struct HttpTtsClient {
    client: Client,
    config: HttpTtsClientConfig,
}

impl HttpTtsClient {
    pub fn new(config: HttpTtsClientConfig) -> Result<Self, TtsError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| TtsError::NetworkError(e.to_string()))?;

        Ok(Self { client, config })
    }

    /// 获取生成 URL
    fn generate_url(&self) -> String {
        format!("{}/api/tts/generate", self.config.base_url.trim_end_matches('/'))
    }

    /// 获取健康检查 URL
    fn health_url(&self) -> String {
        format!("{}/health", self.config.base_url.trim_end_matches('/'))
    }

    async fn send_once(&self, body: &TtsHttpRequest<'_>) -> Result<Vec<u8>, TtsError> {
        let response = self
            .client
            .post(self.generate_url())
            .json(body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    TtsError::Timeout
                } else if e.is_connect() {
                    TtsError::NetworkError(format!("Cannot connect to TTS service: {}", e))
                } else {
                    TtsError::NetworkError(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(TtsError::ServiceError(format!(
                "HTTP {}: {}",
                status, error_text
            )));
        }

        let audio_data = response
            .bytes()
            .await
            .map_err(|e| TtsError::InvalidResponse(format!("Failed to read audio: {}", e)))?
            .to_vec();

        if audio_data.is_empty() {
            return Err(TtsError::InvalidResponse("empty audio body".to_string()));
        }

        Ok(audio_data)
    }
}

/// 只有网络层面的失败才值得重试
fn is_retryable(err: &TtsError) -> bool {
    matches!(err, TtsError::NetworkError(_) | TtsError::Timeout)
}

#[async_trait]
impl TtsEnginePort for HttpTtsClient {
    async fn infer(&self, request: InferRequest) -> Result<InferResponse, TtsError> {
        let body = TtsHttpRequest {
            text: &request.text,
            reference_audio: request
                .reference_audio
                .as_ref()
                .map(|p| p.display().to_string()),
            exaggeration: request.params.exaggeration,
            cfg_weight: request.params.cfg_weight,
            temperature: request.params.temperature,
        };

        tracing::debug!(
            url = %self.generate_url(),
            text_len = request.text.len(),
            reference_audio = ?body.reference_audio,
            "Sending TTS generate request"
        );

        let mut attempt = 0;
        loop {
            match self.send_once(&body).await {
                Ok(audio_data) => {
                    tracing::debug!(
                        audio_size = audio_data.len(),
                        attempt,
                        "TTS generation completed"
                    );
                    return Ok(InferResponse { audio_data });
                }
                Err(e) if attempt < self.config.max_retries && is_retryable(&e) => {
                    attempt += 1;
                    tracing::warn!(error = %e, attempt, "TTS request failed, retrying");
                    tokio::time::sleep(Duration::from_millis(500 * attempt as u64)).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn health_check(&self) -> bool {
        match self
            .client
            .get(self.health_url())
            .timeout(Duration::from_secs(5))
            .send()
            .await
        {
            Ok(response) => response.status().is_success(),
            Err(_) => false,
        }
    }
}
