//! Data Transfer Objects

use serde::{Deserialize, Serialize};

use crate::application::{AddVoiceResponse, ConvertResponse};
use crate::domain::voice::VoiceParams;
use crate::domain::TextSegment;

// ============================================================================
// 统一响应结构
// ============================================================================

/// 统一 API 响应格式
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub errno: i32,
    pub error: String,
    pub data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    /// 成功响应
    pub fn success(data: T) -> Self {
        Self {
            errno: 0,
            error: String::new(),
            data: Some(data),
        }
    }
}

/// 空数据响应
#[derive(Debug, Serialize)]
pub struct Empty {}

impl ApiResponse<Empty> {
    /// 成功但无数据
    pub fn ok() -> Self {
        Self {
            errno: 0,
            error: String::new(),
            data: Some(Empty {}),
        }
    }
}

// ============================================================================
// Voice DTOs
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct DeleteVoiceRequest {
    pub name: String,
}

/// 上传成功后的音色信息，`audio_url` 指向试听接口
#[derive(Debug, Serialize)]
pub struct VoiceResponse {
    pub name: String,
    pub original_name: String,
    pub audio_url: String,
}

impl From<AddVoiceResponse> for VoiceResponse {
    fn from(r: AddVoiceResponse) -> Self {
        Self {
            audio_url: format!("/api/voice/audio/{}", urlencoding::encode(&r.name)),
            name: r.name,
            original_name: r.original_name,
        }
    }
}

// ============================================================================
// Convert DTOs
// ============================================================================

/// 生成参数（全部可选，缺省时使用配置默认值）
#[derive(Debug, Default, Deserialize)]
pub struct VoiceParamsRequest {
    pub exaggeration: Option<f32>,
    pub cfg_weight: Option<f32>,
    pub temperature: Option<f32>,
}

impl VoiceParamsRequest {
    /// 三个参数都未给出时返回 None
    pub fn into_params(self, defaults: VoiceParams) -> Option<VoiceParams> {
        if self.exaggeration.is_none() && self.cfg_weight.is_none() && self.temperature.is_none()
        {
            return None;
        }
        Some(VoiceParams {
            exaggeration: self.exaggeration.unwrap_or(defaults.exaggeration),
            cfg_weight: self.cfg_weight.unwrap_or(defaults.cfg_weight),
            temperature: self.temperature.unwrap_or(defaults.temperature),
        })
    }
}

fn default_clean() -> bool {
    true
}

#[derive(Debug, Deserialize)]
pub struct ConvertRequest {
    pub title: String,
    pub text: String,
    pub voice: String,
    #[serde(default = "default_clean")]
    pub clean: bool,
    #[serde(flatten)]
    pub params: VoiceParamsRequest,
}

#[derive(Debug, Serialize)]
pub struct ConvertResultResponse {
    pub file_name: String,
    pub url: String,
    pub duration_ms: u64,
    pub segment_count: usize,
}

impl From<ConvertResponse> for ConvertResultResponse {
    fn from(r: ConvertResponse) -> Self {
        Self {
            url: format!("/api/audio/{}", r.file_name),
            file_name: r.file_name,
            duration_ms: r.duration_ms,
            segment_count: r.segment_count,
        }
    }
}

// ============================================================================
// Chunk DTOs
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct ChunkRequest {
    pub text: String,
    pub max_length: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct SegmentResponse {
    pub index: usize,
    pub text: String,
    pub char_count: usize,
}

impl From<TextSegment> for SegmentResponse {
    fn from(s: TextSegment) -> Self {
        Self {
            char_count: s.char_count(),
            index: s.index,
            text: s.text,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ChunkResponse {
    pub total: usize,
    pub segments: Vec<SegmentResponse>,
}
