//! Audio Queries - 音频查询

/// 获取已生成的音轨
#[derive(Debug, Clone)]
pub struct GetTrack {
    pub file_name: String,
}

/// 音频数据响应
#[derive(Debug, Clone)]
pub struct AudioDataResponse {
    pub audio_data: Vec<u8>,
    pub content_type: String,
    pub file_name: String,
}
