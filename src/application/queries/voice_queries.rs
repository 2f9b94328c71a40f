//! Voice Queries

/// 列出所有音色查询
#[derive(Debug, Clone)]
pub struct ListVoices;

/// 获取音色参考音频（试听）
#[derive(Debug, Clone)]
pub struct GetVoiceAudio {
    pub name: String,
}
