//! Track Storage Port - 合成音轨的持久化
//!
//! 输出文件名由标题经 `secure_filename` 净化后加 `_audio.wav` 后缀。
//! 写入必须原子化：失败或取消时不留下半成品文件。

use async_trait::async_trait;
use std::path::PathBuf;
use thiserror::Error;

/// 音轨存储错误
#[derive(Debug, Error)]
pub enum TrackStorageError {
    #[error("Track not found: {0}")]
    NotFound(String),

    #[error("Invalid track name: {0}")]
    InvalidName(String),

    #[error("IO error: {0}")]
    IoError(String),
}

/// Track Storage Port
#[async_trait]
pub trait TrackStoragePort: Send + Sync {
    /// 由标题推导输出文件名
    fn track_file_name(&self, title: &str) -> String;

    /// 原子写入音轨，返回最终路径
    async fn save_track(&self, title: &str, wav: &[u8]) -> Result<PathBuf, TrackStorageError>;

    /// 读取已生成的音轨
    async fn read_track(&self, file_name: &str) -> Result<Vec<u8>, TrackStorageError>;
}
