//! Text Cleaner Port - 文本清洗
//!
//! 在分块之前把提取出来的文本改写得更适合朗读，可以整体跳过

use async_trait::async_trait;
use thiserror::Error;

/// 清洗错误
#[derive(Debug, Error)]
pub enum CleanerError {
    #[error("Cleaner unavailable: {0}")]
    Unavailable(String),

    #[error("Cleaner failed: {0}")]
    Failed(String),
}

/// Text Cleaner Port
#[async_trait]
pub trait TextCleanerPort: Send + Sync {
    async fn clean(&self, text: &str) -> Result<String, CleanerError>;
}
