//! Document Extractor Port - 文档文本提取

use async_trait::async_trait;
use std::path::Path;
use thiserror::Error;

/// 提取错误
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("Unsupported document type: {0}")]
    UnsupportedType(String),

    #[error("Document is not valid UTF-8 text: {0}")]
    InvalidEncoding(String),

    #[error("IO error: {0}")]
    IoError(String),
}

/// Document Extractor Port
#[async_trait]
pub trait DocumentExtractorPort: Send + Sync {
    /// 是否支持该文件（按扩展名）
    fn supports(&self, path: &Path) -> bool;

    /// 提取纯文本
    async fn extract(&self, path: &Path) -> Result<String, ExtractError>;
}
