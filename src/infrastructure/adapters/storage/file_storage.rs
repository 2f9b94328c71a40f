//! File Track Storage - 文件系统音轨存储
//!
//! 实现 TrackStoragePort：先写同目录下的临时文件，再 rename 到最终路径

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;
use uuid::Uuid;

use crate::application::ports::{TrackStorageError, TrackStoragePort};
use crate::domain::secure_filename;

/// 标题净化后为空时使用的文件名主干
const FALLBACK_STEM: &str = "document";

const DOCUMENT_EXTENSIONS: &[&str] = &["pdf", "docx", "doc", "md", "markdown", "txt"];

/// 文件系统音轨存储
pub struct FileTrackStorage {
    /// 输出目录
    base_dir: PathBuf,
}

impl FileTrackStorage {
    /// 创建新的文件存储
    pub async fn new(base_dir: impl AsRef<Path>) -> Result<Self, TrackStorageError> {
        let base_dir = base_dir.as_ref().to_path_buf();

        // 确保目录存在
        fs::create_dir_all(&base_dir)
            .await
            .map_err(|e| TrackStorageError::IoError(e.to_string()))?;

        Ok(Self { base_dir })
    }
}

#[async_trait]
impl TrackStoragePort for FileTrackStorage {
    fn track_file_name(&self, title: &str) -> String {
        let name = secure_filename(title);
        // 去掉标题里可能带的文档扩展名，如 "report.pdf"
        let stem = match name.rsplit_once('.') {
            Some((stem, ext)) if DOCUMENT_EXTENSIONS.contains(&ext.to_lowercase().as_str()) => {
                stem.to_string()
            }
            _ => name,
        };
        let stem = if stem.is_empty() { FALLBACK_STEM } else { &stem };
        format!("{}_audio.wav", stem)
    }

    async fn save_track(&self, title: &str, wav: &[u8]) -> Result<PathBuf, TrackStorageError> {
        let final_path = self.base_dir.join(self.track_file_name(title));
        let tmp_path = self
            .base_dir
            .join(format!(".{}.tmp", Uuid::new_v4()));

        if let Err(e) = fs::write(&tmp_path, wav).await {
            let _ = fs::remove_file(&tmp_path).await;
            return Err(TrackStorageError::IoError(e.to_string()));
        }

        if let Err(e) = fs::rename(&tmp_path, &final_path).await {
            let _ = fs::remove_file(&tmp_path).await;
            return Err(TrackStorageError::IoError(e.to_string()));
        }

        tracing::info!(
            path = %final_path.display(),
            size = wav.len(),
            "Track saved"
        );

        Ok(final_path)
    }

    async fn read_track(&self, file_name: &str) -> Result<Vec<u8>, TrackStorageError> {
        // 只接受净化后不变的文件名，防止目录穿越
        if file_name.is_empty() || secure_filename(file_name) != file_name {
            return Err(TrackStorageError::InvalidName(file_name.to_string()));
        }

        let path = self.base_dir.join(file_name);
        match fs::read(&path).await {
            Ok(data) => Ok(data),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(TrackStorageError::NotFound(file_name.to_string()))
            }
            Err(e) => Err(TrackStorageError::IoError(e.to_string())),
        }
    }
}
