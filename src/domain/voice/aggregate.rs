//! Voice Context - Aggregate Root

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::VoiceName;

/// 音色档案
///
/// 不变量:
/// - `directory` 是该音色的私有目录
/// - `reference_audio` 位于 `directory` 内
/// - 创建后不可修改，同名重复添加会被拒绝
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoiceProfile {
    name: VoiceName,
    reference_audio: PathBuf,
    original_name: String,
    directory: PathBuf,
    created_at: DateTime<Utc>,
}

impl VoiceProfile {
    pub fn new(
        name: VoiceName,
        reference_audio: PathBuf,
        original_name: impl Into<String>,
        directory: PathBuf,
    ) -> Self {
        Self {
            name,
            reference_audio,
            original_name: original_name.into(),
            directory,
            created_at: Utc::now(),
        }
    }

    pub fn name(&self) -> &VoiceName {
        &self.name
    }

    pub fn reference_audio(&self) -> &Path {
        &self.reference_audio
    }

    pub fn original_name(&self) -> &str {
        &self.original_name
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}
