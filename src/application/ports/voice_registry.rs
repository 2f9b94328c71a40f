//! Voice Registry Port - 音色注册表
//!
//! 名称到参考音频的持久映射。实现必须在进程间互斥：
//! 每个操作都在同一把排他锁下完成完整的读-改-写。

use async_trait::async_trait;
use std::path::PathBuf;

use crate::domain::voice::{VoiceError, VoiceProfile};

/// Voice Registry Port
#[async_trait]
pub trait VoiceRegistryPort: Send + Sync {
    /// 添加音色
    ///
    /// `original_filename` 的扩展名决定格式，只接受 wav / mp3
    async fn add_voice(
        &self,
        name: &str,
        audio: Vec<u8>,
        original_filename: &str,
    ) -> Result<VoiceProfile, VoiceError>;

    /// 删除音色及其目录
    async fn remove_voice(&self, name: &str) -> Result<(), VoiceError>;

    /// 列出音色名：`"Model default"` 在最前，其余按字典序
    async fn list_voices(&self) -> Result<Vec<String>, VoiceError>;

    /// 解析参考音频路径
    ///
    /// `"Model default"`、未注册的名字、或文件已不存在时返回 None
    async fn resolve_voice_path(&self, name: &str) -> Result<Option<PathBuf>, VoiceError>;

    /// 是否已注册
    async fn exists(&self, name: &str) -> Result<bool, VoiceError>;

    /// 获取音色档案
    async fn get_voice(&self, name: &str) -> Result<Option<VoiceProfile>, VoiceError>;
}
