//! Persistence Layer - 数据持久化
//!
//! 文件系统存储实现

pub mod file;

pub use self::file::{FileVoiceRegistry, FileVoiceRegistryConfig};
