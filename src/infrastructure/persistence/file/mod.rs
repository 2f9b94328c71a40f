//! 文件系统持久化
//!
//! - lock: 跨进程命名文件锁
//! - voice_registry: 音色注册表（索引 + 每音色私有目录）

mod lock;
mod voice_registry;

pub use lock::{FileLock, FileLockGuard, LockError};
pub use voice_registry::{FileVoiceRegistry, FileVoiceRegistryConfig, INDEX_FILE_NAME};
