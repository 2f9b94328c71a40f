//! File Voice Registry - 基于文件系统的音色注册表
//!
//! 目录布局:
//! ```text
//! <root>/
//!   voices.json          索引：name -> VoiceProfile
//!   voices.json.lock     锁文件，不含数据
//!   <safe name>/         每个音色一个私有目录
//!     sample.wav         规范参考音频（转码失败时为 sample.mp3）
//! ```
//!
//! 每个操作都在排他锁内完成完整的读-改-写，读操作也走同一把锁。
//! 索引写入先写临时文件再 rename，读者不会看到写了一半的索引。

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

use super::lock::{FileLock, LockError};
use crate::application::ports::{AudioTranscoderPort, VoiceRegistryPort};
use crate::domain::secure_filename;
use crate::domain::voice::{
    AudioFormat, VoiceError, VoiceName, VoiceProfile, MODEL_DEFAULT_VOICE,
};

/// 索引文件名
pub const INDEX_FILE_NAME: &str = "voices.json";

/// 参考音频文件名主干
const SAMPLE_STEM: &str = "sample";

type VoiceIndex = BTreeMap<String, VoiceProfile>;

/// 注册表配置
#[derive(Debug, Clone)]
pub struct FileVoiceRegistryConfig {
    /// 注册表根目录
    pub root: PathBuf,
    /// 获取锁的最长等待时间
    pub lock_timeout: Duration,
    /// 锁被占用时的轮询间隔
    pub lock_poll_interval: Duration,
}

impl FileVoiceRegistryConfig {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            lock_timeout: Duration::from_secs(10),
            lock_poll_interval: Duration::from_millis(50),
        }
    }

    pub fn with_lock_timeout(mut self, timeout: Duration) -> Self {
        self.lock_timeout = timeout;
        self
    }
}

impl From<LockError> for VoiceError {
    fn from(err: LockError) -> Self {
        match err {
            LockError::Timeout(waited) => VoiceError::LockTimeout(waited),
            LockError::Io(e) => VoiceError::StorageError(format!("lock file: {}", e)),
        }
    }
}

struct RegistryInner {
    root: PathBuf,
    index_path: PathBuf,
    lock: FileLock,
    transcoder: Arc<dyn AudioTranscoderPort>,
}

/// 文件系统音色注册表
///
/// 克隆开销很小，多个克隆共享同一个根目录
#[derive(Clone)]
pub struct FileVoiceRegistry {
    inner: Arc<RegistryInner>,
}

impl FileVoiceRegistry {
    /// 打开（必要时创建）注册表目录
    pub fn open(
        config: FileVoiceRegistryConfig,
        transcoder: Arc<dyn AudioTranscoderPort>,
    ) -> Result<Self, VoiceError> {
        fs::create_dir_all(&config.root)?;
        // 索引里保存绝对路径
        let root = config.root.canonicalize()?;
        let index_path = root.join(INDEX_FILE_NAME);
        let lock_path = root.join(format!("{}.lock", INDEX_FILE_NAME));

        tracing::info!(
            root = %root.display(),
            lock_timeout_ms = config.lock_timeout.as_millis() as u64,
            "Voice registry opened"
        );

        Ok(Self {
            inner: Arc::new(RegistryInner {
                root,
                index_path,
                lock: FileLock::new(lock_path, config.lock_timeout, config.lock_poll_interval),
                transcoder,
            }),
        })
    }

    pub fn index_path(&self) -> &Path {
        &self.inner.index_path
    }

    pub fn lock_path(&self) -> &Path {
        self.inner.lock.path()
    }

    // ------------------------------------------------------------------
    // 同步接口（阻塞当前线程等待锁）
    // ------------------------------------------------------------------

    pub fn add_voice_blocking(
        &self,
        name: &str,
        audio: &[u8],
        original_filename: &str,
    ) -> Result<VoiceProfile, VoiceError> {
        self.inner.add_voice(name, audio, original_filename)
    }

    pub fn remove_voice_blocking(&self, name: &str) -> Result<(), VoiceError> {
        self.inner.remove_voice(name)
    }

    pub fn list_voices_blocking(&self) -> Result<Vec<String>, VoiceError> {
        self.inner.list_voices()
    }

    pub fn resolve_voice_path_blocking(&self, name: &str) -> Result<Option<PathBuf>, VoiceError> {
        self.inner.resolve_voice_path(name)
    }

    pub fn exists_blocking(&self, name: &str) -> Result<bool, VoiceError> {
        self.inner.exists(name)
    }

    pub fn get_voice_blocking(&self, name: &str) -> Result<Option<VoiceProfile>, VoiceError> {
        self.inner.get_voice(name)
    }

    async fn run_blocking<T, F>(&self, f: F) -> Result<T, VoiceError>
    where
        T: Send + 'static,
        F: FnOnce(&RegistryInner) -> Result<T, VoiceError> + Send + 'static,
    {
        let inner = self.inner.clone();
        tokio::task::spawn_blocking(move || f(&inner))
            .await
            .map_err(|e| VoiceError::StorageError(format!("registry task failed: {}", e)))?
    }
}

impl RegistryInner {
    /// 读取索引，调用方必须持有锁
    fn load_index(&self) -> Result<VoiceIndex, VoiceError> {
        match fs::read(&self.index_path) {
            Ok(data) if data.is_empty() => Ok(VoiceIndex::new()),
            Ok(data) => serde_json::from_slice(&data)
                .map_err(|e| VoiceError::CorruptIndex(e.to_string())),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(VoiceIndex::new()),
            Err(e) => Err(e.into()),
        }
    }

    /// 原子写入索引，调用方必须持有锁
    fn save_index(&self, index: &VoiceIndex) -> Result<(), VoiceError> {
        let data = serde_json::to_vec_pretty(index)
            .map_err(|e| VoiceError::StorageError(e.to_string()))?;
        let tmp_path = self
            .root
            .join(format!(".{}.{}.tmp", INDEX_FILE_NAME, Uuid::new_v4().simple()));

        let result = (|| -> std::io::Result<()> {
            let mut file = fs::File::create(&tmp_path)?;
            file.write_all(&data)?;
            file.sync_all()?;
            fs::rename(&tmp_path, &self.index_path)
        })();

        if let Err(e) = result {
            let _ = fs::remove_file(&tmp_path);
            return Err(e.into());
        }
        Ok(())
    }

    /// 目录是否位于注册表根目录之内（不含根目录本身）
    ///
    /// 含 `..` 的路径一律拒绝；目录存在时按解析符号链接后的真实路径比较。
    fn owns_directory(&self, dir: &Path) -> bool {
        if dir.components().any(|c| c == Component::ParentDir) {
            return false;
        }
        let resolved = dir.canonicalize().unwrap_or_else(|_| dir.to_path_buf());
        resolved.starts_with(&self.root) && resolved != self.root
    }

    /// 为新音色选一个未被占用的目录
    fn allocate_directory(&self, name: &VoiceName) -> PathBuf {
        let safe = secure_filename(name.as_str());
        let base = if safe.is_empty() { "voice".to_string() } else { safe };

        let candidate = self.root.join(&base);
        if !candidate.exists() && base != INDEX_FILE_NAME {
            return candidate;
        }
        // 不同名字可能净化成同一个目录名，如 "a b" 与 "a_b"
        let suffix = Uuid::new_v4().simple().to_string();
        self.root.join(format!("{}-{}", base, &suffix[..8]))
    }

    /// 写入上传的音频，非 WAV 时尝试转码，返回规范参考音频路径
    fn store_sample(
        &self,
        dir: &Path,
        audio: &[u8],
        format: AudioFormat,
    ) -> Result<PathBuf, VoiceError> {
        let upload_path = dir.join(format!("{}.{}", SAMPLE_STEM, format.extension()));
        fs::write(&upload_path, audio)?;

        if format == AudioFormat::Wav {
            return Ok(upload_path);
        }

        match self.transcoder.to_wav(audio, format) {
            Ok(wav) => {
                let wav_path = dir.join(format!("{}.wav", SAMPLE_STEM));
                fs::write(&wav_path, wav)?;
                if let Err(e) = fs::remove_file(&upload_path) {
                    tracing::warn!(path = %upload_path.display(), error = %e, "Failed to remove original upload");
                }
                Ok(wav_path)
            }
            Err(e) => {
                // 转码失败时保留原文件并直接引用
                tracing::warn!(
                    format = format.extension(),
                    error = %e,
                    "Could not convert reference audio to WAV, keeping original"
                );
                Ok(upload_path)
            }
        }
    }

    fn add_voice(
        &self,
        name: &str,
        audio: &[u8],
        original_filename: &str,
    ) -> Result<VoiceProfile, VoiceError> {
        let voice_name =
            VoiceName::new(name).map_err(|e| VoiceError::InvalidName(format!("{}: {:?}", e, name)))?;
        let format = AudioFormat::from_filename(original_filename)
            .ok_or_else(|| VoiceError::UnsupportedFormat(original_filename.to_string()))?;

        let _guard = self.lock.acquire()?;
        let mut index = self.load_index()?;
        if index.contains_key(voice_name.as_str()) {
            return Err(VoiceError::AlreadyExists(voice_name.to_string()));
        }

        let dir = self.allocate_directory(&voice_name);
        fs::create_dir_all(&dir)?;

        let published = self
            .store_sample(&dir, audio, format)
            .and_then(|reference| {
                let profile =
                    VoiceProfile::new(voice_name.clone(), reference, original_filename, dir.clone());
                index.insert(voice_name.to_string(), profile.clone());
                self.save_index(&index)?;
                Ok(profile)
            });

        match published {
            Ok(profile) => {
                tracing::info!(
                    voice = %voice_name,
                    dir = %dir.display(),
                    reference = %profile.reference_audio().display(),
                    "Voice added"
                );
                Ok(profile)
            }
            Err(e) => {
                if let Err(cleanup) = fs::remove_dir_all(&dir) {
                    tracing::warn!(dir = %dir.display(), error = %cleanup, "Failed to clean up voice directory");
                }
                tracing::error!(voice = %voice_name, error = %e, "Failed to add voice");
                Err(e)
            }
        }
    }

    fn remove_voice(&self, name: &str) -> Result<(), VoiceError> {
        let _guard = self.lock.acquire()?;
        let mut index = self.load_index()?;

        let profile = index
            .get(name)
            .ok_or_else(|| VoiceError::NotFound(name.to_string()))?;
        let dir = profile.directory().to_path_buf();

        if !self.owns_directory(&dir) {
            return Err(VoiceError::StorageError(format!(
                "refusing to delete directory outside registry: {}",
                dir.display()
            )));
        }

        match fs::remove_dir_all(&dir) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::warn!(voice = %name, dir = %dir.display(), "Voice directory already missing");
            }
            Err(e) => {
                return Err(VoiceError::StorageError(format!(
                    "failed to delete {}: {}",
                    dir.display(),
                    e
                )));
            }
        }

        index.remove(name);
        self.save_index(&index)?;

        tracing::info!(voice = %name, "Voice removed");
        Ok(())
    }

    fn list_voices(&self) -> Result<Vec<String>, VoiceError> {
        let _guard = self.lock.acquire()?;
        let index = self.load_index()?;

        let mut names = Vec::with_capacity(index.len() + 1);
        names.push(MODEL_DEFAULT_VOICE.to_string());
        // BTreeMap 按键的字典序迭代
        names.extend(index.into_keys());
        Ok(names)
    }

    fn resolve_voice_path(&self, name: &str) -> Result<Option<PathBuf>, VoiceError> {
        if name == MODEL_DEFAULT_VOICE {
            return Ok(None);
        }

        let _guard = self.lock.acquire()?;
        let index = self.load_index()?;

        Ok(index.get(name).and_then(|profile| {
            let path = profile.reference_audio();
            if path.is_file() {
                Some(path.to_path_buf())
            } else {
                tracing::warn!(voice = %name, path = %path.display(), "Reference audio missing on disk");
                None
            }
        }))
    }

    fn exists(&self, name: &str) -> Result<bool, VoiceError> {
        if name == MODEL_DEFAULT_VOICE {
            return Ok(false);
        }
        let _guard = self.lock.acquire()?;
        Ok(self.load_index()?.contains_key(name))
    }

    fn get_voice(&self, name: &str) -> Result<Option<VoiceProfile>, VoiceError> {
        let _guard = self.lock.acquire()?;
        Ok(self.load_index()?.remove(name))
    }
}

#[async_trait]
impl VoiceRegistryPort for FileVoiceRegistry {
    async fn add_voice(
        &self,
        name: &str,
        audio: Vec<u8>,
        original_filename: &str,
    ) -> Result<VoiceProfile, VoiceError> {
        let name = name.to_string();
        let original_filename = original_filename.to_string();
        self.run_blocking(move |inner| inner.add_voice(&name, &audio, &original_filename))
            .await
    }

    async fn remove_voice(&self, name: &str) -> Result<(), VoiceError> {
        let name = name.to_string();
        self.run_blocking(move |inner| inner.remove_voice(&name)).await
    }

    async fn list_voices(&self) -> Result<Vec<String>, VoiceError> {
        self.run_blocking(|inner| inner.list_voices()).await
    }

    async fn resolve_voice_path(&self, name: &str) -> Result<Option<PathBuf>, VoiceError> {
        let name = name.to_string();
        self.run_blocking(move |inner| inner.resolve_voice_path(&name))
            .await
    }

    async fn exists(&self, name: &str) -> Result<bool, VoiceError> {
        let name = name.to_string();
        self.run_blocking(move |inner| inner.exists(&name)).await
    }

    async fn get_voice(&self, name: &str) -> Result<Option<VoiceProfile>, VoiceError> {
        let name = name.to_string();
        self.run_blocking(move |inner| inner.get_voice(&name)).await
    }
}
