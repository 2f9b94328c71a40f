//! Configuration Types
//!
//! 定义所有配置结构体

use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

use crate::domain::voice::VoiceParams;
use crate::domain::DEFAULT_MAX_SEGMENT_CHARS;

/// 应用主配置
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// 服务器配置
    #[serde(default)]
    pub server: ServerConfig,

    /// TTS 引擎配置
    #[serde(default)]
    pub tts: TtsConfig,

    /// 合成配置
    #[serde(default)]
    pub synthesis: SynthesisConfig,

    /// 音色注册表配置
    #[serde(default)]
    pub voices: VoicesConfig,

    /// 存储配置
    #[serde(default)]
    pub storage: StorageConfig,

    /// 文本清洗配置
    #[serde(default)]
    pub cleaner: CleanerConfig,

    /// 日志配置
    #[serde(default)]
    pub log: LogConfig,
}

/// 服务器配置
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// 监听地址
    #[serde(default = "default_host")]
    pub host: String,

    /// 监听端口
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5060
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl ServerConfig {
    /// 获取服务器地址
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// TTS 引擎配置
#[derive(Debug, Clone, Deserialize)]
pub struct TtsConfig {
    /// TTS 服务基础 URL
    #[serde(default = "default_tts_url")]
    pub url: String,

    /// 请求超时时间（秒）
    #[serde(default = "default_tts_timeout")]
    pub timeout_secs: u64,

    /// 最大重试次数
    #[serde(default)]
    pub max_retries: u32,

    /// 使用本地假引擎（生成正弦音），用于无 GPU 环境联调
    #[serde(default)]
    pub fake: bool,
}

fn default_tts_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_tts_timeout() -> u64 {
    120
}

impl Default for TtsConfig {
    fn default() -> Self {
        Self {
            url: default_tts_url(),
            timeout_secs: default_tts_timeout(),
            max_retries: 0,
            fake: false,
        }
    }
}

/// 合成配置
#[derive(Debug, Clone, Deserialize)]
pub struct SynthesisConfig {
    /// 单个片段的最大字符数
    #[serde(default = "default_max_segment_chars")]
    pub max_segment_chars: usize,

    /// 片段之间插入的静音（毫秒）
    #[serde(default = "default_silence_ms")]
    pub silence_ms: u64,

    #[serde(default = "default_exaggeration")]
    pub exaggeration: f32,

    #[serde(default = "default_cfg_weight")]
    pub cfg_weight: f32,

    #[serde(default = "default_temperature")]
    pub temperature: f32,
}

fn default_max_segment_chars() -> usize {
    DEFAULT_MAX_SEGMENT_CHARS
}

fn default_silence_ms() -> u64 {
    500
}

fn default_exaggeration() -> f32 {
    0.5
}

fn default_cfg_weight() -> f32 {
    0.5
}

fn default_temperature() -> f32 {
    0.7
}

impl Default for SynthesisConfig {
    fn default() -> Self {
        Self {
            max_segment_chars: default_max_segment_chars(),
            silence_ms: default_silence_ms(),
            exaggeration: default_exaggeration(),
            cfg_weight: default_cfg_weight(),
            temperature: default_temperature(),
        }
    }
}

impl SynthesisConfig {
    /// 默认生成参数
    pub fn voice_params(&self) -> VoiceParams {
        VoiceParams {
            exaggeration: self.exaggeration,
            cfg_weight: self.cfg_weight,
            temperature: self.temperature,
        }
    }
}

/// 音色注册表配置
#[derive(Debug, Clone, Deserialize)]
pub struct VoicesConfig {
    /// 注册表根目录
    #[serde(default = "default_voices_dir")]
    pub dir: PathBuf,

    /// 获取锁的超时（毫秒）
    #[serde(default = "default_lock_timeout_ms")]
    pub lock_timeout_ms: u64,

    /// 锁轮询间隔（毫秒）
    #[serde(default = "default_lock_poll_ms")]
    pub lock_poll_ms: u64,
}

fn default_voices_dir() -> PathBuf {
    PathBuf::from("voices")
}

fn default_lock_timeout_ms() -> u64 {
    10_000
}

fn default_lock_poll_ms() -> u64 {
    50
}

impl Default for VoicesConfig {
    fn default() -> Self {
        Self {
            dir: default_voices_dir(),
            lock_timeout_ms: default_lock_timeout_ms(),
            lock_poll_ms: default_lock_poll_ms(),
        }
    }
}

impl VoicesConfig {
    pub fn lock_timeout(&self) -> Duration {
        Duration::from_millis(self.lock_timeout_ms)
    }

    pub fn lock_poll_interval(&self) -> Duration {
        Duration::from_millis(self.lock_poll_ms)
    }
}

/// 存储配置
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// 生成音轨的输出目录
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// 上传文件最大大小（字节），默认 50MB
    #[serde(default = "default_max_upload_size")]
    pub max_upload_size: u64,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("generated_audio")
}

fn default_max_upload_size() -> u64 {
    50 * 1024 * 1024 // 50 MB
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            max_upload_size: default_max_upload_size(),
        }
    }
}

/// 文本清洗配置
#[derive(Debug, Clone, Deserialize)]
pub struct CleanerConfig {
    /// 是否启用清洗
    #[serde(default = "default_cleaner_enabled")]
    pub enabled: bool,
}

fn default_cleaner_enabled() -> bool {
    true
}

impl Default for CleanerConfig {
    fn default() -> Self {
        Self {
            enabled: default_cleaner_enabled(),
        }
    }
}

/// 日志配置
#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    /// 日志级别
    #[serde(default = "default_log_level")]
    pub level: String,

    /// 是否启用 JSON 格式
    #[serde(default)]
    pub json: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}
