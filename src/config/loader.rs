//! Configuration Loader
//!
//! 实现多源配置加载与合并逻辑
//!
//! 优先级（从高到低）：
//! 1. 环境变量
//! 2. 配置文件（config.toml）
//! 3. 默认值

use config::{Config, ConfigError as ConfigCrateError, Environment, File};
use std::path::Path;
use thiserror::Error;

use super::types::AppConfig;

/// 配置加载错误
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    LoadError(String),

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

impl From<ConfigCrateError> for ConfigError {
    fn from(err: ConfigCrateError) -> Self {
        ConfigError::LoadError(err.to_string())
    }
}

/// 配置文件搜索路径
const CONFIG_FILE_NAMES: &[&str] = &["config", "config.local"];

/// 加载应用配置
///
/// 按优先级从高到低合并配置：
/// 1. 环境变量（前缀 `DOCVOX_`，层级分隔符 `__`）
/// 2. 配置文件（config.toml 或 config.local.toml）
/// 3. 默认值
///
/// # 环境变量示例
/// - `DOCVOX_SERVER__PORT=8080`
/// - `DOCVOX_TTS__URL=http://tts-server:8000`
/// - `DOCVOX_TTS__FAKE=true`
/// - `DOCVOX_VOICES__DIR=/data/voices`
pub fn load_config() -> Result<AppConfig, ConfigError> {
    load_config_from_path(None)
}

/// 从指定路径加载配置
///
/// # 参数
/// - `config_path` - 可选的配置文件路径，如果为 None 则使用默认搜索路径
pub fn load_config_from_path(config_path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    let mut builder = Config::builder();

    // 1. 首先设置默认值（最低优先级）
    builder = builder
        .set_default("server.host", "0.0.0.0")?
        .set_default("server.port", 5060)?
        .set_default("tts.url", "http://localhost:8000")?
        .set_default("tts.timeout_secs", 120)?
        .set_default("tts.max_retries", 0)?
        .set_default("tts.fake", false)?
        .set_default("synthesis.max_segment_chars", 300)?
        .set_default("synthesis.silence_ms", 500)?
        .set_default("synthesis.exaggeration", 0.5)?
        .set_default("synthesis.cfg_weight", 0.5)?
        .set_default("synthesis.temperature", 0.7)?
        .set_default("voices.dir", "voices")?
        .set_default("voices.lock_timeout_ms", 10_000)?
        .set_default("voices.lock_poll_ms", 50)?
        .set_default("storage.output_dir", "generated_audio")?
        .set_default("storage.max_upload_size", 50 * 1024 * 1024)?
        .set_default("cleaner.enabled", true)?
        .set_default("log.level", "info")?
        .set_default("log.json", false)?;

    // 2. 添加配置文件（如果存在）
    if let Some(path) = config_path {
        builder = builder.add_source(File::from(path).required(true));
    } else {
        for name in CONFIG_FILE_NAMES {
            builder = builder.add_source(File::with_name(name).required(false));
        }
    }

    // 3. 添加环境变量（最高优先级）
    // 例如: DOCVOX_TTS__URL=http://tts-server:8000
    builder = builder.add_source(
        Environment::with_prefix("DOCVOX")
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true),
    );

    let config = builder.build()?;

    let app_config: AppConfig = config.try_deserialize().map_err(|e| {
        ConfigError::ParseError(format!("Failed to deserialize config: {}", e))
    })?;

    validate_config(&app_config)?;

    Ok(app_config)
}

/// 验证配置有效性
pub fn validate_config(config: &AppConfig) -> Result<(), ConfigError> {
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "Server port cannot be 0".to_string(),
        ));
    }

    if !config.tts.fake && config.tts.url.is_empty() {
        return Err(ConfigError::ValidationError(
            "TTS URL cannot be empty".to_string(),
        ));
    }

    if config.synthesis.max_segment_chars == 0 {
        return Err(ConfigError::ValidationError(
            "Max segment chars must be positive".to_string(),
        ));
    }

    config
        .synthesis
        .voice_params()
        .validate()
        .map_err(|e| ConfigError::ValidationError(format!("Default voice params: {}", e)))?;

    if config.voices.dir.as_os_str().is_empty() {
        return Err(ConfigError::ValidationError(
            "Voices directory cannot be empty".to_string(),
        ));
    }

    if config.voices.lock_poll_ms == 0 || config.voices.lock_poll_ms > config.voices.lock_timeout_ms {
        return Err(ConfigError::ValidationError(
            "Lock poll interval must be positive and not exceed the lock timeout".to_string(),
        ));
    }

    if config.storage.output_dir.as_os_str().is_empty() {
        return Err(ConfigError::ValidationError(
            "Output directory cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// 打印配置信息（用于启动时日志）
pub fn print_config(config: &AppConfig) {
    tracing::info!("=== Application Configuration ===");
    tracing::info!("Server: {}", config.server.addr());
    if config.tts.fake {
        tracing::info!("TTS: fake engine");
    } else {
        tracing::info!("TTS URL: {}", config.tts.url);
        tracing::info!("TTS Timeout: {}s", config.tts.timeout_secs);
    }
    tracing::info!("Max Segment Chars: {}", config.synthesis.max_segment_chars);
    tracing::info!("Silence Between Segments: {}ms", config.synthesis.silence_ms);
    tracing::info!("Voices Directory: {:?}", config.voices.dir);
    tracing::info!("Lock Timeout: {}ms", config.voices.lock_timeout_ms);
    tracing::info!("Output Directory: {:?}", config.storage.output_dir);
    tracing::info!("Cleaner Enabled: {}", config.cleaner.enabled);
    tracing::info!("Log Level: {}", config.log.level);
    tracing::info!("=================================");
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_load_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 5060);
    }

    #[test]
    fn test_validation_passes_for_valid_config() {
        let config = AppConfig::default();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_validation_error_for_zero_port() {
        let mut config = AppConfig::default();
        config.server.port = 0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_empty_tts_url_allowed_only_with_fake_engine() {
        let mut config = AppConfig::default();
        config.tts.url = String::new();
        assert!(validate_config(&config).is_err());

        config.tts.fake = true;
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_validation_error_for_zero_segment_chars() {
        let mut config = AppConfig::default();
        config.synthesis.max_segment_chars = 0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validation_error_for_out_of_range_params() {
        let mut config = AppConfig::default();
        config.synthesis.temperature = 9.0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validation_error_for_poll_longer_than_timeout() {
        let mut config = AppConfig::default();
        config.voices.lock_timeout_ms = 10;
        config.voices.lock_poll_ms = 50;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_load_from_file_overrides_defaults() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "[synthesis]\nmax_segment_chars = 120\nsilence_ms = 250\n\n[voices]\ndir = \"/tmp/voices\""
        )
        .unwrap();

        let config = load_config_from_path(Some(file.path())).unwrap();
        assert_eq!(config.synthesis.max_segment_chars, 120);
        assert_eq!(config.synthesis.silence_ms, 250);
        assert_eq!(config.voices.dir, std::path::PathBuf::from("/tmp/voices"));
        assert_eq!(config.server.port, 5060);
    }
}
