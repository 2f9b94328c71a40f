//! DocVox - 文档转有声音频服务

use std::sync::Arc;

use docvox::application::{ConvertSettings, TextCleanerPort, TtsEnginePort};
use docvox::config::{load_config, print_config, AppConfig};
use docvox::infrastructure::adapters::{
    FakeTtsClient, FakeTtsClientConfig, FileTrackStorage, HttpTtsClient, HttpTtsClientConfig,
    PlainTextExtractor, RuleTextCleaner, SymphoniaTranscoder,
};
use docvox::infrastructure::http::{AppState, HttpServer, ServerConfig};
use docvox::infrastructure::persistence::{FileVoiceRegistry, FileVoiceRegistryConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 加载配置（优先级：环境变量 > 配置文件 > 默认值）
    let config = load_config().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;

    init_tracing(&config);

    tracing::info!("DocVox - 文档转有声音频");
    print_config(&config);

    // 音色注册表
    let registry_config = FileVoiceRegistryConfig {
        root: config.voices.dir.clone(),
        lock_timeout: config.voices.lock_timeout(),
        lock_poll_interval: config.voices.lock_poll_interval(),
    };
    let registry = Arc::new(FileVoiceRegistry::open(
        registry_config,
        Arc::new(SymphoniaTranscoder::new()),
    )?);

    // TTS 引擎
    let tts_engine: Arc<dyn TtsEnginePort> = if config.tts.fake {
        tracing::warn!("Using fake TTS engine, output is a test tone");
        Arc::new(FakeTtsClient::new(FakeTtsClientConfig::default()))
    } else {
        let tts_config = HttpTtsClientConfig::new(&config.tts.url)
            .with_timeout(config.tts.timeout_secs)
            .with_retries(config.tts.max_retries);
        Arc::new(HttpTtsClient::new(tts_config)?)
    };
    if !tts_engine.health_check().await {
        tracing::warn!(url = %config.tts.url, "TTS service is not reachable yet");
    }

    let cleaner: Option<Arc<dyn TextCleanerPort>> = if config.cleaner.enabled {
        Some(Arc::new(RuleTextCleaner::new()))
    } else {
        None
    };

    let track_storage = Arc::new(FileTrackStorage::new(&config.storage.output_dir).await?);

    let settings = ConvertSettings {
        max_segment_chars: config.synthesis.max_segment_chars,
        default_params: config.synthesis.voice_params(),
    };
    let state = AppState::new(
        registry,
        tts_engine,
        cleaner,
        Arc::new(PlainTextExtractor::new()),
        track_storage,
        settings,
        config.synthesis.silence_ms,
    );

    let server_config = ServerConfig::new(&config.server.host, config.server.port)
        .with_max_body_bytes(config.storage.max_upload_size as usize);
    let server = HttpServer::new(server_config, state);

    // 启动服务器（带优雅关闭）
    server
        .run_with_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "Failed to listen for ctrl-c");
                return;
            }
            tracing::info!("Received shutdown signal");
        })
        .await?;

    tracing::info!("Server shutdown complete");

    Ok(())
}

/// 初始化日志（RUST_LOG 优先于配置）
fn init_tracing(config: &AppConfig) {
    let log_filter = format!(
        "{},docvox={},tower_http=debug",
        config.log.level, config.log.level
    );
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_filter));

    if config.log.json {
        tracing_subscriber::fmt().with_env_filter(filter).json().init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}
