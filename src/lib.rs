//! DocVox - 文档转有声音频
//!
//! 架构设计: DDD + CQRS + Hexagonal Architecture
//!
//! 领域层 (domain/):
//! - text_chunker: 句子/缩写感知的文本分块
//! - audio: PCM 音频缓冲与 WAV 编解码
//! - voice: 音色管理上下文
//!
//! 应用层 (application/):
//! - Ports: 端口定义（TtsEngine, VoiceRegistry, TextCleaner, DocumentExtractor, TrackStorage, AudioTranscoder）
//! - Pipeline: 顺序合成管线（静音间隔、进度、取消）
//! - Commands: CQRS 命令处理器
//! - Queries: CQRS 查询处理器
//!
//! 基础设施层 (infrastructure/):
//! - HTTP: RESTful API
//! - Persistence: 文件锁保护的音色注册表
//! - Adapters: TTS Client, Transcoder, Cleaner, Extractor, Track Storage

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::{load_config, AppConfig};
