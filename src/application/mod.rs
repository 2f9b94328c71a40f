//! 应用层 - 用例编排
//!
//! 包含：
//! - ports: 六边形架构端口定义（TtsEngine、VoiceRegistry、TextCleaner、DocumentExtractor 等）
//! - pipeline: 合成管线
//! - commands: CQRS 命令及处理器
//! - queries: CQRS 查询及处理器
//! - error: 应用层错误定义

pub mod commands;
pub mod error;
pub mod pipeline;
pub mod ports;
pub mod queries;

// Re-exports
pub use commands::{
    // Convert commands
    ConvertDocument,
    ConvertText,
    // Voice commands
    AddVoice,
    RemoveVoice,
    // Handlers
    handlers::{
        AddVoiceHandler, AddVoiceResponse, ConvertDocumentHandler, ConvertResponse,
        ConvertSettings, ConvertTextHandler, RemoveVoiceHandler,
    },
};

pub use error::ApplicationError;

pub use pipeline::{PipelineError, SynthesisOutput, SynthesisPipeline, SynthesisVoice};

pub use ports::{
    // Transcoder
    AudioTranscoderPort,
    TranscodeError,
    // Document extractor
    DocumentExtractorPort,
    ExtractError,
    // Text cleaner
    CleanerError,
    TextCleanerPort,
    // Track storage
    TrackStorageError,
    TrackStoragePort,
    // TTS engine
    InferRequest,
    InferResponse,
    TtsEnginePort,
    TtsError,
    // Voice registry
    VoiceRegistryPort,
};

pub use queries::{
    AudioDataResponse,
    ChunkText,
    GetTrack,
    GetVoiceAudio,
    ListVoices,
    // Handlers
    handlers::{ChunkTextHandler, GetTrackHandler, GetVoiceAudioHandler, ListVoicesHandler},
};
