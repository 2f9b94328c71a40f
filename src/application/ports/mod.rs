//! Application Ports - 出站端口定义
//!
//! 定义应用层与基础设施层的抽象接口

mod audio_transcoder;
mod document_extractor;
mod text_cleaner;
mod track_storage;
mod tts_engine;
mod voice_registry;

pub use audio_transcoder::{AudioTranscoderPort, TranscodeError};
pub use document_extractor::{DocumentExtractorPort, ExtractError};
pub use text_cleaner::{CleanerError, TextCleanerPort};
pub use track_storage::{TrackStorageError, TrackStoragePort};
pub use tts_engine::{InferRequest, InferResponse, TtsEnginePort, TtsError};
pub use voice_registry::VoiceRegistryPort;
