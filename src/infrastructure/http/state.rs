//! Application State
//!
//! 包含所有 Command/Query Handlers 的应用状态

use std::sync::Arc;

use crate::application::{
    // Command handlers
    AddVoiceHandler, ConvertDocumentHandler, ConvertSettings, ConvertTextHandler,
    RemoveVoiceHandler,
    // Query handlers
    ChunkTextHandler, GetTrackHandler, GetVoiceAudioHandler, ListVoicesHandler,
    // Pipeline
    SynthesisPipeline,
    // Ports
    DocumentExtractorPort, TextCleanerPort, TrackStoragePort, TtsEnginePort, VoiceRegistryPort,
};
use crate::domain::voice::VoiceParams;

/// 应用状态
pub struct AppState {
    // ========== Ports ==========
    pub tts_engine: Arc<dyn TtsEnginePort>,
    pub default_params: VoiceParams,

    // ========== Command Handlers ==========
    pub add_voice_handler: AddVoiceHandler,
    pub remove_voice_handler: RemoveVoiceHandler,
    pub convert_text_handler: Arc<ConvertTextHandler>,
    pub convert_document_handler: Arc<ConvertDocumentHandler>,

    // ========== Query Handlers ==========
    pub list_voices_handler: ListVoicesHandler,
    pub get_voice_audio_handler: GetVoiceAudioHandler,
    pub get_track_handler: GetTrackHandler,
    pub chunk_text_handler: ChunkTextHandler,
}

impl AppState {
    /// 创建应用状态
    pub fn new(
        registry: Arc<dyn VoiceRegistryPort>,
        tts_engine: Arc<dyn TtsEnginePort>,
        cleaner: Option<Arc<dyn TextCleanerPort>>,
        extractor: Arc<dyn DocumentExtractorPort>,
        track_storage: Arc<dyn TrackStoragePort>,
        settings: ConvertSettings,
        silence_ms: u64,
    ) -> Self {
        let pipeline = Arc::new(SynthesisPipeline::new(tts_engine.clone(), silence_ms));
        let convert_text_handler = Arc::new(ConvertTextHandler::new(
            registry.clone(),
            cleaner,
            pipeline,
            track_storage.clone(),
            settings,
        ));

        Self {
            // Ports
            tts_engine,
            default_params: settings.default_params,

            // Command handlers
            add_voice_handler: AddVoiceHandler::new(registry.clone()),
            remove_voice_handler: RemoveVoiceHandler::new(registry.clone()),
            convert_document_handler: Arc::new(ConvertDocumentHandler::new(
                extractor,
                convert_text_handler.clone(),
            )),
            convert_text_handler,

            // Query handlers
            list_voices_handler: ListVoicesHandler::new(registry.clone()),
            get_voice_audio_handler: GetVoiceAudioHandler::new(registry),
            get_track_handler: GetTrackHandler::new(track_storage),
            chunk_text_handler: ChunkTextHandler::new(settings.max_segment_chars),
        }
    }
}
