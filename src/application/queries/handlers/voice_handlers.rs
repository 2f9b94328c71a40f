//! Voice Query Handlers

use std::sync::Arc;

use crate::application::error::ApplicationError;
use crate::application::ports::VoiceRegistryPort;
use crate::application::queries::{AudioDataResponse, GetVoiceAudio, ListVoices};
use crate::domain::voice::{AudioFormat, MODEL_DEFAULT_VOICE};

/// ListVoices Handler
pub struct ListVoicesHandler {
    registry: Arc<dyn VoiceRegistryPort>,
}

impl ListVoicesHandler {
    pub fn new(registry: Arc<dyn VoiceRegistryPort>) -> Self {
        Self { registry }
    }

    /// `"Model default"` 在最前，其余按字典序
    pub async fn handle(&self, _query: ListVoices) -> Result<Vec<String>, ApplicationError> {
        Ok(self.registry.list_voices().await?)
    }
}

/// GetVoiceAudio Handler - 试听参考音频
pub struct GetVoiceAudioHandler {
    registry: Arc<dyn VoiceRegistryPort>,
}

impl GetVoiceAudioHandler {
    pub fn new(registry: Arc<dyn VoiceRegistryPort>) -> Self {
        Self { registry }
    }

    pub async fn handle(&self, query: GetVoiceAudio) -> Result<AudioDataResponse, ApplicationError> {
        if query.name == MODEL_DEFAULT_VOICE {
            return Err(ApplicationError::invalid_input(
                "the model default voice has no reference audio",
            ));
        }

        let path = self
            .registry
            .resolve_voice_path(&query.name)
            .await?
            .ok_or_else(|| ApplicationError::not_found("Voice", query.name.as_str()))?;

        let audio_data = tokio::fs::read(&path)
            .await
            .map_err(|e| ApplicationError::storage(e.to_string()))?;

        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let content_type = AudioFormat::from_filename(&file_name)
            .unwrap_or(AudioFormat::Wav)
            .mime_type()
            .to_string();

        Ok(AudioDataResponse {
            audio_data,
            content_type,
            file_name,
        })
    }
}
