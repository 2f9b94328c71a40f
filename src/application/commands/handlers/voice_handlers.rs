//! Voice Command Handlers

use std::sync::Arc;

use crate::application::commands::{AddVoice, RemoveVoice};
use crate::application::error::ApplicationError;
use crate::application::ports::VoiceRegistryPort;

// ============================================================================
// AddVoice
// ============================================================================

/// 添加音色响应
#[derive(Debug, Clone)]
pub struct AddVoiceResponse {
    pub name: String,
    pub original_name: String,
}

/// AddVoice Handler
pub struct AddVoiceHandler {
    registry: Arc<dyn VoiceRegistryPort>,
}

impl AddVoiceHandler {
    pub fn new(registry: Arc<dyn VoiceRegistryPort>) -> Self {
        Self { registry }
    }

    pub async fn handle(&self, command: AddVoice) -> Result<AddVoiceResponse, ApplicationError> {
        if command.audio.is_empty() {
            return Err(ApplicationError::invalid_input("uploaded audio is empty"));
        }

        let profile = self
            .registry
            .add_voice(&command.name, command.audio, &command.original_filename)
            .await?;

        Ok(AddVoiceResponse {
            name: profile.name().to_string(),
            original_name: profile.original_name().to_string(),
        })
    }
}

// ============================================================================
// RemoveVoice
// ============================================================================

/// RemoveVoice Handler
pub struct RemoveVoiceHandler {
    registry: Arc<dyn VoiceRegistryPort>,
}

impl RemoveVoiceHandler {
    pub fn new(registry: Arc<dyn VoiceRegistryPort>) -> Self {
        Self { registry }
    }

    pub async fn handle(&self, command: RemoveVoice) -> Result<(), ApplicationError> {
        self.registry.remove_voice(&command.name).await?;
        Ok(())
    }
}
