//! Audio Query Handlers

use std::sync::Arc;

use crate::application::error::ApplicationError;
use crate::application::ports::TrackStoragePort;
use crate::application::queries::{AudioDataResponse, GetTrack};

/// GetTrack Handler - 下载已生成的音轨
pub struct GetTrackHandler {
    track_storage: Arc<dyn TrackStoragePort>,
}

impl GetTrackHandler {
    pub fn new(track_storage: Arc<dyn TrackStoragePort>) -> Self {
        Self { track_storage }
    }

    pub async fn handle(&self, query: GetTrack) -> Result<AudioDataResponse, ApplicationError> {
        let audio_data = self.track_storage.read_track(&query.file_name).await?;

        Ok(AudioDataResponse {
            audio_data,
            content_type: "audio/wav".to_string(),
            file_name: query.file_name,
        })
    }
}
