//! Voice HTTP Handlers

use axum::{
    body::Body,
    extract::{Multipart, Path, State},
    http::{header, StatusCode},
    response::Response,
    Json,
};
use std::sync::Arc;

use crate::application::{AddVoice, GetVoiceAudio, ListVoices, RemoveVoice};
use crate::domain::voice::AudioFormat;
use crate::infrastructure::http::dto::{ApiResponse, DeleteVoiceRequest, Empty, VoiceResponse};
use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::http::state::AppState;

/// 上传音色（multipart: name + file）
pub async fn upload_voice(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<ApiResponse<VoiceResponse>>, ApiError> {
    let mut name: Option<String> = None;
    let mut audio: Option<(String, Vec<u8>)> = None;

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        ApiError::BadRequest(format!("Failed to read multipart field: {}", e))
    })? {
        let field_name = field.name().unwrap_or_default().to_string();

        match field_name.as_str() {
            "name" => {
                name = Some(
                    field
                        .text()
                        .await
                        .map_err(|e| ApiError::BadRequest(format!("Failed to read name: {}", e)))?,
                );
            }
            "file" => {
                let filename = field.file_name().unwrap_or_default().to_string();
                if AudioFormat::from_filename(&filename).is_none() {
                    return Err(ApiError::BadRequest(
                        "Only WAV and MP3 audio files are allowed".to_string(),
                    ));
                }

                let data = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::BadRequest(format!("Failed to read file: {}", e)))?
                    .to_vec();
                audio = Some((filename, data));
            }
            _ => {}
        }
    }

    let name = name.ok_or_else(|| ApiError::BadRequest("Name is required".to_string()))?;
    let (original_filename, audio) =
        audio.ok_or_else(|| ApiError::BadRequest("Audio file is required".to_string()))?;

    let result = state
        .add_voice_handler
        .handle(AddVoice {
            name,
            audio,
            original_filename,
        })
        .await?;

    Ok(Json(ApiResponse::success(result.into())))
}

/// 获取音色列表（"Model default" 在最前）
pub async fn list_voices(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<String>>>, ApiError> {
    let names = state.list_voices_handler.handle(ListVoices).await?;
    Ok(Json(ApiResponse::success(names)))
}

/// 删除音色
pub async fn delete_voice(
    State(state): State<Arc<AppState>>,
    Json(req): Json<DeleteVoiceRequest>,
) -> Result<Json<ApiResponse<Empty>>, ApiError> {
    state
        .remove_voice_handler
        .handle(RemoveVoice { name: req.name })
        .await?;

    Ok(Json(ApiResponse::ok()))
}

/// 试听音色参考音频
pub async fn voice_audio(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Result<Response, ApiError> {
    let result = state
        .get_voice_audio_handler
        .handle(GetVoiceAudio { name })
        .await?;

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, result.content_type)
        .header(header::CONTENT_LENGTH, result.audio_data.len())
        .body(Body::from(result.audio_data))
        .map_err(|e| ApiError::Internal(format!("Failed to build response: {}", e)))
}
