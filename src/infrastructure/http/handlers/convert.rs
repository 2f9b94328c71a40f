//! Convert HTTP Handlers - 文本/文档转音频、分块预览
//!
//! 合成在独立任务中执行；请求被丢弃（客户端断开）时通过
//! CancellationToken 的 DropGuard 取消合成，不会写出半成品音轨。

use axum::{
    extract::{Multipart, State},
    Json,
};
use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::application::{
    ApplicationError, ChunkText, ConvertDocument, ConvertResponse, ConvertText,
};
use crate::domain::secure_filename;
use crate::infrastructure::http::dto::{
    ApiResponse, ChunkRequest, ChunkResponse, ConvertRequest, ConvertResultResponse,
    VoiceParamsRequest,
};
use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::http::state::AppState;

/// 文本转音频
pub async fn convert_text(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ConvertRequest>,
) -> Result<Json<ApiResponse<ConvertResultResponse>>, ApiError> {
    let command = ConvertText {
        params: req.params.into_params(state.default_params),
        title: req.title,
        text: req.text,
        voice: req.voice,
        clean: req.clean,
    };

    let handler = state.convert_text_handler.clone();
    let progress = progress_logger(command.title.clone());
    let result = run_cancellable(move |cancel| async move {
        handler.handle(command, cancel, progress).await
    })
    .await?;

    Ok(Json(ApiResponse::success(result.into())))
}

/// 文档转音频（multipart: file + voice [+ title, clean, exaggeration, cfg_weight, temperature]）
pub async fn convert_document(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<ApiResponse<ConvertResultResponse>>, ApiError> {
    let mut upload: Option<TempUpload> = None;
    let mut voice: Option<String> = None;
    let mut title: Option<String> = None;
    let mut clean = true;
    let mut params = VoiceParamsRequest::default();

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        ApiError::BadRequest(format!("Failed to read multipart field: {}", e))
    })? {
        let field_name = field.name().unwrap_or_default().to_string();

        if field_name == "file" {
            let filename = field.file_name().unwrap_or_default().to_string();
            let data = field
                .bytes()
                .await
                .map_err(|e| ApiError::BadRequest(format!("Failed to read file: {}", e)))?;
            upload = Some(TempUpload::write(&filename, &data).await?);
            continue;
        }

        let value = field
            .text()
            .await
            .map_err(|e| ApiError::BadRequest(format!("Failed to read {}: {}", field_name, e)))?;
        match field_name.as_str() {
            "voice" => voice = Some(value),
            "title" if !value.trim().is_empty() => title = Some(value),
            "clean" => clean = parse_field(&field_name, &value)?,
            "exaggeration" => params.exaggeration = Some(parse_field(&field_name, &value)?),
            "cfg_weight" => params.cfg_weight = Some(parse_field(&field_name, &value)?),
            "temperature" => params.temperature = Some(parse_field(&field_name, &value)?),
            _ => {}
        }
    }

    let upload = upload.ok_or_else(|| ApiError::BadRequest("Document file is required".to_string()))?;
    let voice = voice.ok_or_else(|| ApiError::BadRequest("Voice is required".to_string()))?;

    let command = ConvertDocument {
        path: upload.path.clone(),
        title: Some(title.unwrap_or_else(|| upload.original_name.clone())),
        voice,
        params: params.into_params(state.default_params),
        clean,
    };

    let handler = state.convert_document_handler.clone();
    let progress = progress_logger(upload.original_name.clone());
    let result = run_cancellable(move |cancel| async move {
        handler.handle(command, cancel, progress).await
    })
    .await;
    drop(upload);

    Ok(Json(ApiResponse::success(result?.into())))
}

/// 分块预览
pub async fn chunk_text(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ChunkRequest>,
) -> Result<Json<ApiResponse<ChunkResponse>>, ApiError> {
    let segments = state.chunk_text_handler.handle(ChunkText {
        text: req.text,
        max_length: req.max_length,
    })?;

    Ok(Json(ApiResponse::success(ChunkResponse {
        total: segments.len(),
        segments: segments.into_iter().map(Into::into).collect(),
    })))
}

// ============================================================================
// Helpers
// ============================================================================

/// 在独立任务中执行转换，返回的 future 被丢弃时取消合成
async fn run_cancellable<F, Fut>(job: F) -> Result<ConvertResponse, ApiError>
where
    F: FnOnce(CancellationToken) -> Fut,
    Fut: Future<Output = Result<ConvertResponse, ApplicationError>> + Send + 'static,
{
    let cancel = CancellationToken::new();
    let _guard = cancel.clone().drop_guard();

    match tokio::spawn(job(cancel)).await {
        Ok(result) => Ok(result?),
        Err(e) => Err(ApiError::Internal(format!("Conversion task failed: {}", e))),
    }
}

/// 每前进 10% 记录一次进度
fn progress_logger(title: String) -> impl FnMut(f32) + Send + 'static {
    let mut reported = 0u32;
    move |fraction| {
        let percent = (fraction * 100.0).round() as u32;
        if percent >= reported + 10 || (percent == 100 && reported < 100) {
            reported = percent;
            tracing::debug!(title = %title, percent, "Conversion progress");
        }
    }
}

fn parse_field<T: std::str::FromStr>(name: &str, value: &str) -> Result<T, ApiError> {
    value
        .trim()
        .parse()
        .map_err(|_| ApiError::BadRequest(format!("Invalid value for {}: {}", name, value)))
}

/// 上传文档的临时副本，Drop 时删除
struct TempUpload {
    path: PathBuf,
    original_name: String,
}

impl TempUpload {
    async fn write(original_name: &str, data: &[u8]) -> Result<Self, ApiError> {
        let safe = secure_filename(original_name);
        if safe.is_empty() {
            return Err(ApiError::BadRequest("Document file name is required".to_string()));
        }

        let path = std::env::temp_dir().join(format!("docvox-{}-{}", Uuid::new_v4(), safe));
        tokio::fs::write(&path, data)
            .await
            .map_err(|e| ApiError::Internal(format!("Failed to store upload: {}", e)))?;

        Ok(Self {
            path,
            original_name: original_name.to_string(),
        })
    }
}

impl Drop for TempUpload {
    fn drop(&mut self) {
        if let Err(e) = std::fs::remove_file(&self.path) {
            tracing::warn!(path = %self.path.display(), error = %e, "Failed to remove temporary upload");
        }
    }
}
