//! HTTP Routes
//!
//! API Endpoints:
//! - /api/ping                GET   健康检查
//! - /api/voice/list          GET   列出所有音色
//! - /api/voice/upload        POST  上传音色（multipart）
//! - /api/voice/delete        POST  删除音色
//! - /api/voice/audio/:name   GET   试听音色参考音频
//! - /api/convert             POST  文本转音频
//! - /api/convert/document    POST  文档转音频（multipart）
//! - /api/chunk               POST  分块预览
//! - /api/audio/:file         GET   下载生成的音轨

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use super::handlers;
use super::state::AppState;

/// 创建所有路由
pub fn create_routes() -> Router<Arc<AppState>> {
    Router::new().nest("/api", api_routes())
}

/// API 路由
fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/ping", get(handlers::ping))
        .nest("/voice", voice_routes())
        .route("/convert", post(handlers::convert_text))
        .route("/convert/document", post(handlers::convert_document))
        .route("/chunk", post(handlers::chunk_text))
        .route("/audio/:file", get(handlers::get_track))
}

/// Voice 路由
fn voice_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/list", get(handlers::list_voices))
        .route("/upload", post(handlers::upload_voice))
        .route("/delete", post(handlers::delete_voice))
        .route("/audio/:name", get(handlers::voice_audio))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use serde_json::Value;
    use tempfile::{tempdir, TempDir};
    use tower::util::ServiceExt;

    use crate::application::ConvertSettings;
    use crate::domain::voice::VoiceParams;
    use crate::infrastructure::adapters::{
        FakeTtsClient, FakeTtsClientConfig, FileTrackStorage, PlainTextExtractor,
        RuleTextCleaner, SymphoniaTranscoder,
    };
    use crate::infrastructure::persistence::{FileVoiceRegistry, FileVoiceRegistryConfig};

    const BOUNDARY: &str = "docvox-test-boundary";

    async fn test_app() -> (TempDir, Router) {
        let dir = tempdir().unwrap();
        let registry = Arc::new(
            FileVoiceRegistry::open(
                FileVoiceRegistryConfig::new(dir.path().join("voices")),
                Arc::new(SymphoniaTranscoder::new()),
            )
            .unwrap(),
        );
        let tts = Arc::new(FakeTtsClient::new(FakeTtsClientConfig {
            segment_ms: 200,
            sample_rate: 16000,
            ..Default::default()
        }));
        let storage = Arc::new(FileTrackStorage::new(dir.path().join("out")).await.unwrap());

        let state = AppState::new(
            registry,
            tts,
            Some(Arc::new(RuleTextCleaner::new())),
            Arc::new(PlainTextExtractor::new()),
            storage,
            ConvertSettings {
                max_segment_chars: 30,
                default_params: VoiceParams::default(),
            },
            100,
        );

        (dir, create_routes().with_state(Arc::new(state)))
    }

    /// (字段名, 文件名, 内容)
    fn multipart_body(fields: &[(&str, Option<&str>, &str)]) -> Vec<u8> {
        let mut body = Vec::new();
        for (name, filename, data) in fields {
            body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
            match filename {
                Some(f) => body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n\
                         Content-Type: application/octet-stream\r\n\r\n",
                        name, f
                    )
                    .as_bytes(),
                ),
                None => body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n", name)
                        .as_bytes(),
                ),
            }
            body.extend_from_slice(data.as_bytes());
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
        body
    }

    fn multipart_request(uri: &str, fields: &[(&str, Option<&str>, &str)]) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={}", BOUNDARY),
            )
            .body(Body::from(multipart_body(fields)))
            .unwrap()
    }

    fn json_request(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get_request(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Vec<u8>) {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, body.to_vec())
    }

    async fn send_json(app: &Router, request: Request<Body>) -> Value {
        let (status, body) = send(app, request).await;
        assert_eq!(status, StatusCode::OK);
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn test_ping() {
        let (_dir, app) = test_app().await;
        let body = send_json(&app, get_request("/api/ping")).await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["tts_available"], true);
    }

    #[tokio::test]
    async fn test_voice_lifecycle() {
        let (_dir, app) = test_app().await;

        let body = send_json(&app, get_request("/api/voice/list")).await;
        assert_eq!(body["data"], serde_json::json!(["Model default"]));

        let upload = multipart_request(
            "/api/voice/upload",
            &[
                ("name", None, "Narrator"),
                ("file", Some("narrator.wav"), "RIFF fake wav bytes"),
            ],
        );
        let body = send_json(&app, upload).await;
        assert_eq!(body["errno"], 0);
        assert_eq!(body["data"]["name"], "Narrator");
        assert_eq!(body["data"]["original_name"], "narrator.wav");
        assert_eq!(body["data"]["audio_url"], "/api/voice/audio/Narrator");
        assert!(body["data"].get("reference_audio").is_none());

        let body = send_json(&app, get_request("/api/voice/list")).await;
        assert_eq!(body["data"], serde_json::json!(["Model default", "Narrator"]));

        let (status, audio) = send(&app, get_request("/api/voice/audio/Narrator")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(audio, b"RIFF fake wav bytes");

        let body = send_json(
            &app,
            json_request("/api/voice/delete", serde_json::json!({ "name": "Narrator" })),
        )
        .await;
        assert_eq!(body["errno"], 0);

        let body = send_json(&app, get_request("/api/voice/list")).await;
        assert_eq!(body["data"], serde_json::json!(["Model default"]));
    }

    #[tokio::test]
    async fn test_uploaded_voice_audio_url_is_routable() {
        let (_dir, app) = test_app().await;

        let upload = multipart_request(
            "/api/voice/upload",
            &[
                ("name", None, "Old Narrator"),
                ("file", Some("old.wav"), "RIFF old narrator"),
            ],
        );
        let body = send_json(&app, upload).await;
        let url = body["data"]["audio_url"].as_str().unwrap().to_string();
        assert_eq!(url, "/api/voice/audio/Old%20Narrator");

        let (status, audio) = send(&app, get_request(&url)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(audio, b"RIFF old narrator");
    }

    #[tokio::test]
    async fn test_voice_upload_errors() {
        let (_dir, app) = test_app().await;

        let bad_ext = multipart_request(
            "/api/voice/upload",
            &[("name", None, "Narrator"), ("file", Some("notes.txt"), "hello")],
        );
        assert_eq!(send_json(&app, bad_ext).await["errno"], 400);

        let upload = || {
            multipart_request(
                "/api/voice/upload",
                &[("name", None, "Narrator"), ("file", Some("n.wav"), "RIFF")],
            )
        };
        assert_eq!(send_json(&app, upload()).await["errno"], 0);
        assert_eq!(send_json(&app, upload()).await["errno"], 409);

        let missing = json_request("/api/voice/delete", serde_json::json!({ "name": "Ghost" }));
        assert_eq!(send_json(&app, missing).await["errno"], 404);
    }

    #[tokio::test]
    async fn test_convert_and_download() {
        let (_dir, app) = test_app().await;

        let body = send_json(
            &app,
            json_request(
                "/api/convert",
                serde_json::json!({
                    "title": "Weekly Report",
                    "text": "The first sentence is here. The second follows it.",
                    "voice": "Model default",
                }),
            ),
        )
        .await;
        assert_eq!(body["errno"], 0);
        assert_eq!(body["data"]["segment_count"], 2);
        assert_eq!(body["data"]["duration_ms"], 600);
        assert_eq!(body["data"]["file_name"], "Weekly_Report_audio.wav");
        assert_eq!(body["data"]["url"], "/api/audio/Weekly_Report_audio.wav");

        let response = app
            .clone()
            .oneshot(get_request("/api/audio/Weekly_Report_audio.wav"))
            .await
            .unwrap();
        assert_eq!(response.headers()[header::CONTENT_TYPE], "audio/wav");
        let wav = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&wav[..4], b"RIFF");
    }

    #[tokio::test]
    async fn test_convert_errors() {
        let (_dir, app) = test_app().await;

        let unknown_voice = json_request(
            "/api/convert",
            serde_json::json!({ "title": "t", "text": "Hello.", "voice": "Nobody" }),
        );
        assert_eq!(send_json(&app, unknown_voice).await["errno"], 404);

        let bad_params = json_request(
            "/api/convert",
            serde_json::json!({
                "title": "t", "text": "Hello.", "voice": "Model default", "temperature": 3.5
            }),
        );
        assert_eq!(send_json(&app, bad_params).await["errno"], 400);

        let missing_track = get_request("/api/audio/nothing_audio.wav");
        assert_eq!(send_json(&app, missing_track).await["errno"], 404);
    }

    #[tokio::test]
    async fn test_convert_document() {
        let (_dir, app) = test_app().await;

        let request = multipart_request(
            "/api/convert/document",
            &[
                ("voice", None, "Model default"),
                ("temperature", None, "0.9"),
                (
                    "file",
                    Some("meeting notes.txt"),
                    "Agenda for today.\n\nWe review the budget.",
                ),
            ],
        );
        let body = send_json(&app, request).await;
        assert_eq!(body["errno"], 0);
        assert_eq!(body["data"]["file_name"], "meeting_notes_audio.wav");
        assert_eq!(body["data"]["segment_count"], 2);

        let unsupported = multipart_request(
            "/api/convert/document",
            &[("voice", None, "Model default"), ("file", Some("scan.pdf"), "%PDF")],
        );
        assert_eq!(send_json(&app, unsupported).await["errno"], 400);
    }

    #[tokio::test]
    async fn test_chunk_preview() {
        let (_dir, app) = test_app().await;

        let body = send_json(
            &app,
            json_request(
                "/api/chunk",
                serde_json::json!({ "text": "Dr. Smith arrived. Mr. Jones left early.", "max_length": 25 }),
            ),
        )
        .await;
        assert_eq!(body["data"]["total"], 2);
        assert_eq!(body["data"]["segments"][0]["text"], "Dr. Smith arrived.");
        assert_eq!(body["data"]["segments"][1]["index"], 2);

        let zero = json_request("/api/chunk", serde_json::json!({ "text": "Hi.", "max_length": 0 }));
        assert_eq!(send_json(&app, zero).await["errno"], 400);
    }
}
