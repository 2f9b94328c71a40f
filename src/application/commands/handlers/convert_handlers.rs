//! Convert Command Handlers - 文本/文档转音频
//!
//! 流程：解析音色 → 可选清洗 → 分块 → 合成管线 → 原子写出音轨

use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use crate::application::commands::{ConvertDocument, ConvertText};
use crate::application::error::ApplicationError;
use crate::application::pipeline::{SynthesisPipeline, SynthesisVoice};
use crate::application::ports::{
    DocumentExtractorPort, TextCleanerPort, TrackStoragePort, VoiceRegistryPort,
};
use crate::domain::chunk_text;
use crate::domain::voice::{VoiceParams, MODEL_DEFAULT_VOICE};

// ============================================================================
// ConvertText
// ============================================================================

/// 转换响应
#[derive(Debug, Clone)]
pub struct ConvertResponse {
    pub output_path: PathBuf,
    pub file_name: String,
    pub duration_ms: u64,
    pub segment_count: usize,
}

/// 转换设置
#[derive(Debug, Clone, Copy)]
pub struct ConvertSettings {
    pub max_segment_chars: usize,
    pub default_params: VoiceParams,
}

/// ConvertText Handler
pub struct ConvertTextHandler {
    registry: Arc<dyn VoiceRegistryPort>,
    cleaner: Option<Arc<dyn TextCleanerPort>>,
    pipeline: Arc<SynthesisPipeline>,
    track_storage: Arc<dyn TrackStoragePort>,
    settings: ConvertSettings,
}

impl ConvertTextHandler {
    pub fn new(
        registry: Arc<dyn VoiceRegistryPort>,
        cleaner: Option<Arc<dyn TextCleanerPort>>,
        pipeline: Arc<SynthesisPipeline>,
        track_storage: Arc<dyn TrackStoragePort>,
        settings: ConvertSettings,
    ) -> Self {
        Self {
            registry,
            cleaner,
            pipeline,
            track_storage,
            settings,
        }
    }

    /// 解析音色：保留名直接使用模型内置音色，未注册的名字报 NotFound
    async fn resolve_voice(&self, name: &str) -> Result<Option<PathBuf>, ApplicationError> {
        if name == MODEL_DEFAULT_VOICE {
            return Ok(None);
        }
        if !self.registry.exists(name).await? {
            return Err(ApplicationError::not_found("Voice", name));
        }

        let path = self.registry.resolve_voice_path(name).await?;
        if path.is_none() {
            tracing::warn!(voice = %name, "Reference audio missing, falling back to model default voice");
        }
        Ok(path)
    }

    async fn prepare_text(&self, text: String, clean: bool) -> String {
        let cleaner = match (&self.cleaner, clean) {
            (Some(cleaner), true) => cleaner,
            _ => return text,
        };

        match cleaner.clean(&text).await {
            Ok(cleaned) if !cleaned.trim().is_empty() => cleaned,
            Ok(_) => {
                tracing::warn!("Cleaner returned empty text, using original");
                text
            }
            Err(e) => {
                tracing::warn!(error = %e, "Text cleaning failed, using original");
                text
            }
        }
    }

    pub async fn handle<F>(
        &self,
        command: ConvertText,
        cancel: CancellationToken,
        on_progress: F,
    ) -> Result<ConvertResponse, ApplicationError>
    where
        F: FnMut(f32) + Send,
    {
        if command.text.trim().is_empty() {
            return Err(ApplicationError::invalid_input("text is empty"));
        }

        let params = command.params.unwrap_or(self.settings.default_params);
        params.validate().map_err(ApplicationError::invalid_input)?;

        let reference_audio = self.resolve_voice(&command.voice).await?;
        let text = self.prepare_text(command.text, command.clean).await;

        let segments = chunk_text(&text, self.settings.max_segment_chars)?;
        if segments.is_empty() {
            return Err(ApplicationError::invalid_input("text has no speakable content"));
        }

        tracing::info!(
            title = %command.title,
            voice = %command.voice,
            segments = segments.len(),
            chars = text.chars().count(),
            "Starting conversion"
        );

        let voice = SynthesisVoice {
            reference_audio,
            params,
        };
        let output = self
            .pipeline
            .synthesize(&segments, &voice, &cancel, on_progress)
            .await?;

        // 合成结束与写出之间也可能被取消
        if cancel.is_cancelled() {
            return Err(ApplicationError::Cancelled);
        }

        let wav = output.track.to_wav();
        let output_path = self.track_storage.save_track(&command.title, &wav).await?;
        let file_name = self.track_storage.track_file_name(&command.title);

        tracing::info!(
            path = %output_path.display(),
            duration_ms = output.track.duration_ms(),
            segments = output.segment_count,
            "Conversion completed"
        );

        Ok(ConvertResponse {
            output_path,
            file_name,
            duration_ms: output.track.duration_ms(),
            segment_count: output.segment_count,
        })
    }
}

// ============================================================================
// ConvertDocument
// ============================================================================

/// ConvertDocument Handler - 提取文本后交给 ConvertText
pub struct ConvertDocumentHandler {
    extractor: Arc<dyn DocumentExtractorPort>,
    convert_text: Arc<ConvertTextHandler>,
}

impl ConvertDocumentHandler {
    pub fn new(
        extractor: Arc<dyn DocumentExtractorPort>,
        convert_text: Arc<ConvertTextHandler>,
    ) -> Self {
        Self {
            extractor,
            convert_text,
        }
    }

    pub async fn handle<F>(
        &self,
        command: ConvertDocument,
        cancel: CancellationToken,
        on_progress: F,
    ) -> Result<ConvertResponse, ApplicationError>
    where
        F: FnMut(f32) + Send,
    {
        if !self.extractor.supports(&command.path) {
            return Err(ApplicationError::invalid_input(format!(
                "unsupported document: {}",
                command.path.display()
            )));
        }

        let text = self.extractor.extract(&command.path).await?;
        let title = command.title.unwrap_or_else(|| {
            command
                .path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default()
        });

        self.convert_text
            .handle(
                ConvertText {
                    title,
                    text,
                    voice: command.voice,
                    params: command.params,
                    clean: command.clean,
                },
                cancel,
                on_progress,
            )
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::AudioBuffer;
    use crate::infrastructure::adapters::{
        FakeTtsClient, FakeTtsClientConfig, FileTrackStorage, PlainTextExtractor,
        RuleTextCleaner, SymphoniaTranscoder,
    };
    use crate::infrastructure::persistence::{FileVoiceRegistry, FileVoiceRegistryConfig};
    use tempfile::{tempdir, TempDir};

    struct Fixture {
        _dir: TempDir,
        output_dir: PathBuf,
        tts: Arc<FakeTtsClient>,
        registry: Arc<FileVoiceRegistry>,
        handler: Arc<ConvertTextHandler>,
    }

    async fn fixture(fail_at: Option<usize>) -> Fixture {
        let dir = tempdir().unwrap();
        let output_dir = dir.path().join("out");
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
            fail_at,
            ..Default::default()
        }));
        let storage = Arc::new(FileTrackStorage::new(&output_dir).await.unwrap());
        let handler = Arc::new(ConvertTextHandler::new(
            registry.clone(),
            Some(Arc::new(RuleTextCleaner::new())),
            Arc::new(SynthesisPipeline::new(tts.clone(), 100)),
            storage,
            ConvertSettings {
                max_segment_chars: 30,
                default_params: VoiceParams::default(),
            },
        ));

        Fixture {
            _dir: dir,
            output_dir,
            tts,
            registry,
            handler,
        }
    }

    fn command(text: &str, voice: &str) -> ConvertText {
        ConvertText {
            title: "My Doc.pdf".to_string(),
            text: text.to_string(),
            voice: voice.to_string(),
            params: None,
            clean: true,
        }
    }

    fn output_files(dir: &std::path::Path) -> Vec<String> {
        std::fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect()
    }

    #[tokio::test]
    async fn test_convert_with_model_default() {
        let f = fixture(None).await;
        let text = "The first sentence is here. The second follows it. A third one ends.";

        let response = f
            .handler
            .handle(command(text, MODEL_DEFAULT_VOICE), CancellationToken::new(), |_| {})
            .await
            .unwrap();

        assert_eq!(response.segment_count, 3);
        assert_eq!(response.file_name, "My_Doc_audio.wav");
        assert_eq!(response.duration_ms, 3 * 300);

        let wav = std::fs::read(&response.output_path).unwrap();
        assert_eq!(AudioBuffer::from_wav(&wav).unwrap().duration_ms(), 900);
        assert_eq!(f.tts.last_reference(), None);
    }

    #[tokio::test]
    async fn test_convert_uses_registered_voice() {
        let f = fixture(None).await;
        let profile = f
            .registry
            .add_voice_blocking("Narrator", b"fake audio data", "n.wav")
            .unwrap();

        f.handler
            .handle(command("Hello there.", "Narrator"), CancellationToken::new(), |_| {})
            .await
            .unwrap();

        assert_eq!(
            f.tts.last_reference().as_deref(),
            Some(profile.reference_audio())
        );
    }

    #[tokio::test]
    async fn test_unknown_voice_and_empty_text() {
        let f = fixture(None).await;

        let err = f
            .handler
            .handle(command("Hello.", "Nobody"), CancellationToken::new(), |_| {})
            .await
            .unwrap_err();
        assert!(matches!(err, ApplicationError::NotFound { .. }));

        let err = f
            .handler
            .handle(command("   \n ", MODEL_DEFAULT_VOICE), CancellationToken::new(), |_| {})
            .await
            .unwrap_err();
        assert!(matches!(err, ApplicationError::InvalidInput(_)));
        assert!(f.tts.calls().is_empty());
    }

    #[tokio::test]
    async fn test_invalid_params_rejected() {
        let f = fixture(None).await;
        let mut cmd = command("Hello.", MODEL_DEFAULT_VOICE);
        cmd.params = Some(VoiceParams {
            temperature: 5.0,
            ..Default::default()
        });

        let err = f
            .handler
            .handle(cmd, CancellationToken::new(), |_| {})
            .await
            .unwrap_err();
        assert!(matches!(err, ApplicationError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_failure_leaves_no_output() {
        let f = fixture(Some(2)).await;
        let text = "The first sentence is here. The second follows it. A third one ends.";

        let err = f
            .handler
            .handle(command(text, MODEL_DEFAULT_VOICE), CancellationToken::new(), |_| {})
            .await
            .unwrap_err();

        assert!(matches!(err, ApplicationError::SynthesisFailure { index: 2, .. }));
        assert!(output_files(&f.output_dir).is_empty());
    }

    #[tokio::test]
    async fn test_cancellation_leaves_no_output() {
        let f = fixture(None).await;
        let cancel = CancellationToken::new();
        let token = cancel.clone();
        let text = "The first sentence is here. The second follows it. A third one ends.";

        let err = f
            .handler
            .handle(command(text, MODEL_DEFAULT_VOICE), cancel, move |_| token.cancel())
            .await
            .unwrap_err();

        assert!(matches!(err, ApplicationError::Cancelled));
        assert_eq!(f.tts.calls().len(), 1);
        assert!(output_files(&f.output_dir).is_empty());
    }

    #[tokio::test]
    async fn test_convert_document() {
        let f = fixture(None).await;
        let doc = f.output_dir.parent().unwrap().join("chapter.md");
        std::fs::write(&doc, "# Chapter One\n\nIt was a **dark** night.").unwrap();

        let handler = ConvertDocumentHandler::new(Arc::new(PlainTextExtractor::new()), f.handler.clone());
        let response = handler
            .handle(
                ConvertDocument {
                    path: doc,
                    title: None,
                    voice: MODEL_DEFAULT_VOICE.to_string(),
                    params: None,
                    clean: true,
                },
                CancellationToken::new(),
                |_| {},
            )
            .await
            .unwrap();

        assert_eq!(response.file_name, "chapter_audio.wav");
        assert!(f.tts.calls().join(" ").contains("It was a dark night."));
    }

    #[tokio::test]
    async fn test_convert_document_rejects_unsupported() {
        let f = fixture(None).await;
        let handler = ConvertDocumentHandler::new(Arc::new(PlainTextExtractor::new()), f.handler.clone());

        let err = handler
            .handle(
                ConvertDocument {
                    path: PathBuf::from("paper.pdf"),
                    title: None,
                    voice: MODEL_DEFAULT_VOICE.to_string(),
                    params: None,
                    clean: false,
                },
                CancellationToken::new(),
                |_| {},
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ApplicationError::InvalidInput(_)));
    }
}
