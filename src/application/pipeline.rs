//! 合成管线
//!
//! 按顺序逐个合成文本片段，每段之后追加固定时长的静音，拼成一条完整音轨。
//!
//! - 同一时刻只有一个合成请求在进行
//! - 每完成一段回调一次进度 `(i + 1) / total`，成功时恰好到达 1.0
//! - 任一片段失败即中止，错误携带失败片段的序号
//! - 取消信号在片段之间检查

use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

use crate::application::ports::{InferRequest, TtsEnginePort, TtsError};
use crate::domain::voice::VoiceParams;
use crate::domain::{AudioBuffer, AudioError, TextSegment};

/// 管线错误
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("No segments to synthesize")]
    EmptyInput,

    #[error("Segment {index} synthesis failed: {source}")]
    Synthesis {
        index: usize,
        #[source]
        source: TtsError,
    },

    #[error("Segment {index} returned unusable audio: {source}")]
    InvalidAudio {
        index: usize,
        #[source]
        source: AudioError,
    },

    #[error("Cancelled after {completed} segments")]
    Cancelled { completed: usize },
}

/// 合成使用的音色
#[derive(Debug, Clone, Default)]
pub struct SynthesisVoice {
    /// 参考音频，None 表示模型内置音色
    pub reference_audio: Option<PathBuf>,
    pub params: VoiceParams,
}

/// 合成结果
#[derive(Debug)]
pub struct SynthesisOutput {
    pub track: AudioBuffer,
    pub segment_count: usize,
}

/// 合成管线
pub struct SynthesisPipeline {
    tts_engine: Arc<dyn TtsEnginePort>,
    silence_ms: u64,
}

impl SynthesisPipeline {
    pub fn new(tts_engine: Arc<dyn TtsEnginePort>, silence_ms: u64) -> Self {
        Self {
            tts_engine,
            silence_ms,
        }
    }

    /// 合成全部片段
    ///
    /// 空片段列表返回 [`PipelineError::EmptyInput`]
    pub async fn synthesize<F>(
        &self,
        segments: &[TextSegment],
        voice: &SynthesisVoice,
        cancel: &CancellationToken,
        mut on_progress: F,
    ) -> Result<SynthesisOutput, PipelineError>
    where
        F: FnMut(f32) + Send,
    {
        if segments.is_empty() {
            return Err(PipelineError::EmptyInput);
        }

        let total = segments.len();
        let mut track: Option<AudioBuffer> = None;

        for (i, segment) in segments.iter().enumerate() {
            if cancel.is_cancelled() {
                tracing::info!(completed = i, total, "Synthesis cancelled");
                return Err(PipelineError::Cancelled { completed: i });
            }

            tracing::debug!(
                segment_index = segment.index,
                total,
                chars = segment.char_count(),
                "Synthesizing segment"
            );

            let response = self
                .tts_engine
                .infer(InferRequest {
                    text: segment.text.clone(),
                    reference_audio: voice.reference_audio.clone(),
                    params: voice.params,
                })
                .await
                .map_err(|source| {
                    tracing::error!(segment_index = segment.index, error = %source, "Segment synthesis failed");
                    PipelineError::Synthesis {
                        index: segment.index,
                        source,
                    }
                })?;

            let mut audio = AudioBuffer::from_wav(&response.audio_data).map_err(|source| {
                PipelineError::InvalidAudio {
                    index: segment.index,
                    source,
                }
            })?;
            audio.append_silence(self.silence_ms);

            match track.as_mut() {
                Some(track) => track.append(&audio).map_err(|source| PipelineError::InvalidAudio {
                    index: segment.index,
                    source,
                })?,
                None => track = Some(audio),
            }

            on_progress((i + 1) as f32 / total as f32);
        }

        let track = track.ok_or(PipelineError::EmptyInput)?;
        tracing::info!(
            segments = total,
            duration_ms = track.duration_ms(),
            "Synthesis completed"
        );

        Ok(SynthesisOutput {
            track,
            segment_count: total,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::chunk_text;
    use crate::infrastructure::adapters::{FakeTtsClient, FakeTtsClientConfig};

    fn segments(texts: &[&str]) -> Vec<TextSegment> {
        texts
            .iter()
            .enumerate()
            .map(|(i, t)| TextSegment {
                index: i + 1,
                text: t.to_string(),
            })
            .collect()
    }

    fn fake(fail_at: Option<usize>) -> Arc<FakeTtsClient> {
        Arc::new(FakeTtsClient::new(FakeTtsClientConfig {
            segment_ms: 1000,
            sample_rate: 16000,
            fail_at,
            ..Default::default()
        }))
    }

    #[tokio::test]
    async fn test_calls_in_order_and_sums_duration() {
        let tts = fake(None);
        let pipeline = SynthesisPipeline::new(tts.clone(), 500);
        let segs = segments(&["One.", "Two.", "Three."]);

        let output = pipeline
            .synthesize(&segs, &SynthesisVoice::default(), &CancellationToken::new(), |_| {})
            .await
            .unwrap();

        assert_eq!(tts.calls(), vec!["One.", "Two.", "Three."]);
        assert_eq!(output.segment_count, 3);
        // 3 × (1000ms 语音 + 500ms 静音)
        assert_eq!(output.track.duration_ms(), 4500);
    }

    #[tokio::test]
    async fn test_progress_is_monotonic_and_reaches_one() {
        let pipeline = SynthesisPipeline::new(fake(None), 100);
        let segs = chunk_text("First sentence. Second one. Third here. Fourth.", 16).unwrap();
        assert_eq!(segs.len(), 4);

        let mut progress = Vec::new();
        pipeline
            .synthesize(&segs, &SynthesisVoice::default(), &CancellationToken::new(), |p| {
                progress.push(p)
            })
            .await
            .unwrap();

        assert_eq!(progress.len(), 4);
        assert!(progress.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(*progress.last().unwrap(), 1.0);
    }

    #[tokio::test]
    async fn test_failure_reports_segment_index() {
        let tts = fake(Some(2));
        let pipeline = SynthesisPipeline::new(tts.clone(), 100);
        let segs = segments(&["a", "b", "c"]);

        let err = pipeline
            .synthesize(&segs, &SynthesisVoice::default(), &CancellationToken::new(), |_| {})
            .await
            .unwrap_err();

        assert!(matches!(err, PipelineError::Synthesis { index: 2, .. }));
        // 失败后不再继续
        assert_eq!(tts.calls().len(), 2);
    }

    #[tokio::test]
    async fn test_empty_segments_rejected() {
        let pipeline = SynthesisPipeline::new(fake(None), 100);
        let err = pipeline
            .synthesize(&[], &SynthesisVoice::default(), &CancellationToken::new(), |_| {})
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::EmptyInput));
    }

    #[tokio::test]
    async fn test_cancel_between_segments() {
        let tts = fake(None);
        let pipeline = SynthesisPipeline::new(tts.clone(), 100);
        let segs = segments(&["a", "b", "c"]);
        let cancel = CancellationToken::new();

        let token = cancel.clone();
        let err = pipeline
            .synthesize(&segs, &SynthesisVoice::default(), &cancel, |p| {
                if p > 0.0 {
                    token.cancel();
                }
            })
            .await
            .unwrap_err();

        assert!(matches!(err, PipelineError::Cancelled { completed: 1 }));
        assert_eq!(tts.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_reference_audio_is_forwarded() {
        let tts = fake(None);
        let pipeline = SynthesisPipeline::new(tts.clone(), 0);
        let voice = SynthesisVoice {
            reference_audio: Some(PathBuf::from("/voices/Alice/sample.wav")),
            params: VoiceParams::default(),
        };

        let output = pipeline
            .synthesize(&segments(&["Hi."]), &voice, &CancellationToken::new(), |_| {})
            .await
            .unwrap();

        assert_eq!(output.track.duration_ms(), 1000);
        assert_eq!(
            tts.last_reference(),
            Some(PathBuf::from("/voices/Alice/sample.wav"))
        );
    }
}
