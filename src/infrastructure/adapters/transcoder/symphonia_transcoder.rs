//! Symphonia Transcoder - 把上传的参考音频统一转成 16 位 PCM WAV
//!
//! WAV 也会走一遍解码，24 位/浮点等编码因此被规整为 16 位 PCM

use std::io::Cursor;

use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::DecoderOptions;
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

use crate::application::ports::{AudioTranscoderPort, TranscodeError};
use crate::domain::voice::AudioFormat;
use crate::domain::{AudioBuffer, AudioSpec};

/// 基于 symphonia 的转码器
#[derive(Debug, Default, Clone)]
pub struct SymphoniaTranscoder;

impl SymphoniaTranscoder {
    pub fn new() -> Self {
        Self
    }

    /// 解码为交错 f32 采样
    fn decode(&self, data: &[u8], format: AudioFormat) -> Result<AudioBuffer, TranscodeError> {
        let cursor = Cursor::new(data.to_vec());
        let mss = MediaSourceStream::new(Box::new(cursor), Default::default());

        let mut hint = Hint::new();
        hint.with_extension(format.extension());
        hint.mime_type(format.mime_type());

        let probed = symphonia::default::get_probe()
            .format(
                &hint,
                mss,
                &FormatOptions::default(),
                &MetadataOptions::default(),
            )
            .map_err(|e| TranscodeError::DecodingError(format!("Probe failed: {}", e)))?;

        let mut reader = probed.format;

        let track = reader
            .default_track()
            .ok_or_else(|| TranscodeError::DecodingError("No audio track found".to_string()))?;
        let track_id = track.id;

        let mut decoder = symphonia::default::get_codecs()
            .make(&track.codec_params, &DecoderOptions::default())
            .map_err(|e| TranscodeError::UnsupportedFormat(format!("{}", e)))?;

        let mut spec: Option<AudioSpec> = None;
        let mut samples: Vec<f32> = Vec::new();

        loop {
            let packet = match reader.next_packet() {
                Ok(p) => p,
                Err(SymphoniaError::IoError(e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                    break;
                }
                Err(e) => {
                    return Err(TranscodeError::DecodingError(format!(
                        "Packet read error: {}",
                        e
                    )));
                }
            };

            if packet.track_id() != track_id {
                continue;
            }

            let decoded = match decoder.decode(&packet) {
                Ok(d) => d,
                Err(SymphoniaError::DecodeError(e)) => {
                    tracing::warn!(error = %e, "Decode error (skipping packet)");
                    continue;
                }
                Err(e) => {
                    return Err(TranscodeError::DecodingError(e.to_string()));
                }
            };

            let signal = *decoded.spec();
            spec.get_or_insert(AudioSpec {
                sample_rate: signal.rate,
                channels: signal.channels.count() as u16,
            });

            let num_frames = decoded.frames();
            let mut sample_buf = SampleBuffer::<f32>::new(num_frames as u64, signal);
            sample_buf.copy_interleaved_ref(decoded);
            let actual = num_frames * signal.channels.count();
            samples.extend(&sample_buf.samples()[..actual]);
        }

        let spec = spec.ok_or(TranscodeError::EmptyStream)?;
        if samples.is_empty() {
            return Err(TranscodeError::EmptyStream);
        }

        Ok(AudioBuffer::from_f32(spec, &samples))
    }
}

impl AudioTranscoderPort for SymphoniaTranscoder {
    fn to_wav(&self, data: &[u8], format: AudioFormat) -> Result<Vec<u8>, TranscodeError> {
        let audio = self.decode(data, format)?;
        tracing::debug!(
            from = format.extension(),
            sample_rate = audio.spec().sample_rate,
            channels = audio.spec().channels,
            duration_ms = audio.duration_ms(),
            "Reference audio transcoded to WAV"
        );
        Ok(audio.to_wav())
    }
}
