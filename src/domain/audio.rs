//! 音频缓冲区
//!
//! 16 位 PCM 交错采样 + 格式描述，负责 WAV 的解析与编码、静音生成和拼接。
//! 合成管线把每个片段的 WAV 解码到这里，折叠进最终音轨后再编码回 WAV。

use thiserror::Error;

/// 音频错误
#[derive(Debug, Error)]
pub enum AudioError {
    #[error("Invalid WAV: {0}")]
    InvalidWav(String),

    #[error("Unsupported WAV encoding: {0}")]
    Unsupported(String),

    #[error("Audio format mismatch: expected {expected}, got {actual}")]
    SpecMismatch { expected: AudioSpec, actual: AudioSpec },
}

/// 音频格式描述
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AudioSpec {
    pub sample_rate: u32,
    pub channels: u16,
}

impl std::fmt::Display for AudioSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}Hz/{}ch", self.sample_rate, self.channels)
    }
}

const WAVE_FORMAT_PCM: u16 = 1;
const WAVE_FORMAT_EXTENSIBLE: u16 = 0xFFFE;
const BITS_PER_SAMPLE: u16 = 16;

#[derive(Debug)]
struct FmtChunk {
    audio_format: u16,
    num_channels: u16,
    sample_rate: u32,
    bits_per_sample: u16,
}

/// 内存中的 PCM 音频
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioBuffer {
    spec: AudioSpec,
    samples: Vec<i16>,
}

impl AudioBuffer {
    pub fn new(spec: AudioSpec, samples: Vec<i16>) -> Self {
        Self { spec, samples }
    }

    /// 指定时长的静音
    pub fn silence(spec: AudioSpec, duration_ms: u64) -> Self {
        let frames = Self::frames_for(spec, duration_ms);
        Self {
            spec,
            samples: vec![0; frames * spec.channels as usize],
        }
    }

    fn frames_for(spec: AudioSpec, duration_ms: u64) -> usize {
        (duration_ms * spec.sample_rate as u64 / 1000) as usize
    }

    pub fn spec(&self) -> AudioSpec {
        self.spec
    }

    pub fn samples(&self) -> &[i16] {
        &self.samples
    }

    /// 每声道采样帧数
    pub fn frames(&self) -> u64 {
        if self.spec.channels == 0 {
            return 0;
        }
        (self.samples.len() / self.spec.channels as usize) as u64
    }

    pub fn duration_ms(&self) -> u64 {
        if self.spec.sample_rate == 0 {
            return 0;
        }
        self.frames() * 1000 / self.spec.sample_rate as u64
    }

    /// 追加另一段音频，格式必须一致
    pub fn append(&mut self, other: &AudioBuffer) -> Result<(), AudioError> {
        if other.spec != self.spec {
            return Err(AudioError::SpecMismatch {
                expected: self.spec,
                actual: other.spec,
            });
        }
        self.samples.extend_from_slice(&other.samples);
        Ok(())
    }

    /// 追加静音
    pub fn append_silence(&mut self, duration_ms: u64) {
        let frames = Self::frames_for(self.spec, duration_ms);
        let len = self.samples.len() + frames * self.spec.channels as usize;
        self.samples.resize(len, 0);
    }

    /// 解析 16 位 PCM WAV
    pub fn from_wav(data: &[u8]) -> Result<Self, AudioError> {
        if data.len() < 12 {
            return Err(AudioError::InvalidWav("data too short".to_string()));
        }
        if &data[0..4] != b"RIFF" {
            return Err(AudioError::InvalidWav("missing RIFF header".to_string()));
        }
        if &data[8..12] != b"WAVE" {
            return Err(AudioError::InvalidWav("missing WAVE identifier".to_string()));
        }

        let mut pos = 12;
        let mut fmt: Option<FmtChunk> = None;
        let mut pcm: Option<&[u8]> = None;

        while pos + 8 <= data.len() {
            let chunk_id = &data[pos..pos + 4];
            let chunk_size =
                u32::from_le_bytes([data[pos + 4], data[pos + 5], data[pos + 6], data[pos + 7]])
                    as usize;
            let body_start = pos + 8;
            // 流式写出的 WAV 可能把 data 大小写成占位值，按实际长度截断
            let body_end = body_start.saturating_add(chunk_size).min(data.len());
            let body = &data[body_start..body_end];

            match chunk_id {
                b"fmt " => {
                    if body.len() < 16 {
                        return Err(AudioError::InvalidWav("fmt chunk too short".to_string()));
                    }
                    fmt = Some(FmtChunk {
                        audio_format: u16::from_le_bytes([body[0], body[1]]),
                        num_channels: u16::from_le_bytes([body[2], body[3]]),
                        sample_rate: u32::from_le_bytes([body[4], body[5], body[6], body[7]]),
                        bits_per_sample: u16::from_le_bytes([body[14], body[15]]),
                    });
                }
                b"data" => {
                    pcm = Some(body);
                    break;
                }
                _ => {}
            }

            pos = body_start.saturating_add(chunk_size);
            // 对齐到偶数字节
            if chunk_size % 2 != 0 {
                pos += 1;
            }
        }

        let fmt = fmt.ok_or_else(|| AudioError::InvalidWav("missing fmt chunk".to_string()))?;
        let pcm = pcm.ok_or_else(|| AudioError::InvalidWav("missing data chunk".to_string()))?;

        if fmt.audio_format != WAVE_FORMAT_PCM && fmt.audio_format != WAVE_FORMAT_EXTENSIBLE {
            return Err(AudioError::Unsupported(format!(
                "format tag {:#06x}",
                fmt.audio_format
            )));
        }
        if fmt.bits_per_sample != BITS_PER_SAMPLE {
            return Err(AudioError::Unsupported(format!(
                "{} bits per sample",
                fmt.bits_per_sample
            )));
        }
        if fmt.num_channels == 0 || fmt.sample_rate == 0 {
            return Err(AudioError::InvalidWav(
                "zero channels or sample rate".to_string(),
            ));
        }

        let samples = pcm
            .chunks_exact(2)
            .map(|b| i16::from_le_bytes([b[0], b[1]]))
            .collect();

        Ok(Self {
            spec: AudioSpec {
                sample_rate: fmt.sample_rate,
                channels: fmt.num_channels,
            },
            samples,
        })
    }

    /// 编码为 16 位 PCM WAV
    pub fn to_wav(&self) -> Vec<u8> {
        let num_channels = self.spec.channels;
        let sample_rate = self.spec.sample_rate;
        let bytes_per_sample = BITS_PER_SAMPLE / 8;
        let byte_rate = sample_rate * num_channels as u32 * bytes_per_sample as u32;
        let block_align = num_channels * bytes_per_sample;

        let data_size = self.samples.len() * 2;
        let file_size = 36 + data_size;

        let mut wav = Vec::with_capacity(44 + data_size);

        // RIFF header
        wav.extend_from_slice(b"RIFF");
        wav.extend_from_slice(&(file_size as u32).to_le_bytes());
        wav.extend_from_slice(b"WAVE");

        // fmt chunk
        wav.extend_from_slice(b"fmt ");
        wav.extend_from_slice(&16u32.to_le_bytes());
        wav.extend_from_slice(&WAVE_FORMAT_PCM.to_le_bytes());
        wav.extend_from_slice(&num_channels.to_le_bytes());
        wav.extend_from_slice(&sample_rate.to_le_bytes());
        wav.extend_from_slice(&byte_rate.to_le_bytes());
        wav.extend_from_slice(&block_align.to_le_bytes());
        wav.extend_from_slice(&BITS_PER_SAMPLE.to_le_bytes());

        // data chunk
        wav.extend_from_slice(b"data");
        wav.extend_from_slice(&(data_size as u32).to_le_bytes());
        for sample in &self.samples {
            wav.extend_from_slice(&sample.to_le_bytes());
        }

        wav
    }

    /// 由 [-1.0, 1.0] 浮点采样构造
    pub fn from_f32(spec: AudioSpec, samples: &[f32]) -> Self {
        let samples = samples
            .iter()
            .map(|&s| (s.clamp(-1.0, 1.0) * 32767.0) as i16)
            .collect();
        Self { spec, samples }
    }
}
