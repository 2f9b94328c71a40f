//! Voice Context - Value Objects

use serde::{Deserialize, Serialize};

/// 保留的伪音色名：不使用参考音频，由合成器使用内置音色
pub const MODEL_DEFAULT_VOICE: &str = "Model default";

/// 音色名称
///
/// 不变量:
/// - 去掉首尾空白后非空
/// - 不等于保留名 [`MODEL_DEFAULT_VOICE`]
/// - 大小写敏感
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct VoiceName(String);

impl VoiceName {
    pub fn new(name: impl Into<String>) -> Result<Self, &'static str> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err("voice name must not be empty");
        }
        if name.chars().count() > 100 {
            return Err("voice name must not exceed 100 characters");
        }
        if name == MODEL_DEFAULT_VOICE {
            return Err("voice name is reserved");
        }
        Ok(Self(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for VoiceName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 可接受的上传音频格式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AudioFormat {
    Wav,
    Mp3,
}

impl AudioFormat {
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "wav" => Some(Self::Wav),
            "mp3" => Some(Self::Mp3),
            _ => None,
        }
    }

    /// 按上传文件名的扩展名识别格式（大小写不敏感）
    pub fn from_filename(filename: &str) -> Option<Self> {
        std::path::Path::new(filename)
            .extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_extension)
    }

    pub fn extension(&self) -> &'static str {
        match self {
            Self::Wav => "wav",
            Self::Mp3 => "mp3",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Wav => "audio/wav",
            Self::Mp3 => "audio/mpeg",
        }
    }
}

/// 合成参数
///
/// 声音克隆模型的三个条件参数
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VoiceParams {
    /// 情感夸张度 (0.0 - 1.0)
    pub exaggeration: f32,
    /// CFG 权重，影响语速与稳定性 (0.1 - 1.0)
    pub cfg_weight: f32,
    /// 采样温度 (0.0 - 2.0)
    pub temperature: f32,
}

impl Default for VoiceParams {
    fn default() -> Self {
        Self {
            exaggeration: 0.5,
            cfg_weight: 0.5,
            temperature: 0.7,
        }
    }
}

impl VoiceParams {
    pub fn validate(&self) -> Result<(), &'static str> {
        if !(0.0..=1.0).contains(&self.exaggeration) {
            return Err("exaggeration must be between 0.0 and 1.0");
        }
        if !(0.1..=1.0).contains(&self.cfg_weight) {
            return Err("cfg_weight must be between 0.1 and 1.0");
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err("temperature must be between 0.0 and 2.0");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_voice_name_rules() {
        assert!(VoiceName::new("Narrator").is_ok());
        assert!(VoiceName::new("").is_err());
        assert!(VoiceName::new("   ").is_err());
        assert!(VoiceName::new(MODEL_DEFAULT_VOICE).is_err());
        assert!(VoiceName::new("x".repeat(101)).is_err());
        // 大小写敏感
        assert_ne!(
            VoiceName::new("alice").unwrap(),
            VoiceName::new("Alice").unwrap()
        );
    }

    #[test]
    fn test_audio_format_from_filename() {
        assert_eq!(AudioFormat::from_filename("ref.WAV"), Some(AudioFormat::Wav));
        assert_eq!(AudioFormat::from_filename("clip.mp3"), Some(AudioFormat::Mp3));
        assert_eq!(AudioFormat::from_filename("clip.flac"), None);
        assert_eq!(AudioFormat::from_filename("noext"), None);
    }

    #[test]
    fn test_params_validation() {
        assert!(VoiceParams::default().validate().is_ok());

        let params = VoiceParams {
            cfg_weight: 0.05,
            ..Default::default()
        };
        assert!(params.validate().is_err());

        let params = VoiceParams {
            temperature: 2.5,
            ..Default::default()
        };
        assert!(params.validate().is_err());

        let params = VoiceParams {
            exaggeration: -0.1,
            ..Default::default()
        };
        assert!(params.validate().is_err());
    }
}
