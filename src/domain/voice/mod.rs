//! Voice Context - 音色限界上下文
//!
//! 职责:
//! - 音色档案（名称、参考音频、私有目录）
//! - 合成参数
//! - 保留的 "Model default" 伪音色

mod aggregate;
mod errors;
mod value_objects;

pub use aggregate::VoiceProfile;
pub use errors::VoiceError;
pub use value_objects::{AudioFormat, VoiceName, VoiceParams, MODEL_DEFAULT_VOICE};
