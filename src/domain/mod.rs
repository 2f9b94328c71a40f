//! Domain Layer - 领域层
//!
//! - Voice Context: 音色档案与合成参数
//! - 文本分块器：句子感知的有界切分
//! - 音频缓冲区：PCM WAV 的解析、拼接与编码

pub mod audio;
pub mod filename;
pub mod text_chunker;
pub mod voice;

pub use audio::{AudioBuffer, AudioError, AudioSpec};
pub use filename::secure_filename;
pub use text_chunker::{chunk_text, split_sentences, ChunkError, TextSegment, DEFAULT_MAX_SEGMENT_CHARS};
