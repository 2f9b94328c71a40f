//! Transcoder Adapter - 参考音频转码

mod symphonia_transcoder;

pub use symphonia_transcoder::SymphoniaTranscoder;
