//! Extractor Adapter - 文档文本提取

mod plain_text;

pub use plain_text::PlainTextExtractor;
