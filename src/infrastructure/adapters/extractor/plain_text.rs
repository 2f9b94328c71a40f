//! Plain Text Extractor - 纯文本与 Markdown 提取
//!
//! PDF / DOCX 等二进制格式不在这里解析，返回 UnsupportedType

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::Path;

use crate::application::ports::{DocumentExtractorPort, ExtractError};

/// `<script>` / `<style>` 连同内容一起去掉
static SCRIPT_BLOCKS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<(script|style)\b[^>]*>.*?</(script|style)\s*>").unwrap());

/// 允许属性值里出现 `>`
static HTML_TAGS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"<(?:[^>"']|"[^"]*"|'[^']*')*>"#).unwrap());

static CODE_FENCES: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^[ \t]*(```|~~~).*$").unwrap());

static HEADINGS: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^[ \t]{0,3}#{1,6}[ \t]+").unwrap());

static LIST_MARKERS: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^[ \t]*[-*+>][ \t]+").unwrap());

static IMAGES: Lazy<Regex> = Lazy::new(|| Regex::new(r"!\[([^\]]*)\]\([^)]*\)").unwrap());

static LINKS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[([^\]]*)\]\([^)]*\)").unwrap());

static EMPHASIS: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\*\*|__|\*|`)").unwrap());

/// 纯文本提取器
#[derive(Debug, Default, Clone)]
pub struct PlainTextExtractor;

impl PlainTextExtractor {
    pub fn new() -> Self {
        Self
    }
}

fn extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
}

/// UTF-8 优先，失败时按 Latin-1 逐字节解码
fn decode_text(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(s) => s.trim_start_matches('\u{feff}').to_string(),
        Err(_) => bytes.iter().map(|&b| b as char).collect(),
    }
}

/// 去掉 HTML 标签并还原常见实体
fn strip_html(text: &str) -> String {
    let text = SCRIPT_BLOCKS.replace_all(text, "");
    let text = HTML_TAGS.replace_all(&text, "");
    text.replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}

/// 去掉 Markdown 语法，保留可朗读的文字
fn strip_markdown(text: &str) -> String {
    let text = strip_html(text);
    let text = CODE_FENCES.replace_all(&text, "");
    let text = HEADINGS.replace_all(&text, "");
    let text = LIST_MARKERS.replace_all(&text, "");
    let text = IMAGES.replace_all(&text, "$1");
    let text = LINKS.replace_all(&text, "$1");
    EMPHASIS.replace_all(&text, "").into_owned()
}

#[async_trait]
impl DocumentExtractorPort for PlainTextExtractor {
    fn supports(&self, path: &Path) -> bool {
        matches!(
            extension(path).as_deref(),
            Some("txt" | "md" | "markdown")
        )
    }

    async fn extract(&self, path: &Path) -> Result<String, ExtractError> {
        let ext = extension(path).unwrap_or_default();
        if !self.supports(path) {
            return Err(ExtractError::UnsupportedType(ext));
        }

        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| ExtractError::IoError(e.to_string()))?;
        let text = decode_text(&bytes);

        let text = match ext.as_str() {
            "md" | "markdown" => strip_markdown(&text),
            _ => text,
        };

        tracing::debug!(
            path = %path.display(),
            chars = text.chars().count(),
            "Document text extracted"
        );

        Ok(text)
    }
}
