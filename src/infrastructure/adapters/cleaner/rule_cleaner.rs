//! Rule Cleaner - 基于正则规则的文本清洗
//!
//! - 三个及以上连续换行折叠为一个空行
//! - 连续空格/制表符折叠为一个空格
//! - 跨行/跨空格断开的连字符单词重新拼合："exam- ple" → "example"
//! - 去掉首尾空白
//!
//! 单独成行的数字（列表项、年份、疑似页码）一律保留

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::application::ports::{CleanerError, TextCleanerPort};

static BLANK_LINES: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n\s*\n\s*\n+").unwrap());

static INLINE_SPACES: Lazy<Regex> = Lazy::new(|| Regex::new(r"[ \t]+").unwrap());

static BROKEN_HYPHEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"([a-z])-[ \t]*\n?[ \t]*([a-z])").unwrap());

/// 规则清洗器
#[derive(Debug, Default, Clone)]
pub struct RuleTextCleaner;

impl RuleTextCleaner {
    pub fn new() -> Self {
        Self
    }

    /// 同步清洗
    pub fn clean_text(&self, text: &str) -> String {
        let text = text.replace("\r\n", "\n");
        let text = BLANK_LINES.replace_all(&text, "\n\n");
        let text = INLINE_SPACES.replace_all(&text, " ");
        let text = rejoin_hyphenated(&text);
        text.trim().to_string()
    }
}

/// 只拼合连字符后紧跟断行/空格的情况，"well-known" 保持不变
fn rejoin_hyphenated(text: &str) -> String {
    BROKEN_HYPHEN
        .replace_all(text, |caps: &regex::Captures<'_>| {
            let whole = &caps[0];
            // "a-b" 形式（中间没有空白）是正常的复合词
            if whole.len() == 3 {
                whole.to_string()
            } else {
                format!("{}{}", &caps[1], &caps[2])
            }
        })
        .into_owned()
}

#[async_trait]
impl TextCleanerPort for RuleTextCleaner {
    async fn clean(&self, text: &str) -> Result<String, CleanerError> {
        let cleaned = self.clean_text(text);
        tracing::debug!(
            before = text.len(),
            after = cleaned.len(),
            "Text cleaned"
        );
        Ok(cleaned)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collapses_blank_lines_and_spaces() {
        let cleaner = RuleTextCleaner::new();
        let text = "Title\n\n\n\nBody   text\twith  gaps.\n \n \nEnd";
        assert_eq!(
            cleaner.clean_text(text),
            "Title\n\nBody text with gaps.\n\nEnd"
        );
    }

    #[test]
    fn test_rejoins_hyphenated_words() {
        let cleaner = RuleTextCleaner::new();
        assert_eq!(cleaner.clean_text("an exam- ple here"), "an example here");
        assert_eq!(cleaner.clean_text("inter-\nnational"), "international");
        assert_eq!(cleaner.clean_text("a well-known fact"), "a well-known fact");
    }

    #[test]
    fn test_preserves_standalone_numbers() {
        let cleaner = RuleTextCleaner::new();
        assert_eq!(cleaner.clean_text("List:\n10\n20\n30"), "List:\n10\n20\n30");
        assert!(cleaner.clean_text("Page end.\n\n14\n\nNext page").contains("14"));
        assert!(cleaner.clean_text("Year:\n2023\nEnd").contains("2023"));
    }

    #[tokio::test]
    async fn test_port_trims() {
        let cleaner = RuleTextCleaner::new();
        assert_eq!(cleaner.clean("  hello  ").await.unwrap(), "hello");
    }
}
