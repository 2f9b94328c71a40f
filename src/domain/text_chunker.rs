//! 文本分块器
//!
//! 将任意长度的文本切分为适合 TTS 模型上下文窗口的有界片段：
//! 1. 按句子边界切分（识别缩写，不会在 "Mr." / "U.S.A." / "Fig." 之后断句）
//! 2. 贪心地把相邻句子合并进同一片段，直到超过最大长度
//! 3. 单句超长时按空白拆分为词组，绝不拆开单词
//!
//! 长度一律按字符数（`chars().count()`）计算。

use serde::Serialize;
use thiserror::Error;

/// 默认最大片段字符数
pub const DEFAULT_MAX_SEGMENT_CHARS: usize = 300;

/// 分块错误
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChunkError {
    #[error("max_length must be greater than 0")]
    InvalidMaxLength,
}

/// 文本片段（序号从 1 开始）
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TextSegment {
    pub index: usize,
    pub text: String,
}

impl TextSegment {
    pub fn char_count(&self) -> usize {
        self.text.chars().count()
    }
}

/// 始终出现在名称之前的缩写，其后的句点永远不是句末
const LEADING_ABBREVIATIONS: &[&str] = &[
    "mr", "mrs", "ms", "dr", "prof", "sr", "st", "mt", "rev", "hon", "gen", "col", "lt", "sgt",
    "capt", "vs", "cf", "approx", "dept", "e.g", "i.e", "viz", "ca",
];

/// 编号前缀缩写：只有后接数字或 `#` 时才不断句（"No. 5" 与回答 "No." 区分开）
const NUMBER_ABBREVIATIONS: &[&str] = &[
    "no", "nos", "vol", "vols", "pp", "p", "ch", "sec", "eq", "eqs", "fig", "figs", "ref", "refs",
];

/// 也可能出现在句末的缩写：后接大写开头的单词时才断句
const TRAILING_ABBREVIATIONS: &[&str] = &[
    "etc", "al", "inc", "ltd", "co", "corp", "jr", "bros", "jan", "feb", "mar", "apr", "jun",
    "jul", "aug", "sep", "sept", "oct", "nov", "dec",
];

/// 常见的句首词，用于区分 "vitamin C. It ..." 与 "by J. Smith"
const SENTENCE_STARTERS: &[&str] = &[
    "a", "an", "and", "but", "he", "her", "his", "i", "if", "in", "it", "its", "my", "on",
    "our", "she", "so", "that", "the", "their", "then", "there", "these", "they", "this",
    "those", "we", "when", "you",
];

#[inline]
fn is_terminator(ch: char) -> bool {
    matches!(ch, '.' | '!' | '?' | '…' | '。' | '！' | '？')
}

/// 中文句末标点后面不需要空白也能断句
#[inline]
fn is_cjk_terminator(ch: char) -> bool {
    matches!(ch, '。' | '！' | '？')
}

/// 句末标点之后可以跟随的闭合引号/括号
#[inline]
fn is_closing(ch: char) -> bool {
    matches!(
        ch,
        '"' | '\'' | ')' | ']' | '}' | '\u{201D}' | '\u{2019}' | '」' | '』' | '）'
    )
}

/// 形如 "U.S.A" / "U.K" 的点分首字母缩写（不含末尾句点）
fn is_initialism(token: &str) -> bool {
    token.contains('.')
        && token.chars().all(|c| c == '.' || c.is_alphabetic())
        && token.split('.').all(|part| part.chars().count() <= 2)
}

/// 去掉词首的引号、括号等非字母数字字符
fn strip_leading_punct(word: &str) -> &str {
    word.trim_start_matches(|c: char| !c.is_alphanumeric())
}

/// 单个字母后的句点是否为人名首字母
///
/// 前一个词是小写普通词、且下一个词是常见句首词时，视为句末（"vitamin C. It helps."）；
/// 其余情况按首字母处理（"J. R. Tolkien"、"by J. Smith"）。"Plan B. The end." 这类
/// 前一个词大写的情况仍按首字母处理，不会断句。
fn is_initial(prev: Option<&str>, next_word: Option<&str>) -> bool {
    let after_common_word = prev
        .map(strip_leading_punct)
        .and_then(|w| w.chars().next())
        .is_some_and(char::is_lowercase);
    let starts_sentence = next_word
        .map(|w| strip_leading_punct(w).trim_end_matches(|c: char| !c.is_alphanumeric()))
        .is_some_and(|w| SENTENCE_STARTERS.contains(&w.to_lowercase().as_str()));
    !(after_common_word && starts_sentence)
}

/// 判断 `token.` 后的句点是否属于缩写（即不构成句末）
///
/// `prev` 为 token 之前的词，`next_word` 为句点之后的第一个词
fn is_abbreviation_stop(token: &str, prev: Option<&str>, next_word: Option<&str>) -> bool {
    let token = strip_leading_punct(token);
    if token.is_empty() {
        return false;
    }
    let next = next_word.and_then(|w| w.chars().next());

    let lower = token.to_lowercase();
    if LEADING_ABBREVIATIONS.contains(&lower.as_str()) {
        return true;
    }

    if NUMBER_ABBREVIATIONS.contains(&lower.as_str())
        && next.is_some_and(|c| c.is_ascii_digit() || c == '#')
    {
        return true;
    }

    let mut chars = token.chars();
    if let (Some(first), None) = (chars.next(), chars.next()) {
        if first.is_alphabetic() {
            return is_initial(prev, next_word);
        }
    }

    if TRAILING_ABBREVIATIONS.contains(&lower.as_str()) || is_initialism(token) {
        return !next.is_some_and(char::is_uppercase);
    }

    false
}

/// 把一段文本中的空白折叠为单个空格
fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// 按句子边界切分文本
///
/// 返回的句子已折叠内部空白，空句被丢弃
pub fn split_sentences(text: &str) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    let mut sentences = Vec::new();
    let mut start = 0;
    let mut i = 0;

    let push = |from: usize, to: usize, sentences: &mut Vec<String>| {
        let sentence = normalize_whitespace(&chars[from..to].iter().collect::<String>());
        if !sentence.is_empty() {
            sentences.push(sentence);
        }
    };

    while i < chars.len() {
        if !is_terminator(chars[i]) {
            i += 1;
            continue;
        }

        // 吞掉连续的句末标点和闭合引号，如 `?!"`
        let mut end = i + 1;
        let mut has_cjk = is_cjk_terminator(chars[i]);
        while end < chars.len() && (is_terminator(chars[end]) || is_closing(chars[end])) {
            has_cjk |= is_cjk_terminator(chars[end]);
            end += 1;
        }

        let at_boundary = end == chars.len() || chars[end].is_whitespace() || has_cjk;
        if !at_boundary {
            i = end;
            continue;
        }

        // 单个句点需要做缩写判断
        if chars[i] == '.' && end == i + 1 {
            let token_start = chars[start..i]
                .iter()
                .rposition(|c| c.is_whitespace())
                .map_or(start, |p| start + p + 1);
            let token: String = chars[token_start..i].iter().collect();
            let before: String = chars[start..token_start].iter().collect();
            let after: String = chars[end..]
                .iter()
                .skip_while(|c| c.is_whitespace())
                .take_while(|c| !c.is_whitespace())
                .collect();
            let prev = before.split_whitespace().last();
            let next_word = (!after.is_empty()).then_some(after.as_str());

            if is_abbreviation_stop(&token, prev, next_word) {
                i = end;
                continue;
            }
        }

        push(start, end, &mut sentences);
        start = end;
        i = end;
    }

    push(start, chars.len(), &mut sentences);
    sentences
}

/// 贪心打包：在不超过 `max_length` 的前提下用单个空格连接各部分
///
/// 单个部分本身超长时独占一个片段
fn pack_greedy<I>(parts: I, max_length: usize, out: &mut Vec<String>)
where
    I: IntoIterator<Item = String>,
{
    let mut current = String::new();
    let mut current_len = 0;

    for part in parts {
        let len = part.chars().count();
        if current.is_empty() {
            current = part;
            current_len = len;
        } else if current_len + 1 + len <= max_length {
            current.push(' ');
            current.push_str(&part);
            current_len += 1 + len;
        } else {
            out.push(std::mem::replace(&mut current, part));
            current_len = len;
        }
    }

    if !current.is_empty() {
        out.push(current);
    }
}

/// 将文本切分为有界片段
///
/// - 每个片段不超过 `max_length` 个字符，唯一例外是单个超长单词
/// - 空文本返回空列表
/// - `max_length == 0` 返回 [`ChunkError::InvalidMaxLength`]
pub fn chunk_text(text: &str, max_length: usize) -> Result<Vec<TextSegment>, ChunkError> {
    if max_length == 0 {
        return Err(ChunkError::InvalidMaxLength);
    }

    let mut chunks: Vec<String> = Vec::new();
    let mut pending: Vec<String> = Vec::new();

    for sentence in split_sentences(text) {
        if sentence.chars().count() <= max_length {
            pending.push(sentence);
            continue;
        }

        // 超长句：先结算已累积的句子，再按单词拆分
        pack_greedy(pending.drain(..), max_length, &mut chunks);
        let words = sentence.split_whitespace().map(str::to_string);
        pack_greedy(words, max_length, &mut chunks);
    }
    pack_greedy(pending, max_length, &mut chunks);

    Ok(chunks
        .into_iter()
        .enumerate()
        .map(|(i, text)| TextSegment { index: i + 1, text })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(segments: &[TextSegment]) -> Vec<&str> {
        segments.iter().map(|s| s.text.as_str()).collect()
    }

    #[test]
    fn test_basic_splitting() {
        let segments = chunk_text("Hello world. This is a test.", 15).unwrap();
        assert_eq!(texts(&segments), vec!["Hello world.", "This is a test."]);

        let segments = chunk_text("Hello world. This is a test.", 50).unwrap();
        assert_eq!(texts(&segments), vec!["Hello world. This is a test."]);
    }

    #[test]
    fn test_titles_and_initialisms_do_not_split() {
        let text = "Mr. Smith went to the U.S.A. today.";
        let segments = chunk_text(text, 100).unwrap();
        assert_eq!(texts(&segments), vec![text]);
        assert_eq!(split_sentences(text).len(), 1);
    }

    #[test]
    fn test_figure_reference_does_not_split() {
        let text = "Fig. 1 shows the data. This is important.";
        let segments = chunk_text(text, 100).unwrap();
        assert_eq!(texts(&segments), vec![text]);
        assert_eq!(
            split_sentences(text),
            vec!["Fig. 1 shows the data.", "This is important."]
        );
    }

    #[test]
    fn test_multiple_sentences_with_abbreviations() {
        let segments = chunk_text("Dr. Jones is here. He likes the U.K. very much.", 30).unwrap();
        assert_eq!(
            texts(&segments),
            vec!["Dr. Jones is here.", "He likes the U.K. very much."]
        );
        assert_eq!(segments[0].index, 1);
        assert_eq!(segments[1].index, 2);
    }

    #[test]
    fn test_trailing_abbreviation_before_capital_ends_sentence() {
        let sentences = split_sentences("We bought apples, pears, etc. The shop closed at noon.");
        assert_eq!(sentences.len(), 2);

        let sentences = split_sentences("I moved to the U.S. Then everything changed.");
        assert_eq!(
            sentences,
            vec!["I moved to the U.S.", "Then everything changed."]
        );
    }

    #[test]
    fn test_initial_and_decimal_do_not_split() {
        let sentences = split_sentences("J. R. Tolkien wrote 3.5 books. Maybe more.");
        assert_eq!(
            sentences,
            vec!["J. R. Tolkien wrote 3.5 books.", "Maybe more."]
        );
    }

    #[test]
    fn test_no_as_answer_ends_sentence() {
        assert_eq!(
            split_sentences("Is it ready? No. She left."),
            vec!["Is it ready?", "No.", "She left."]
        );
        assert_eq!(split_sentences("See No. 5 below."), vec!["See No. 5 below."]);
        assert_eq!(
            split_sentences("Read vol. 2 and pp. 10-12. Then rest."),
            vec!["Read vol. 2 and pp. 10-12.", "Then rest."]
        );
        assert_eq!(split_sentences("Ask for item No. #12 today."), vec!["Ask for item No. #12 today."]);
    }

    #[test]
    fn test_lone_capital_after_common_word_can_end_sentence() {
        assert_eq!(
            split_sentences("Take vitamin C. It helps."),
            vec!["Take vitamin C.", "It helps."]
        );
        assert_eq!(
            split_sentences("The book was written by J. Smith in 1990."),
            vec!["The book was written by J. Smith in 1990."]
        );
        assert_eq!(
            split_sentences("John F. Kennedy spoke."),
            vec!["John F. Kennedy spoke."]
        );
    }

    #[test]
    fn test_question_exclamation_and_quotes() {
        let sentences = split_sentences("Is it done?! \"Yes.\" She left.");
        assert_eq!(sentences, vec!["Is it done?!", "\"Yes.\"", "She left."]);
    }

    #[test]
    fn test_cjk_terminators_split_without_space() {
        let sentences = split_sentences("第一句。第二句！第三句？");
        assert_eq!(sentences, vec!["第一句。", "第二句！", "第三句？"]);
    }

    #[test]
    fn test_no_punctuation_is_single_sentence() {
        let segments = chunk_text("just some words without an ending", 100).unwrap();
        assert_eq!(segments.len(), 1);
    }

    #[test]
    fn test_long_sentence_is_split_on_words() {
        let text = "one two three four five six seven eight nine ten";
        let segments = chunk_text(text, 14).unwrap();
        assert_eq!(
            texts(&segments),
            vec!["one two three", "four five six", "seven eight", "nine ten"]
        );
        assert!(segments.iter().all(|s| s.char_count() <= 14));
    }

    #[test]
    fn test_oversized_word_gets_own_segment() {
        let segments = chunk_text("a supercalifragilistic b", 5).unwrap();
        assert_eq!(texts(&segments), vec!["a", "supercalifragilistic", "b"]);
    }

    #[test]
    fn test_max_length_smaller_than_every_word_terminates() {
        let segments = chunk_text("alpha beta. gamma.", 1).unwrap();
        assert_eq!(texts(&segments), vec!["alpha", "beta.", "gamma."]);
    }

    #[test]
    fn test_zero_max_length_rejected() {
        assert_eq!(chunk_text("text", 0), Err(ChunkError::InvalidMaxLength));
    }

    #[test]
    fn test_empty_and_whitespace_text() {
        assert!(chunk_text("", 10).unwrap().is_empty());
        assert!(chunk_text("   \n\t ", 10).unwrap().is_empty());
        assert!(split_sentences(" . ").iter().all(|s| !s.trim().is_empty()));
    }

    #[test]
    fn test_bound_holds_and_content_preserved() {
        let text = "The quick brown fox jumps over the lazy dog. Dr. Who arrived at 5 p.m. \
                    yesterday! Was it late? Nobody knows, etc. Prof. Plum left the U.K. quietly. \
                    A remarkably extraordinarilylongwordthatcannotfit appears here.";
        for max in [1, 8, 20, 45, 80, 500] {
            let segments = chunk_text(text, max).unwrap();
            for segment in &segments {
                let single_word = !segment.text.contains(' ');
                assert!(segment.char_count() <= max || single_word, "{:?}", segment);
                assert!(!segment.text.is_empty());
            }

            let joined: Vec<&str> = segments
                .iter()
                .flat_map(|s| s.text.split_whitespace())
                .collect();
            let original: Vec<&str> = text.split_whitespace().collect();
            assert_eq!(joined, original);
        }
    }

    #[test]
    fn test_deterministic() {
        let text = "Sentence one. Sentence two. Sentence three.";
        assert_eq!(chunk_text(text, 20).unwrap(), chunk_text(text, 20).unwrap());
    }
}
