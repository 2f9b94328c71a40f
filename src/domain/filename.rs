//! 文件名净化
//!
//! 用户提供的标题、音色名会被直接用作目录名和输出文件名，
//! 这里把它们变换为不含路径分隔符、仅由 ASCII 安全字符组成的名字。

use once_cell::sync::Lazy;
use regex::Regex;

static UNSAFE_CHARS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^A-Za-z0-9_.\-]").unwrap());

/// 净化文件名
///
/// - 路径分隔符视为空白
/// - 连续空白折叠为 `_`
/// - 只保留 ASCII 字母、数字和 `._-`
/// - 去掉首尾的 `.` 与 `_`
///
/// 结果可能为空字符串，调用方需要自行兜底
pub fn secure_filename(name: &str) -> String {
    let spaced: String = name
        .chars()
        .map(|c| if c == '/' || c == '\\' { ' ' } else { c })
        .collect();
    let joined = spaced.split_whitespace().collect::<Vec<_>>().join("_");
    let stripped = UNSAFE_CHARS.replace_all(&joined, "");
    stripped.trim_matches(|c| c == '.' || c == '_').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_directory_traversal_is_stripped() {
        assert_eq!(secure_filename("../../malicious.pdf"), "malicious.pdf");
        assert_eq!(secure_filename("../../../etc/passwd"), "etc_passwd");
        assert_eq!(secure_filename("..\\..\\windows\\system32"), "windows_system32");
    }

    #[test]
    fn test_whitespace_becomes_underscore() {
        assert_eq!(secure_filename("file with spaces.pdf"), "file_with_spaces.pdf");
        assert_eq!(secure_filename("  tabs\tand\n lines "), "tabs_and_lines");
    }

    #[test]
    fn test_non_ascii_is_dropped() {
        assert_eq!(secure_filename("café narrator"), "caf_narrator");
        assert_eq!(secure_filename("旁白"), "");
        assert_eq!(secure_filename("...__hidden__..."), "hidden");
    }

    #[test]
    fn test_safe_name_unchanged() {
        assert_eq!(secure_filename("Narrator-01.wav"), "Narrator-01.wav");
    }
}
