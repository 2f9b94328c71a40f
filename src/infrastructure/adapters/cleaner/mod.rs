//! Cleaner Adapter - 文本清洗

mod rule_cleaner;

pub use rule_cleaner::RuleTextCleaner;
