//! Convert Commands - 文本/文档转音频

use std::path::PathBuf;

use crate::domain::voice::VoiceParams;

/// 文本转音频命令
#[derive(Debug, Clone)]
pub struct ConvertText {
    /// 标题，用于推导输出文件名
    pub title: String,
    pub text: String,
    /// 音色名，`"Model default"` 表示模型内置音色
    pub voice: String,
    /// 为空时使用配置中的默认参数
    pub params: Option<VoiceParams>,
    /// 是否在分块前清洗文本
    pub clean: bool,
}

/// 文档转音频命令
#[derive(Debug, Clone)]
pub struct ConvertDocument {
    pub path: PathBuf,
    /// 为空时使用文档文件名
    pub title: Option<String>,
    pub voice: String,
    pub params: Option<VoiceParams>,
    pub clean: bool,
}
