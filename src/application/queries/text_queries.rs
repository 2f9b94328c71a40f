//! Text Queries - 分块预览

/// 文本分块查询
#[derive(Debug, Clone)]
pub struct ChunkText {
    pub text: String,
    /// 为空时使用配置中的最大片段长度
    pub max_length: Option<usize>,
}
