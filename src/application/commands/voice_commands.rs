//! Voice Commands

/// 添加音色命令
#[derive(Debug, Clone)]
pub struct AddVoice {
    pub name: String,
    /// 上传的音频字节
    pub audio: Vec<u8>,
    /// 上传时的原始文件名，扩展名决定格式
    pub original_filename: String,
}

/// 删除音色命令
#[derive(Debug, Clone)]
pub struct RemoveVoice {
    pub name: String,
}
