//! 变体处理上下文
//!
//! 封装"我正在生成哪份试卷的第几个变体"这一信息

use std::fmt::Display;

/// 变体处理上下文
#[derive(Debug, Clone)]
pub struct VariantCtx {
    /// 试卷名（上传文件名去掉扩展名）
    pub exam_name: String,

    /// 试卷索引（仅用于日志显示）
    pub exam_index: usize,

    /// 变体在本次生成中的序号（从1开始）
    pub variant_index: usize,

    /// 试卷代码
    pub code: u32,
}

impl VariantCtx {
    pub fn new(exam_name: String, exam_index: usize, variant_index: usize, code: u32) -> Self {
        Self {
            exam_name,
            exam_index,
            variant_index,
            code,
        }
    }
}

impl Display for VariantCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[试卷 {} {} 变体#{} 代码#{}]",
            self.exam_index, self.exam_name, self.variant_index, self.code
        )
    }
}
