use crate::models::exam_meta::ExamMeta;

/// 一份待处理的上传文档
#[derive(Debug, Clone)]
pub struct ExamUpload {
    /// 原始文件名（含扩展名）
    pub file_name: String,
    pub bytes: Vec<u8>,
    pub meta: ExamMeta,
    /// 来源路径（仅用于日志）
    pub file_path: Option<String>,
}

impl ExamUpload {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes,
            meta: ExamMeta::default(),
            file_path: None,
        }
    }

    pub fn with_meta(mut self, meta: ExamMeta) -> Self {
        self.meta = meta;
        self
    }

    pub fn with_file_path(mut self, file_path: String) -> Self {
        self.file_path = Some(file_path);
        self
    }

    /// 不含扩展名的文件名，用于生成输出文件名
    pub fn stem(&self) -> &str {
        self.file_name
            .rsplit_once('.')
            .map(|(stem, _)| stem)
            .unwrap_or(&self.file_name)
    }

    /// 只接受 .docx
    pub fn has_docx_extension(file_name: &str) -> bool {
        file_name.to_lowercase().ends_with(".docx")
    }
}
