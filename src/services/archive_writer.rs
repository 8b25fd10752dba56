//! 打包服务 - 业务能力层
//!
//! 把多份变体文档和答案表打成一个 zip，交给调用方保存

use crate::error::{ExamError, ExamResult};
use std::io::{Cursor, Write};
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

/// 变体文档的条目名
pub fn exam_entry_name(code: u32) -> String {
    format!("Exam_{}.docx", code)
}

/// 打包器
pub struct ExamArchive {
    writer: ZipWriter<Cursor<Vec<u8>>>,
    entries: usize,
}

impl ExamArchive {
    pub fn new() -> Self {
        Self {
            writer: ZipWriter::new(Cursor::new(Vec::new())),
            entries: 0,
        }
    }

    /// 添加一个条目
    pub fn add(&mut self, name: &str, bytes: &[u8]) -> ExamResult<()> {
        let options = FileOptions::default().compression_method(CompressionMethod::Deflated);
        self.writer
            .start_file(name, options)
            .map_err(|e| ExamError::package_write(name, e))?;
        self.writer
            .write_all(bytes)
            .map_err(|e| ExamError::package_write(name, e))?;
        self.entries += 1;
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries == 0
    }

    /// 结束写入，返回 zip 字节
    pub fn finish(mut self) -> ExamResult<Vec<u8>> {
        let cursor = self
            .writer
            .finish()
            .map_err(|e| ExamError::package_write("archive", e))?;
        Ok(cursor.into_inner())
    }
}

impl Default for ExamArchive {
    fn default() -> Self {
        Self::new()
    }
}
