//! 文档包 - 基础设施层
//!
//! 持有上传的 .docx 原始字节，只暴露"读出主文档"和"替换主文档"两种能力

use crate::error::{ExamError, ExamResult};
use std::io::{Cursor, Read, Write};
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

/// 主文档在容器中的条目名
pub const MAIN_DOCUMENT_PART: &str = "word/document.xml";

/// .docx 文档包
///
/// 职责：
/// - 校验容器格式，读出主文档标记
/// - 用新标记替换主文档，其余条目按原始压缩数据复制
/// - 不认识题目 / 答案
#[derive(Debug, Clone)]
pub struct DocxPackage {
    bytes: Vec<u8>,
    document_xml: String,
}

impl DocxPackage {
    /// 打开文档包
    pub fn open(bytes: Vec<u8>) -> ExamResult<Self> {
        let raw = {
            let mut archive = ZipArchive::new(Cursor::new(bytes.as_slice()))
                .map_err(ExamError::invalid_package)?;
            let mut entry = archive.by_name(MAIN_DOCUMENT_PART).map_err(|_| {
                ExamError::invalid_package(format!("找不到 {}", MAIN_DOCUMENT_PART))
            })?;
            let mut raw = Vec::new();
            entry
                .read_to_end(&mut raw)
                .map_err(ExamError::invalid_package)?;
            raw
        };

        let document_xml = String::from_utf8(raw)
            .map_err(|e| ExamError::malformed(format!("主文档不是合法的 UTF-8: {}", e)))?;

        Ok(Self {
            bytes,
            document_xml,
        })
    }

    /// 主文档标记文本
    pub fn document_xml(&self) -> &str {
        &self.document_xml
    }

    /// 生成替换了主文档的新文档包
    ///
    /// 其余条目通过 `raw_copy_file` 复制，压缩数据逐字节不变。
    pub fn with_document_xml(&self, xml: &str) -> ExamResult<Vec<u8>> {
        let mut archive = ZipArchive::new(Cursor::new(self.bytes.as_slice()))
            .map_err(ExamError::invalid_package)?;
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));

        for index in 0..archive.len() {
            let entry = archive
                .by_index_raw(index)
                .map_err(ExamError::invalid_package)?;

            if entry.name() == MAIN_DOCUMENT_PART {
                drop(entry);
                let options =
                    FileOptions::default().compression_method(CompressionMethod::Deflated);
                writer
                    .start_file(MAIN_DOCUMENT_PART, options)
                    .map_err(|e| ExamError::package_write(MAIN_DOCUMENT_PART, e))?;
                writer
                    .write_all(xml.as_bytes())
                    .map_err(|e| ExamError::package_write(MAIN_DOCUMENT_PART, e))?;
            } else {
                let name = entry.name().to_string();
                writer
                    .raw_copy_file(entry)
                    .map_err(|e| ExamError::package_write(name, e))?;
            }
        }

        let cursor = writer
            .finish()
            .map_err(|e| ExamError::package_write("docx", e))?;
        Ok(cursor.into_inner())
    }
}
