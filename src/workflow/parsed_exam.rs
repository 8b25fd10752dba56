//! 解析后的试卷 - 流程层
//!
//! 每份上传只解析一次：文档包 → 文档树 → 分类段落 → 题目列表 → 试卷区域。
//! 之后每个变体都在这份结果的深拷贝上重建。

use crate::error::ExamResult;
use crate::infrastructure::{DocxPackage, XmlTree};
use crate::models::{ClassifiedLine, Question};
use crate::services::rebuilder::{self, ExamRegion};
use crate::services::{line_classifier, question_assembler, text_extractor};
use tracing::debug;

/// 解析结果
#[derive(Debug, Clone)]
pub struct ParsedExam {
    pub package: DocxPackage,
    pub tree: XmlTree,
    pub lines: Vec<ClassifiedLine>,
    pub questions: Vec<Question>,
    /// 文档里没有任何分组标签或题目时为 None
    pub region: Option<ExamRegion>,
}

impl ParsedExam {
    pub fn from_bytes(bytes: Vec<u8>) -> ExamResult<Self> {
        let package = DocxPackage::open(bytes)?;
        let tree = XmlTree::parse(package.document_xml())?;

        let body = text_extractor::body(&tree)?;
        let paragraphs = text_extractor::body_paragraphs(&tree, body);
        let lines = line_classifier::classify_paragraphs(&tree, &paragraphs);
        debug!("段落 {} 个，非空 {} 个", paragraphs.len(), lines.len());

        let questions = question_assembler::assemble(&tree, &lines)?;
        let region = rebuilder::locate_region(&tree, &lines)?;

        Ok(Self {
            package,
            tree,
            lines,
            questions,
            region,
        })
    }

    pub fn question_count(&self) -> usize {
        self.questions.len()
    }
}
