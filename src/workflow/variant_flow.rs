//! 变体生成流程 - 流程层
//!
//! 核心职责：定义"一个变体"的完整生成流程
//!
//! 流程顺序：
//! 1. 打乱题目与答案
//! 2. 在文档树深拷贝上重建试卷区域
//! 3. 序列化并写回文档包

use crate::error::ExamResult;
use crate::services::{archive_writer, rebuilder, shuffler};
use crate::workflow::{ParsedExam, VariantCtx};
use rand::Rng;
use tracing::{debug, info, warn};

/// 单个变体的输出
#[derive(Debug, Clone)]
pub struct VariantOutput {
    pub code: u32,
    /// `Exam_{code}.docx`
    pub file_name: String,
    pub bytes: Vec<u8>,
    pub answer_key: Vec<Option<char>>,
}

/// 变体生成流程
///
/// - 只读访问解析结果，每次运行都在自己的深拷贝上修改
/// - 随机源由调用方注入
pub struct VariantFlow<'a> {
    exam: &'a ParsedExam,
}

impl<'a> VariantFlow<'a> {
    pub fn new(exam: &'a ParsedExam) -> Self {
        Self { exam }
    }

    pub fn run<R: Rng + ?Sized>(&self, ctx: &VariantCtx, rng: &mut R) -> ExamResult<VariantOutput> {
        let variant = shuffler::generate_variant(&self.exam.questions, rng);

        let xml = match &self.exam.region {
            Some(region) => rebuilder::rebuild(&self.exam.tree, region, &variant).serialize(),
            None => {
                warn!("{} ⚠️ 文档中没有试卷区域，原样输出", ctx);
                self.exam.tree.serialize()
            }
        };
        debug!("{} 重建完成，document.xml {} 字节", ctx, xml.len());

        let bytes = self.exam.package.with_document_xml(&xml)?;
        info!(
            "{} ✓ 变体生成完成: {} 道题",
            ctx,
            variant.questions.len()
        );

        Ok(VariantOutput {
            code: ctx.code,
            file_name: archive_writer::exam_entry_name(ctx.code),
            bytes,
            answer_key: variant.answer_key,
        })
    }
}
