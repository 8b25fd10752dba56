//! 单份试卷处理器 - 编排层
//!
//! ## 职责
//!
//! 本模块负责处理单份上传文档的所有变体，是试卷级别的编排器。
//!
//! ## 核心功能
//!
//! 1. **解析一次**：文档包 → 题目列表 → 试卷区域
//! 2. **变体循环**：按试卷代码依次执行 `VariantFlow`
//! 3. **答案表**：收集每个变体的答案，生成 .xlsx / .json
//! 4. **打包输出**：单个变体直接输出 .docx，多个变体打成 zip
//! 5. **报告**：写出 `<stem>_report.json`

use crate::config::Config;
use crate::error::{AppError, ExamError, ExamResult};
use crate::models::{ExamMeta, ExamUpload, GenerationOptions};
use crate::services::{AnswerKeyTable, ExamArchive};
use crate::utils::logging::truncate_text;
use crate::workflow::{ParsedExam, VariantCtx, VariantFlow, VariantOutput};
use anyhow::{Context, Result};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// 答案表条目名
pub const ANSWER_KEY_XLSX: &str = "AnswerKey.xlsx";
pub const ANSWER_KEY_JSON: &str = "answer_key.json";

/// 一份试卷的全部生成结果
#[derive(Debug, Clone)]
pub struct ExamSet {
    pub question_count: usize,
    pub variants: Vec<VariantOutput>,
    pub answer_key: AnswerKeyTable,
}

impl ExamSet {
    /// 打包成要写出的文件列表 `(文件名, 字节)`
    ///
    /// 单个变体：`<stem>_Exam_{code}.docx`；
    /// 多个变体：`<stem>_variants.zip`，内含各变体文档和答案表。
    pub fn package(&self, stem: &str) -> ExamResult<Vec<(String, Vec<u8>)>> {
        if let [only] = self.variants.as_slice() {
            return Ok(vec![(
                format!("{}_Exam_{}.docx", stem, only.code),
                only.bytes.clone(),
            )]);
        }

        let mut archive = ExamArchive::new();
        for variant in &self.variants {
            archive.add(&variant.file_name, &variant.bytes)?;
        }
        archive.add(ANSWER_KEY_XLSX, &self.answer_key.to_xlsx()?)?;
        let json = serde_json::to_vec_pretty(&self.answer_key)
            .map_err(|e| ExamError::package_write(ANSWER_KEY_JSON, e))?;
        archive.add(ANSWER_KEY_JSON, &json)?;

        Ok(vec![(format!("{}_variants.zip", stem), archive.finish()?)])
    }
}

/// 处理报告
#[derive(Debug, Clone, Serialize)]
pub struct ExamReport {
    pub file_name: String,
    #[serde(flatten)]
    pub meta: ExamMeta,
    pub question_count: usize,
    pub starting_question_number: u32,
    pub codes: Vec<u32>,
    pub answer_key: AnswerKeyTable,
    pub outputs: Vec<String>,
    pub generated_at: String,
}

/// 生成一份试卷的全部变体（不做任何 I/O）
pub fn generate_exam_set<R: Rng + ?Sized>(
    exam_name: &str,
    exam_index: usize,
    bytes: Vec<u8>,
    options: &GenerationOptions,
    rng: &mut R,
) -> ExamResult<ExamSet> {
    let exam = ParsedExam::from_bytes(bytes)?;
    info!(
        "[试卷 {}] 解析完成: {} 道题",
        exam_index,
        exam.question_count()
    );
    if let Some(first) = exam.questions.first() {
        info!(
            "[试卷 {}] 第一题: {}",
            exam_index,
            truncate_text(&first.text, 40)
        );
    }

    let flow = VariantFlow::new(&exam);
    let variants = options
        .codes()
        .into_iter()
        .enumerate()
        .map(|(index, code)| {
            let ctx = VariantCtx::new(exam_name.to_string(), exam_index, index + 1, code);
            flow.run(&ctx, &mut *rng)
        })
        .collect::<ExamResult<Vec<_>>>()?;

    let keys: Vec<(u32, Vec<Option<char>>)> = variants
        .iter()
        .map(|variant| (variant.code, variant.answer_key.clone()))
        .collect();

    Ok(ExamSet {
        question_count: exam.question_count(),
        answer_key: AnswerKeyTable::build(&keys),
        variants,
    })
}

/// 处理单份上传并写出结果
///
/// # 参数
/// - `upload`: 上传文档及其元数据
/// - `exam_index`: 试卷索引（用于日志和种子）
/// - `config`: 配置
///
/// # 返回
/// 返回生成的报告
pub fn process_exam(upload: ExamUpload, exam_index: usize, config: &Config) -> Result<ExamReport> {
    log_exam_start(exam_index, &upload);

    if !ExamUpload::has_docx_extension(&upload.file_name) {
        anyhow::bail!("只接受 .docx 文件: {}", upload.file_name);
    }

    let options = GenerationOptions::resolve(config, &upload.meta)
        .with_context(|| format!("试卷参数无效: {}", upload.file_name))?;
    if options.starting_question_number != 1 {
        warn!(
            "[试卷 {}] ⚠️ 起始题号 {} 暂不生效，题号仍从 1 开始",
            exam_index, options.starting_question_number
        );
    }

    let mut rng = match config.rng_seed {
        Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(exam_index as u64)),
        None => StdRng::from_entropy(),
    };

    let stem = upload.stem().to_string();
    let set = generate_exam_set(&stem, exam_index, upload.bytes, &options, &mut rng)
        .with_context(|| format!("生成变体失败: {}", upload.file_name))?;

    let output_dir = Path::new(&config.output_folder);
    fs::create_dir_all(output_dir)
        .with_context(|| format!("无法创建输出目录: {}", config.output_folder))?;

    let mut outputs = Vec::new();
    for (name, bytes) in set.package(&stem)? {
        let path = output_dir.join(&name);
        fs::write(&path, bytes)
            .map_err(|e| AppError::file_write_failed(path.display().to_string(), e))?;
        info!("[试卷 {}] 💾 已写出: {}", exam_index, name);
        outputs.push(name);
    }

    let report = ExamReport {
        file_name: upload.file_name,
        meta: upload.meta,
        question_count: set.question_count,
        starting_question_number: options.starting_question_number,
        codes: options.codes(),
        answer_key: set.answer_key,
        outputs,
        generated_at: chrono::Local::now().to_rfc3339(),
    };
    write_report(output_dir, &stem, &report)?;

    log_exam_complete(exam_index, &report);
    Ok(report)
}

fn write_report(output_dir: &Path, stem: &str, report: &ExamReport) -> Result<PathBuf> {
    let path = output_dir.join(format!("{}_report.json", stem));
    let json = serde_json::to_string_pretty(report).context("序列化报告失败")?;
    fs::write(&path, json)
        .map_err(|e| AppError::file_write_failed(path.display().to_string(), e))?;
    Ok(path)
}

// ========== 日志辅助函数 ==========

fn log_exam_start(exam_index: usize, upload: &ExamUpload) {
    info!("[试卷 {}] 开始处理", exam_index);
    info!("[试卷 {}] 文件: {}", exam_index, upload.file_name);
    if let Some(title) = &upload.meta.exam_title {
        info!("[试卷 {}] 标题: {}", exam_index, title);
    }
}

fn log_exam_complete(exam_index: usize, report: &ExamReport) {
    info!(
        "[试卷 {}] 变体统计: 题目 {}, 变体 {}, 输出 {}",
        exam_index,
        report.question_count,
        report.codes.len(),
        report.outputs.len()
    );
    info!("\n[试卷 {}] ✅ 试卷处理完成\n", exam_index);
}
