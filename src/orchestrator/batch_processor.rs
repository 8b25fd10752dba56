//! 批量试卷处理器 - 编排层
//!
//! ## 职责
//!
//! 本模块是整个应用的入口，负责批量试卷的处理和资源管理。
//!
//! ## 核心功能
//!
//! 1. **应用初始化**：启动日志、准备输出目录
//! 2. **批量加载**：扫描并加载所有待处理的上传（`Vec<ExamUpload>`）
//! 3. **并发控制**：使用 Semaphore 限制并发数量
//! 4. **分批处理**：将试卷分批次处理，每批完成后再开始下一批
//! 5. **失败兜底**：失败的试卷写入 warn.txt，不影响其它试卷
//! 6. **全局统计**：汇总所有试卷的处理结果
//!
//! ## 设计特点
//!
//! - **顶层编排**：不处理单个试卷的细节
//! - **CPU 任务隔离**：解析与重建通过 `spawn_blocking` 运行
//! - **向下委托**：委托 exam_processor 处理单个试卷

use crate::config::Config;
use crate::models::ExamUpload;
use crate::orchestrator::exam_processor;
use crate::services::WarnWriter;
use crate::utils::logging;
use anyhow::{Context, Result};
use futures::future::join_all;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{error, info, warn};

/// 应用主结构
pub struct App {
    config: Config,
    warn_writer: Arc<WarnWriter>,
}

impl App {
    /// 初始化应用
    pub async fn initialize(config: Config) -> Result<Self> {
        config.validate()?;

        // 初始化日志文件
        logging::init_log_file(&config.output_log_file)
            .with_context(|| format!("无法创建日志文件: {}", config.output_log_file))?;

        logging::log_startup(config.max_concurrent_exams, config.number_of_variants);

        tokio::fs::create_dir_all(&config.output_folder)
            .await
            .with_context(|| format!("无法创建输出目录: {}", config.output_folder))?;

        let warn_writer = Arc::new(WarnWriter::with_path(config.warn_file.clone()));

        Ok(Self {
            config,
            warn_writer,
        })
    }

    /// 运行应用主逻辑
    pub async fn run(&self) -> Result<ProcessingStats> {
        // 加载所有待处理的上传
        let all_uploads = self.load_uploads().await?;

        if all_uploads.is_empty() {
            warn!("⚠️ 没有找到待处理的 .docx 文件，程序结束");
            return Ok(ProcessingStats::default());
        }

        logging::log_exams_loaded(all_uploads.len(), self.config.max_concurrent_exams);

        // 处理所有试卷
        let stats = self.process_all_exams(all_uploads).await?;

        // 输出最终统计
        logging::print_final_stats(
            stats.success,
            stats.failed,
            stats.total,
            stats.variants,
            &self.config.output_log_file,
        );

        Ok(stats)
    }

    /// 加载上传
    async fn load_uploads(&self) -> Result<Vec<ExamUpload>> {
        info!("\n📁 正在扫描待处理的试卷...");
        crate::models::load_all_uploads(&self.config.input_folder).await
    }

    /// 处理所有试卷
    async fn process_all_exams(&self, all_uploads: Vec<ExamUpload>) -> Result<ProcessingStats> {
        let max_concurrent = self.config.max_concurrent_exams;
        let semaphore = Arc::new(Semaphore::new(max_concurrent));
        let total_exams = all_uploads.len();
        let total_batches = (total_exams + max_concurrent - 1) / max_concurrent;
        let mut stats = ProcessingStats {
            total: total_exams,
            ..Default::default()
        };

        let mut remaining = all_uploads.into_iter();
        for batch_num in 1..=total_batches {
            let batch_start = (batch_num - 1) * max_concurrent;
            let batch_uploads: Vec<ExamUpload> = remaining.by_ref().take(max_concurrent).collect();
            let batch_end = batch_start + batch_uploads.len();

            logging::log_batch_start(
                batch_num,
                total_batches,
                batch_start + 1,
                batch_end,
                total_exams,
            );

            // 处理本批
            let batch_result = self
                .process_batch(batch_uploads, batch_start, semaphore.clone())
                .await?;

            stats.success += batch_result.success;
            stats.failed += batch_result.failed;
            stats.variants += batch_result.variants;

            logging::log_batch_complete(
                batch_num,
                batch_result.success,
                batch_result.success + batch_result.failed,
            );
        }

        Ok(stats)
    }

    /// 处理单个批次
    async fn process_batch(
        &self,
        batch_uploads: Vec<ExamUpload>,
        batch_start: usize,
        semaphore: Arc<Semaphore>,
    ) -> Result<BatchResult> {
        let mut batch_handles = Vec::new();

        // 为本批创建并发任务
        for (idx, upload) in batch_uploads.into_iter().enumerate() {
            let exam_index = batch_start + idx + 1;
            let permit = semaphore.clone().acquire_owned().await?;
            let file_name = upload.file_name.clone();
            let config_clone = self.config.clone();

            let handle = tokio::task::spawn_blocking(move || {
                let _permit = permit;
                exam_processor::process_exam(upload, exam_index, &config_clone)
            });
            batch_handles.push((exam_index, file_name, handle));
        }

        let (labels, handles): (Vec<_>, Vec<_>) = batch_handles
            .into_iter()
            .map(|(exam_index, file_name, handle)| ((exam_index, file_name), handle))
            .unzip();

        // 等待本批所有任务完成
        let mut result = BatchResult::default();

        for ((exam_index, file_name), outcome) in labels.into_iter().zip(join_all(handles).await) {
            let failure = match outcome {
                Ok(Ok(report)) => {
                    result.success += 1;
                    result.variants += report.codes.len();
                    continue;
                }
                Ok(Err(e)) => {
                    error!("[试卷 {}] ❌ 处理过程中发生错误: {:#}", exam_index, e);
                    format!("{:#}", e)
                }
                Err(e) => {
                    error!("[试卷 {}] 任务执行失败: {}", exam_index, e);
                    e.to_string()
                }
            };

            result.failed += 1;
            if let Err(e) = self.warn_writer.write(&file_name, &failure) {
                error!("[试卷 {}] 写入 warn.txt 失败: {}", exam_index, e);
            }
        }

        Ok(result)
    }
}

/// 处理统计
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ProcessingStats {
    pub success: usize,
    pub failed: usize,
    pub total: usize,
    /// 成功生成的变体总数
    pub variants: usize,
}

/// 批次处理结果
#[derive(Debug, Default)]
struct BatchResult {
    success: usize,
    failed: usize,
    variants: usize,
}
