//! # Exam Variant Builder
//!
//! 把按约定编写的 .docx 试卷生成多份打乱顺序的变体，并输出对应答案表
//!
//! ## 架构设计
//!
//! 本系统采用严格的四层架构：
//!
//! ### ① 基础设施层（Infrastructure）
//! - `infrastructure/` - 文档包与标记树，只暴露能力
//! - `DocxPackage` - 读出 / 替换 `word/document.xml`，其余条目逐字节复制
//! - `XmlTree` - arena 标记树，未修改节点原样序列化
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"
//! - `line_classifier` - 段落分类
//! - `question_assembler` - 题目组装状态机
//! - `shuffler` - 按分组规则打乱
//! - `rebuilder` - 在深拷贝上重建试卷区域
//! - `AnswerKeyTable` / `ExamArchive` / `WarnWriter` - 输出能力
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/` - 定义"一个变体"的完整生成流程
//! - `ParsedExam` - 每份上传只解析一次
//! - `VariantFlow` - 流程编排（shuffle → rebuild → repackage）
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/batch_processor` - 批量试卷处理器，管理并发和失败兜底
//! - `orchestrator/exam_processor` - 单份试卷处理器，循环生成变体并打包
//!
//! ## 模块结构

pub mod config;
pub mod error;
pub mod infrastructure;

pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use config::Config;
pub use error::{AppError, AppResult, ExamError, ExamResult};
pub use infrastructure::{DocxPackage, XmlTree};
pub use models::{ExamMeta, ExamUpload, ExamVariant, GenerationOptions, Question};
pub use orchestrator::{generate_exam_set, process_exam, App, ExamSet};
pub use workflow::{ParsedExam, VariantCtx, VariantFlow, VariantOutput};
