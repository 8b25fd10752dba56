//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 本层负责批量处理和流程调度，是整个系统的"指挥中心"。
//!
//! ## 模块划分
//!
//! ### `batch_processor` - 批量试卷处理器
//! - 管理应用生命周期（初始化、运行）
//! - 批量加载上传（Vec<ExamUpload>）
//! - 控制并发数量（Semaphore）
//! - 失败写入 warn.txt
//! - 输出全局统计信息
//!
//! ### `exam_processor` - 单份试卷处理器
//! - 解析一次，循环生成所有变体（Vec<VariantOutput>）
//! - 汇总答案表
//! - 打包并写出结果和报告
//!
//! ## 层次关系
//!
//! ```text
//! batch_processor (处理 Vec<ExamUpload>)
//!     ↓
//! exam_processor (处理一份试卷的所有变体)
//!     ↓
//! workflow::VariantFlow (处理单个变体)
//!     ↓
//! services (能力层：classify / assemble / shuffle / rebuild / answer key)
//!     ↓
//! infrastructure (基础设施：DocxPackage / XmlTree)
//! ```

pub mod batch_processor;
pub mod exam_processor;

// 重新导出主要类型
pub use batch_processor::{App, ProcessingStats};
pub use exam_processor::{generate_exam_set, process_exam, ExamReport, ExamSet};
