//! 失败记录服务 - 业务能力层
//!
//! 只负责"写 warn.txt"能力，不关心流程

use anyhow::Result;
use std::fs::OpenOptions;
use std::io::Write;
use tracing::debug;

/// 失败记录服务
///
/// 职责：
/// - 将处理失败的试卷写入 warn.txt
/// - 只处理单个试卷的记录
/// - 不关心流程顺序
pub struct WarnWriter {
    warn_file_path: String,
}

impl WarnWriter {
    /// 创建新的失败记录服务
    pub fn new() -> Self {
        Self {
            warn_file_path: "warn.txt".to_string(),
        }
    }

    /// 使用自定义文件路径创建
    pub fn with_path(path: impl Into<String>) -> Self {
        Self {
            warn_file_path: path.into(),
        }
    }

    /// 写入失败信息
    ///
    /// # 参数
    /// - `file_name`: 上传文件名
    /// - `reason`: 失败原因（错误信息原文）
    pub fn write(&self, file_name: &str, reason: &str) -> Result<()> {
        debug!("写入失败记录: {} | 原因长度: {}", file_name, reason.len());

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.warn_file_path)?;

        let warn_msg = format!(
            "[{}] 文件 {} | 错误: {}\n",
            chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
            file_name,
            reason.replace('\n', " / ")
        );

        file.write_all(warn_msg.as_bytes())?;

        Ok(())
    }
}

impl Default for WarnWriter {
    fn default() -> Self {
        Self::new()
    }
}
