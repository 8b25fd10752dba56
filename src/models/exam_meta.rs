use crate::config::Config;
use crate::error::{AppError, AppResult};
use serde::{Deserialize, Serialize};

/// 试卷附带的 TOML 元数据（与 .docx 同名）
///
/// 抬头字段只用于报告，不参与生成；数值字段覆盖全局配置。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExamMeta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub institution_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exam_title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
    #[serde(default, skip_serializing)]
    pub number_of_variants: Option<usize>,
    #[serde(default, skip_serializing)]
    pub starting_code: Option<u32>,
    #[serde(default, skip_serializing)]
    pub starting_question_number: Option<u32>,
}

/// 生成参数
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GenerationOptions {
    pub number_of_variants: usize,
    pub starting_code: u32,
    pub starting_question_number: u32,
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            number_of_variants: 4,
            starting_code: 101,
            starting_question_number: 1,
        }
    }
}

impl GenerationOptions {
    /// 合并全局配置与试卷元数据（元数据优先）
    pub fn resolve(config: &Config, meta: &ExamMeta) -> AppResult<Self> {
        let options = Self {
            number_of_variants: meta.number_of_variants.unwrap_or(config.number_of_variants),
            starting_code: meta.starting_code.unwrap_or(config.starting_code),
            starting_question_number: meta
                .starting_question_number
                .unwrap_or(config.starting_question_number),
        };
        options.validate()?;
        Ok(options)
    }

    pub fn validate(&self) -> AppResult<()> {
        if self.number_of_variants == 0 {
            return Err(AppError::invalid_config(
                "number_of_variants",
                "至少需要生成 1 个变体",
            ));
        }
        Ok(())
    }

    /// 各变体的试卷代码
    pub fn codes(&self) -> Vec<u32> {
        (0..self.number_of_variants as u32)
            .map(|offset| self.starting_code + offset)
            .collect()
    }
}
