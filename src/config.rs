use crate::error::{AppResult, ConfigError};

/// 程序配置文件
#[derive(Clone, Debug)]
pub struct Config {
    /// 待处理 .docx 所在目录
    pub input_folder: String,
    /// 生成结果输出目录
    pub output_folder: String,
    /// 每份试卷生成的变体数量
    pub number_of_variants: usize,
    /// 第一个变体的试卷代码（只影响命名）
    pub starting_code: u32,
    /// 起始题号（目前重排时总是从 1 开始编号）
    pub starting_question_number: u32,
    /// 同时处理的试卷数量
    pub max_concurrent_exams: usize,
    /// 是否显示详细日志
    pub verbose_logging: bool,
    /// 输出日志文件
    pub output_log_file: String,
    /// 失败记录文件
    pub warn_file: String,
    /// 随机种子，设置后结果可复现
    pub rng_seed: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            input_folder: "input_docx".to_string(),
            output_folder: "output_exams".to_string(),
            number_of_variants: 4,
            starting_code: 101,
            starting_question_number: 1,
            max_concurrent_exams: 4,
            verbose_logging: false,
            output_log_file: "output.txt".to_string(),
            warn_file: "warn.txt".to_string(),
            rng_seed: None,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            input_folder: std::env::var("INPUT_FOLDER").unwrap_or(default.input_folder),
            output_folder: std::env::var("OUTPUT_FOLDER").unwrap_or(default.output_folder),
            number_of_variants: std::env::var("NUMBER_OF_VARIANTS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.number_of_variants),
            starting_code: std::env::var("STARTING_CODE").ok().and_then(|v| v.parse().ok()).unwrap_or(default.starting_code),
            starting_question_number: std::env::var("STARTING_QUESTION_NUMBER").ok().and_then(|v| v.parse().ok()).unwrap_or(default.starting_question_number),
            max_concurrent_exams: std::env::var("MAX_CONCURRENT_EXAMS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.max_concurrent_exams),
            verbose_logging: std::env::var("VERBOSE_LOGGING").ok().and_then(|v| v.parse().ok()).unwrap_or(default.verbose_logging),
            output_log_file: std::env::var("OUTPUT_LOG_FILE").unwrap_or(default.output_log_file),
            warn_file: std::env::var("WARN_FILE").unwrap_or(default.warn_file),
            rng_seed: std::env::var("RNG_SEED").ok().and_then(|v| v.parse().ok()),
        }
    }

    /// 校验配置
    pub fn validate(&self) -> AppResult<()> {
        if self.number_of_variants == 0 {
            return Err(ConfigError::InvalidValue {
                field: "NUMBER_OF_VARIANTS".to_string(),
                reason: "至少需要生成 1 个变体".to_string(),
            }
            .into());
        }
        if self.max_concurrent_exams == 0 {
            return Err(ConfigError::InvalidValue {
                field: "MAX_CONCURRENT_EXAMS".to_string(),
                reason: "并发数必须大于 0".to_string(),
            }
            .into());
        }
        Ok(())
    }
}
