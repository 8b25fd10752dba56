use std::fmt;

/// 应用程序错误类型
#[derive(Debug)]
pub enum AppError {
    /// 试卷处理错误（核心流水线）
    Exam(ExamError),
    /// 文件操作错误
    File(FileError),
    /// 配置错误
    Config(ConfigError),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Exam(e) => write!(f, "试卷错误: {}", e),
            AppError::File(e) => write!(f, "文件错误: {}", e),
            AppError::Config(e) => write!(f, "配置错误: {}", e),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Exam(e) => Some(e),
            AppError::File(e) => Some(e),
            AppError::Config(e) => Some(e),
        }
    }
}

/// 试卷处理错误
///
/// 全部为终止性错误：任何一个都会让当前文档整体失败，不会输出部分结果。
#[derive(Debug, thiserror::Error)]
pub enum ExamError {
    /// 不是合法的 zip 容器，或缺少主文档条目
    #[error("无效的文档包: {reason}")]
    InvalidPackage { reason: String },

    /// 主文档条目无法解析为标记树
    #[error("文档标记解析失败: {reason}")]
    MalformedMarkup { reason: String },

    /// 答案块出现在任何题目之前
    #[error("答案块没有所属题目: {text}")]
    OrphanAnswer { text: String },

    /// 同一题目中出现重复的答案字母
    #[error("题目中答案字母 {letter} 重复: {question}")]
    DuplicateAnswerLetter { question: String, letter: char },

    /// 题目有答案但数量不是 4
    #[error("题目答案数量应为 4，实际为 {count}: {question}")]
    WrongAnswerCount { question: String, count: usize },

    /// 写出文档包或答案表失败
    #[error("写出文件失败 ({target}): {reason}")]
    PackageWrite { target: String, reason: String },
}

impl ExamError {
    pub fn invalid_package(reason: impl fmt::Display) -> Self {
        ExamError::InvalidPackage {
            reason: reason.to_string(),
        }
    }

    pub fn malformed(reason: impl fmt::Display) -> Self {
        ExamError::MalformedMarkup {
            reason: reason.to_string(),
        }
    }

    pub fn package_write(target: impl Into<String>, reason: impl fmt::Display) -> Self {
        ExamError::PackageWrite {
            target: target.into(),
            reason: reason.to_string(),
        }
    }
}

/// 文件操作错误
#[derive(Debug)]
pub enum FileError {
    /// 读取文件失败
    ReadFailed {
        path: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 写入文件失败
    WriteFailed {
        path: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// TOML 解析失败
    TomlParseFailed {
        path: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 目录不存在
    DirectoryNotFound { path: String },
}

impl fmt::Display for FileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileError::ReadFailed { path, source } => {
                write!(f, "读取文件失败 ({}): {}", path, source)
            }
            FileError::WriteFailed { path, source } => {
                write!(f, "写入文件失败 ({}): {}", path, source)
            }
            FileError::TomlParseFailed { path, source } => {
                write!(f, "TOML解析失败 ({}): {}", path, source)
            }
            FileError::DirectoryNotFound { path } => write!(f, "目录不存在: {}", path),
        }
    }
}

impl std::error::Error for FileError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FileError::ReadFailed { source, .. }
            | FileError::WriteFailed { source, .. }
            | FileError::TomlParseFailed { source, .. } => {
                Some(source.as_ref() as &(dyn std::error::Error + 'static))
            }
            FileError::DirectoryNotFound { .. } => None,
        }
    }
}

/// 配置错误
#[derive(Debug)]
pub enum ConfigError {
    /// 配置值不合法
    InvalidValue { field: String, reason: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidValue { field, reason } => {
                write!(f, "配置项 {} 不合法: {}", field, reason)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

// ========== 从常见错误类型转换 ==========
// 注意：不需要手动实现 From<AppError> for anyhow::Error，
// 因为 anyhow 已经为所有实现了 std::error::Error 的类型提供了自动实现

impl From<ExamError> for AppError {
    fn from(err: ExamError) -> Self {
        AppError::Exam(err)
    }
}

impl From<ConfigError> for AppError {
    fn from(err: ConfigError) -> Self {
        AppError::Config(err)
    }
}

// ========== 便捷构造函数 ==========

impl AppError {
    /// 创建文件读取错误
    pub fn file_read_failed(
        path: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        AppError::File(FileError::ReadFailed {
            path: path.into(),
            source: Box::new(source),
        })
    }

    /// 创建文件写入错误
    pub fn file_write_failed(
        path: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        AppError::File(FileError::WriteFailed {
            path: path.into(),
            source: Box::new(source),
        })
    }

    /// 创建配置值错误
    pub fn invalid_config(field: impl Into<String>, reason: impl Into<String>) -> Self {
        AppError::Config(ConfigError::InvalidValue {
            field: field.into(),
            reason: reason.into(),
        })
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;

/// 核心流水线结果类型
pub type ExamResult<T> = Result<T, ExamError>;
