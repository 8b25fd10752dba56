use serde::{Deserialize, Serialize};

/// 分组打乱规则（分组标签中的数字）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShuffleRule {
    /// 0: 不打乱
    Fixed = 0,
    /// 1: 只打乱题目顺序
    QuestionsOnly = 1,
    /// 2: 只打乱答案顺序
    AnswersOnly = 2,
    /// 3: 题目和答案都打乱
    Both = 3,
}

impl ShuffleRule {
    /// 从标签数字解析
    pub fn from_digit(digit: u8) -> Option<Self> {
        match digit {
            0 => Some(ShuffleRule::Fixed),
            1 => Some(ShuffleRule::QuestionsOnly),
            2 => Some(ShuffleRule::AnswersOnly),
            3 => Some(ShuffleRule::Both),
            _ => None,
        }
    }

    pub fn digit(self) -> u8 {
        self as u8
    }

    pub fn shuffles_questions(self) -> bool {
        matches!(self, ShuffleRule::QuestionsOnly | ShuffleRule::Both)
    }

    pub fn shuffles_answers(self) -> bool {
        matches!(self, ShuffleRule::AnswersOnly | ShuffleRule::Both)
    }
}

/// 分组标签 `<g{规则}[#{后缀}]>`
///
/// 后缀目前没有任何规则使用，只原样保留。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GroupTag {
    pub rule: ShuffleRule,
    pub suffix: Option<u8>,
}

impl GroupTag {
    pub fn new(rule: ShuffleRule, suffix: Option<u8>) -> Self {
        Self { rule, suffix }
    }

    /// 规范化后的标签文本，用作分组键
    pub fn key(&self) -> String {
        match self.suffix {
            Some(suffix) => format!("<g{}#{}>", self.rule.digit(), suffix),
            None => format!("<g{}>", self.rule.digit()),
        }
    }
}

impl Default for GroupTag {
    /// 还没遇到任何标签时按规则 3 处理
    fn default() -> Self {
        Self::new(ShuffleRule::Both, None)
    }
}

impl std::fmt::Display for GroupTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.key())
    }
}
