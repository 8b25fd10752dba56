use crate::infrastructure::NodeId;
use crate::models::group::GroupTag;
use std::collections::HashSet;

/// 每道选择题固定的答案数量
pub const ANSWERS_PER_QUESTION: usize = 4;

/// 按位置得到规范答案字母（0 → 'A'）
pub fn letter_for_position(position: usize) -> char {
    (b'A' + position as u8) as char
}

/// 答案
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Answer {
    /// 原文中的字母，大写
    pub letter: Option<char>,
    /// 含标签的原始片段文本，例如 `#B. 4`
    pub raw_text: String,
    /// 片段以 `#` 开头：打乱时位置固定
    pub is_pinned: bool,
    /// 带有"正确答案"格式（颜色或下划线）
    pub is_correct: bool,
    /// 所在段落
    pub source_node: NodeId,
    /// 在题目中的原始顺序
    pub source_order: usize,
}

impl Answer {
    /// 去掉 `[#]X.` 标签后的答案正文
    pub fn body(&self) -> &str {
        let text = self.raw_text.trim_start();
        let text = text.strip_prefix('#').unwrap_or(text);
        let mut chars = text.char_indices();
        match (chars.next(), chars.next()) {
            (Some((_, letter)), Some((dot, '.'))) if letter.is_ascii_alphabetic() => {
                text[dot + 1..].trim()
            }
            _ => text.trim(),
        }
    }
}

/// 题目
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    /// 题干文本（多段时以换行连接）
    pub text: String,
    /// 题干段落，按文档顺序
    pub source_nodes: Vec<NodeId>,
    /// 0 个（纯文本题）或 4 个答案
    pub answers: Vec<Answer>,
    pub group: GroupTag,
}

impl Question {
    pub fn new(text: impl Into<String>, source_node: NodeId, group: GroupTag) -> Self {
        Self {
            text: text.into(),
            source_nodes: vec![source_node],
            answers: Vec::new(),
            group,
        }
    }

    /// 没有答案的纯文本题（例如阅读材料）
    pub fn is_text_only(&self) -> bool {
        self.answers.is_empty()
    }

    /// 答案所在的不同段落，按首次出现顺序
    pub fn answer_paragraphs(&self) -> Vec<NodeId> {
        let mut seen = HashSet::new();
        self.answers
            .iter()
            .map(|answer| answer.source_node)
            .filter(|node| seen.insert(*node))
            .collect()
    }

    /// 多个答案挤在同一段落里，无法单独移动
    pub fn answers_share_paragraph(&self) -> bool {
        !self.answers.is_empty() && self.answer_paragraphs().len() != self.answers.len()
    }

    /// 第一个正确答案当前所在的位置
    pub fn correct_position(&self) -> Option<usize> {
        self.answers.iter().position(|answer| answer.is_correct)
    }

    /// 当前顺序下的答案字母，无法判断时为 None
    pub fn correct_letter(&self) -> Option<char> {
        self.correct_position().map(letter_for_position)
    }
}
