//! 段落分类服务 - 业务能力层
//!
//! 按固定优先级给每个非空段落打上一个标签：
//! 分组标签 → 题目 → 选择题答案 → 判断题答案 → 普通文本。
//! 空白段落直接丢弃，不会进入后续流程。

use crate::infrastructure::{NodeId, XmlTree};
use crate::models::{ClassifiedLine, GroupTag, LineKind, ShuffleRule};
use crate::services::text_extractor;
use once_cell::sync::Lazy;
use regex::Regex;

/// `<g3>` / `<g1#2>`
pub static GROUP_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^\s*<g([0-3])(?:#([1-3]))?>").expect("valid group tag pattern"));

/// `Question 12:` / `Câu 3.`
pub static QUESTION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^\s*(?:question|câu)\s*\d+\s*[:.]").expect("valid question pattern")
});

/// `A.` / `#C.`
pub static MCQ_ANSWER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^\s*#?[A-D]\.").expect("valid answer pattern"));

/// `a)` / `#b)`
pub static TF_ANSWER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^\s*#?[a-d]\)").expect("valid true/false pattern"));

/// 给一行文本分类，空白行返回 None
pub fn classify(text: &str) -> Option<LineKind> {
    if text.trim().is_empty() {
        return None;
    }
    let kind = if GROUP_TAG.is_match(text) {
        LineKind::GroupTag
    } else if QUESTION.is_match(text) {
        LineKind::Question
    } else if MCQ_ANSWER.is_match(text) {
        LineKind::McqAnswer
    } else if TF_ANSWER.is_match(text) {
        LineKind::TfAnswer
    } else {
        LineKind::Text
    };
    Some(kind)
}

/// 解析分组标签行
pub fn parse_group_tag(text: &str) -> Option<GroupTag> {
    let captures = GROUP_TAG.captures(text)?;
    let rule = captures
        .get(1)
        .and_then(|m| m.as_str().parse::<u8>().ok())
        .and_then(ShuffleRule::from_digit)?;
    let suffix = captures.get(2).and_then(|m| m.as_str().parse::<u8>().ok());
    Some(GroupTag::new(rule, suffix))
}

/// 对 body 的直接子段落逐个提取文本并分类
pub fn classify_paragraphs(tree: &XmlTree, paragraphs: &[NodeId]) -> Vec<ClassifiedLine> {
    paragraphs
        .iter()
        .filter_map(|&paragraph| {
            let text = text_extractor::extract(tree, paragraph).text;
            classify(&text).map(|kind| ClassifiedLine::new(kind, text, paragraph))
        })
        .collect()
}
