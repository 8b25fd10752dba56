//! 文档重建服务 - 业务能力层
//!
//! 在基础树的深拷贝上：克隆题干和答案段落、重写题号和答案字母、
//! 去掉正确答案格式，然后用新内容替换原来的试卷区域。
//! 区域之前的内容和没有改动过的 run 原样保留。

use crate::error::ExamResult;
use crate::infrastructure::{NodeId, XmlTree};
use crate::models::{letter_for_position, ClassifiedLine, ExamVariant, LineKind, Question};
use crate::services::question_assembler::ANSWER_MARKER;
use crate::services::text_extractor::{self, ParagraphText, RUN_PROPERTIES, SECTION_PROPERTIES};
use once_cell::sync::Lazy;
use regex::Regex;
use std::ops::Range;
use tracing::debug;

/// 题号标签（含其后的空白）
static QUESTION_LABEL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^\s*(?:question|câu)\s*\d+\s*[:.]\s*").expect("valid question label pattern")
});

/// 单个答案段落的字母标签（含其后的空白）
static ANSWER_LABEL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^\s*#?[A-D]\.\s*").expect("valid answer label pattern"));

/// 去格式时移除的 run 属性
const CORRECTNESS_PROPERTIES: [&str; 2] = ["w:color", "w:u"];

/// 试卷区域
///
/// 从第一个分组标签或题目段落开始，到 body 末尾（不含结尾的 `w:sectPr`）。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExamRegion {
    pub body: NodeId,
    /// 区域内 body 的直接子节点，按文档顺序
    pub nodes: Vec<NodeId>,
    /// 新内容插入到它之前；没有时追加到 body 末尾
    pub end_anchor: Option<NodeId>,
}

impl ExamRegion {
    fn place(&self, tree: &mut XmlTree, node: NodeId) {
        match self.end_anchor {
            Some(anchor) => tree.insert_before(anchor, node),
            None => tree.append_child(self.body, node),
        }
    }
}

/// 定位试卷区域，文档中没有任何标签或题目时返回 None
pub fn locate_region(tree: &XmlTree, lines: &[ClassifiedLine]) -> ExamResult<Option<ExamRegion>> {
    let body = text_extractor::body(tree)?;

    let Some(start) = lines
        .iter()
        .find(|line| matches!(line.kind, LineKind::GroupTag | LineKind::Question))
        .map(|line| line.source_node)
    else {
        return Ok(None);
    };

    let children = tree.children(body);
    let Some(start_index) = children.iter().position(|&child| child == start) else {
        return Ok(None);
    };

    let end_anchor = children
        .last()
        .copied()
        .filter(|&last| tree.is_element(last, SECTION_PROPERTIES));
    let end_index = if end_anchor.is_some() {
        children.len() - 1
    } else {
        children.len()
    };

    Ok(Some(ExamRegion {
        body,
        nodes: children[start_index..end_index.max(start_index)].to_vec(),
        end_anchor,
    }))
}

/// 按变体重建文档树（在基础树的深拷贝上操作）
pub fn rebuild(base: &XmlTree, region: &ExamRegion, variant: &ExamVariant) -> XmlTree {
    let mut tree = base.clone();

    for (index, question) in variant.questions.iter().enumerate() {
        let number = index + 1;
        for (stem_index, &stem) in question.source_nodes.iter().enumerate() {
            let clone = tree.deep_clone(stem);
            if stem_index == 0 {
                relabel(&mut tree, clone, &QUESTION_LABEL, &format!("Question {}: ", number));
            }
            region.place(&mut tree, clone);
        }
        insert_answers(&mut tree, region, question);
    }

    for &node in &region.nodes {
        tree.detach(node);
    }
    tree
}

fn insert_answers(tree: &mut XmlTree, region: &ExamRegion, question: &Question) {
    if question.is_text_only() {
        return;
    }

    if !question.answers_share_paragraph() {
        for (position, answer) in question.answers.iter().enumerate() {
            let clone = tree.deep_clone(answer.source_node);
            let label = format!("{}. ", letter_for_position(position));
            relabel(tree, clone, &ANSWER_LABEL, &label);
            strip_correctness_marks(tree, clone);
            region.place(tree, clone);
        }
        return;
    }

    // 答案挤在同一段落：按原顺序整段放回，标记按位置重写为 A.-D.，去掉正确答案格式
    debug!("答案共用段落，保持原顺序: {}", question.text);
    let mut answers: Vec<_> = question.answers.iter().collect();
    answers.sort_by_key(|answer| answer.source_order);
    let mut placed: Vec<NodeId> = Vec::new();
    let mut position = 0;
    for answer in answers {
        if placed.contains(&answer.source_node) {
            continue;
        }
        placed.push(answer.source_node);
        let clone = tree.deep_clone(answer.source_node);
        position += normalize_markers(tree, clone, position);
        strip_correctness_marks(tree, clone);
        region.place(tree, clone);
    }
}

/// 用 `label` 替换段落中第一个匹配 `pattern` 的文本
fn relabel(tree: &mut XmlTree, paragraph: NodeId, pattern: &Regex, label: &str) {
    let text = text_extractor::extract(tree, paragraph);
    if let Some(found) = pattern.find(&text.text) {
        splice_label(tree, &text, found.range(), label);
    }
}

/// 把段落中第 k 个 `[#]x.` 标记改写成第 `first_position + k` 个位置的字母
///
/// 与答案表一致：答案表按位置取字母，不看原文字母。
/// 从后往前处理，前面标记的偏移量不受影响。返回标记个数。
fn normalize_markers(tree: &mut XmlTree, paragraph: NodeId, first_position: usize) -> usize {
    let original = text_extractor::extract(tree, paragraph).text;
    let markers: Vec<Range<usize>> = ANSWER_MARKER
        .captures_iter(&original)
        .filter_map(|captures| Some(captures.get(1)?.start()..captures.get(0)?.end()))
        .collect();
    let count = markers.len();

    for (offset, range) in markers.into_iter().enumerate().rev() {
        let label = format!("{}.", letter_for_position(first_position + offset));
        let text = text_extractor::extract(tree, paragraph);
        splice_label(tree, &text, range, &label);
    }
    count
}

/// 标签拼接
///
/// 第一个与匹配区间相交的 run 改为"匹配前的前缀 + 新标签（+ 匹配后的后缀，若匹配在此结束）"；
/// 之后相交的 run 只保留匹配之后的部分（被整段吞掉的变为空文本）。
/// run 节点和它们的格式属性都不删除。
pub fn splice_label(tree: &mut XmlTree, text: &ParagraphText, range: Range<usize>, label: &str) {
    let mut label_written = false;

    for span in &text.runs {
        if span.range.is_empty()
            || span.range.end <= range.start
            || span.range.start >= range.end
        {
            continue;
        }

        let suffix = if range.end < span.range.end {
            &span.text[range.end - span.range.start..]
        } else {
            ""
        };

        let new_text = if label_written {
            suffix.to_string()
        } else {
            label_written = true;
            let prefix_len = range.start.saturating_sub(span.range.start);
            format!("{}{}{}", &span.text[..prefix_len], label, suffix)
        };

        if new_text != span.text {
            text_extractor::set_run_text(tree, span.run, &new_text);
        }
    }
}

/// 去掉段落中所有 run 的颜色和下划线
pub fn strip_correctness_marks(tree: &mut XmlTree, paragraph: NodeId) {
    let marks: Vec<NodeId> = tree
        .descendants(paragraph)
        .into_iter()
        .filter(|&node| tree.is_element(node, RUN_PROPERTIES))
        .flat_map(|properties| tree.children(properties).to_vec())
        .filter(|&property| {
            tree.name(property)
                .map(|name| CORRECTNESS_PROPERTIES.contains(&name))
                .unwrap_or(false)
        })
        .collect();

    for mark in marks {
        tree.detach(mark);
    }
}
