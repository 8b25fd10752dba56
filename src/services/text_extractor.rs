//! 文本提取服务 - 业务能力层
//!
//! 把一个段落当成"按字符寻址的字符串"来看：拼接所有 run 的文本，
//! 同时记下每个 run 在拼接结果中占据的字节区间。

use crate::error::{ExamError, ExamResult};
use crate::infrastructure::{NodeId, XmlTree};
use std::ops::Range;

pub const BODY: &str = "w:body";
pub const PARAGRAPH: &str = "w:p";
pub const RUN: &str = "w:r";
pub const RUN_TEXT: &str = "w:t";
pub const RUN_PROPERTIES: &str = "w:rPr";
pub const SECTION_PROPERTIES: &str = "w:sectPr";

/// 段落中的一个 run 及其在拼接文本中的区间
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSpan {
    pub run: NodeId,
    pub text: String,
    pub range: Range<usize>,
}

/// 段落的拼接文本
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParagraphText {
    pub text: String,
    pub runs: Vec<RunSpan>,
}

/// 找到 `w:body`
pub fn body(tree: &XmlTree) -> ExamResult<NodeId> {
    tree.find_descendant(tree.root(), BODY)
        .ok_or_else(|| ExamError::malformed("主文档中没有 w:body"))
}

/// body 的直接子段落
pub fn body_paragraphs(tree: &XmlTree, body: NodeId) -> Vec<NodeId> {
    tree.children(body)
        .iter()
        .copied()
        .filter(|&child| tree.is_element(child, PARAGRAPH))
        .collect()
}

/// 段落内的所有 run（包括超链接等容器里的），按文档顺序
///
/// 不会进入嵌套段落（文本框）。
pub fn paragraph_runs(tree: &XmlTree, paragraph: NodeId) -> Vec<NodeId> {
    let mut runs = Vec::new();
    let mut stack: Vec<NodeId> = tree.children(paragraph).iter().rev().copied().collect();
    while let Some(node) = stack.pop() {
        if tree.is_element(node, RUN) {
            runs.push(node);
        } else if !tree.is_element(node, PARAGRAPH) {
            stack.extend(tree.children(node).iter().rev().copied());
        }
    }
    runs
}

/// run 中 `w:t` 元素
pub fn run_text_nodes(tree: &XmlTree, run: NodeId) -> Vec<NodeId> {
    tree.descendants(run)
        .into_iter()
        .filter(|&node| tree.is_element(node, RUN_TEXT))
        .collect()
}

/// run 的文本
pub fn run_text(tree: &XmlTree, run: NodeId) -> String {
    run_text_nodes(tree, run)
        .into_iter()
        .map(|t| tree.text_content(t))
        .collect()
}

/// 拼接段落所有 run 的文本，忽略 run 边界
pub fn extract(tree: &XmlTree, paragraph: NodeId) -> ParagraphText {
    let mut result = ParagraphText::default();
    for run in paragraph_runs(tree, paragraph) {
        let text = run_text(tree, run);
        let start = result.text.len();
        result.text.push_str(&text);
        result.runs.push(RunSpan {
            run,
            range: start..result.text.len(),
            text,
        });
    }
    result
}

/// 改写 run 的文本：全部放进第一个 `w:t`，其余 `w:t` 置空
///
/// run 本身及其 `w:rPr` 不动。
pub fn set_run_text(tree: &mut XmlTree, run: NodeId, text: &str) {
    let text_nodes = run_text_nodes(tree, run);
    match text_nodes.split_first() {
        Some((&first, rest)) => {
            tree.set_text_content(first, text);
            for &other in rest {
                tree.set_text_content(other, "");
            }
        }
        None if !text.is_empty() => {
            let t = tree.create_element(RUN_TEXT);
            tree.append_child(run, t);
            tree.set_text_content(t, text);
        }
        None => {}
    }
}
