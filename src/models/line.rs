use crate::infrastructure::NodeId;

/// 段落分类结果
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LineKind {
    /// 分组标签 `<g3>`
    GroupTag,
    /// 题干首行 `Question 1:`
    Question,
    /// 选择题答案块 `A.` / `#B.`
    McqAnswer,
    /// 判断题答案块 `a)`，目前只做识别
    TfAnswer,
    /// 普通文本
    Text,
}

/// 已分类的段落
///
/// `source_node` 只在解析出它的那棵树（及其克隆）上有效。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedLine {
    pub kind: LineKind,
    pub text: String,
    pub source_node: NodeId,
}

impl ClassifiedLine {
    pub fn new(kind: LineKind, text: impl Into<String>, source_node: NodeId) -> Self {
        Self {
            kind,
            text: text.into(),
            source_node,
        }
    }
}
