//! 正确答案识别服务 - 业务能力层
//!
//! 正确答案通过 run 格式标记：颜色在允许列表中，或带下划线。
//! 一个答案的文字可能跨多个 run（例如字母不加格式、正文标红），
//! 所以按字符判断：片段中任意一个字符来自被标记的 run，该片段就是正确答案。

use crate::infrastructure::{NodeId, XmlTree};
use crate::services::text_extractor::{self, RUN_PROPERTIES};
use phf::phf_set;

/// 视为"正确答案"的颜色（大写比较）
static CORRECT_COLORS: phf::Set<&'static str> = phf_set! {
    "FF0000", "C00000", "00FF00", "00B050", "0000FF", "0070C0", "00B0F0",
    "RED", "GREEN", "BLUE",
};

/// run 是否带有正确答案标记
pub fn is_marked_run(tree: &XmlTree, run: NodeId) -> bool {
    let Some(properties) = tree.child_element(run, RUN_PROPERTIES) else {
        return false;
    };

    let colored = tree
        .child_element(properties, "w:color")
        .and_then(|color| tree.attribute(color, "w:val"))
        .map(|value| CORRECT_COLORS.contains(value.to_uppercase().as_str()))
        .unwrap_or(false);

    let underlined = tree
        .child_element(properties, "w:u")
        .map(|u| {
            tree.attribute(u, "w:val")
                .map(|value| !value.eq_ignore_ascii_case("none"))
                .unwrap_or(true)
        })
        .unwrap_or(false);

    colored || underlined
}

/// 段落拼接文本及每个字节是否被标记
#[derive(Debug, Clone, Default)]
pub struct MarkedText {
    pub text: String,
    pub marks: Vec<bool>,
}

impl MarkedText {
    pub fn from_paragraph(tree: &XmlTree, paragraph: NodeId) -> Self {
        let extracted = text_extractor::extract(tree, paragraph);
        let mut marks = vec![false; extracted.text.len()];
        for span in &extracted.runs {
            if is_marked_run(tree, span.run) {
                marks[span.range.clone()].iter_mut().for_each(|m| *m = true);
            }
        }
        Self {
            text: extracted.text,
            marks,
        }
    }

    /// 依次定位各片段并判断是否被标记
    ///
    /// 查找游标只向前推进，相同文字的片段不会被重复匹配到同一位置。
    /// 找不到的片段视为未标记。
    pub fn fragments_marked<S: AsRef<str>>(&self, fragments: &[S]) -> Vec<bool> {
        let mut cursor = 0;
        fragments
            .iter()
            .map(|fragment| {
                let needle = fragment.as_ref();
                let Some(offset) = self.text.get(cursor..).and_then(|rest| rest.find(needle))
                else {
                    return false;
                };
                let start = cursor + offset;
                let end = start + needle.len();
                cursor = end;
                self.marks[start..end].iter().any(|&marked| marked)
            })
            .collect()
    }
}
