//! 标记树 - 基础设施层
//!
//! 把 `word/document.xml` 解析成一棵 arena 树，节点之间用 `NodeId` 索引关联。
//!
//! 每个节点都保留解析时的原始字节，序列化时未修改的节点原样输出，
//! 因此没有被改动过的 run 在输出中与输入逐字节一致。
//! 克隆整棵树（`Clone`）得到的新树中，所有 `NodeId` 仍然有效。

use crate::error::{ExamError, ExamResult};
use quick_xml::escape::{partial_escape, unescape};
use quick_xml::events::Event;
use quick_xml::Reader;

const BOM: char = '\u{feff}';

/// 节点句柄（arena 下标）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

#[derive(Debug, Clone)]
enum NodeKind {
    /// 虚拟根节点
    Document,
    /// 元素：`open` 为原始开始标签（自闭合元素时为整个 `<x/>`），`close` 为原始结束标签
    Element {
        name: String,
        open: String,
        close: Option<String>,
    },
    /// 文本（保存转义后的原始形式）
    Text { raw: String },
    /// 声明、注释、CDATA、处理指令等，原样保留
    Markup { raw: String },
}

#[derive(Debug, Clone)]
struct Node {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// arena 标记树
#[derive(Debug, Clone)]
pub struct XmlTree {
    nodes: Vec<Node>,
    has_bom: bool,
}

impl XmlTree {
    /// 解析 XML 文本
    pub fn parse(xml: &str) -> ExamResult<Self> {
        let (has_bom, source) = match xml.strip_prefix(BOM) {
            Some(rest) => (true, rest),
            None => (false, xml),
        };

        let mut tree = XmlTree {
            nodes: vec![Node {
                kind: NodeKind::Document,
                parent: None,
                children: Vec::new(),
            }],
            has_bom,
        };
        let mut stack = vec![tree.root()];
        let mut reader = Reader::from_str(source);

        loop {
            let start = reader.buffer_position() as usize;
            let event = reader.read_event().map_err(|e| {
                ExamError::malformed(format!("位置 {}: {}", reader.buffer_position(), e))
            })?;
            let end = reader.buffer_position() as usize;
            let raw = source.get(start..end).unwrap_or_default().to_string();
            let parent = *stack.last().ok_or_else(|| ExamError::malformed("结束标签多于开始标签"))?;

            match event {
                Event::Start(e) => {
                    let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                    let id = tree.push(
                        parent,
                        NodeKind::Element {
                            name,
                            open: raw,
                            close: None,
                        },
                    );
                    stack.push(id);
                }
                Event::Empty(e) => {
                    let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                    tree.push(
                        parent,
                        NodeKind::Element {
                            name,
                            open: raw,
                            close: None,
                        },
                    );
                }
                Event::End(_) => {
                    if stack.len() < 2 {
                        return Err(ExamError::malformed("结束标签多于开始标签"));
                    }
                    if let Some(id) = stack.pop() {
                        if let NodeKind::Element { close, .. } = &mut tree.nodes[id.0].kind {
                            *close = Some(raw);
                        }
                    }
                }
                Event::Text(_) => {
                    tree.push(parent, NodeKind::Text { raw });
                }
                Event::Eof => break,
                _ => {
                    tree.push(parent, NodeKind::Markup { raw });
                }
            }
        }

        if stack.len() != 1 {
            return Err(ExamError::malformed("存在未闭合的元素"));
        }
        Ok(tree)
    }

    /// 序列化为 XML 文本
    pub fn serialize(&self) -> String {
        let mut out = String::new();
        if self.has_bom {
            out.push(BOM);
        }
        self.write_node(self.root(), &mut out);
        out
    }

    fn write_node(&self, id: NodeId, out: &mut String) {
        match &self.nodes[id.0].kind {
            NodeKind::Document => {}
            NodeKind::Element { open, .. } => out.push_str(open),
            NodeKind::Text { raw } | NodeKind::Markup { raw } => out.push_str(raw),
        }
        for &child in &self.nodes[id.0].children {
            self.write_node(child, out);
        }
        if let NodeKind::Element {
            close: Some(close), ..
        } = &self.nodes[id.0].kind
        {
            out.push_str(close);
        }
    }

    fn push(&mut self, parent: NodeId, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            kind,
            parent: Some(parent),
            children: Vec::new(),
        });
        self.nodes[parent.0].children.push(id);
        id
    }

    fn push_detached(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            kind,
            parent: None,
            children: Vec::new(),
        });
        id
    }

    // ========== 查询 ==========

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    /// 元素名（含命名空间前缀），非元素返回 None
    pub fn name(&self, id: NodeId) -> Option<&str> {
        match &self.nodes[id.0].kind {
            NodeKind::Element { name, .. } => Some(name),
            _ => None,
        }
    }

    pub fn is_element(&self, id: NodeId, name: &str) -> bool {
        self.name(id) == Some(name)
    }

    /// 直接子元素中第一个名为 `name` 的
    pub fn child_element(&self, id: NodeId, name: &str) -> Option<NodeId> {
        self.children(id)
            .iter()
            .copied()
            .find(|&child| self.is_element(child, name))
    }

    /// 先序遍历的所有后代（不含自身）
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut result = Vec::new();
        let mut stack: Vec<NodeId> = self.children(id).iter().rev().copied().collect();
        while let Some(current) = stack.pop() {
            result.push(current);
            stack.extend(self.children(current).iter().rev().copied());
        }
        result
    }

    /// 后代中第一个名为 `name` 的元素
    pub fn find_descendant(&self, id: NodeId, name: &str) -> Option<NodeId> {
        self.descendants(id)
            .into_iter()
            .find(|&node| self.is_element(node, name))
    }

    /// 读取属性值（已反转义）
    pub fn attribute(&self, id: NodeId, key: &str) -> Option<String> {
        let NodeKind::Element { open, .. } = &self.nodes[id.0].kind else {
            return None;
        };
        let mut reader = Reader::from_str(open);
        let start = match reader.read_event() {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) => e,
            _ => return None,
        };
        start
            .attributes()
            .flatten()
            .find(|attr| attr.key.as_ref() == key.as_bytes())
            .and_then(|attr| attr.unescape_value().ok().map(|v| v.into_owned()))
    }

    /// 元素下所有文本子节点拼接后的内容（已反转义）
    pub fn text_content(&self, id: NodeId) -> String {
        let mut text = String::new();
        for &child in self.children(id) {
            if let NodeKind::Text { raw } = &self.nodes[child.0].kind {
                match unescape(raw) {
                    Ok(decoded) => text.push_str(&decoded),
                    Err(_) => text.push_str(raw),
                }
            }
        }
        text
    }

    // ========== 修改 ==========

    /// 用一个文本节点替换元素的全部子节点
    ///
    /// 新文本首尾带空白时，Word 会把它裁掉，所以被改写的 `w:t` 统一补上
    /// `xml:space="preserve"`。
    pub fn set_text_content(&mut self, id: NodeId, text: &str) {
        let NodeKind::Element { name, open, close } = &mut self.nodes[id.0].kind else {
            return;
        };
        if close.is_none() {
            // 自闭合元素展开成成对标签
            let head = open.trim_end_matches('>').trim_end_matches('/').trim_end();
            *open = format!("{}>", head);
            *close = Some(format!("</{}>", name));
        }
        if !open.contains("xml:space") {
            let head = open.trim_end_matches('>');
            *open = format!("{} xml:space=\"preserve\">", head);
        }

        for child in std::mem::take(&mut self.nodes[id.0].children) {
            self.nodes[child.0].parent = None;
        }
        if !text.is_empty() {
            let raw = partial_escape(text).into_owned();
            let text_id = self.push_detached(NodeKind::Text { raw });
            self.append_child(id, text_id);
        }
    }

    /// 新建一个空元素（未挂到树上）
    pub fn create_element(&mut self, name: &str) -> NodeId {
        self.push_detached(NodeKind::Element {
            name: name.to_string(),
            open: format!("<{}>", name),
            close: Some(format!("</{}>", name)),
        })
    }

    /// 深拷贝子树，返回未挂到树上的新根
    pub fn deep_clone(&mut self, id: NodeId) -> NodeId {
        let kind = self.nodes[id.0].kind.clone();
        let copy = self.push_detached(kind);
        let children = self.nodes[id.0].children.clone();
        for child in children {
            let child_copy = self.deep_clone(child);
            self.append_child(copy, child_copy);
        }
        copy
    }

    /// 把节点从父节点上摘下（节点本身仍留在 arena 中）
    pub fn detach(&mut self, id: NodeId) {
        if let Some(parent) = self.nodes[id.0].parent.take() {
            self.nodes[parent.0].children.retain(|&child| child != id);
        }
    }

    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        self.detach(child);
        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].children.push(child);
    }

    /// 插入到 `anchor` 之前（同一父节点下）
    pub fn insert_before(&mut self, anchor: NodeId, node: NodeId) {
        let Some(parent) = self.nodes[anchor.0].parent else {
            return;
        };
        self.detach(node);
        let position = self.nodes[parent.0]
            .children
            .iter()
            .position(|&child| child == anchor)
            .unwrap_or(self.nodes[parent.0].children.len());
        self.nodes[node.0].parent = Some(parent);
        self.nodes[parent.0].children.insert(position, node);
    }
}
