//! 基础设施层：持有文档包和标记树这两种"原始资源"，只暴露读写能力

pub mod docx_package;
pub mod xml_tree;

pub use docx_package::{DocxPackage, MAIN_DOCUMENT_PART};
pub use xml_tree::{NodeId, XmlTree};
