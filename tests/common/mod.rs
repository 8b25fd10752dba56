//! 测试用的内存 .docx 构建器

#![allow(dead_code)]

use std::io::{Cursor, Read, Write};
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

pub const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/></Types>"#;

pub const RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/></Relationships>"#;

pub const STYLES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:styles xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:style w:type="paragraph" w:styleId="Normal"><w:name w:val="Normal"/></w:style></w:styles>"#;

pub const HEADER_PARAGRAPH: &str =
    r#"<w:p><w:pPr><w:jc w:val="center"/></w:pPr><w:r><w:rPr><w:b/></w:rPr><w:t>SCHOOL EXAM</w:t></w:r></w:p>"#;

pub const SECTION_PROPERTIES: &str =
    r#"<w:sectPr><w:pgSz w:w="11906" w:h="16838"/></w:sectPr>"#;

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// 普通段落
pub fn para(text: &str) -> String {
    format!(
        r#"<w:p><w:r><w:t xml:space="preserve">{}</w:t></w:r></w:p>"#,
        escape(text)
    )
}

/// 带下划线（正确答案）的段落
pub fn underlined(text: &str) -> String {
    format!(
        r#"<w:p><w:r><w:rPr><w:u w:val="single"/></w:rPr><w:t xml:space="preserve">{}</w:t></w:r></w:p>"#,
        escape(text)
    )
}

/// 标红（正确答案）的段落
pub fn red(text: &str) -> String {
    format!(
        r#"<w:p><w:r><w:rPr><w:color w:val="FF0000"/></w:rPr><w:t xml:space="preserve">{}</w:t></w:r></w:p>"#,
        escape(text)
    )
}

/// 运行片段的格式
#[derive(Clone, Copy, PartialEq, Eq)]
pub enum Mark {
    Plain,
    Underline,
    Red,
}

/// 由多个 run 组成的段落
pub fn runs(parts: &[(&str, Mark)]) -> String {
    let body: String = parts
        .iter()
        .map(|(text, mark)| {
            let properties = match mark {
                Mark::Plain => "",
                Mark::Underline => r#"<w:rPr><w:u w:val="single"/></w:rPr>"#,
                Mark::Red => r#"<w:rPr><w:color w:val="FF0000"/></w:rPr>"#,
            };
            format!(
                r#"<w:r>{}<w:t xml:space="preserve">{}</w:t></w:r>"#,
                properties,
                escape(text)
            )
        })
        .collect();
    format!("<w:p>{}</w:p>", body)
}

/// 完整的 document.xml：抬头段落 + 给定段落 + 节属性
pub fn document_xml(paragraphs: &[String]) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>{}{}{}</w:body></w:document>"#,
        HEADER_PARAGRAPH,
        paragraphs.concat(),
        SECTION_PROPERTIES
    )
}

/// 用给定条目构建 zip
pub fn zip_entries(entries: &[(&str, &str)]) -> Vec<u8> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = FileOptions::default().compression_method(CompressionMethod::Deflated);
    for (name, content) in entries {
        writer.start_file(*name, options).unwrap();
        writer.write_all(content.as_bytes()).unwrap();
    }
    writer.finish().unwrap().into_inner()
}

/// 构建 .docx
pub fn docx(paragraphs: &[String]) -> Vec<u8> {
    let document = document_xml(paragraphs);
    zip_entries(&[
        ("[Content_Types].xml", CONTENT_TYPES),
        ("_rels/.rels", RELS),
        ("word/document.xml", &document),
        ("word/styles.xml", STYLES),
    ])
}

/// 读出 zip 中某个条目
pub fn read_entry(bytes: &[u8], name: &str) -> Vec<u8> {
    let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
    let mut entry = archive.by_name(name).unwrap();
    let mut content = Vec::new();
    entry.read_to_end(&mut content).unwrap();
    content
}

/// zip 中的条目名（排序后）
pub fn entry_names(bytes: &[u8]) -> Vec<String> {
    let archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
    let mut names: Vec<String> = archive.file_names().map(str::to_string).collect();
    names.sort();
    names
}

/// 一道四选一的题目，`correct` 为正确答案下标（下划线标记）
pub fn mcq(stem: &str, answers: [&str; 4], correct: usize) -> Vec<String> {
    let mut paragraphs = vec![para(stem)];
    for (index, answer) in answers.iter().enumerate() {
        let text = format!("{}. {}", (b'A' + index as u8) as char, answer);
        if index == correct {
            paragraphs.push(underlined(&text));
        } else {
            paragraphs.push(para(&text));
        }
    }
    paragraphs
}
