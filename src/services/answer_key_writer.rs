//! 答案表服务 - 业务能力层
//!
//! 只负责把各变体的答案整理成表格并写成 .xlsx，不关心变体如何生成

use crate::error::{ExamError, ExamResult};
use rust_xlsxwriter::{Format, Workbook};
use serde::Serialize;

/// 无法判断正确答案时的占位
pub const UNKNOWN_ANSWER: &str = "N/A";

/// 答案表：每行一个题号，每列一个变体
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnswerKeyTable {
    /// 各列对应的试卷代码
    pub codes: Vec<u32>,
    /// `rows[题号 - 1][变体下标]`
    pub rows: Vec<Vec<String>>,
}

impl AnswerKeyTable {
    /// 由 (试卷代码, 答案序列) 构建
    ///
    /// 各变体题目数相同；若不同，缺的格子填占位符。
    pub fn build(keys: &[(u32, Vec<Option<char>>)]) -> Self {
        let question_count = keys.iter().map(|(_, key)| key.len()).max().unwrap_or(0);
        let rows = (0..question_count)
            .map(|row| {
                keys.iter()
                    .map(|(_, key)| match key.get(row).copied().flatten() {
                        Some(letter) => letter.to_string(),
                        None => UNKNOWN_ANSWER.to_string(),
                    })
                    .collect()
            })
            .collect();

        Self {
            codes: keys.iter().map(|(code, _)| *code).collect(),
            rows,
        }
    }

    /// 写成 .xlsx
    pub fn to_xlsx(&self) -> ExamResult<Vec<u8>> {
        self.write_workbook()
            .map_err(|e| ExamError::package_write("AnswerKey.xlsx", e))
    }

    fn write_workbook(&self) -> Result<Vec<u8>, rust_xlsxwriter::XlsxError> {
        let mut workbook = Workbook::new();
        let header = Format::new().set_bold();
        let worksheet = workbook.add_worksheet();
        worksheet.set_name("Answer Key")?;

        worksheet.write_string_with_format(0, 0, "Question", &header)?;
        for (col, code) in self.codes.iter().enumerate() {
            let title = format!("Exam {}", code);
            worksheet.write_string_with_format(0, col as u16 + 1, &title, &header)?;
        }

        for (row, letters) in self.rows.iter().enumerate() {
            let row_index = row as u32 + 1;
            worksheet.write_number(row_index, 0, (row + 1) as f64)?;
            for (col, letter) in letters.iter().enumerate() {
                worksheet.write_string(row_index, col as u16 + 1, letter)?;
            }
        }

        workbook.save_to_buffer()
    }
}
