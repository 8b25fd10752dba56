use crate::models::question::Question;

/// 一份打乱后的试卷
///
/// 题目是基础题目列表的深拷贝，答案各自独立重排；`answer_key` 与题目一一对应。
#[derive(Debug, Clone)]
pub struct ExamVariant {
    pub questions: Vec<Question>,
    pub answer_key: Vec<Option<char>>,
}

impl ExamVariant {
    /// 由题目顺序推导答案
    pub fn new(questions: Vec<Question>) -> Self {
        let answer_key = questions.iter().map(Question::correct_letter).collect();
        Self {
            questions,
            answer_key,
        }
    }
}
