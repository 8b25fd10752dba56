//! 变体打乱服务 - 业务能力层
//!
//! 只负责"打乱"能力：输入基础题目列表和随机源，输出一份变体。
//! 随机源由调用方注入，同一个种子得到同一份结果。

use crate::models::{Answer, ExamVariant, Question};
use rand::seq::SliceRandom;
use rand::Rng;
use tracing::debug;

/// 生成一份变体
///
/// 1. 按分组标签分组，保持首次出现的顺序
/// 2. 规则 1/3 的分组内打乱题目顺序
/// 3. 规则 2/3 的题目打乱未固定的答案，固定答案留在原位
pub fn generate_variant<R: Rng + ?Sized>(base: &[Question], rng: &mut R) -> ExamVariant {
    let mut questions = Vec::with_capacity(base.len());

    for (key, mut members) in partition_by_group(base) {
        let Some(rule) = members.first().map(|q| q.group.rule) else {
            continue;
        };
        if rule.shuffles_questions() {
            members.shuffle(&mut *rng);
        }
        debug!("分组 {}: {} 道题", key, members.len());

        questions.extend(
            members
                .into_iter()
                .map(|question| shuffle_answers(question, &mut *rng)),
        );
    }

    ExamVariant::new(questions)
}

/// 按分组标签分组（插入顺序）
pub fn partition_by_group(questions: &[Question]) -> Vec<(String, Vec<&Question>)> {
    let mut groups: Vec<(String, Vec<&Question>)> = Vec::new();
    for question in questions {
        let key = question.group.key();
        match groups.iter_mut().find(|(existing, _)| *existing == key) {
            Some((_, members)) => members.push(question),
            None => groups.push((key, vec![question])),
        }
    }
    groups
}

/// 深拷贝题目并按规则重排答案
///
/// 答案挤在同一段落里的题目无法单独移动答案，保持原顺序。
pub fn shuffle_answers<R: Rng + ?Sized>(question: &Question, rng: &mut R) -> Question {
    let mut copy = question.clone();
    if !question.group.rule.shuffles_answers() || question.answers_share_paragraph() {
        return copy;
    }

    let mut pool: Vec<Answer> = question
        .answers
        .iter()
        .filter(|answer| !answer.is_pinned)
        .cloned()
        .collect();
    pool.shuffle(&mut *rng);
    let mut pool = pool.into_iter();

    copy.answers = question
        .answers
        .iter()
        .filter_map(|answer| {
            if answer.is_pinned {
                Some(answer.clone())
            } else {
                pool.next()
            }
        })
        .collect();
    copy
}
