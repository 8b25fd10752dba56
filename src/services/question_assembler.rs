//! 题目组装服务 - 业务能力层
//!
//! 显式状态机：`(状态, 已分类段落) → (新状态, 可能产出的题目)`。
//!
//! 当前分组是"粘性"的：每道题继承最近一次出现的分组标签，不向后看。

use crate::error::{ExamError, ExamResult};
use crate::infrastructure::XmlTree;
use crate::models::{
    Answer, ClassifiedLine, GroupTag, LineKind, Question, ANSWERS_PER_QUESTION,
};
use crate::services::correctness::MarkedText;
use crate::services::line_classifier;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;
use tracing::debug;

/// 答案标记：行首或空白之后的 `[#]X.`
pub static ANSWER_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(?:^|\s)(#?)([A-D])\.").expect("valid answer marker pattern"));

/// 组装阶段
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Phase {
    NoCurrentQuestion,
    BuildingQuestion(Question),
}

/// 状态机状态：阶段 + 粘性分组
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssemblyState {
    pub group: GroupTag,
    pub phase: Phase,
}

impl Default for AssemblyState {
    fn default() -> Self {
        Self {
            group: GroupTag::default(),
            phase: Phase::NoCurrentQuestion,
        }
    }
}

/// 答案块中的一个片段
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerFragment {
    pub letter: char,
    pub is_pinned: bool,
    pub text: String,
}

/// 在每个答案标记处切分答案块
pub fn split_fragments(text: &str) -> Vec<AnswerFragment> {
    let starts: Vec<(usize, bool, char)> = ANSWER_MARKER
        .captures_iter(text)
        .filter_map(|captures| {
            let pin = captures.get(1)?;
            let letter = captures.get(2)?.as_str().chars().next()?;
            Some((pin.start(), !pin.as_str().is_empty(), letter.to_ascii_uppercase()))
        })
        .collect();

    starts
        .iter()
        .enumerate()
        .map(|(index, &(start, is_pinned, letter))| {
            let end = starts
                .get(index + 1)
                .map(|&(next, _, _)| next)
                .unwrap_or(text.len());
            AnswerFragment {
                letter,
                is_pinned,
                text: text[start..end].trim().to_string(),
            }
        })
        .collect()
}

/// 校验即将关闭的题目
///
/// 纯文本题（没有答案）直接通过；否则必须恰好 4 个字母互不相同的答案。
pub fn validate_question(question: &Question) -> ExamResult<()> {
    if question.answers.is_empty() {
        return Ok(());
    }

    let mut seen = HashSet::new();
    for answer in &question.answers {
        if let Some(letter) = answer.letter {
            if !seen.insert(letter) {
                return Err(ExamError::DuplicateAnswerLetter {
                    question: question.text.clone(),
                    letter,
                });
            }
        }
    }

    if question.answers.len() != ANSWERS_PER_QUESTION {
        return Err(ExamError::WrongAnswerCount {
            question: question.text.clone(),
            count: question.answers.len(),
        });
    }
    Ok(())
}

/// 状态转移
///
/// 返回新状态和（如果有）刚关闭的题目。
pub fn transition(
    tree: &XmlTree,
    state: AssemblyState,
    line: &ClassifiedLine,
) -> ExamResult<(AssemblyState, Option<Question>)> {
    let AssemblyState { group, phase } = state;

    match (line.kind, phase) {
        (LineKind::GroupTag, phase) => {
            let group = line_classifier::parse_group_tag(&line.text).unwrap_or(group);
            debug!("切换分组: {}", group);
            Ok((AssemblyState { group, phase }, None))
        }

        (LineKind::Question, phase) => {
            let emitted = close(phase)?;
            let question = Question::new(line.text.trim(), line.source_node, group);
            Ok((
                AssemblyState {
                    group,
                    phase: Phase::BuildingQuestion(question),
                },
                emitted,
            ))
        }

        (LineKind::McqAnswer, Phase::NoCurrentQuestion) => Err(ExamError::OrphanAnswer {
            text: line.text.trim().to_string(),
        }),

        (LineKind::McqAnswer, Phase::BuildingQuestion(mut question)) => {
            append_answers(tree, &mut question, line);
            Ok((
                AssemblyState {
                    group,
                    phase: Phase::BuildingQuestion(question),
                },
                None,
            ))
        }

        // 判断题答案只做识别，按普通文本处理
        (LineKind::Text | LineKind::TfAnswer, Phase::BuildingQuestion(mut question)) => {
            if question.answers.is_empty() {
                question.text.push('\n');
                question.text.push_str(line.text.trim());
                question.source_nodes.push(line.source_node);
            } else {
                debug!("忽略答案之后的文本: {}", line.text.trim());
            }
            Ok((
                AssemblyState {
                    group,
                    phase: Phase::BuildingQuestion(question),
                },
                None,
            ))
        }

        (LineKind::Text | LineKind::TfAnswer, Phase::NoCurrentQuestion) => {
            debug!("忽略题目之外的文本: {}", line.text.trim());
            Ok((
                AssemblyState {
                    group,
                    phase: Phase::NoCurrentQuestion,
                },
                None,
            ))
        }
    }
}

/// 输入结束：关闭仍在构建中的题目
pub fn finish(state: AssemblyState) -> ExamResult<Option<Question>> {
    close(state.phase)
}

/// 依次喂入所有段落，得到题目列表
pub fn assemble(tree: &XmlTree, lines: &[ClassifiedLine]) -> ExamResult<Vec<Question>> {
    let mut questions = Vec::new();
    let mut state = AssemblyState::default();

    for line in lines {
        let (next, emitted) = transition(tree, state, line)?;
        questions.extend(emitted);
        state = next;
    }
    questions.extend(finish(state)?);

    Ok(questions)
}

fn close(phase: Phase) -> ExamResult<Option<Question>> {
    match phase {
        Phase::NoCurrentQuestion => Ok(None),
        Phase::BuildingQuestion(question) => {
            validate_question(&question)?;
            Ok(Some(question))
        }
    }
}

fn append_answers(tree: &XmlTree, question: &mut Question, line: &ClassifiedLine) {
    let marked = MarkedText::from_paragraph(tree, line.source_node);
    let fragments = split_fragments(&marked.text);
    let texts: Vec<&str> = fragments.iter().map(|f| f.text.as_str()).collect();
    let correctness = marked.fragments_marked(&texts);

    for (fragment, is_correct) in fragments.into_iter().zip(correctness) {
        let source_order = question.answers.len();
        question.answers.push(Answer {
            letter: Some(fragment.letter),
            raw_text: fragment.text,
            is_pinned: fragment.is_pinned,
            is_correct,
            source_node: line.source_node,
            source_order,
        });
    }
}
