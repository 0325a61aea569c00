//! Quiz grading.
//!
//! Every question is worth its `marks` on an exact match and nothing
//! otherwise. Answers arrive as raw strings; anything that does not parse for
//! the question type is simply wrong, grading never fails.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::engine::{EngineError, EngineResult};
use crate::model::entity::{AnswerKey, QuizQuestion, QuizResult};
use crate::model::{QuizRepository, QuizResultRepository, ResourceType};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct QuestionOutcome {
    pub question_id: String,
    pub awarded: i32,
    pub max: i32,
}

impl QuestionOutcome {
    pub fn is_correct(&self) -> bool {
        self.awarded == self.max
    }
}

/// A scored attempt together with the per-question breakdown.
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct GradedAttempt {
    pub result: QuizResult,
    pub outcomes: Vec<QuestionOutcome>,
    pub max_score: i32,
}

impl GradedAttempt {
    pub fn score(&self) -> i32 {
        self.result.score()
    }
}

/// Parses a single choice index. Leading zeros are fine, `"02"` is `2`, but
/// surrounding whitespace is not.
fn parse_choice(raw: &str) -> Option<i32> {
    raw.parse().ok()
}

/// Parses `"3,1"` (or `"[3, 1]"`) into sorted indices, dropping entries that
/// are not integers.
fn parse_choices(raw: &str) -> Vec<i32> {
    let trimmed = raw.trim();
    let inner = trimmed
        .strip_prefix('[')
        .and_then(|s| s.strip_suffix(']'))
        .unwrap_or(trimmed);

    let mut indices: Vec<i32> = inner
        .split(',')
        .map(str::trim)
        .filter_map(parse_choice)
        .collect();
    indices.sort_unstable();
    indices
}

fn normalize_text(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Whether `answer` matches the question's key exactly.
pub fn is_correct(question: &QuizQuestion, answer: Option<&str>) -> bool {
    let Some(answer) = answer else {
        return false;
    };

    match question.answer() {
        AnswerKey::Mcq {
            correct_answer_index,
        } => parse_choice(answer) == Some(*correct_answer_index),
        AnswerKey::Msq {
            correct_answer_indices,
        } => {
            let mut expected = correct_answer_indices.clone();
            expected.sort_unstable();
            parse_choices(answer) == expected
        }
        AnswerKey::Fill {
            correct_answer_text,
        } => normalize_text(answer) == normalize_text(correct_answer_text),
    }
}

/// Scores `answers` (question id to raw answer) against `questions`.
///
/// The result is keyed by (quiz, student), so storing it replaces any earlier
/// attempt.
pub fn grade(
    quiz_id: &str,
    student_id: &str,
    questions: &[QuizQuestion],
    answers: HashMap<String, String>,
) -> GradedAttempt {
    let outcomes: Vec<QuestionOutcome> = questions
        .iter()
        .map(|question| {
            let answer = answers.get(question.id()).map(String::as_str);
            let awarded = if is_correct(question, answer) {
                question.marks()
            } else {
                0
            };
            QuestionOutcome {
                question_id: question.id().to_string(),
                awarded,
                max: question.marks(),
            }
        })
        .collect();

    let score = outcomes
        .iter()
        .fold(0i32, |acc, o| acc.saturating_add(o.awarded));
    let max_score = questions
        .iter()
        .fold(0i32, |acc, q| acc.saturating_add(q.marks()));

    GradedAttempt {
        result: QuizResult::new(quiz_id, student_id, answers, score, Utc::now()),
        outcomes,
        max_score,
    }
}

/// Grades submissions and stores them.
pub struct QuizGrader<S: ?Sized> {
    store: Arc<S>,
}

impl<S> QuizGrader<S>
where
    S: QuizRepository + QuizResultRepository + ?Sized,
{
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Grades against the quiz's current questions and overwrites the
    /// student's stored attempt.
    #[tracing::instrument(skip(self, answers))]
    pub async fn submit(
        &self,
        quiz_id: &str,
        student_id: &str,
        answers: HashMap<String, String>,
    ) -> EngineResult<GradedAttempt> {
        if self.store.quiz_by_id(quiz_id).await?.is_none() {
            return Err(EngineError::not_found(ResourceType::Quiz, quiz_id));
        }

        let questions = self.store.questions_by_quiz(quiz_id).await?;
        let attempt = grade(quiz_id, student_id, &questions, answers);
        self.store.save_quiz_result(&attempt.result).await?;

        tracing::info!(
            "quiz {quiz_id} graded for {student_id}: {}/{}",
            attempt.score(),
            attempt.max_score
        );
        Ok(attempt)
    }
}
