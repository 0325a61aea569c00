//! Course-level completion state of one student.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::engine::completed_ids;
use crate::model::QuizResultRepository;
use crate::model::entity::{Lesson, LessonProgress, QuizResult};

/// Default raw score a quiz result must reach to count as passed.
pub const DEFAULT_PASS_THRESHOLD: i32 = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CompletionState {
    NotStarted,
    InProgress,
    QuizPending,
    Completed,
}

/// Where a student stands on the lessons alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LessonStage {
    NotStarted,
    InProgress,
    AllCompleted,
}

fn lesson_stage(lessons: &[Lesson], progress: &[LessonProgress]) -> LessonStage {
    let completed = completed_ids(progress);

    // an empty course with no progress is "not started", not "completed"
    if completed.is_empty() {
        LessonStage::NotStarted
    } else if !lessons.iter().all(|lesson| completed.contains(lesson.id())) {
        LessonStage::InProgress
    } else {
        LessonStage::AllCompleted
    }
}

fn quiz_outcome(quiz_result: Option<&QuizResult>, pass_threshold: i32) -> CompletionState {
    match quiz_result {
        Some(result) if result.score() >= pass_threshold => CompletionState::Completed,
        _ => CompletionState::QuizPending,
    }
}

/// Classifies a student from already fetched values.
pub fn classify(
    lessons: &[Lesson],
    progress: &[LessonProgress],
    quiz_result: Option<&QuizResult>,
    pass_threshold: i32,
) -> CompletionState {
    match lesson_stage(lessons, progress) {
        LessonStage::NotStarted => CompletionState::NotStarted,
        LessonStage::InProgress => CompletionState::InProgress,
        LessonStage::AllCompleted => quiz_outcome(quiz_result, pass_threshold),
    }
}

/// [`classify`] with the quiz result looked up on demand.
#[derive(Debug)]
pub struct CompletionClassifier<S: ?Sized> {
    store: Arc<S>,
    pass_threshold: i32,
}

impl<S: ?Sized> Clone for CompletionClassifier<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            pass_threshold: self.pass_threshold,
        }
    }
}

impl<S> CompletionClassifier<S>
where
    S: QuizResultRepository + ?Sized,
{
    pub fn new(store: Arc<S>, pass_threshold: i32) -> Self {
        Self {
            store,
            pass_threshold,
        }
    }

    pub fn pass_threshold(&self) -> i32 {
        self.pass_threshold
    }

    /// The quiz result is only fetched once every lesson is completed. A
    /// course without a quiz, a missing result and a failed lookup all leave
    /// the student at `QuizPending`.
    pub async fn classify(
        &self,
        quiz_id: Option<&str>,
        student_id: &str,
        lessons: &[Lesson],
        progress: &[LessonProgress],
    ) -> CompletionState {
        match lesson_stage(lessons, progress) {
            LessonStage::NotStarted => CompletionState::NotStarted,
            LessonStage::InProgress => CompletionState::InProgress,
            LessonStage::AllCompleted => {
                let Some(quiz_id) = quiz_id else {
                    return CompletionState::QuizPending;
                };

                let result = match self.store.quiz_result(quiz_id, student_id).await {
                    Ok(result) => result,
                    Err(e) => {
                        tracing::warn!(
                            "quiz result lookup failed for quiz {quiz_id}, student {student_id}: {e}"
                        );
                        None
                    }
                };

                quiz_outcome(result.as_ref(), self.pass_threshold)
            }
        }
    }
}

#[cfg(test)]
mod test {
    use std::collections::HashMap;

    use chrono::Utc;

    use super::*;
    use crate::engine::test_support::{lesson, progress};

    fn result(score: i32) -> QuizResult {
        QuizResult::new("quiz", "student", HashMap::new(), score, Utc::now())
    }

    #[test]
    fn test_not_started() {
        let lessons = vec![lesson("a", 1), lesson("b", 2)];
        assert_eq!(
            classify(&lessons, &[], Some(&result(100)), DEFAULT_PASS_THRESHOLD),
            CompletionState::NotStarted
        );
    }

    #[test]
    fn test_empty_course_without_progress_is_not_started() {
        assert_eq!(
            classify(&[], &[], None, DEFAULT_PASS_THRESHOLD),
            CompletionState::NotStarted
        );
    }

    #[test]
    fn test_in_progress() {
        let lessons = vec![lesson("a", 1), lesson("b", 2)];
        assert_eq!(
            classify(&lessons, &[progress("a")], Some(&result(100)), DEFAULT_PASS_THRESHOLD),
            CompletionState::InProgress
        );
    }

    #[test]
    fn test_all_lessons_done_quiz_decides() {
        let lessons = vec![lesson("a", 1), lesson("b", 2)];
        let done = vec![progress("a"), progress("b")];

        assert_eq!(
            classify(&lessons, &done, None, DEFAULT_PASS_THRESHOLD),
            CompletionState::QuizPending
        );
        assert_eq!(
            classify(&lessons, &done, Some(&result(40)), DEFAULT_PASS_THRESHOLD),
            CompletionState::QuizPending
        );
        assert_eq!(
            classify(&lessons, &done, Some(&result(50)), DEFAULT_PASS_THRESHOLD),
            CompletionState::Completed
        );
        assert_eq!(
            classify(&lessons, &done, Some(&result(60)), DEFAULT_PASS_THRESHOLD),
            CompletionState::Completed
        );
    }

    #[test]
    fn test_custom_threshold() {
        let lessons = vec![lesson("a", 1)];
        let done = vec![progress("a")];

        assert_eq!(
            classify(&lessons, &done, Some(&result(6)), 5),
            CompletionState::Completed
        );
        assert_eq!(
            classify(&lessons, &done, Some(&result(4)), 5),
            CompletionState::QuizPending
        );
    }
}
