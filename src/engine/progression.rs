use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::engine::classifier::CompletionClassifier;
use crate::engine::{CompletionState, EngineError, EngineResult, LessonStatus, gate, tracker};
use crate::model::entity::{EnrolmentStatus, Lesson, LessonProgress, ProgressCreate};
use crate::model::{ResourceType, Store};

#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct LessonEntry {
    pub lesson_id: String,
    pub title: String,
    pub order: i32,
    pub status: LessonStatus,
}

/// One student's standing in one course.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct CourseOverview {
    pub course_id: String,
    pub lessons: Vec<LessonEntry>,
    pub percent_complete: f64,
    pub state: CompletionState,
}

/// Student-facing operations: what is open, what is done, where they stand.
pub struct Progression<S: ?Sized> {
    store: Arc<S>,
    classifier: CompletionClassifier<S>,
}

impl<S> Progression<S>
where
    S: Store + ?Sized,
{
    pub fn new(store: Arc<S>, pass_threshold: i32) -> Self {
        Self {
            classifier: CompletionClassifier::new(Arc::clone(&store), pass_threshold),
            store,
        }
    }

    /// Fails with `NotEnrolled` unless the student's enrolment was accepted.
    pub async fn ensure_enrolled(&self, course_id: &str, student_id: &str) -> EngineResult<()> {
        let accepted = self
            .store
            .enrolments_by_student(student_id, Some(EnrolmentStatus::Accepted))
            .await?
            .iter()
            .any(|e| e.course_id() == course_id);

        if accepted {
            Ok(())
        } else {
            Err(EngineError::NotEnrolled {
                course_id: course_id.to_string(),
                student_id: student_id.to_string(),
            })
        }
    }

    async fn course_state(
        &self,
        course_id: &str,
        student_id: &str,
    ) -> EngineResult<(Vec<Lesson>, Vec<LessonProgress>)> {
        let (lessons, progress) = tokio::try_join!(
            self.store.lessons_by_course(course_id),
            self.store.progress_by_student(course_id, student_id),
        )?;
        Ok((lessons, progress))
    }

    #[tracing::instrument(skip(self))]
    pub async fn overview(&self, course_id: &str, student_id: &str) -> EngineResult<CourseOverview> {
        if self.store.course_by_id(course_id).await?.is_none() {
            return Err(EngineError::not_found(ResourceType::Course, course_id));
        }

        let (lessons, progress) = self.course_state(course_id, student_id).await?;
        let quiz = self.store.quiz_by_course(course_id).await?;

        let state = self
            .classifier
            .classify(quiz.as_ref().map(|q| q.id()), student_id, &lessons, &progress)
            .await;

        let entries = tracker::statuses_in_order(&lessons, &progress)
            .into_iter()
            .map(|(lesson, status)| LessonEntry {
                lesson_id: lesson.id().to_string(),
                title: lesson.title().to_string(),
                order: lesson.order(),
                status,
            })
            .collect();

        Ok(CourseOverview {
            course_id: course_id.to_string(),
            lessons: entries,
            percent_complete: tracker::percent_complete(&lessons, &progress),
            state,
        })
    }

    /// The lesson, if the student may open it.
    #[tracing::instrument(skip(self))]
    pub async fn open_lesson(&self, lesson_id: &str, student_id: &str) -> EngineResult<Lesson> {
        let Some(lesson) = self.store.lesson_by_id(lesson_id).await? else {
            return Err(EngineError::not_found(ResourceType::Lesson, lesson_id));
        };
        self.ensure_enrolled(lesson.course_id(), student_id).await?;

        let (lessons, progress) = self.course_state(lesson.course_id(), student_id).await?;
        if !gate::can_access(lesson.id(), &lessons, &progress) {
            return Err(EngineError::LessonLocked {
                lesson_id: lesson_id.to_string(),
            });
        }

        Ok(lesson)
    }

    /// Records the lesson as completed; only an open lesson can be completed.
    #[tracing::instrument(skip(self))]
    pub async fn complete_lesson(
        &self,
        lesson_id: &str,
        student_id: &str,
    ) -> EngineResult<LessonProgress> {
        let lesson = self.open_lesson(lesson_id, student_id).await?;
        let progress = self
            .store
            .mark_lesson_completed(ProgressCreate::new(
                student_id,
                lesson.course_id(),
                lesson.id(),
            ))
            .await?;

        tracing::debug!("lesson {lesson_id} completed by {student_id}");
        Ok(progress)
    }
}
