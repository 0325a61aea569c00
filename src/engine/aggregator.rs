//! Tutor dashboard analytics.
//!
//! For each of a tutor's courses the aggregator fetches the quiz, the
//! accepted enrolments and the lessons, then evaluates every student
//! concurrently (bounded by a semaphore) and folds the outcomes into one
//! [`CourseAnalytics`]. Failures stay local: a student whose data cannot be
//! fetched is left out and counted as unavailable, a course whose data
//! cannot be fetched gets an error report while its siblings still succeed.

use std::future::Future;
use std::sync::Arc;

use futures::stream::{FuturesUnordered, StreamExt};
use serde::{Deserialize, Serialize};
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;

use crate::config::EngineConfig;
use crate::engine::{CompletionState, EngineError, EngineResult, classifier, tracker};
use crate::model::Store;
use crate::model::entity::{Course, EnrolmentStatus, Lesson, Quiz};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct CourseAnalytics {
    pub course_id: String,
    pub course_title: String,
    /// Accepted enrolments.
    pub enrolled_count: usize,
    /// Mean completion percentage of the evaluated students, 0 without any.
    pub average_progress: f64,
    pub completed_count: usize,
    pub passed_quiz_count: usize,
    /// Students left out because their progress could not be fetched.
    pub unavailable_students: usize,
}

/// Analytics of one course, or why they could not be computed.
#[derive(Debug)]
pub struct CourseReport {
    pub course_id: String,
    pub course_title: String,
    pub analytics: EngineResult<CourseAnalytics>,
}

/// What one student contributes to the course totals.
#[derive(Debug, Clone, Copy)]
struct StudentOutcome {
    completed_lessons: usize,
    completed: bool,
    passed_quiz: bool,
}

#[derive(Debug, Default)]
struct CourseAccumulator {
    evaluated: usize,
    completed_lessons: usize,
    completed: usize,
    passed_quiz: usize,
    unavailable: usize,
}

impl CourseAccumulator {
    fn add(&mut self, outcome: StudentOutcome) {
        self.evaluated += 1;
        self.completed_lessons += outcome.completed_lessons;
        self.completed += usize::from(outcome.completed);
        self.passed_quiz += usize::from(outcome.passed_quiz);
    }

    /// Mean of the per-student percentages. Every student shares the same
    /// lesson count, so the mean is computed from integer totals and does not
    /// depend on the order students finished in.
    fn average_progress(&self, lesson_count: usize) -> f64 {
        if self.evaluated == 0 || lesson_count == 0 {
            return 0.0;
        }
        100.0 * self.completed_lessons as f64 / (lesson_count * self.evaluated) as f64
    }
}

async fn limited<F, T>(semaphore: &Semaphore, fut: F) -> T
where
    F: Future<Output = T>,
{
    // the semaphore is never closed, a failed acquire only lifts the bound
    let _permit = semaphore.acquire().await.ok();
    fut.await
}

pub struct DashboardAggregator<S: ?Sized> {
    store: Arc<S>,
    config: EngineConfig,
}

impl<S> DashboardAggregator<S>
where
    S: Store + ?Sized,
{
    pub fn new(store: Arc<S>, config: EngineConfig) -> Self {
        Self { store, config }
    }

    /// Like [`Self::aggregate`], but gives up with `Cancelled` as soon as
    /// `cancel` fires. Nothing partial is returned.
    pub async fn aggregate_with_cancel(
        &self,
        tutor_id: &str,
        cancel: &CancellationToken,
    ) -> EngineResult<Vec<CourseReport>> {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                tracing::debug!("dashboard aggregation for {tutor_id} cancelled");
                Err(EngineError::Cancelled)
            }
            reports = self.aggregate(tutor_id) => reports,
        }
    }

    /// One report per course of the tutor, in the order the store lists
    /// them. Only a failure to list the courses fails the whole call.
    #[tracing::instrument(skip(self))]
    pub async fn aggregate(&self, tutor_id: &str) -> EngineResult<Vec<CourseReport>> {
        let courses = self.store.courses_by_tutor(tutor_id).await?;
        let semaphore = Semaphore::new(self.config.max_concurrent_fetches.max(1));

        let reports = futures::future::join_all(
            courses
                .iter()
                .map(|course| self.course_report(course, &semaphore)),
        )
        .await;

        tracing::debug!("aggregated {} courses for tutor {tutor_id}", reports.len());
        Ok(reports)
    }

    async fn course_report(&self, course: &Course, semaphore: &Semaphore) -> CourseReport {
        let analytics = self.course_analytics(course, semaphore).await;
        if let Err(e) = &analytics {
            tracing::error!("analytics unavailable for course {}: {e}", course.id());
        }

        CourseReport {
            course_id: course.id().to_string(),
            course_title: course.title().to_string(),
            analytics,
        }
    }

    async fn course_analytics(
        &self,
        course: &Course,
        semaphore: &Semaphore,
    ) -> EngineResult<CourseAnalytics> {
        let course_id = course.id();
        let (quiz, enrolments, lessons) = tokio::try_join!(
            limited(semaphore, self.store.quiz_by_course(course_id)),
            limited(
                semaphore,
                self.store
                    .enrolments_by_course(course_id, Some(EnrolmentStatus::Accepted))
            ),
            limited(semaphore, self.store.lessons_by_course(course_id)),
        )?;

        let mut pending: FuturesUnordered<_> = enrolments
            .iter()
            // the store filters already, this keeps a sloppy store honest
            .filter(|e| e.is_accepted())
            .map(|e| {
                self.student_outcome(course_id, e.student_id(), &lessons, quiz.as_ref(), semaphore)
            })
            .collect();

        let enrolled_count = pending.len();
        let mut acc = CourseAccumulator::default();
        while let Some((student_id, outcome)) = pending.next().await {
            match outcome {
                Ok(outcome) => acc.add(outcome),
                Err(e) => {
                    tracing::warn!(
                        "skipping student {student_id} in course {course_id} analytics: {e}"
                    );
                    acc.unavailable += 1;
                }
            }
        }

        Ok(CourseAnalytics {
            course_id: course_id.to_string(),
            course_title: course.title().to_string(),
            enrolled_count,
            average_progress: acc.average_progress(lessons.len()),
            completed_count: acc.completed,
            passed_quiz_count: acc.passed_quiz,
            unavailable_students: acc.unavailable,
        })
    }

    async fn student_outcome<'a>(
        &self,
        course_id: &str,
        student_id: &'a str,
        lessons: &[Lesson],
        quiz: Option<&Quiz>,
        semaphore: &Semaphore,
    ) -> (&'a str, EngineResult<StudentOutcome>) {
        let outcome = self
            .evaluate_student(course_id, student_id, lessons, quiz, semaphore)
            .await;
        (student_id, outcome)
    }

    async fn evaluate_student(
        &self,
        course_id: &str,
        student_id: &str,
        lessons: &[Lesson],
        quiz: Option<&Quiz>,
        semaphore: &Semaphore,
    ) -> EngineResult<StudentOutcome> {
        let progress = limited(
            semaphore,
            self.store.progress_by_student(course_id, student_id),
        )
        .await?;
        let completed_lessons = tracker::completed_count(lessons, &progress);

        let Some(quiz) = quiz else {
            // without a quiz nobody is classified or passes
            return Ok(StudentOutcome {
                completed_lessons,
                completed: false,
                passed_quiz: false,
            });
        };

        // an unreadable result counts as absent, the progress above still counts
        let result = match limited(semaphore, self.store.quiz_result(quiz.id(), student_id)).await {
            Ok(result) => result,
            Err(e) => {
                tracing::warn!(
                    "quiz result lookup failed for quiz {}, student {student_id}: {e}",
                    quiz.id()
                );
                None
            }
        };
        let state = classifier::classify(
            lessons,
            &progress,
            result.as_ref(),
            self.config.pass_threshold,
        );
        // TODO: decide with product whether this should use the quiz's pass_percentage
        let passed_quiz = result
            .as_ref()
            .is_some_and(|r| r.score() >= self.config.dashboard_pass_bar);

        Ok(StudentOutcome {
            completed_lessons,
            completed: state == CompletionState::Completed,
            passed_quiz,
        })
    }
}
