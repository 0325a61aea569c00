//! Progression & assessment rules.
//!
//! The gate, tracker, classifier and grader are pure functions over values
//! that were already fetched. The services in this module ([`Progression`],
//! [`QuizGrader`], [`CompletionClassifier`], [`DashboardAggregator`]) wrap
//! them with the storage lookups they need, injected as an `Arc<S>`.

mod error;
pub use error::{EngineError, EngineResult};

pub mod gate;
pub mod tracker;

pub mod classifier;
pub use classifier::{CompletionClassifier, CompletionState};

pub mod grader;
pub use grader::{GradedAttempt, QuestionOutcome, QuizGrader};

mod progression;
pub use progression::{CourseOverview, LessonEntry, Progression};

pub mod aggregator;
pub use aggregator::{CourseAnalytics, CourseReport, DashboardAggregator};

pub use tracker::LessonStatus;

use std::collections::HashSet;

use crate::model::entity::{Lesson, LessonProgress};

/// Lessons ordered by `order`; equal orders keep their input position.
pub fn sorted_lessons(lessons: &[Lesson]) -> Vec<&Lesson> {
    let mut sorted: Vec<&Lesson> = lessons.iter().collect();
    // `sort_by_key` is stable, which is what keeps ties in input order
    sorted.sort_by_key(|lesson| lesson.order());
    sorted
}

/// Ids of every lesson the progress records mark as completed.
pub fn completed_ids(progress: &[LessonProgress]) -> HashSet<&str> {
    progress.iter().map(|p| p.lesson_id()).collect()
}
