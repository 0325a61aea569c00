//! Per-lesson status and completion percentage for one student.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::engine::{completed_ids, sorted_lessons};
use crate::model::entity::{Lesson, LessonProgress};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LessonStatus {
    Locked,
    Available,
    Completed,
}

/// Status of every lesson, keyed by lesson id.
///
/// Walks the lessons in `order` once: a completed lesson is `Completed`, the
/// first lesson or one right after a `Completed` lesson is `Available`, the
/// rest are `Locked`.
pub fn status_of(lessons: &[Lesson], progress: &[LessonProgress]) -> HashMap<String, LessonStatus> {
    statuses_in_order(lessons, progress)
        .into_iter()
        .map(|(lesson, status)| (lesson.id().to_string(), status))
        .collect()
}

/// Same walk as [`status_of`], keeping the course order.
pub fn statuses_in_order<'a>(
    lessons: &'a [Lesson],
    progress: &[LessonProgress],
) -> Vec<(&'a Lesson, LessonStatus)> {
    let completed = completed_ids(progress);
    let mut previous: Option<LessonStatus> = None;

    sorted_lessons(lessons)
        .into_iter()
        .map(|lesson| {
            let status = if completed.contains(lesson.id()) {
                LessonStatus::Completed
            } else if matches!(previous, None | Some(LessonStatus::Completed)) {
                LessonStatus::Available
            } else {
                LessonStatus::Locked
            };
            previous = Some(status);
            (lesson, status)
        })
        .collect()
}

/// Number of `lessons` that have a progress record.
pub fn completed_count(lessons: &[Lesson], progress: &[LessonProgress]) -> usize {
    let completed = completed_ids(progress);
    lessons
        .iter()
        .filter(|lesson| completed.contains(lesson.id()))
        .count()
}

/// Share of `lessons` completed, in `[0, 100]`. An empty course is at 0.
pub fn percent_complete(lessons: &[Lesson], progress: &[LessonProgress]) -> f64 {
    if lessons.is_empty() {
        return 0.0;
    }

    100.0 * completed_count(lessons, progress) as f64 / lessons.len() as f64
}
