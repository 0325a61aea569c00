//! Lesson access gating.

use crate::engine::{completed_ids, sorted_lessons};
use crate::model::entity::{Lesson, LessonProgress};

/// Whether the lesson `target_id` is open to a student with `progress`.
///
/// The first lesson of the course is always open; any other lesson opens once
/// the lesson right before it (in `order`) is completed. A lesson that is not
/// part of `lessons` is never open.
pub fn can_access(target_id: &str, lessons: &[Lesson], progress: &[LessonProgress]) -> bool {
    let sorted = sorted_lessons(lessons);

    let Some(position) = sorted.iter().position(|lesson| lesson.id() == target_id) else {
        tracing::debug!("lesson {target_id} is not part of the given course lessons");
        return false;
    };

    if position == 0 {
        return true;
    }

    let previous = sorted[position - 1];
    completed_ids(progress).contains(previous.id())
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::engine::test_support::{lesson, progress};

    #[test]
    fn test_first_lesson_always_open() {
        let lessons = vec![lesson("b", 2), lesson("a", 1), lesson("c", 3)];
        assert!(can_access("a", &lessons, &[]));
        assert!(can_access("a", &lessons, &[progress("c")]));
    }

    #[test]
    fn test_next_lesson_needs_previous_completed() {
        let lessons = vec![lesson("a", 1), lesson("b", 2), lesson("c", 3)];
        let done = vec![progress("a")];

        assert!(can_access("b", &lessons, &done));
        assert!(!can_access("c", &lessons, &done));
        assert!(!can_access("b", &lessons, &[]));
    }

    #[test]
    fn test_completing_a_later_lesson_does_not_open_the_gap() {
        let lessons = vec![lesson("a", 1), lesson("b", 2), lesson("c", 3)];
        assert!(!can_access("c", &lessons, &[progress("a")]));
        assert!(can_access("c", &lessons, &[progress("b")]));
    }

    #[test]
    fn test_equal_orders_keep_input_position() {
        // x and y share order 1, x comes first in the input
        let lessons = vec![lesson("x", 1), lesson("y", 1), lesson("z", 0)];

        assert!(can_access("z", &lessons, &[]));
        assert!(can_access("x", &lessons, &[progress("z")]));
        assert!(!can_access("y", &lessons, &[progress("z")]));
        assert!(can_access("y", &lessons, &[progress("x")]));
    }

    #[test]
    fn test_unknown_lesson_is_closed() {
        let lessons = vec![lesson("a", 1)];
        assert!(!can_access("missing", &lessons, &[progress("a")]));
        assert!(!can_access("a", &[], &[]));
    }
}
