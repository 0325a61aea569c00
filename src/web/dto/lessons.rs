use serde::{Deserialize, Serialize};

use crate::model::entity::{Lesson, LessonCreate, LessonPage, LessonProgress};

#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct LessonResponse {
    pub id: String,
    pub course_id: String,
    pub title: String,
    pub order: i32,
    pub pages: Vec<LessonPage>,
}

impl From<Lesson> for LessonResponse {
    fn from(lesson: Lesson) -> Self {
        Self {
            id: lesson.id().to_string(),
            course_id: lesson.course_id().to_string(),
            title: lesson.title().to_string(),
            order: lesson.order(),
            pages: lesson.pages().to_vec(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct LessonDoneResponse {
    pub lesson_id: String,
    pub completed_at: chrono::DateTime<chrono::Utc>,
}

impl From<LessonProgress> for LessonDoneResponse {
    fn from(progress: LessonProgress) -> Self {
        Self {
            lesson_id: progress.lesson_id().to_string(),
            completed_at: progress.completed_at(),
        }
    }
}

/// Fields left out keep their current value.
#[derive(Debug, Clone, Deserialize, utoipa::ToSchema)]
pub struct LessonUpdateRequest {
    pub title: Option<String>,
    pub pages: Option<Vec<LessonPage>>,
    pub order: Option<i32>,
}

impl LessonUpdateRequest {
    pub fn merge_into(self, lesson: &Lesson) -> LessonCreate {
        LessonCreate {
            course_id: lesson.course_id().to_string(),
            title: self.title.unwrap_or_else(|| lesson.title().to_string()),
            pages: self.pages.unwrap_or_else(|| lesson.pages().to_vec()),
            order: Some(self.order.unwrap_or(lesson.order())),
        }
    }
}
