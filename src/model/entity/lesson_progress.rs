use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;

use crate::model::key::ProgressKey;
use crate::model::repo::{ProgressRepository, ResourceType, ResourceTyped};
use crate::model::{ModelManager, error::DatabaseResult};

/// Marks one lesson as completed by one student.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, utoipa::ToSchema)]
pub struct LessonProgress {
    id: String,
    student_id: String,
    course_id: String,
    lesson_id: String,
    completed_at: DateTime<Utc>,
}

impl ResourceTyped for LessonProgress {
    fn get_resource_type() -> ResourceType {
        ResourceType::LessonProgress
    }
}

impl LessonProgress {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn key(&self) -> ProgressKey {
        ProgressKey::new(&self.student_id, &self.lesson_id)
    }

    pub fn student_id(&self) -> &str {
        &self.student_id
    }

    pub fn course_id(&self) -> &str {
        &self.course_id
    }

    pub fn lesson_id(&self) -> &str {
        &self.lesson_id
    }

    pub fn completed_at(&self) -> DateTime<Utc> {
        self.completed_at
    }
}

#[derive(Debug, Clone)]
pub struct ProgressCreate {
    pub student_id: String,
    pub course_id: String,
    pub lesson_id: String,
}

impl ProgressCreate {
    pub fn new(
        student_id: impl Into<String>,
        course_id: impl Into<String>,
        lesson_id: impl Into<String>,
    ) -> Self {
        Self {
            student_id: student_id.into(),
            course_id: course_id.into(),
            lesson_id: lesson_id.into(),
        }
    }

    pub fn into_progress(self, completed_at: DateTime<Utc>) -> LessonProgress {
        let key = ProgressKey::new(&self.student_id, &self.lesson_id);
        LessonProgress {
            id: key.to_string(),
            student_id: self.student_id,
            course_id: self.course_id,
            lesson_id: self.lesson_id,
            completed_at,
        }
    }
}

#[async_trait]
impl ProgressRepository for ModelManager {
    async fn progress_by_student(
        &self,
        course_id: &str,
        student_id: &str,
    ) -> DatabaseResult<Vec<LessonProgress>> {
        let result = sqlx::query_as(
            "SELECT * FROM lesson_progress WHERE course_id = $1 AND student_id = $2",
        )
        .bind(course_id)
        .bind(student_id)
        .fetch_all(self.executor())
        .await?;
        Ok(result)
    }

    async fn mark_lesson_completed(&self, data: ProgressCreate) -> DatabaseResult<LessonProgress> {
        let progress = data.into_progress(Utc::now());
        sqlx::query(
            r#"
            INSERT INTO lesson_progress (id, student_id, course_id, lesson_id, completed_at)
            VALUES ($1,$2,$3,$4,$5)
            ON CONFLICT (id) DO UPDATE
            SET course_id = EXCLUDED.course_id, completed_at = EXCLUDED.completed_at
            "#,
        )
        .bind(&progress.id)
        .bind(&progress.student_id)
        .bind(&progress.course_id)
        .bind(&progress.lesson_id)
        .bind(progress.completed_at)
        .execute(self.executor())
        .await?;

        Ok(progress)
    }
}
