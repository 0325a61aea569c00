use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;

use crate::model::repo::{LessonRepository, ResourceType, ResourceTyped};
use crate::model::{ModelManager, error::DatabaseResult, new_id};

/// A block of lesson content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    Text {
        text: String,
    },
    Image {
        url: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        caption: Option<String>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct LessonPage {
    pub id: String,
    #[serde(default)]
    pub blocks: Vec<ContentBlock>,
}

impl LessonPage {
    pub fn new(blocks: Vec<ContentBlock>) -> Self {
        Self {
            id: new_id(),
            blocks,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, utoipa::ToSchema)]
pub struct Lesson {
    id: String,
    course_id: String,
    title: String,
    #[sqlx(json)]
    pages: Vec<LessonPage>,
    /// Position in the course; not unique.
    order_index: i32,
    created_at: DateTime<Utc>,
}

impl ResourceTyped for Lesson {
    fn get_resource_type() -> ResourceType {
        ResourceType::Lesson
    }
}

impl Lesson {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn course_id(&self) -> &str {
        &self.course_id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn pages(&self) -> &[LessonPage] {
        &self.pages
    }

    pub fn order(&self) -> i32 {
        self.order_index
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, utoipa::ToSchema)]
pub struct LessonCreate {
    pub course_id: String,
    pub title: String,
    #[serde(default)]
    pub pages: Vec<LessonPage>,
    pub order: Option<i32>,
}

impl LessonCreate {
    pub fn into_lesson(self, id: String) -> Lesson {
        Lesson {
            id,
            course_id: self.course_id,
            title: self.title,
            pages: self.pages,
            order_index: self.order.unwrap_or(0),
            created_at: Utc::now(),
        }
    }
}

#[async_trait]
impl LessonRepository for ModelManager {
    async fn lessons_by_course(&self, course_id: &str) -> DatabaseResult<Vec<Lesson>> {
        let result = sqlx::query_as(
            "SELECT * FROM lessons WHERE course_id = $1 ORDER BY order_index ASC, created_at ASC, id ASC",
        )
        .bind(course_id)
        .fetch_all(self.executor())
        .await?;
        Ok(result)
    }

    async fn lesson_by_id(&self, lesson_id: &str) -> DatabaseResult<Option<Lesson>> {
        let result = sqlx::query_as("SELECT * FROM lessons WHERE id = $1")
            .bind(lesson_id)
            .fetch_optional(self.executor())
            .await?;
        Ok(result)
    }

    async fn create_lesson(&self, data: LessonCreate) -> DatabaseResult<Lesson> {
        let lesson = data.into_lesson(new_id());
        sqlx::query(
            "INSERT INTO lessons (id, course_id, title, pages, order_index, created_at) VALUES ($1,$2,$3,$4,$5,$6)",
        )
        .bind(&lesson.id)
        .bind(&lesson.course_id)
        .bind(&lesson.title)
        .bind(sqlx::types::Json(&lesson.pages))
        .bind(lesson.order_index)
        .bind(lesson.created_at)
        .execute(self.executor())
        .await?;

        Ok(lesson)
    }

    async fn update_lesson(
        &self,
        lesson_id: &str,
        data: LessonCreate,
    ) -> DatabaseResult<Option<Lesson>> {
        let result = sqlx::query_as(
            r#"
            UPDATE lessons
            SET course_id = $1, title = $2, pages = $3, order_index = $4
            WHERE id = $5
            RETURNING *
            "#,
        )
        .bind(&data.course_id)
        .bind(&data.title)
        .bind(sqlx::types::Json(&data.pages))
        .bind(data.order.unwrap_or(0))
        .bind(lesson_id)
        .fetch_optional(self.executor())
        .await?;

        Ok(result)
    }
}
