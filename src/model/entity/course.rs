use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;

use crate::model::access::HasOwner;
use crate::model::repo::{CourseRepository, ResourceType, ResourceTyped};
use crate::model::{ModelManager, error::DatabaseResult, new_id};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, utoipa::ToSchema)]
pub struct Course {
    id: String,
    tutor_id: String,
    title: String,
    description: String,
    created_at: DateTime<Utc>,
}

impl ResourceTyped for Course {
    fn get_resource_type() -> ResourceType {
        ResourceType::Course
    }
}

impl Course {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn tutor_id(&self) -> &str {
        &self.tutor_id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, utoipa::ToSchema)]
pub struct CourseCreate {
    pub tutor_id: String,
    pub title: String,
    pub description: String,
}

impl CourseCreate {
    pub fn into_course(self, id: String) -> Course {
        Course {
            id,
            tutor_id: self.tutor_id,
            title: self.title,
            description: self.description,
            created_at: Utc::now(),
        }
    }
}

#[async_trait]
impl CourseRepository for ModelManager {
    async fn course_by_id(&self, course_id: &str) -> DatabaseResult<Option<Course>> {
        let result = sqlx::query_as("SELECT * FROM courses WHERE id = $1")
            .bind(course_id)
            .fetch_optional(self.executor())
            .await?;
        Ok(result)
    }

    async fn courses_by_tutor(&self, tutor_id: &str) -> DatabaseResult<Vec<Course>> {
        let result = sqlx::query_as(
            "SELECT * FROM courses WHERE tutor_id = $1 ORDER BY created_at DESC, id",
        )
        .bind(tutor_id)
        .fetch_all(self.executor())
        .await?;
        Ok(result)
    }

    async fn create_course(&self, data: CourseCreate) -> DatabaseResult<Course> {
        let course = data.into_course(new_id());
        sqlx::query(
            "INSERT INTO courses (id, tutor_id, title, description, created_at) VALUES ($1,$2,$3,$4,$5)",
        )
        .bind(&course.id)
        .bind(&course.tutor_id)
        .bind(&course.title)
        .bind(&course.description)
        .bind(course.created_at)
        .execute(self.executor())
        .await?;

        Ok(course)
    }
}

impl HasOwner for Course {
    fn owner_id(&self) -> &str {
        &self.tutor_id
    }
}
