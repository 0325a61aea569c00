use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;

use crate::model::error::DatabaseError;
use crate::model::key::EnrolmentKey;
use crate::model::repo::{EnrolmentRepository, ResourceType, ResourceTyped};
use crate::model::{ModelManager, error::DatabaseResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EnrolmentStatus {
    Pending,
    Accepted,
    Rejected,
}

impl EnrolmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Accepted => "ACCEPTED",
            Self::Rejected => "REJECTED",
        }
    }
}

impl TryFrom<String> for EnrolmentStatus {
    type Error = DatabaseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.as_str() {
            "PENDING" => Ok(Self::Pending),
            "ACCEPTED" => Ok(Self::Accepted),
            "REJECTED" => Ok(Self::Rejected),
            other => Err(DatabaseError::invalid_row(
                "enrolments",
                format!("unknown status `{other}`"),
            )),
        }
    }
}

impl std::fmt::Display for EnrolmentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, utoipa::ToSchema)]
pub struct Enrolment {
    id: String,
    course_id: String,
    student_id: String,
    #[sqlx(try_from = "String")]
    status: EnrolmentStatus,
    requested_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl ResourceTyped for Enrolment {
    fn get_resource_type() -> ResourceType {
        ResourceType::Enrolment
    }
}

impl Enrolment {
    /// A fresh `PENDING` request.
    pub fn request(course_id: impl Into<String>, student_id: impl Into<String>) -> Self {
        let course_id = course_id.into();
        let student_id = student_id.into();
        let now = Utc::now();
        Self {
            id: EnrolmentKey::new(&course_id, &student_id).to_string(),
            course_id,
            student_id,
            status: EnrolmentStatus::Pending,
            requested_at: now,
            updated_at: now,
        }
    }

    pub fn with_status(mut self, status: EnrolmentStatus) -> Self {
        self.status = status;
        self.updated_at = Utc::now();
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn key(&self) -> EnrolmentKey {
        EnrolmentKey::new(&self.course_id, &self.student_id)
    }

    pub fn course_id(&self) -> &str {
        &self.course_id
    }

    pub fn student_id(&self) -> &str {
        &self.student_id
    }

    pub fn status(&self) -> EnrolmentStatus {
        self.status
    }

    pub fn is_accepted(&self) -> bool {
        self.status == EnrolmentStatus::Accepted
    }

    pub fn requested_at(&self) -> DateTime<Utc> {
        self.requested_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}

#[async_trait]
impl EnrolmentRepository for ModelManager {
    async fn enrolments_by_course(
        &self,
        course_id: &str,
        status: Option<EnrolmentStatus>,
    ) -> DatabaseResult<Vec<Enrolment>> {
        let result = sqlx::query_as(
            r#"
            SELECT * FROM enrolments
            WHERE course_id = $1 AND ($2::TEXT IS NULL OR status = $2)
            ORDER BY requested_at ASC
            "#,
        )
        .bind(course_id)
        .bind(status.map(|s| s.as_str()))
        .fetch_all(self.executor())
        .await?;
        Ok(result)
    }

    async fn enrolments_by_student(
        &self,
        student_id: &str,
        status: Option<EnrolmentStatus>,
    ) -> DatabaseResult<Vec<Enrolment>> {
        let result = sqlx::query_as(
            r#"
            SELECT * FROM enrolments
            WHERE student_id = $1 AND ($2::TEXT IS NULL OR status = $2)
            ORDER BY requested_at ASC
            "#,
        )
        .bind(student_id)
        .bind(status.map(|s| s.as_str()))
        .fetch_all(self.executor())
        .await?;
        Ok(result)
    }

    async fn request_enrolment(
        &self,
        course_id: &str,
        student_id: &str,
    ) -> DatabaseResult<Enrolment> {
        let enrolment = Enrolment::request(course_id, student_id);
        sqlx::query(
            r#"
            INSERT INTO enrolments (id, course_id, student_id, status, requested_at, updated_at)
            VALUES ($1,$2,$3,$4,$5,$6)
            ON CONFLICT (id) DO UPDATE
            SET status = EXCLUDED.status,
                requested_at = EXCLUDED.requested_at,
                updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(&enrolment.id)
        .bind(&enrolment.course_id)
        .bind(&enrolment.student_id)
        .bind(enrolment.status.as_str())
        .bind(enrolment.requested_at)
        .bind(enrolment.updated_at)
        .execute(self.executor())
        .await?;

        Ok(enrolment)
    }

    async fn update_enrolment_status(
        &self,
        course_id: &str,
        student_id: &str,
        status: EnrolmentStatus,
    ) -> DatabaseResult<Option<Enrolment>> {
        let key = EnrolmentKey::new(course_id, student_id);
        let result = sqlx::query_as(
            "UPDATE enrolments SET status = $1, updated_at = $2 WHERE id = $3 RETURNING *",
        )
        .bind(status.as_str())
        .bind(Utc::now())
        .bind(key.to_string())
        .fetch_optional(self.executor())
        .await?;

        Ok(result)
    }
}
