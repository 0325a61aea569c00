use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;

use crate::model::key::QuizResultKey;
use crate::model::repo::{QuizResultRepository, ResourceType, ResourceTyped};
use crate::model::{ModelManager, error::DatabaseResult};

/// The single stored attempt of a student at a quiz.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, utoipa::ToSchema)]
pub struct QuizResult {
    id: String,
    quiz_id: String,
    student_id: String,
    /// Raw answers by question id.
    #[sqlx(json)]
    answers: HashMap<String, String>,
    score: i32,
    submitted_at: DateTime<Utc>,
}

impl ResourceTyped for QuizResult {
    fn get_resource_type() -> ResourceType {
        ResourceType::QuizResult
    }
}

impl QuizResult {
    pub fn new(
        quiz_id: impl Into<String>,
        student_id: impl Into<String>,
        answers: HashMap<String, String>,
        score: i32,
        submitted_at: DateTime<Utc>,
    ) -> Self {
        let quiz_id = quiz_id.into();
        let student_id = student_id.into();
        Self {
            id: QuizResultKey::new(&quiz_id, &student_id).to_string(),
            quiz_id,
            student_id,
            answers,
            score,
            submitted_at,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn key(&self) -> QuizResultKey {
        QuizResultKey::new(&self.quiz_id, &self.student_id)
    }

    pub fn quiz_id(&self) -> &str {
        &self.quiz_id
    }

    pub fn student_id(&self) -> &str {
        &self.student_id
    }

    pub fn answers(&self) -> &HashMap<String, String> {
        &self.answers
    }

    pub fn score(&self) -> i32 {
        self.score
    }

    pub fn submitted_at(&self) -> DateTime<Utc> {
        self.submitted_at
    }
}

#[async_trait]
impl QuizResultRepository for ModelManager {
    async fn quiz_result(
        &self,
        quiz_id: &str,
        student_id: &str,
    ) -> DatabaseResult<Option<QuizResult>> {
        let key = QuizResultKey::new(quiz_id, student_id);
        let result = sqlx::query_as("SELECT * FROM quiz_results WHERE id = $1")
            .bind(key.to_string())
            .fetch_optional(self.executor())
            .await?;
        Ok(result)
    }

    async fn quiz_results_by_quiz(&self, quiz_id: &str) -> DatabaseResult<Vec<QuizResult>> {
        let result = sqlx::query_as(
            "SELECT * FROM quiz_results WHERE quiz_id = $1 ORDER BY submitted_at DESC",
        )
        .bind(quiz_id)
        .fetch_all(self.executor())
        .await?;
        Ok(result)
    }

    async fn save_quiz_result(&self, result: &QuizResult) -> DatabaseResult<()> {
        sqlx::query(
            r#"
            INSERT INTO quiz_results (id, quiz_id, student_id, answers, score, submitted_at)
            VALUES ($1,$2,$3,$4,$5,$6)
            ON CONFLICT (id) DO UPDATE
            SET answers = EXCLUDED.answers,
                score = EXCLUDED.score,
                submitted_at = EXCLUDED.submitted_at
            "#,
        )
        .bind(&result.id)
        .bind(&result.quiz_id)
        .bind(&result.student_id)
        .bind(sqlx::types::Json(&result.answers))
        .bind(result.score)
        .bind(result.submitted_at)
        .execute(self.executor())
        .await?;

        Ok(())
    }
}
