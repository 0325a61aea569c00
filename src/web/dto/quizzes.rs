use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::engine::{GradedAttempt, QuestionOutcome};
use crate::model::entity::QuizResult;

/// Raw answers keyed by question id.
#[derive(Debug, Clone, Deserialize, utoipa::ToSchema)]
pub struct SubmitQuizRequest {
    pub answers: HashMap<String, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct SubmitQuizResponse {
    pub result_id: String,
    pub quiz_id: String,
    pub score: i32,
    pub max_score: i32,
    pub outcomes: Vec<QuestionOutcome>,
    pub submitted_at: DateTime<Utc>,
}

impl From<GradedAttempt> for SubmitQuizResponse {
    fn from(attempt: GradedAttempt) -> Self {
        Self {
            result_id: attempt.result.id().to_string(),
            quiz_id: attempt.result.quiz_id().to_string(),
            score: attempt.score(),
            max_score: attempt.max_score,
            outcomes: attempt.outcomes,
            submitted_at: attempt.result.submitted_at(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct QuizResultResponse {
    pub result_id: String,
    pub quiz_id: String,
    pub student_id: String,
    pub score: i32,
    pub submitted_at: DateTime<Utc>,
}

impl From<QuizResult> for QuizResultResponse {
    fn from(result: QuizResult) -> Self {
        Self {
            result_id: result.id().to_string(),
            quiz_id: result.quiz_id().to_string(),
            student_id: result.student_id().to_string(),
            score: result.score(),
            submitted_at: result.submitted_at(),
        }
    }
}
