use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;

use crate::model::error::DatabaseError;
use crate::model::repo::{QuizRepository, ResourceType, ResourceTyped};
use crate::model::{ModelManager, error::DatabaseResult, new_id};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, utoipa::ToSchema)]
pub struct Quiz {
    id: String,
    course_id: String,
    title: String,
    description: String,
    created_by: String,
    total_marks: i32,
    /// 0..=100
    pass_percentage: i32,
    created_at: DateTime<Utc>,
}

impl ResourceTyped for Quiz {
    fn get_resource_type() -> ResourceType {
        ResourceType::Quiz
    }
}

impl Quiz {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn course_id(&self) -> &str {
        &self.course_id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn created_by(&self) -> &str {
        &self.created_by
    }

    pub fn total_marks(&self) -> i32 {
        self.total_marks
    }

    pub fn pass_percentage(&self) -> i32 {
        self.pass_percentage
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, utoipa::ToSchema)]
pub struct QuizCreate {
    pub course_id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub created_by: String,
    pub total_marks: i32,
    pub pass_percentage: i32,
}

impl QuizCreate {
    pub fn into_quiz(self, id: String) -> Quiz {
        Quiz {
            id,
            course_id: self.course_id,
            title: self.title,
            description: self.description,
            created_by: self.created_by,
            total_marks: self.total_marks,
            pass_percentage: self.pass_percentage.clamp(0, 100),
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum QuestionType {
    /// Single choice.
    Mcq,
    /// Multiple choice, every correct option must be picked.
    Msq,
    /// Free text.
    Fill,
}

impl QuestionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Mcq => "MCQ",
            Self::Msq => "MSQ",
            Self::Fill => "FILL",
        }
    }
}

impl std::str::FromStr for QuestionType {
    type Err = DatabaseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "MCQ" => Ok(Self::Mcq),
            "MSQ" => Ok(Self::Msq),
            "FILL" => Ok(Self::Fill),
            other => Err(DatabaseError::invalid_row(
                "quiz_questions",
                format!("unknown question type `{other}`"),
            )),
        }
    }
}

/// The correct answer of a question, shaped by its type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(tag = "type", rename_all = "UPPERCASE")]
pub enum AnswerKey {
    Mcq { correct_answer_index: i32 },
    Msq { correct_answer_indices: Vec<i32> },
    Fill { correct_answer_text: String },
}

impl AnswerKey {
    pub fn question_type(&self) -> QuestionType {
        match self {
            Self::Mcq { .. } => QuestionType::Mcq,
            Self::Msq { .. } => QuestionType::Msq,
            Self::Fill { .. } => QuestionType::Fill,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct QuizQuestion {
    id: String,
    quiz_id: String,
    question_text: String,
    options: Vec<String>,
    marks: i32,
    answer: AnswerKey,
}

impl ResourceTyped for QuizQuestion {
    fn get_resource_type() -> ResourceType {
        ResourceType::QuizQuestion
    }
}

impl QuizQuestion {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn quiz_id(&self) -> &str {
        &self.quiz_id
    }

    pub fn question_text(&self) -> &str {
        &self.question_text
    }

    pub fn options(&self) -> &[String] {
        &self.options
    }

    pub fn marks(&self) -> i32 {
        self.marks
    }

    pub fn answer(&self) -> &AnswerKey {
        &self.answer
    }

    pub fn question_type(&self) -> QuestionType {
        self.answer.question_type()
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, utoipa::ToSchema)]
pub struct QuizQuestionCreate {
    pub quiz_id: String,
    pub question_text: String,
    #[serde(default)]
    pub options: Vec<String>,
    pub marks: i32,
    pub answer: AnswerKey,
}

impl QuizQuestionCreate {
    /// Fails unless `marks` is positive.
    pub fn into_question(self, id: String) -> DatabaseResult<QuizQuestion> {
        if self.marks <= 0 {
            return Err(DatabaseError::invalid_input(
                "quiz_questions",
                format!("marks must be positive, got {}", self.marks),
            ));
        }

        Ok(QuizQuestion {
            id,
            quiz_id: self.quiz_id,
            question_text: self.question_text,
            options: self.options,
            marks: self.marks,
            answer: self.answer,
        })
    }
}

/// Flat row of `quiz_questions`; only the answer column matching the type is set.
#[derive(Debug, FromRow)]
pub struct QuizQuestionRow {
    pub id: String,
    pub quiz_id: String,
    pub question_text: String,
    pub options: Vec<String>,
    pub question_type: String,
    pub marks: i32,
    pub correct_answer_index: Option<i32>,
    pub correct_answer_indices: Option<Vec<i32>>,
    pub correct_answer_text: Option<String>,
}

impl TryFrom<QuizQuestionRow> for QuizQuestion {
    type Error = DatabaseError;

    fn try_from(row: QuizQuestionRow) -> Result<Self, Self::Error> {
        let question_type: QuestionType = row.question_type.parse()?;
        let answer = match (
            question_type,
            row.correct_answer_index,
            row.correct_answer_indices,
            row.correct_answer_text,
        ) {
            (QuestionType::Mcq, Some(index), None, None) => AnswerKey::Mcq {
                correct_answer_index: index,
            },
            (QuestionType::Msq, None, Some(indices), None) => AnswerKey::Msq {
                correct_answer_indices: indices,
            },
            (QuestionType::Fill, None, None, Some(text)) => AnswerKey::Fill {
                correct_answer_text: text,
            },
            _ => {
                return Err(DatabaseError::invalid_row(
                    "quiz_questions",
                    format!(
                        "question {} of type {} has mismatched answer columns",
                        row.id,
                        question_type.as_str()
                    ),
                ));
            }
        };

        Ok(QuizQuestion {
            id: row.id,
            quiz_id: row.quiz_id,
            question_text: row.question_text,
            options: row.options,
            marks: row.marks,
            answer,
        })
    }
}

#[async_trait]
impl QuizRepository for ModelManager {
    async fn quiz_by_course(&self, course_id: &str) -> DatabaseResult<Option<Quiz>> {
        let result = sqlx::query_as(
            "SELECT * FROM quizzes WHERE course_id = $1 ORDER BY created_at ASC LIMIT 1",
        )
        .bind(course_id)
        .fetch_optional(self.executor())
        .await?;
        Ok(result)
    }

    async fn quiz_by_id(&self, quiz_id: &str) -> DatabaseResult<Option<Quiz>> {
        let result = sqlx::query_as("SELECT * FROM quizzes WHERE id = $1")
            .bind(quiz_id)
            .fetch_optional(self.executor())
            .await?;
        Ok(result)
    }

    async fn create_quiz(&self, data: QuizCreate) -> DatabaseResult<Quiz> {
        let quiz = data.into_quiz(new_id());
        sqlx::query(
            r#"
            INSERT INTO quizzes (id, course_id, title, description, created_by, total_marks, pass_percentage, created_at)
            VALUES ($1,$2,$3,$4,$5,$6,$7,$8)
            "#,
        )
        .bind(&quiz.id)
        .bind(&quiz.course_id)
        .bind(&quiz.title)
        .bind(&quiz.description)
        .bind(&quiz.created_by)
        .bind(quiz.total_marks)
        .bind(quiz.pass_percentage)
        .bind(quiz.created_at)
        .execute(self.executor())
        .await?;

        Ok(quiz)
    }

    async fn questions_by_quiz(&self, quiz_id: &str) -> DatabaseResult<Vec<QuizQuestion>> {
        let rows: Vec<QuizQuestionRow> = sqlx::query_as(
            "SELECT * FROM quiz_questions WHERE quiz_id = $1 ORDER BY position ASC",
        )
        .bind(quiz_id)
        .fetch_all(self.executor())
        .await?;

        rows.into_iter().map(QuizQuestion::try_from).collect()
    }

    async fn add_question(&self, data: QuizQuestionCreate) -> DatabaseResult<QuizQuestion> {
        let question = data.into_question(new_id())?;
        let (index, indices, text) = match question.answer() {
            AnswerKey::Mcq { correct_answer_index } => (Some(*correct_answer_index), None, None),
            AnswerKey::Msq { correct_answer_indices } => {
                (None, Some(correct_answer_indices.clone()), None)
            }
            AnswerKey::Fill { correct_answer_text } => {
                (None, None, Some(correct_answer_text.clone()))
            }
        };

        sqlx::query(
            r#"
            INSERT INTO quiz_questions (
                id, quiz_id, question_text, options, question_type, marks,
                correct_answer_index, correct_answer_indices, correct_answer_text
            )
            VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9)
            "#,
        )
        .bind(question.id())
        .bind(question.quiz_id())
        .bind(question.question_text())
        .bind(question.options())
        .bind(question.question_type().as_str())
        .bind(question.marks())
        .bind(index)
        .bind(indices)
        .bind(text)
        .execute(self.executor())
        .await?;

        Ok(question)
    }
}
