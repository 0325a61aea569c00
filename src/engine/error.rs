use thiserror::Error;

use crate::model::{DatabaseError, ResourceType};

pub type EngineResult<T> = std::result::Result<T, EngineError>;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("{resource} `{id}` not found")]
    NotFound { resource: ResourceType, id: String },
    #[error("remote failure: {0}")]
    RemoteFailure(#[from] DatabaseError),
    #[error("lesson `{lesson_id}` is locked")]
    LessonLocked { lesson_id: String },
    #[error("student `{student_id}` is not enrolled in course `{course_id}`")]
    NotEnrolled {
        course_id: String,
        student_id: String,
    },
    #[error("operation cancelled")]
    Cancelled,
}

impl EngineError {
    pub fn not_found(resource: ResourceType, id: impl Into<String>) -> Self {
        Self::NotFound {
            resource,
            id: id.into(),
        }
    }
}
