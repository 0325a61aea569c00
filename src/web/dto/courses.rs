use serde::{Deserialize, Serialize};

use crate::engine::{CompletionState, CourseOverview, LessonEntry};
use crate::model::entity::EnrolmentStatus;

#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct CourseLessonsResponse {
    pub course_id: String,
    pub percent_complete: f64,
    pub lessons: Vec<LessonEntry>,
}

impl From<CourseOverview> for CourseLessonsResponse {
    fn from(overview: CourseOverview) -> Self {
        Self {
            course_id: overview.course_id,
            percent_complete: overview.percent_complete,
            lessons: overview.lessons,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct CompletionResponse {
    pub course_id: String,
    pub state: CompletionState,
    pub percent_complete: f64,
}

impl From<CourseOverview> for CompletionResponse {
    fn from(overview: CourseOverview) -> Self {
        Self {
            course_id: overview.course_id,
            state: overview.state,
            percent_complete: overview.percent_complete,
        }
    }
}

#[derive(Debug, Clone, Deserialize, utoipa::ToSchema)]
pub struct EnrolmentDecisionRequest {
    pub status: EnrolmentStatus,
}
