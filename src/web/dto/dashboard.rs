use serde::{Deserialize, Serialize};

use crate::engine::{CourseAnalytics, CourseReport};

#[derive(Debug, Clone, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct DashboardQuery {
    /// Admins may look at another tutor's dashboard.
    pub tutor_id: Option<String>,
}

/// One course of the dashboard. Exactly one of `analytics` and `error` is set.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct CourseReportResponse {
    pub course_id: String,
    pub course_title: String,
    pub analytics: Option<CourseAnalytics>,
    pub error: Option<String>,
}

impl From<CourseReport> for CourseReportResponse {
    fn from(report: CourseReport) -> Self {
        let (analytics, error) = match report.analytics {
            Ok(analytics) => (Some(analytics), None),
            Err(e) => (None, Some(e.to_string())),
        };
        Self {
            course_id: report.course_id,
            course_title: report.course_title,
            analytics,
            error,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct DashboardResponse {
    pub tutor_id: String,
    pub courses: Vec<CourseReportResponse>,
}
