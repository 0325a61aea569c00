use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::web::middlewares::AUTH_TOKEN;

pub struct CookieAuthModifier;

impl Modify for CookieAuthModifier {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(schema) = openapi.components.as_mut() {
            schema.add_security_scheme(
                "cookie",
                SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                    AUTH_TOKEN,
                    "JWT token for current user",
                ))),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::web::routes::courses::courses_lessons_handler,
        crate::web::routes::courses::courses_completion_handler,
        crate::web::routes::courses::courses_enrol_handler,
        crate::web::routes::courses::courses_enrolment_decide_handler,
        crate::web::routes::lessons::lessons_get_handler,
        crate::web::routes::lessons::lessons_mark_done_handler,
        crate::web::routes::lessons::lessons_update_handler,
        crate::web::routes::quizzes::quizzes_submit_handler,
        crate::web::routes::quizzes::quizzes_result_handler,
        crate::web::routes::quizzes::quizzes_results_handler,
        crate::web::routes::dashboard::dashboard_get_handler,
    ),
    modifiers(&CookieAuthModifier),
    tags(
        (name = "courses", description = "Lesson lists, completion and enrolment"),
        (name = "lessons", description = "Gated lesson access"),
        (name = "quizzes", description = "Submission and results"),
        (name = "dashboard", description = "Tutor analytics"),
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_openapi_lists_every_route() {
        let doc = ApiDoc::openapi();
        for path in [
            "/api/v1/courses/{course_id}/lessons",
            "/api/v1/courses/{course_id}/enrolments/{student_id}",
            "/api/v1/lessons/{lesson_id}/done",
            "/api/v1/quizzes/{quiz_id}/submit",
            "/api/v1/dashboard/",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }

        let lesson = &doc.paths.paths["/api/v1/lessons/{lesson_id}"];
        assert!(lesson.get.is_some());
        assert!(lesson.put.is_some());
    }
}
