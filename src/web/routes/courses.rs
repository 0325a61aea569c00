use axum::Json;
use axum::extract::Path;
use axum::http::StatusCode;
use axum::routing::{post, put};
use axum::{Router, extract::State, middleware, response::IntoResponse, routing::get};

use crate::engine::CourseOverview;
use crate::model::entity::{Course, Enrolment};
use crate::model::{ResourceType, ResourceTyped, check_access};
use crate::web::dto::courses::{CompletionResponse, CourseLessonsResponse, EnrolmentDecisionRequest};
use crate::web::error::ErrorResponse;
use crate::web::{
    AppState, AuthenticatedUser, RequestContext, UserRole, WebError, WebResult, middlewares,
};

pub fn routes<S>(state: AppState) -> Router<S> {
    Router::new()
        .route("/{id}/lessons", get(courses_lessons_handler))
        .route("/{id}/completion", get(courses_completion_handler))
        .route("/{id}/enrol", post(courses_enrol_handler))
        .route("/{id}/enrolments/{student_id}", put(courses_enrolment_decide_handler))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            middlewares::extract_context_fn,
        ))
        .with_state(state)
}

async fn find_course(state: &AppState, id: &str) -> WebResult<Course> {
    state
        .store()
        .course_by_id(id)
        .await
        .map_err(|e| WebError::resource_fetch_error(Course::get_resource_type(), e))?
        .ok_or_else(|| WebError::resource_not_found(Course::get_resource_type(), id))
}

/// Students need an accepted enrolment, staff see the course as-is.
async fn overview_for(
    state: &AppState,
    course_id: &str,
    user: &AuthenticatedUser,
) -> WebResult<CourseOverview> {
    let progression = state.progression();
    let map_err = |e| WebError::from_engine(ResourceType::Course, e);

    if user.user_role() == UserRole::Student {
        progression
            .ensure_enrolled(course_id, user.user_id())
            .await
            .map_err(map_err)?;
    }

    progression
        .overview(course_id, user.user_id())
        .await
        .map_err(map_err)
}

#[utoipa::path(
    get,
    path = "/api/v1/courses/{course_id}/lessons",
    description = "List the lessons of a course in order, each with its status for the current student",
    params(
        ("course_id" = String, Path, description = "ID of the course")
    ),
    responses(
        (status = 200, description = "Lessons with status", body = CourseLessonsResponse),
        (status = 404, description = "Course not found", body = ErrorResponse),
        (status = 403, description = "Not enrolled", body = ErrorResponse),
        (status = 401, description = "You're not authorized to do this", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    security(
        ("cookie" = [])
    ),
    tag = "courses"
)]
async fn courses_lessons_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ctx: RequestContext,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;
    let overview = overview_for(&state, &id, user).await?;

    Ok((StatusCode::OK, Json(CourseLessonsResponse::from(overview))))
}

#[utoipa::path(
    get,
    path = "/api/v1/courses/{course_id}/completion",
    description = "Completion state of the current student in a course",
    params(
        ("course_id" = String, Path, description = "ID of the course")
    ),
    responses(
        (status = 200, description = "Completion state", body = CompletionResponse),
        (status = 404, description = "Course not found", body = ErrorResponse),
        (status = 403, description = "Not enrolled", body = ErrorResponse),
        (status = 401, description = "You're not authorized to do this", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    security(
        ("cookie" = [])
    ),
    tag = "courses"
)]
async fn courses_completion_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ctx: RequestContext,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;
    let overview = overview_for(&state, &id, user).await?;

    Ok((StatusCode::OK, Json(CompletionResponse::from(overview))))
}

#[utoipa::path(
    post,
    path = "/api/v1/courses/{course_id}/enrol",
    description = "Request enrolment in a course. A repeated request resets it to PENDING",
    params(
        ("course_id" = String, Path, description = "ID of the course")
    ),
    responses(
        (status = 201, description = "Enrolment requested", body = Enrolment),
        (status = 404, description = "Course not found", body = ErrorResponse),
        (status = 401, description = "You're not authorized to do this", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    security(
        ("cookie" = [])
    ),
    tag = "courses"
)]
async fn courses_enrol_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ctx: RequestContext,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;
    let course = find_course(&state, &id).await?;

    let enrolment = state
        .store()
        .request_enrolment(course.id(), user.user_id())
        .await
        .map_err(|e| WebError::resource_fetch_error(Enrolment::get_resource_type(), e))?;

    tracing::info!("{} requested enrolment in {}", user.user_id(), course.id());
    Ok((StatusCode::CREATED, Json(enrolment)))
}

#[utoipa::path(
    put,
    path = "/api/v1/courses/{course_id}/enrolments/{student_id}",
    description = "Accept or reject an enrolment request. Only the course's tutor can decide",
    params(
        ("course_id" = String, Path, description = "ID of the course"),
        ("student_id" = String, Path, description = "ID of the student"),
    ),
    request_body = EnrolmentDecisionRequest,
    responses(
        (status = 200, description = "Enrolment updated", body = Enrolment),
        (status = 404, description = "Course or enrolment not found", body = ErrorResponse),
        (status = 403, description = "Not the course's tutor", body = ErrorResponse),
        (status = 401, description = "You're not authorized to do this", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    security(
        ("cookie" = [])
    ),
    tag = "courses"
)]
async fn courses_enrolment_decide_handler(
    State(state): State<AppState>,
    Path((id, student_id)): Path<(String, String)>,
    ctx: RequestContext,
    Json(payload): Json<EnrolmentDecisionRequest>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;
    user.require_tutor()?;

    let course = find_course(&state, &id).await?;
    check_access(user, &course)
        .map_err(|_| WebError::resource_forbidden(Course::get_resource_type()))?;

    let enrolment = state
        .store()
        .update_enrolment_status(course.id(), &student_id, payload.status)
        .await
        .map_err(|e| WebError::resource_fetch_error(Enrolment::get_resource_type(), e))?
        .ok_or_else(|| {
            WebError::resource_not_found(Enrolment::get_resource_type(), format!("{id}/{student_id}"))
        })?;

    tracing::info!(
        "enrolment of {student_id} in {} set to {}",
        course.id(),
        enrolment.status()
    );
    Ok((StatusCode::OK, Json(enrolment)))
}
