use axum::Json;
use axum::extract::Path;
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Router, extract::State, middleware, response::IntoResponse, routing::get};

use crate::model::entity::{Course, Lesson};
use crate::model::{ResourceType, ResourceTyped, check_access};
use crate::web::dto::lessons::{LessonDoneResponse, LessonResponse, LessonUpdateRequest};
use crate::web::error::ErrorResponse;
use crate::web::{AppState, RequestContext, WebError, WebResult, middlewares};

pub fn routes<S>(state: AppState) -> Router<S> {
    Router::new()
        .route("/{id}", get(lessons_get_handler).put(lessons_update_handler))
        .route("/{id}/done", post(lessons_mark_done_handler))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            middlewares::extract_context_fn,
        ))
        .with_state(state)
}

#[utoipa::path(
    get,
    path = "/api/v1/lessons/{lesson_id}",
    description = "Open a lesson with its pages. Only the first lesson of a course and lessons whose predecessor is completed can be opened",
    params(
        ("lesson_id" = String, Path, description = "ID of the lesson to open")
    ),
    responses(
        (status = 200, description = "Lesson found", body = LessonResponse),
        (status = 404, description = "Lesson not found", body = ErrorResponse),
        (status = 403, description = "Lesson locked or not enrolled", body = ErrorResponse),
        (status = 401, description = "You're not authorized to do this", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    security(
        ("cookie" = [])
    ),
    tag = "lessons"
)]
async fn lessons_get_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ctx: RequestContext,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;
    let lesson = state
        .progression()
        .open_lesson(&id, user.user_id())
        .await
        .map(LessonResponse::from)
        .map_err(|e| WebError::from_engine(ResourceType::Lesson, e))?;

    Ok((StatusCode::OK, Json(lesson)))
}

#[utoipa::path(
    post,
    path = "/api/v1/lessons/{lesson_id}/done",
    description = "Mark an open lesson as completed",
    params(
        ("lesson_id" = String, Path, description = "ID of the lesson to mark")
    ),
    responses(
        (status = 200, description = "Lesson marked", body = LessonDoneResponse),
        (status = 404, description = "Lesson not found", body = ErrorResponse),
        (status = 403, description = "Lesson locked or not enrolled", body = ErrorResponse),
        (status = 401, description = "You're not allowed to do this", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    security(
        ("cookie" = [])
    ),
    tag = "lessons"
)]
async fn lessons_mark_done_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ctx: RequestContext,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;
    let progress = state
        .progression()
        .complete_lesson(&id, user.user_id())
        .await
        .map_err(|e| WebError::from_engine(ResourceType::LessonProgress, e))?;

    Ok((StatusCode::OK, Json(LessonDoneResponse::from(progress))))
}

#[utoipa::path(
    put,
    path = "/api/v1/lessons/{lesson_id}",
    description = "Edit a lesson, e.g. move it within its course. Only the course's tutor can edit",
    params(
        ("lesson_id" = String, Path, description = "ID of the lesson to edit")
    ),
    request_body = LessonUpdateRequest,
    responses(
        (status = 200, description = "Lesson updated", body = LessonResponse),
        (status = 404, description = "Lesson not found", body = ErrorResponse),
        (status = 403, description = "Not the course's tutor", body = ErrorResponse),
        (status = 401, description = "You're not authorized to do this", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    security(
        ("cookie" = [])
    ),
    tag = "lessons"
)]
async fn lessons_update_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ctx: RequestContext,
    Json(payload): Json<LessonUpdateRequest>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;
    user.require_tutor()?;

    let lesson = state
        .store()
        .lesson_by_id(&id)
        .await
        .map_err(|e| WebError::resource_fetch_error(Lesson::get_resource_type(), e))?
        .ok_or_else(|| WebError::resource_not_found(Lesson::get_resource_type(), &id))?;

    let course = state
        .store()
        .course_by_id(lesson.course_id())
        .await
        .map_err(|e| WebError::resource_fetch_error(Course::get_resource_type(), e))?
        .ok_or_else(|| {
            WebError::resource_not_found(Course::get_resource_type(), lesson.course_id())
        })?;
    check_access(user, &course)
        .map_err(|_| WebError::resource_forbidden(Lesson::get_resource_type()))?;

    let updated = state
        .store()
        .update_lesson(lesson.id(), payload.merge_into(&lesson))
        .await
        .map_err(|e| WebError::resource_fetch_error(Lesson::get_resource_type(), e))?
        .ok_or_else(|| WebError::resource_not_found(Lesson::get_resource_type(), &id))?;

    tracing::info!("lesson {} updated by {}", updated.id(), user.user_id());
    Ok((StatusCode::OK, Json(LessonResponse::from(updated))))
}
