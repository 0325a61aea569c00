use axum::Json;
use axum::extract::Path;
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Router, extract::State, middleware, response::IntoResponse, routing::get};

use crate::model::entity::{Course, Quiz, QuizResult};
use crate::model::{ResourceType, ResourceTyped, check_access};
use crate::web::dto::quizzes::{QuizResultResponse, SubmitQuizRequest, SubmitQuizResponse};
use crate::web::error::ErrorResponse;
use crate::web::{AppState, RequestContext, WebError, WebResult, middlewares};

pub fn routes<S>(state: AppState) -> Router<S> {
    Router::new()
        .route("/{id}/submit", post(quizzes_submit_handler))
        .route("/{id}/result", get(quizzes_result_handler))
        .route("/{id}/results", get(quizzes_results_handler))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            middlewares::extract_context_fn,
        ))
        .with_state(state)
}

async fn find_quiz(state: &AppState, id: &str) -> WebResult<Quiz> {
    state
        .store()
        .quiz_by_id(id)
        .await
        .map_err(|e| WebError::resource_fetch_error(Quiz::get_resource_type(), e))?
        .ok_or_else(|| WebError::resource_not_found(Quiz::get_resource_type(), id))
}

#[utoipa::path(
    post,
    path = "/api/v1/quizzes/{quiz_id}/submit",
    description = "Grade a submission and store it as the student's result. A resubmission replaces the previous result",
    params(
        ("quiz_id" = String, Path, description = "ID of the quiz")
    ),
    request_body = SubmitQuizRequest,
    responses(
        (status = 200, description = "Submission graded", body = SubmitQuizResponse),
        (status = 404, description = "Quiz not found", body = ErrorResponse),
        (status = 403, description = "Not enrolled", body = ErrorResponse),
        (status = 401, description = "You're not authorized to do this", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    security(
        ("cookie" = [])
    ),
    tag = "quizzes"
)]
async fn quizzes_submit_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ctx: RequestContext,
    Json(payload): Json<SubmitQuizRequest>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;
    let quiz = find_quiz(&state, &id).await?;

    state
        .progression()
        .ensure_enrolled(quiz.course_id(), user.user_id())
        .await
        .map_err(|e| WebError::from_engine(ResourceType::Quiz, e))?;

    let attempt = state
        .grader()
        .submit(quiz.id(), user.user_id(), payload.answers)
        .await
        .map_err(|e| WebError::from_engine(ResourceType::QuizResult, e))?;

    Ok((StatusCode::OK, Json(SubmitQuizResponse::from(attempt))))
}

#[utoipa::path(
    get,
    path = "/api/v1/quizzes/{quiz_id}/result",
    description = "The current student's stored result",
    params(
        ("quiz_id" = String, Path, description = "ID of the quiz")
    ),
    responses(
        (status = 200, description = "Result found", body = QuizResultResponse),
        (status = 404, description = "No result yet", body = ErrorResponse),
        (status = 401, description = "You're not authorized to do this", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    security(
        ("cookie" = [])
    ),
    tag = "quizzes"
)]
async fn quizzes_result_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ctx: RequestContext,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;
    let result = state
        .store()
        .quiz_result(&id, user.user_id())
        .await
        .map_err(|e| WebError::resource_fetch_error(QuizResult::get_resource_type(), e))?
        .ok_or_else(|| WebError::resource_not_found(QuizResult::get_resource_type(), &id))?;

    Ok((StatusCode::OK, Json(QuizResultResponse::from(result))))
}

#[utoipa::path(
    get,
    path = "/api/v1/quizzes/{quiz_id}/results",
    description = "Every stored result of a quiz. Only the course's tutor can list them",
    params(
        ("quiz_id" = String, Path, description = "ID of the quiz")
    ),
    responses(
        (status = 200, description = "Results", body = [QuizResultResponse]),
        (status = 404, description = "Quiz not found", body = ErrorResponse),
        (status = 403, description = "Not the course's tutor", body = ErrorResponse),
        (status = 401, description = "You're not authorized to do this", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    security(
        ("cookie" = [])
    ),
    tag = "quizzes"
)]
async fn quizzes_results_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ctx: RequestContext,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;
    user.require_tutor()?;

    let quiz = find_quiz(&state, &id).await?;
    let course = state
        .store()
        .course_by_id(quiz.course_id())
        .await
        .map_err(|e| WebError::resource_fetch_error(Course::get_resource_type(), e))?
        .ok_or_else(|| WebError::resource_not_found(Course::get_resource_type(), quiz.course_id()))?;
    check_access(user, &course)
        .map_err(|_| WebError::resource_forbidden(Quiz::get_resource_type()))?;

    let results: Vec<QuizResultResponse> = state
        .store()
        .quiz_results_by_quiz(quiz.id())
        .await
        .map_err(|e| WebError::resource_fetch_error(QuizResult::get_resource_type(), e))?
        .into_iter()
        .map(QuizResultResponse::from)
        .collect();

    Ok((StatusCode::OK, Json(results)))
}
