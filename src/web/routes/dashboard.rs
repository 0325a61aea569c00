use axum::Json;
use axum::extract::Query;
use axum::http::StatusCode;
use axum::{Router, extract::State, middleware, response::IntoResponse, routing::get};

use crate::model::ResourceType;
use crate::web::dto::dashboard::{CourseReportResponse, DashboardQuery, DashboardResponse};
use crate::web::error::ErrorResponse;
use crate::web::{AppState, RequestContext, UserRole, WebError, WebResult, middlewares};

pub fn routes<S>(state: AppState) -> Router<S> {
    Router::new()
        .route("/", get(dashboard_get_handler))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            middlewares::extract_context_fn,
        ))
        .with_state(state)
}

#[utoipa::path(
    get,
    path = "/api/v1/dashboard/",
    description = "Per-course analytics for a tutor. A course whose data cannot be fetched carries an error instead of analytics",
    params(DashboardQuery),
    responses(
        (status = 200, description = "Dashboard", body = DashboardResponse),
        (status = 403, description = "Tutor role required", body = ErrorResponse),
        (status = 401, description = "You're not authorized to do this", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
        (status = 503, description = "Server shutting down", body = ErrorResponse),
    ),
    security(
        ("cookie" = [])
    ),
    tag = "dashboard"
)]
async fn dashboard_get_handler(
    State(state): State<AppState>,
    Query(query): Query<DashboardQuery>,
    ctx: RequestContext,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;
    user.require_tutor()?;

    let tutor_id = match (user.user_role(), query.tutor_id) {
        (UserRole::Admin, Some(tutor_id)) => tutor_id,
        _ => user.user_id().to_string(),
    };

    let cancel = state.shutdown().child_token();
    let courses = state
        .aggregator()
        .aggregate_with_cancel(&tutor_id, &cancel)
        .await
        .map_err(|e| WebError::from_engine(ResourceType::Course, e))?
        .into_iter()
        .map(CourseReportResponse::from)
        .collect();

    Ok((StatusCode::OK, Json(DashboardResponse { tutor_id, courses })))
}
