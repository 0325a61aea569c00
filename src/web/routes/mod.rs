use crate::web::{AppState, doc::ApiDoc};
use axum::Router;
use tower_cookies::CookieManagerLayer;
use tower_http::cors::CorsLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub mod courses;
pub mod dashboard;
pub mod lessons;
pub mod quizzes;

pub fn build_app<S: Send + Sync + Clone + 'static>(state: AppState, docs: bool) -> Router<S> {
    let mut router = Router::new()
        .nest("/api/v1/courses/", courses::routes(state.clone()))
        .nest("/api/v1/lessons/", lessons::routes(state.clone()))
        .nest("/api/v1/quizzes/", quizzes::routes(state.clone()))
        .nest("/api/v1/dashboard/", dashboard::routes(state.clone()))
        .layer(CookieManagerLayer::default())
        .layer(CorsLayer::very_permissive())
        .with_state(state);

    if docs {
        let openapi = ApiDoc::openapi();

        router = router.merge(SwaggerUi::new("/api/v1/docs").url("/api-doc/openapi.json", openapi));
    }

    router
}
