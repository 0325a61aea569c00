use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use tower_cookies::Cookies;

use crate::{
    auth,
    web::{AppState, RequestContext, UserRole, context::AuthenticatedUser, error::WebError},
};

pub static AUTH_TOKEN: &str = "SID";

pub async fn extract_context_fn(
    State(state): State<AppState>,
    cookies: Cookies,
    mut req: Request,
    next: Next,
) -> Result<Response, WebError> {
    let token = match cookies.get(AUTH_TOKEN) {
        Some(token) => token,
        None => {
            req.extensions_mut().insert(RequestContext::new(None));
            return Ok(next.run(req).await);
        }
    };

    let claims = auth::process_token(token.value(), state.jwt_secret())
        .map_err(|e| WebError::auth_cookie_invalid(AUTH_TOKEN, e))?
        .claims;

    let user = AuthenticatedUser::new(claims.sub, UserRole::from(claims.role.as_str()));
    tracing::trace!("request by {} ({})", user.user_id(), user.user_role());
    req.extensions_mut()
        .insert(RequestContext::new(Some(user)));

    Ok(next.run(req).await)
}
