use axum::{Json, http::StatusCode, response::IntoResponse};
use thiserror::Error;

use crate::{
    engine::EngineError,
    error::log_error,
    model::{DatabaseError, ResourceType},
    web::UserRole,
};

pub type WebResult<T> = std::result::Result<T, WebError>;

#[derive(Debug, Error)]
pub enum AuthenticationError {
    #[error("AuthenticationCookieInvalid, cookie: {cookie}. Error: {error}")]
    AuthenticationCookieInvalid {
        cookie: String,
        error: jsonwebtoken::errors::Error,
    },

    #[error("AuthenticationRequired")]
    AuthenticationRequired,

    #[error("AuthenticationRoleRequired: {role}")]
    AuthenticationRoleRequired { role: UserRole },
}

#[derive(Debug, Error)]
pub enum ResourceError {
    #[error("ResourceNotFound: {resource_type:?} {id}")]
    ResourceNotFound {
        resource_type: ResourceType,
        id: String,
    },

    #[error("ResourceForbidden: {resource_type:?}")]
    ResourceForbidden { resource_type: ResourceType },

    #[error("ResourceLocked: lesson {lesson_id}")]
    ResourceLocked { lesson_id: String },

    #[error("ResourceFetchError: {resource_type:?}. Error: {error}")]
    ResourceFetchError {
        resource_type: ResourceType,
        error: DatabaseError,
    },
}

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("ServerShuttingDown")]
    ServerShuttingDown,
}

impl ServerError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::ServerShuttingDown => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    pub fn client_display(&self) -> String {
        match self {
            Self::ServerShuttingDown => String::from("Server is shutting down, try again later."),
        }
    }
}

impl AuthenticationError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::AuthenticationRequired => StatusCode::UNAUTHORIZED,
            Self::AuthenticationCookieInvalid { .. } => StatusCode::BAD_REQUEST,
            Self::AuthenticationRoleRequired { .. } => StatusCode::FORBIDDEN,
        }
    }

    pub fn client_display(&self) -> String {
        match self {
            Self::AuthenticationCookieInvalid { .. } => {
                String::from("Authentication error, cookie invalid.")
            }
            Self::AuthenticationRequired => String::from("Authentication required."),
            Self::AuthenticationRoleRequired { role } => {
                format!("Authentication error, {role} role required.")
            }
        }
    }
}

impl ResourceError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::ResourceNotFound { .. } => StatusCode::NOT_FOUND,
            Self::ResourceForbidden { .. } => StatusCode::FORBIDDEN,
            Self::ResourceLocked { .. } => StatusCode::FORBIDDEN,
            Self::ResourceFetchError { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn client_display(&self) -> String {
        match self {
            Self::ResourceNotFound { .. } => String::from("Resource error, resource not found."),
            Self::ResourceForbidden { .. } => String::from("Resource error, resource forbidden."),
            Self::ResourceLocked { .. } => {
                String::from("Resource error, complete the previous lesson first.")
            }
            Self::ResourceFetchError { .. } => {
                String::from("Resource error, unable to fetch resource.")
            }
        }
    }
}

#[derive(Debug, Error)]
pub enum WebError {
    #[error("ResourceError - {0}")]
    ResourceError(#[from] ResourceError),
    #[error("AuthenticationError - {0}")]
    AuthenticationError(#[from] AuthenticationError),
    #[error("ServerError - {0}")]
    ServerError(#[from] ServerError),
}

impl WebError {
    pub fn resource_not_found(r#type: ResourceType, id: impl Into<String>) -> Self {
        Self::ResourceError(ResourceError::ResourceNotFound {
            resource_type: r#type,
            id: id.into(),
        })
    }

    pub fn resource_forbidden(r#type: ResourceType) -> Self {
        Self::ResourceError(ResourceError::ResourceForbidden {
            resource_type: r#type,
        })
    }

    pub fn resource_fetch_error(r#type: ResourceType, error: DatabaseError) -> Self {
        Self::ResourceError(ResourceError::ResourceFetchError {
            resource_type: r#type,
            error,
        })
    }

    pub fn auth_cookie_invalid<S: Into<String>>(
        cookie: S,
        error: jsonwebtoken::errors::Error,
    ) -> Self {
        Self::AuthenticationError(AuthenticationError::AuthenticationCookieInvalid {
            cookie: cookie.into(),
            error,
        })
    }

    pub fn auth_required() -> Self {
        Self::AuthenticationError(AuthenticationError::AuthenticationRequired)
    }

    pub fn auth_role_required(role: UserRole) -> Self {
        Self::AuthenticationError(AuthenticationError::AuthenticationRoleRequired { role })
    }

    /// Maps an engine failure, `r#type` names what the handler was fetching.
    pub fn from_engine(r#type: ResourceType, error: EngineError) -> Self {
        match error {
            EngineError::NotFound { resource, id } => Self::resource_not_found(resource, id),
            EngineError::RemoteFailure(DatabaseError::Forbidden) => Self::resource_forbidden(r#type),
            EngineError::RemoteFailure(e) => Self::resource_fetch_error(r#type, e),
            EngineError::LessonLocked { lesson_id } => {
                Self::ResourceError(ResourceError::ResourceLocked { lesson_id })
            }
            EngineError::NotEnrolled { .. } => Self::resource_forbidden(ResourceType::Enrolment),
            EngineError::Cancelled => Self::ServerError(ServerError::ServerShuttingDown),
        }
    }

    pub fn status_code(&self) -> axum::http::StatusCode {
        match self {
            Self::ResourceError(e) => e.status_code(),
            Self::AuthenticationError(e) => e.status_code(),
            Self::ServerError(e) => e.status_code(),
        }
    }

    pub fn client_display(&self) -> String {
        match self {
            Self::ResourceError(e) => e.client_display(),
            Self::AuthenticationError(e) => e.client_display(),
            Self::ServerError(e) => e.client_display(),
        }
    }
}

#[derive(serde::Serialize, serde::Deserialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    /// Human-readable message for the client
    pub message: String,
    /// HTTP status code (stringified)
    pub status_code: String,
    /// Optional debug details (only in debug mode)
    pub details: Option<String>,
}

impl IntoResponse for WebError {
    fn into_response(self) -> axum::response::Response {
        log_error(&self);

        let status_code = self.status_code();
        let display = self.client_display();

        let body = ErrorResponse {
            message: display,
            status_code: status_code.as_str().to_string(),
            details: if cfg!(debug_assertions) {
                Some(self.to_string())
            } else {
                None
            },
        };

        (status_code, Json(body)).into_response()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_engine_errors_map_to_status_codes() {
        let cases = [
            (
                EngineError::not_found(ResourceType::Lesson, "l1"),
                StatusCode::NOT_FOUND,
            ),
            (
                EngineError::LessonLocked {
                    lesson_id: "l2".into(),
                },
                StatusCode::FORBIDDEN,
            ),
            (
                EngineError::NotEnrolled {
                    course_id: "c".into(),
                    student_id: "s".into(),
                },
                StatusCode::FORBIDDEN,
            ),
            (
                EngineError::RemoteFailure(DatabaseError::SqlxError(sqlx::Error::PoolTimedOut)),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (EngineError::Cancelled, StatusCode::SERVICE_UNAVAILABLE),
        ];

        for (error, expected) in cases {
            let web = WebError::from_engine(ResourceType::Lesson, error);
            assert_eq!(web.status_code(), expected, "{web}");
        }
    }
}
