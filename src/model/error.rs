use thiserror::Error;

use crate::model::key::KeyParseError;

pub type DatabaseResult<T> = std::result::Result<T, DatabaseError>;

#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("sqlx migrate error: {0}")]
    SqlxMigrateError(#[from] sqlx::migrate::MigrateError),
    #[error("sqlx error: {0}")]
    SqlxError(#[from] sqlx::Error),
    #[error("json error: {0}")]
    SerdeError(#[from] serde_json::Error),
    #[error("key error: {0}")]
    KeyError(#[from] KeyParseError),
    #[error("invalid stored row in `{table}`: {reason}")]
    InvalidRow { table: &'static str, reason: String },
    #[error("rejected write to `{table}`: {reason}")]
    InvalidInput { table: &'static str, reason: String },
    #[error("access to this resource is forbidden")]
    Forbidden,
}

impl DatabaseError {
    pub fn invalid_row<S: Into<String>>(table: &'static str, reason: S) -> Self {
        Self::InvalidRow {
            table,
            reason: reason.into(),
        }
    }

    pub fn invalid_input<S: Into<String>>(table: &'static str, reason: S) -> Self {
        Self::InvalidInput {
            table,
            reason: reason.into(),
        }
    }
}
