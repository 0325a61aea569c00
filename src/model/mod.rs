mod access;
pub use access::{HasOwner, check_access};

mod database;
pub use database::DbConnection;

pub mod entity;

mod error;
pub use error::{DatabaseError, DatabaseResult};

pub mod key;

mod repo;
pub use repo::{
    CourseRepository, EnrolmentRepository, LessonRepository, ProgressRepository, QuizRepository,
    QuizResultRepository, ResourceType, ResourceTyped, Store,
};

use sqlx::PgPool;

/// PostgreSQL-backed [`Store`].
#[derive(Debug, Clone)]
pub struct ModelManager {
    database: DbConnection,
}

impl ModelManager {
    pub fn new(conn: DbConnection) -> Self {
        Self { database: conn }
    }

    pub fn executor(&self) -> &PgPool {
        self.database.pool()
    }
}

/// Fresh identifier for a new document.
pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
