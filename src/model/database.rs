use std::path::Path;

use sqlx::{PgPool, migrate::Migrator, postgres::PgPoolOptions};

use crate::model::error::DatabaseResult;

/// Handle to the PostgreSQL pool backing every repository.
#[derive(Debug, Clone)]
pub struct DbConnection {
    pool: PgPool, // Arc inside, clones share connections
}

impl DbConnection {
    pub fn connect(connection_str: &str, max_connections: u32) -> DatabaseResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect_lazy(connection_str)?;
        Ok(Self { pool })
    }

    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    #[tracing::instrument(skip(self))]
    pub async fn migrate(&self, dir: &Path) -> DatabaseResult<()> {
        let migrator = Migrator::new(dir).await?;
        tracing::debug!("applying migrations from {}", dir.display());
        migrator.run(&self.pool).await?;
        Ok(())
    }
}
