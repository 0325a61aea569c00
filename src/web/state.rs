use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::config::EngineConfig;
use crate::engine::{DashboardAggregator, Progression, QuizGrader};
use crate::model::Store;

#[derive(Clone)]
pub struct AppState {
    store: Arc<dyn Store>,
    jwt_secret: Arc<str>,
    engine: EngineConfig,
    shutdown: CancellationToken,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, jwt_secret: &str, engine: EngineConfig) -> Self {
        Self {
            store,
            jwt_secret: Arc::from(jwt_secret),
            engine,
            shutdown: CancellationToken::new(),
        }
    }

    pub fn store(&self) -> &dyn Store {
        self.store.as_ref()
    }

    pub fn jwt_secret(&self) -> &str {
        &self.jwt_secret
    }

    pub fn engine(&self) -> &EngineConfig {
        &self.engine
    }

    /// Cancelled once the server starts shutting down.
    pub fn shutdown(&self) -> &CancellationToken {
        &self.shutdown
    }

    pub fn progression(&self) -> Progression<dyn Store> {
        Progression::new(Arc::clone(&self.store), self.engine.pass_threshold)
    }

    pub fn grader(&self) -> QuizGrader<dyn Store> {
        QuizGrader::new(Arc::clone(&self.store))
    }

    pub fn aggregator(&self) -> DashboardAggregator<dyn Store> {
        DashboardAggregator::new(Arc::clone(&self.store), self.engine.clone())
    }
}
