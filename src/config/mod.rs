use serde::Deserialize;

static CONFIG: OnceCell<Config> = OnceCell::const_new();

mod config_dir;
pub use config_dir::{find_config_file, read_config};

mod error;
pub use error::{ConfigError, ConfigResult};
use tokio::sync::OnceCell;

use crate::engine::classifier::DEFAULT_PASS_THRESHOLD;

#[derive(Debug, Deserialize)]
pub struct Config {
    host: Host,
    app: App,
    #[serde(default)]
    engine: EngineConfig,
}

#[derive(Debug, Deserialize)]
pub struct Host {
    bindto: String,
}

#[derive(Debug, Deserialize)]
pub struct App {
    jwt: String,
    database_uri: String,
    #[serde(default = "default_max_connections")]
    max_connections: u32,
    #[serde(default)]
    docs: bool,
}

fn default_max_connections() -> u32 {
    5
}

/// Tunables of the progression engine.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Raw quiz score a student needs to be classified as completed.
    pub pass_threshold: i32,
    /// Raw quiz score counted as a pass on the tutor dashboard.
    pub dashboard_pass_bar: i32,
    /// Storage fetches the dashboard keeps in flight at once.
    pub max_concurrent_fetches: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            pass_threshold: DEFAULT_PASS_THRESHOLD,
            dashboard_pass_bar: 50,
            max_concurrent_fetches: 8,
        }
    }
}

impl Config {
    pub fn from_toml(bytes: &[u8]) -> ConfigResult<Self> {
        let text = std::str::from_utf8(bytes).map_err(|_| ConfigError::NotUtf8)?;
        Ok(toml::from_str(text)?)
    }

    #[tracing::instrument]
    pub async fn get_or_init(use_local: bool) -> &'static Config {
        CONFIG
            .get_or_init(|| async {
                let read_cfg = |use_local| -> ConfigResult<Self> {
                    let bytes = read_config(use_local)?;
                    Self::from_toml(&bytes)
                };

                match read_cfg(use_local) {
                    Ok(c) => c,
                    Err(e) => {
                        if !matches!(e, error::ConfigError::ConfigNotFound) {
                            crate::error::log_error(&e);
                        }
                        tracing::error!("Config not found.");
                        std::process::exit(1);
                    }
                }
            })
            .await
    }

    #[inline]
    pub fn host(&self) -> &Host {
        &self.host
    }

    #[inline]
    pub fn app(&self) -> &App {
        &self.app
    }

    #[inline]
    pub fn engine(&self) -> &EngineConfig {
        &self.engine
    }
}

impl Host {
    #[inline]
    pub fn bindto(&self) -> &str {
        &self.bindto
    }
}

impl App {
    #[inline]
    pub fn jwt(&self) -> &str {
        &self.jwt
    }

    #[inline]
    pub fn database_uri(&self) -> &str {
        &self.database_uri
    }

    #[inline]
    pub fn max_connections(&self) -> u32 {
        self.max_connections
    }

    #[inline]
    pub fn docs(&self) -> bool {
        self.docs
    }
}
