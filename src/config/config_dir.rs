use std::path::{Path, PathBuf};

use tracing::debug;

use super::error::{ConfigError, ConfigResult};

const CONFIG_FILE: &str = "config.toml";

/// `./config.toml` when running locally, else the per-user config if it
/// exists, falling back to `./config.toml`.
pub fn find_config_file(use_local: bool) -> PathBuf {
    if use_local {
        return PathBuf::from(".").join(CONFIG_FILE);
    }

    #[cfg(unix)]
    let base = std::env::var_os("HOME").map(|home| PathBuf::from(home).join(".config"));
    #[cfg(windows)]
    let base = std::env::var_os("APPDATA").map(PathBuf::from);
    #[cfg(not(any(unix, windows)))]
    let base: Option<PathBuf> = None;

    base.map(|base| user_config_file(&base))
        .filter(|path| path.exists())
        .unwrap_or_else(|| PathBuf::from(".").join(CONFIG_FILE))
}

fn user_config_file(base: &Path) -> PathBuf {
    base.join(crate::APPLICATION_NAME).join(CONFIG_FILE)
}

pub fn read_config(use_local: bool) -> ConfigResult<Vec<u8>> {
    read_config_at(&find_config_file(use_local))
}

fn read_config_at(filename: &Path) -> ConfigResult<Vec<u8>> {
    tracing::trace!("looking for config at: {}", filename.display());
    if !filename.exists() {
        return Err(ConfigError::ConfigNotFound);
    }

    let filename = filename.canonicalize()?;
    debug!("using {} as configuration file", filename.display());

    Ok(std::fs::read(filename)?)
}
