use std::path::Path;

use super::types::LauncherConfig;
use crate::error::ConfigError;

pub const CONFIG_PATH_VAR: &str = "DOTSHIM_CONFIG";
pub const LOG_FILTER_VAR: &str = "DOTSHIM_LOG";
pub const LOG_FILE_VAR: &str = "DOTSHIM_LOG_FILE";

/// Loads the launcher configuration.
///
/// A TOML file is read only when `DOTSHIM_CONFIG` names one; the working
/// directory never contributes. `DOTSHIM_LOG` and `DOTSHIM_LOG_FILE`
/// override the logging section.
pub fn load_default() -> Result<LauncherConfig, ConfigError> {
    let mut cfg = match non_empty_var(CONFIG_PATH_VAR) {
        Some(path) => load_file(Path::new(&path))?,
        None => LauncherConfig::default(),
    };

    if let Some(v) = non_empty_var(LOG_FILTER_VAR) {
        cfg.logging.filter = v;
    }
    if let Some(v) = non_empty_var(LOG_FILE_VAR) {
        cfg.logging.file = Some(v);
    }

    Ok(cfg)
}

pub fn load_file(path: &Path) -> Result<LauncherConfig, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::NotFound(path.display().to_string()));
    }
    let s = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.display().to_string(),
        source,
    })?;
    parse(&s)
}

pub fn parse(s: &str) -> Result<LauncherConfig, ConfigError> {
    toml::from_str::<LauncherConfig>(s).map_err(ConfigError::Parse)
}

fn non_empty_var(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}
