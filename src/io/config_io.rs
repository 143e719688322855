use std::fs;
use std::path::{Path, PathBuf};

use crate::model::config::{Config, UiConfig};

const APP_DIR: &str = "kantui";
const DATABASE_FILE: &str = "kantui.db";
const LOG_FILE: &str = "kantui.log";
const STATE_FILE: &str = "kantui.state.json";

/// Error type for configuration loading
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("could not read {path}: {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not parse config: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("no data directory found; pass --db")]
    NoDataDir,
}

/// Values given on the command line, taking precedence over the file
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    /// Folder holding the database
    pub db_dir: Option<PathBuf>,
    pub debug: bool,
    pub remigrate: usize,
}

/// Fully resolved runtime settings
#[derive(Debug, Clone)]
pub struct Settings {
    pub database_path: PathBuf,
    pub log_path: PathBuf,
    pub state_path: PathBuf,
    pub log_level: String,
    pub remigrate: usize,
    pub ui: UiConfig,
}

/// `<config_dir>/kantui/config.toml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_DIR).join("config.toml"))
}

/// Read the config file. A missing file yields the defaults.
pub fn read_config(path: &Path) -> Result<Config, ConfigError> {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Config::default()),
        Err(source) => {
            return Err(ConfigError::ReadError {
                path: path.to_path_buf(),
                source,
            });
        }
    };
    Ok(toml::from_str(&text)?)
}

/// Merge the config file with command line overrides
pub fn resolve(config: Config, overrides: Overrides) -> Result<Settings, ConfigError> {
    let database_path = match (overrides.db_dir, config.database.path) {
        (Some(dir), _) => dir.join(DATABASE_FILE),
        (None, Some(path)) => path,
        (None, None) => dirs::data_dir()
            .ok_or(ConfigError::NoDataDir)?
            .join(APP_DIR)
            .join(DATABASE_FILE),
    };
    let data_dir = database_path
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_default();

    let log_path = config.log.file.unwrap_or_else(|| data_dir.join(LOG_FILE));
    let log_level = if overrides.debug {
        "debug".to_string()
    } else {
        config.log.level
    };

    Ok(Settings {
        state_path: data_dir.join(STATE_FILE),
        database_path,
        log_path,
        log_level,
        remigrate: overrides.remigrate,
        ui: config.ui,
    })
}
