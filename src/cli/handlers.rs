use std::io::ErrorKind;

use crate::io::config_io::{self, ConfigError, Settings};
use crate::logging;
use crate::tui::board::Failure;

use super::commands::Cli;

/// Load the config file and merge the command line into it. An explicit
/// `--config` must exist; the default location may be absent.
pub fn load_settings(cli: &Cli) -> Result<Settings, ConfigError> {
    let config = match &cli.config {
        Some(path) => {
            if !path.exists() {
                return Err(ConfigError::ReadError {
                    path: path.clone(),
                    source: ErrorKind::NotFound.into(),
                });
            }
            config_io::read_config(path)?
        }
        None => match config_io::default_config_path() {
            Some(path) => config_io::read_config(&path)?,
            None => Default::default(),
        },
    };
    config_io::resolve(config, cli.overrides())
}

/// Start logging and run the board. Returns the failure that ended the
/// session, if any.
pub fn launch(cli: Cli) -> Result<Option<Failure>, Box<dyn std::error::Error>> {
    let settings = load_settings(&cli)?;
    logging::init(&settings.log_path, &settings.log_level).map_err(|e| {
        format!(
            "could not open log file {}: {}",
            settings.log_path.display(),
            e
        )
    })?;
    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        database = %settings.database_path.display(),
        "starting kantui"
    );
    let failure = crate::tui::run(&settings)?;
    tracing::info!(failed = failure.is_some(), "kantui exited");
    Ok(failure)
}
