//! Configuration file loading for the CLI
//!
//! This module handles finding and loading TOML configuration files
//! from various locations (explicit path, local directory, system directory).

use std::{
    fs,
    path::{Path, PathBuf},
};

use directories::ProjectDirs;
use log::{debug, info};
use thiserror::Error;

use strata::{StrataError, config::AppConfig};

/// Configuration-related errors for CLI
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to parse TOML configuration: {0}")]
    Parse(String),

    #[error("Missing configuration file: {0}")]
    MissingFile(PathBuf),
}

impl From<ConfigError> for StrataError {
    fn from(err: ConfigError) -> Self {
        StrataError::Config(err.to_string())
    }
}

/// Where a configuration file was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ConfigSource {
    Local,
    System,
}

/// Implicit configuration locations, in lookup order.
fn implicit_candidates() -> Vec<(ConfigSource, PathBuf)> {
    let mut candidates = vec![(ConfigSource::Local, PathBuf::from("strata/config.toml"))];
    match ProjectDirs::from("com", "strata", "strata") {
        Some(dirs) => candidates.push((ConfigSource::System, dirs.config_dir().join("config.toml"))),
        None => debug!("Could not determine platform-specific config directory"),
    }
    candidates
}

/// Loads the configuration for a run.
///
/// An explicit path must exist. Otherwise `strata/config.toml` in the
/// working directory is used, then `config.toml` in the platform config
/// directory, then [`AppConfig::default`].
///
/// # Errors
///
/// Returns [`StrataError::Config`] if the explicit file is missing or any
/// selected file fails to parse, and [`StrataError::Read`] if it cannot be read.
pub fn load_config(explicit_path: Option<impl AsRef<Path>>) -> Result<AppConfig, StrataError> {
    if let Some(path) = explicit_path {
        let path = path.as_ref();
        info!(path:? = path; "Loading explicit configuration");
        return load_config_file(path);
    }

    let found = implicit_candidates().into_iter().find(|(source, path)| {
        let exists = path.exists();
        debug!(source:? = source, path:? = path, exists; "Checked configuration location");
        exists
    });

    match found {
        Some((source, path)) => {
            info!(source:? = source, path:? = path; "Loading configuration");
            load_config_file(&path)
        }
        None => {
            debug!("No configuration file found, using defaults");
            Ok(AppConfig::default())
        }
    }
}

/// Load configuration from a TOML file
///
/// # Errors
///
/// Returns error if the file doesn't exist, cannot be read, or fails to parse.
fn load_config_file(path: impl AsRef<Path>) -> Result<AppConfig, StrataError> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(ConfigError::MissingFile(path.to_path_buf()).into());
    }

    let content = fs::read_to_string(path).map_err(|err| StrataError::new_read_error(err, path))?;

    let config: AppConfig =
        toml::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))?;

    Ok(config)
}
