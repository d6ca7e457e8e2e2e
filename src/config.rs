//! Environment overrides for StayAlive
//!
//! The primary configuration source is the TOML file managed by the
//! config_file module. Environment variables (all optional):
//! - STAY_ALIVE_CONFIG: Use a different config file location

use crate::config_file::ConfigStore;
use crate::constants::CONFIG_PATH_ENV;
use crate::error::PersistenceError;
use log::{debug, info, warn};
use std::env;
use std::path::PathBuf;

/// Parse the STAY_ALIVE_CONFIG environment variable
///
/// Returns Some(path) if set to a non-empty value
pub fn parse_config_path_override() -> Option<PathBuf> {
    match env::var_os(CONFIG_PATH_ENV) {
        Some(val) if !val.is_empty() => {
            let path = PathBuf::from(val);
            info!(
                "Config file location set via {}: {}",
                CONFIG_PATH_ENV,
                path.display()
            );
            Some(path)
        }
        Some(_) => {
            warn!("{} is set but empty. Using default location.", CONFIG_PATH_ENV);
            None
        }
        None => {
            debug!("{} not set.", CONFIG_PATH_ENV);
            None
        }
    }
}

/// Resolve the config store (precedence: explicit path > env var > home directory)
///
/// # Errors
///
/// Fails only when falling back to the home directory and it cannot be resolved.
pub fn resolve_store(explicit: Option<PathBuf>) -> Result<ConfigStore, PersistenceError> {
    match explicit.or_else(parse_config_path_override) {
        Some(path) => Ok(ConfigStore::at(path)),
        None => ConfigStore::new(),
    }
}
