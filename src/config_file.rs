//! Configuration file management
//!
//! This module handles loading and saving the keep-alive configuration
//! (interval, key, autostart flag). Loading never fails: a missing file yields
//! the defaults, a broken one yields the defaults plus a warning in the log.

use crate::constants::{
    CONFIG_FILE_NAME, CONFIG_FILE_PERMISSIONS, DEFAULT_ACTION_KEY, DEFAULT_INTERVAL_SECONDS,
};
use crate::error::{PersistenceError, ValidationError};
use crate::utils::keycode::ActionKey;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tempfile::NamedTempFile;

#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;

/// The keep-alive configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Configuration {
    /// Seconds between key presses (must be > 0)
    pub interval_secs: u64,
    /// Key to press
    pub action_key: ActionKey,
    /// Launch at login
    pub auto_start: bool,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            interval_secs: DEFAULT_INTERVAL_SECONDS,
            action_key: DEFAULT_ACTION_KEY,
            auto_start: false,
        }
    }
}

impl Configuration {
    pub fn new(interval_secs: u64, action_key: ActionKey, auto_start: bool) -> Self {
        Self {
            interval_secs,
            action_key,
            auto_start,
        }
    }

    /// Build a configuration from raw settings values
    ///
    /// This is what a settings form submits: a possibly negative number and
    /// a free-text key name.
    pub fn from_settings(
        interval_secs: i64,
        key_name: &str,
        auto_start: bool,
    ) -> Result<Self, ValidationError> {
        let interval_secs = match interval_secs {
            n if n < 0 => return Err(ValidationError::NegativeInterval(n)),
            0 => return Err(ValidationError::ZeroInterval),
            n => n as u64,
        };
        let action_key = key_name.parse::<ActionKey>()?;
        Ok(Self::new(interval_secs, action_key, auto_start))
    }

    /// Check the invariants a configuration must hold before it is applied
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.interval_secs == 0 {
            return Err(ValidationError::ZeroInterval);
        }
        Ok(())
    }

    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }
}

/// On-disk layout of the config file
#[derive(Debug, Serialize, Deserialize)]
struct ConfigRecord {
    /// Seconds between presses (0 or missing = default)
    #[serde(default)]
    interval: u64,
    /// Numeric key code (0 or missing = default key)
    #[serde(default)]
    key_code: u16,
    #[serde(default)]
    auto_start: bool,
}

impl From<&Configuration> for ConfigRecord {
    fn from(config: &Configuration) -> Self {
        Self {
            interval: config.interval_secs,
            key_code: config.action_key.code(),
            auto_start: config.auto_start,
        }
    }
}

impl ConfigRecord {
    /// Fill unset fields with defaults; an unknown key code falls back to the default key
    fn into_configuration(self, path: &Path) -> Configuration {
        let interval_secs = if self.interval == 0 {
            DEFAULT_INTERVAL_SECONDS
        } else {
            self.interval
        };

        let action_key = match self.key_code {
            0 => DEFAULT_ACTION_KEY,
            code => ActionKey::from_code(code).unwrap_or_else(|| {
                log::warn!(
                    "{} in {}; using {}",
                    ValidationError::UnknownKeyCode(code),
                    path.display(),
                    DEFAULT_ACTION_KEY
                );
                DEFAULT_ACTION_KEY
            }),
        };

        Configuration {
            interval_secs,
            action_key,
            auto_start: self.auto_start,
        }
    }
}

/// Loads and saves the configuration at a fixed location
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    /// Store at the standard per-user location: `~/.stay_alive_config.toml`
    ///
    /// # Errors
    ///
    /// Fails only when the home directory cannot be resolved.
    pub fn new() -> Result<Self, PersistenceError> {
        let home = dirs::home_dir().ok_or(PersistenceError::HomeDirUnavailable)?;
        Ok(Self::at(home.join(CONFIG_FILE_NAME)))
    }

    /// Store at an explicit location
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the configuration, falling back to defaults
    pub fn load(&self) -> Configuration {
        match self.try_load() {
            Ok(Some(config)) => config,
            Ok(None) => {
                log::info!(
                    "No saved configuration at {}, using default values",
                    self.path.display()
                );
                Configuration::default()
            }
            Err(e) => {
                log::warn!("{:#}; using default values", anyhow::Error::new(e));
                Configuration::default()
            }
        }
    }

    /// Load the configuration, reporting what went wrong
    ///
    /// Returns `Ok(None)` if the file does not exist.
    pub fn try_load(&self) -> Result<Option<Configuration>, PersistenceError> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(PersistenceError::Read {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        let record: ConfigRecord =
            toml::from_str(&contents).map_err(|source| PersistenceError::Parse {
                path: self.path.clone(),
                source,
            })?;

        Ok(Some(record.into_configuration(&self.path)))
    }

    /// Save the configuration
    ///
    /// Writes to a temporary file next to the target and renames it into
    /// place, so the previous file stays readable if the write is interrupted.
    pub fn save(&self, config: &Configuration) -> Result<(), PersistenceError> {
        let contents = toml::to_string_pretty(&ConfigRecord::from(config))?;
        write_atomic(&self.path, contents.as_bytes()).map_err(|source| {
            PersistenceError::Write {
                path: self.path.clone(),
                source,
            }
        })?;

        log::info!("Configuration saved to: {}", self.path.display());
        Ok(())
    }
}

/// Write `data` to `path` through a temp file in the same directory
pub(crate) fn write_atomic(path: &Path, data: &[u8]) -> io::Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir)?;

    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(data)?;
    tmp.as_file().sync_all()?;

    #[cfg(unix)]
    tmp.as_file()
        .set_permissions(fs::Permissions::from_mode(CONFIG_FILE_PERMISSIONS))?;

    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store_in(dir: &TempDir) -> ConfigStore {
        ConfigStore::at(dir.path().join(CONFIG_FILE_NAME))
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        assert!(store.try_load().unwrap().is_none());

        let config = store.load();
        assert_eq!(config.interval_secs, 60);
        assert_eq!(config.action_key, ActionKey::F15);
        assert!(!config.auto_start);
    }

    #[test]
    fn test_save_load_roundtrip() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        let original = Configuration::new(45, ActionKey::F20, true);

        store.save(&original).expect("Failed to save config");

        assert_eq!(store.load(), original);
    }

    #[test]
    fn test_file_is_human_readable() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        store
            .save(&Configuration::new(30, ActionKey::F16, true))
            .unwrap();

        let contents = fs::read_to_string(store.path()).unwrap();
        assert!(contents.contains("interval = 30"), "{}", contents);
        assert!(contents.contains("key_code = 127"), "{}", contents);
        assert!(contents.contains("auto_start = true"), "{}", contents);
    }

    #[test]
    fn test_corrupt_file_yields_defaults() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        fs::write(store.path(), "interval = \"sixty\"\n{{{").unwrap();

        assert!(matches!(
            store.try_load(),
            Err(PersistenceError::Parse { .. })
        ));
        assert_eq!(store.load(), Configuration::default());
    }

    #[test]
    fn test_zero_values_fall_back_to_defaults() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        fs::write(
            store.path(),
            "interval = 0\nkey_code = 0\nauto_start = true\n",
        )
        .unwrap();

        let config = store.load();
        assert_eq!(config.interval_secs, DEFAULT_INTERVAL_SECONDS);
        assert_eq!(config.action_key, DEFAULT_ACTION_KEY);
        assert!(config.auto_start);
    }

    #[test]
    fn test_missing_fields_fall_back_to_defaults() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        fs::write(store.path(), "interval = 90\n").unwrap();

        let config = store.load();
        assert_eq!(config.interval_secs, 90);
        assert_eq!(config.action_key, DEFAULT_ACTION_KEY);
        assert!(!config.auto_start);
    }

    #[test]
    fn test_unknown_key_code_falls_back_to_default_key() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        fs::write(store.path(), "interval = 20\nkey_code = 65\n").unwrap();

        let config = store.load();
        assert_eq!(config.interval_secs, 20);
        assert_eq!(config.action_key, DEFAULT_ACTION_KEY);
    }

    #[test]
    fn test_save_creates_parent_directory() {
        let dir = TempDir::new().unwrap();
        let store = ConfigStore::at(dir.path().join("nested").join("config.toml"));

        store.save(&Configuration::default()).unwrap();

        assert!(store.path().exists());
    }

    #[test]
    fn test_save_replaces_previous_file() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        store.save(&Configuration::new(10, ActionKey::F13, false)).unwrap();
        store.save(&Configuration::new(20, ActionKey::F14, true)).unwrap();

        assert_eq!(store.load(), Configuration::new(20, ActionKey::F14, true));
        // Only the config file remains; the temp file was renamed away
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    #[cfg(unix)]
    fn test_config_permissions() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        store.save(&Configuration::default()).unwrap();

        let mode = fs::metadata(store.path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, CONFIG_FILE_PERMISSIONS);
    }

    #[test]
    fn test_from_settings_validation() {
        assert_eq!(
            Configuration::from_settings(0, "F16", false),
            Err(ValidationError::ZeroInterval)
        );
        assert_eq!(
            Configuration::from_settings(-5, "F16", false),
            Err(ValidationError::NegativeInterval(-5))
        );
        assert_eq!(
            Configuration::from_settings(30, "F99", false),
            Err(ValidationError::UnknownKey("F99".to_string()))
        );
        assert_eq!(
            Configuration::from_settings(30, " f16 ", true),
            Ok(Configuration::new(30, ActionKey::F16, true))
        );
    }
}
