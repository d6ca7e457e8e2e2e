//! Error types for the keep-alive service
//!
//! Only `PersistenceError::HomeDirUnavailable` is meant to stop the program;
//! every other error is reported to the caller or logged and the service
//! keeps running.

use crate::utils::keycode::ActionKey;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// A configuration change was rejected; nothing was applied
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("interval must be at least 1 second")]
    ZeroInterval,

    #[error("interval must be positive (got {0})")]
    NegativeInterval(i64),

    #[error("unknown key '{0}' (expected one of F13-F24)")]
    UnknownKey(String),

    #[error("unknown key code {0:#x}")]
    UnknownKeyCode(u16),
}

/// Reading or writing the config file failed
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("could not determine the user's home directory")]
    HomeDirUnavailable,

    #[error("failed to read config file {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse config file {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("failed to serialize configuration")]
    Serialize(#[from] toml::ser::Error),

    #[error("failed to write config file {path}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Registering or unregistering the login item failed
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("autostart entry I/O failed for {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to determine executable path")]
    ExecutablePath(#[source] io::Error),

    #[error("could not determine the autostart directory")]
    LocationUnavailable,

    #[error("registry operation failed with code {0}")]
    Registry(i32),
}

/// A single keep-alive press failed
#[derive(Debug, Error)]
pub enum ActionError {
    #[error("input injection unavailable: {0}")]
    Unavailable(String),

    #[error("key press failed: {0}")]
    Input(String),

    #[error("{0} cannot be synthesized on this platform")]
    Unsupported(ActionKey),
}

/// Errors returned by `ServiceController` operations
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("invalid configuration: {0}")]
    Invalid(#[from] ValidationError),

    #[error("service has not been started")]
    NotStarted,

    #[error("service was already started")]
    AlreadyStarted,

    #[error("service has been shut down")]
    ShutDown,

    #[error("failed to spawn action loop thread")]
    Spawn(#[source] io::Error),
}
