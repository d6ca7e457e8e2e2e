//! Launch-at-login registration
//!
//! - macOS: `~/Library/LaunchAgents/com.stayalive.keepawake.plist`
//! - Windows: `HKCU\Software\Microsoft\Windows\CurrentVersion\Run` registry value
//! - Linux and other Unix: `~/.config/autostart/stayalive.desktop`

pub mod launch_file;
#[cfg(target_os = "windows")]
pub mod registry;

use crate::error::GatewayError;

pub use launch_file::LaunchFile;

/// Capability to register the program to run at login
///
/// Implementations must be idempotent: enabling twice or disabling an entry
/// that does not exist both succeed.
pub trait AutoStartGateway: Send + Sync {
    fn is_enabled(&self) -> bool;
    fn enable(&self) -> Result<(), GatewayError>;
    fn disable(&self) -> Result<(), GatewayError>;
}

/// Path of the running executable, as the login item should launch it
pub fn current_executable() -> Result<std::path::PathBuf, GatewayError> {
    std::env::current_exe().map_err(GatewayError::ExecutablePath)
}

/// The login item implementation for the current platform
pub fn platform_gateway() -> Result<Box<dyn AutoStartGateway>, GatewayError> {
    #[cfg(target_os = "windows")]
    {
        Ok(Box::new(registry::RunKey::new(current_executable()?)))
    }

    #[cfg(target_os = "macos")]
    {
        Ok(Box::new(LaunchFile::launch_agent(&current_executable()?)?))
    }

    #[cfg(not(any(target_os = "macos", target_os = "windows")))]
    {
        Ok(Box::new(LaunchFile::desktop_entry(&current_executable()?)?))
    }
}
