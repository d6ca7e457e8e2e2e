//! Centralized constants for StayAlive
//!
//! This module contains all configurable numerical values and fixed names used
//! throughout the application. Each constant includes documentation on its
//! purpose, unit, and recommended value range.

use crate::utils::keycode::ActionKey;

// ============================================================================
// KEEP-ALIVE CONFIGURATION
// ============================================================================

/// Default interval between keep-alive key presses when no config exists.
/// Unit: seconds
/// Recommended range: 30-240 (most idle timers fire after 5 minutes or more)
pub const DEFAULT_INTERVAL_SECONDS: u64 = 60;

/// Default keep-alive key. F13-F24 have no default binding on common desktops.
pub const DEFAULT_ACTION_KEY: ActionKey = ActionKey::F15;

/// Interval presets offered by the tray menu.
/// Unit: seconds
pub const TRAY_INTERVAL_PRESETS_SECONDS: [u64; 6] = [30, 60, 120, 180, 240, 300];

// ============================================================================
// FILES & PATHS
// ============================================================================

/// Application name, used as the Windows Run value name.
pub const APP_NAME: &str = "StayAlive";

/// Reverse-DNS label for the macOS LaunchAgent.
pub const APP_LABEL: &str = "com.stayalive.keepawake";

/// Config file name, placed directly in the user's home directory.
pub const CONFIG_FILE_NAME: &str = ".stay_alive_config.toml";

/// Environment variable that overrides the config file location.
pub const CONFIG_PATH_ENV: &str = "STAY_ALIVE_CONFIG";

/// XDG autostart entry file name (Linux and other Unix desktops).
pub const DESKTOP_ENTRY_FILE_NAME: &str = "stayalive.desktop";

/// Config file permissions. The file holds no secrets.
/// Unit: Unix permission bits (octal)
/// Recommended: 0o644 (user read/write, readable by others)
pub const CONFIG_FILE_PERMISSIONS: u32 = 0o644;

// ============================================================================
// NOTIFICATIONS
// ============================================================================

/// Warning notification display duration.
/// Unit: milliseconds
/// Recommended range: 4000-10000 (warnings need more attention)
pub const NOTIFICATION_WARNING_TIMEOUT_MS: u32 = 6000;
