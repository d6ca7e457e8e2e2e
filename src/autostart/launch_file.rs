use super::AutoStartGateway;
use crate::config_file::write_atomic;
use crate::constants::{APP_LABEL, APP_NAME, DESKTOP_ENTRY_FILE_NAME};
use crate::error::GatewayError;
use log::info;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// A login item backed by a single file: enabled while the file exists
///
/// Used for macOS LaunchAgents and XDG autostart entries.
#[derive(Debug, Clone)]
pub struct LaunchFile {
    path: PathBuf,
    contents: String,
}

impl LaunchFile {
    /// A login item at `path` with the given file contents
    pub fn new(path: impl Into<PathBuf>, contents: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            contents: contents.into(),
        }
    }

    /// macOS LaunchAgent in `~/Library/LaunchAgents`
    pub fn launch_agent(program: &Path) -> Result<Self, GatewayError> {
        let dir = dirs::home_dir()
            .ok_or(GatewayError::LocationUnavailable)?
            .join("Library")
            .join("LaunchAgents");
        Ok(Self::new(
            dir.join(format!("{APP_LABEL}.plist")),
            launch_agent_plist(program),
        ))
    }

    /// XDG autostart entry in `~/.config/autostart`
    pub fn desktop_entry(program: &Path) -> Result<Self, GatewayError> {
        let dir = dirs::config_dir()
            .ok_or(GatewayError::LocationUnavailable)?
            .join("autostart");
        Ok(Self::new(
            dir.join(DESKTOP_ENTRY_FILE_NAME),
            desktop_entry(program),
        ))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: io::Error) -> GatewayError {
        GatewayError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

impl AutoStartGateway for LaunchFile {
    fn is_enabled(&self) -> bool {
        self.path.is_file()
    }

    fn enable(&self) -> Result<(), GatewayError> {
        // Rewrite even if present so a moved executable gets picked up
        write_atomic(&self.path, self.contents.as_bytes()).map_err(|e| self.io_error(e))?;
        info!("Autostart enabled: {}", self.path.display());
        Ok(())
    }

    fn disable(&self) -> Result<(), GatewayError> {
        match fs::remove_file(&self.path) {
            Ok(()) => {
                info!("Autostart disabled: removed {}", self.path.display());
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                info!("Autostart already disabled (no entry found)");
                Ok(())
            }
            Err(e) => Err(self.io_error(e)),
        }
    }
}

/// LaunchAgent plist that runs `program` at login
///
/// The agent is not loaded with launchctl here; that would start a second
/// instance right away.
pub fn launch_agent_plist(program: &Path) -> String {
    let program = xml_escape(&program.to_string_lossy());
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE plist PUBLIC "-//Apple//DTD PLIST 1.0//EN" "http://www.apple.com/DTDs/PropertyList-1.0.dtd">
<plist version="1.0">
<dict>
    <key>Label</key>
    <string>{APP_LABEL}</string>
    <key>ProgramArguments</key>
    <array>
        <string>{program}</string>
    </array>
    <key>RunAtLoad</key>
    <true/>
    <key>KeepAlive</key>
    <false/>
</dict>
</plist>
"#
    )
}

/// XDG desktop entry that runs `program` at login
pub fn desktop_entry(program: &Path) -> String {
    // Exec quoting: wrap in double quotes and backslash `"`, `` ` ``, `$` and `\`.
    // The value is also a string-typed key whose escapes are undone first, so
    // every backslash of the quoted form is doubled once more.
    let mut quoted = String::from("\"");
    for ch in program.to_string_lossy().chars() {
        if matches!(ch, '"' | '`' | '$' | '\\') {
            quoted.push('\\');
        }
        quoted.push(ch);
    }
    quoted.push('"');
    let exec = quoted.replace('\\', "\\\\");

    format!(
        "[Desktop Entry]\n\
         Type=Application\n\
         Name={APP_NAME}\n\
         Comment=Keep the session from going idle\n\
         Exec={exec}\n\
         Terminal=false\n\
         X-GNOME-Autostart-enabled=true\n"
    )
}

fn xml_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
