//! Windows Run key registration

use super::AutoStartGateway;
use crate::constants::APP_NAME;
use crate::error::GatewayError;
use log::{info, warn};
use std::ffi::OsStr;
use std::os::windows::ffi::OsStrExt;
use std::path::PathBuf;

use windows_sys::Win32::Foundation::{ERROR_FILE_NOT_FOUND, ERROR_SUCCESS};
use windows_sys::Win32::System::Registry::{
    RegCloseKey, RegCreateKeyExW, RegDeleteValueW, RegOpenKeyExW, RegQueryValueExW,
    RegSetValueExW, HKEY, HKEY_CURRENT_USER, KEY_READ, KEY_WRITE, REG_OPTION_NON_VOLATILE, REG_SZ,
};

const RUN_SUBKEY: &str = r"Software\Microsoft\Windows\CurrentVersion\Run";

/// `HKCU\...\Run\StayAlive = "<exe>"`
pub struct RunKey {
    program: PathBuf,
}

impl RunKey {
    pub fn new(program: PathBuf) -> Self {
        Self { program }
    }

    /// Quoted command line; embedded quotes are doubled
    fn command_line(&self) -> String {
        format!(
            "\"{}\"",
            self.program.to_string_lossy().replace('"', "\"\"")
        )
    }
}

/// UTF-16, null-terminated
fn to_wide(s: &str) -> Vec<u16> {
    OsStr::new(s)
        .encode_wide()
        .chain(std::iter::once(0))
        .collect()
}

/// Open (or create) the Run key with the requested access
fn open_run_key(access: u32, create: bool) -> Result<HKEY, u32> {
    let subkey = to_wide(RUN_SUBKEY);
    let mut hkey: HKEY = std::ptr::null_mut();
    let result = unsafe {
        if create {
            RegCreateKeyExW(
                HKEY_CURRENT_USER,
                subkey.as_ptr(),
                0,
                std::ptr::null(),
                REG_OPTION_NON_VOLATILE,
                access,
                std::ptr::null(),
                &mut hkey,
                std::ptr::null_mut(),
            )
        } else {
            RegOpenKeyExW(HKEY_CURRENT_USER, subkey.as_ptr(), 0, access, &mut hkey)
        }
    };
    if result == ERROR_SUCCESS {
        Ok(hkey)
    } else {
        Err(result)
    }
}

impl AutoStartGateway for RunKey {
    fn is_enabled(&self) -> bool {
        let hkey = match open_run_key(KEY_READ, false) {
            Ok(hkey) => hkey,
            Err(code) => {
                if code != ERROR_FILE_NOT_FOUND {
                    warn!("Error opening registry key: code {}", code);
                }
                return false;
            }
        };

        let value = to_wide(APP_NAME);
        let result = unsafe {
            let result = RegQueryValueExW(
                hkey,
                value.as_ptr(),
                std::ptr::null_mut(),
                std::ptr::null_mut(),
                std::ptr::null_mut(),
                std::ptr::null_mut(),
            );
            RegCloseKey(hkey);
            result
        };
        result == ERROR_SUCCESS
    }

    fn enable(&self) -> Result<(), GatewayError> {
        let hkey = open_run_key(KEY_WRITE, true).map_err(|c| GatewayError::Registry(c as i32))?;

        let value = to_wide(APP_NAME);
        let data = to_wide(&self.command_line());
        let result = unsafe {
            let result = RegSetValueExW(
                hkey,
                value.as_ptr(),
                0,
                REG_SZ,
                data.as_ptr() as *const u8,
                (data.len() * 2) as u32,
            );
            RegCloseKey(hkey);
            result
        };

        if result != ERROR_SUCCESS {
            return Err(GatewayError::Registry(result as i32));
        }
        info!("Autostart enabled: {}", self.command_line());
        Ok(())
    }

    fn disable(&self) -> Result<(), GatewayError> {
        let hkey = match open_run_key(KEY_WRITE, false) {
            Ok(hkey) => hkey,
            // No Run key at all means nothing is registered
            Err(ERROR_FILE_NOT_FOUND) => return Ok(()),
            Err(code) => return Err(GatewayError::Registry(code as i32)),
        };

        let value = to_wide(APP_NAME);
        let result = unsafe {
            let result = RegDeleteValueW(hkey, value.as_ptr());
            RegCloseKey(hkey);
            result
        };

        match result {
            ERROR_SUCCESS => {
                info!("Autostart disabled");
                Ok(())
            }
            ERROR_FILE_NOT_FOUND => {
                info!("Autostart already disabled (no entry found)");
                Ok(())
            }
            code => Err(GatewayError::Registry(code as i32)),
        }
    }
}
