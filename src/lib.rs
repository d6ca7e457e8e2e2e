// Library interface for StayAlive
// Shared by the CLI and the tray app, and used directly by the tests

pub mod action_loop;
pub mod autostart;
pub mod config;
pub mod config_file;
pub mod constants;
pub mod error;
pub mod service;
pub mod utils;

pub use action_loop::{EnigoKeyPresser, KeyPresser, LoopState, LoopStatus};
pub use autostart::AutoStartGateway;
pub use config_file::{ConfigStore, Configuration};
pub use error::{ActionError, GatewayError, PersistenceError, ServiceError, ValidationError};
pub use service::{ServiceController, UpdateReport, UpdateWarning};
pub use utils::keycode::ActionKey;

use anyhow::{Context, Result};
use std::sync::Arc;

/// Controller wired to the platform's login item and enigo key synthesis
pub fn platform_controller(store: ConfigStore) -> Result<ServiceController> {
    let gateway = autostart::platform_gateway().context("Failed to set up launch at login")?;
    Ok(ServiceController::new(
        store,
        gateway,
        Arc::new(EnigoKeyPresser::new()),
    ))
}
