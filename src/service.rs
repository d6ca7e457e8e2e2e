//! Service lifecycle: the current configuration and the one loop that acts on it

use crate::action_loop::{ActionLoop, KeyPresser, LoopStatus, Snapshot};
use crate::autostart::AutoStartGateway;
use crate::config_file::{ConfigStore, Configuration};
use crate::error::{GatewayError, PersistenceError, ServiceError};
use log::{error, info, warn};
use parking_lot::Mutex;
use std::io;
use std::sync::Arc;
use thiserror::Error;

/// A non-fatal problem encountered while applying a configuration
#[derive(Debug, Error)]
pub enum UpdateWarning {
    #[error("configuration was applied but not saved")]
    NotSaved(#[source] PersistenceError),

    #[error("launch at login could not be updated")]
    AutoStart(#[source] GatewayError),
}

impl UpdateWarning {
    /// The warning followed by its chain of causes, on one line
    pub fn describe(&self) -> String {
        let mut text = self.to_string();
        let mut source = std::error::Error::source(self);
        while let Some(cause) = source {
            text.push_str(": ");
            text.push_str(&cause.to_string());
            source = cause.source();
        }
        text
    }
}

/// Outcome of a successful `update` or `reload`
#[derive(Debug)]
pub struct UpdateReport {
    /// The configuration now in effect
    pub config: Configuration,
    /// Generation of the loop started for it
    pub generation: u64,
    pub warnings: Vec<UpdateWarning>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Idle,
    Running,
    Stopped,
}

struct ServiceState {
    phase: Phase,
    config: Configuration,
    active: Option<ActionLoop>,
    generation: u64,
}

struct ControllerInner {
    store: ConfigStore,
    gateway: Box<dyn AutoStartGateway>,
    presser: Arc<dyn KeyPresser>,
    state: Mutex<ServiceState>,
}

/// Owns the configuration and the active action loop
///
/// Cloning is cheap; clones share the same service.
#[derive(Clone)]
pub struct ServiceController {
    inner: Arc<ControllerInner>,
}

impl ServiceController {
    pub fn new(
        store: ConfigStore,
        gateway: Box<dyn AutoStartGateway>,
        presser: Arc<dyn KeyPresser>,
    ) -> Self {
        Self {
            inner: Arc::new(ControllerInner {
                store,
                gateway,
                presser,
                state: Mutex::new(ServiceState {
                    phase: Phase::Idle,
                    config: Configuration::default(),
                    active: None,
                    generation: 0,
                }),
            }),
        }
    }

    pub fn store(&self) -> &ConfigStore {
        &self.inner.store
    }

    /// Load the stored configuration and start acting on it
    ///
    /// Autostart failures are logged; the service still starts.
    pub fn start(&self) -> Result<(), ServiceError> {
        let mut state = self.inner.state.lock();
        match state.phase {
            Phase::Idle => {}
            Phase::Running => return Err(ServiceError::AlreadyStarted),
            Phase::Stopped => return Err(ServiceError::ShutDown),
        }

        let config = self.inner.store.load();
        info!(
            "Starting with interval {}s, key {}, launch at login {}",
            config.interval_secs, config.action_key, config.auto_start
        );

        if let Err(e) = self.reconcile_autostart(config.auto_start) {
            warn!("Failed to update launch at login: {:#}", anyhow::Error::new(e));
        }

        self.replace_loop(&mut state, config)?;
        state.phase = Phase::Running;
        Ok(())
    }

    /// Validate, persist and apply a new configuration
    ///
    /// On a validation error nothing changes. Save and autostart failures do
    /// not block the change; they are returned as warnings.
    pub fn update(&self, config: Configuration) -> Result<UpdateReport, ServiceError> {
        self.apply(config, true)
    }

    /// `update` from raw settings values (free-text key name, signed interval)
    pub fn apply_settings(
        &self,
        interval_secs: i64,
        key_name: &str,
        auto_start: bool,
    ) -> Result<UpdateReport, ServiceError> {
        let config = Configuration::from_settings(interval_secs, key_name, auto_start)?;
        self.update(config)
    }

    /// Re-read the config file and apply it
    ///
    /// For when another process edited the file directly. The value just read
    /// is not written back.
    pub fn reload(&self) -> Result<UpdateReport, ServiceError> {
        self.ensure_running()?;
        let config = self.inner.store.load();
        info!("Reloading configuration from {}", self.inner.store.path().display());
        self.apply(config, false)
    }

    /// Stop the active loop and wait for its worker to exit
    ///
    /// Safe to call more than once. After this, `update` and `reload` fail
    /// with `ServiceError::ShutDown`.
    pub fn shutdown(&self) {
        let mut state = self.inner.state.lock();
        if state.phase == Phase::Stopped {
            return;
        }
        state.phase = Phase::Stopped;

        if let Some(action_loop) = state.active.take() {
            action_loop.join();
        }
        info!("Service stopped");
    }

    pub fn current_config(&self) -> Configuration {
        self.inner.state.lock().config
    }

    pub fn active_loop(&self) -> Option<LoopStatus> {
        self.inner
            .state
            .lock()
            .active
            .as_ref()
            .map(ActionLoop::status)
    }

    pub fn is_running(&self) -> bool {
        self.inner.state.lock().phase == Phase::Running
    }

    fn ensure_running(&self) -> Result<(), ServiceError> {
        match self.inner.state.lock().phase {
            Phase::Idle => Err(ServiceError::NotStarted),
            Phase::Running => Ok(()),
            Phase::Stopped => Err(ServiceError::ShutDown),
        }
    }

    fn apply(&self, config: Configuration, persist: bool) -> Result<UpdateReport, ServiceError> {
        config.validate()?;

        // Everything below happens under one lock so readers never see the
        // new configuration alongside the old loop.
        let mut state = self.inner.state.lock();
        match state.phase {
            Phase::Idle => return Err(ServiceError::NotStarted),
            Phase::Running => {}
            Phase::Stopped => return Err(ServiceError::ShutDown),
        }

        let mut warnings = Vec::new();

        if persist {
            if let Err(e) = self.inner.store.save(&config) {
                let warning = UpdateWarning::NotSaved(e);
                warn!("{}", warning.describe());
                warnings.push(warning);
            }
        }

        if let Err(e) = self.reconcile_autostart(config.auto_start) {
            let warning = UpdateWarning::AutoStart(e);
            warn!("{}", warning.describe());
            warnings.push(warning);
        }

        let previous = state.config;
        let generation = self.replace_loop(&mut state, config)?;
        if previous != config {
            info!(
                "Configuration changed: interval {}s -> {}s, key {} -> {}, launch at login {} -> {}",
                previous.interval_secs,
                config.interval_secs,
                previous.action_key,
                config.action_key,
                previous.auto_start,
                config.auto_start
            );
        }

        Ok(UpdateReport {
            config,
            generation,
            warnings,
        })
    }

    fn replace_loop(
        &self,
        state: &mut ServiceState,
        config: Configuration,
    ) -> Result<u64, ServiceError> {
        let presser = &self.inner.presser;
        swap_loop(state, config, |generation, snapshot| {
            ActionLoop::spawn(generation, snapshot, presser.clone())
        })
    }

    /// Make the login item match `desired`, touching it only if it differs
    fn reconcile_autostart(&self, desired: bool) -> Result<(), GatewayError> {
        let gateway = &self.inner.gateway;
        if gateway.is_enabled() == desired {
            return Ok(());
        }
        if desired {
            gateway.enable()
        } else {
            gateway.disable()
        }
    }
}

/// Stop the current loop (if any) and start one for `config`
///
/// The configuration and loop are committed together. If the new loop cannot
/// be started, the previous configuration stays in effect and, once running,
/// its loop is restarted.
fn swap_loop<F>(
    state: &mut ServiceState,
    config: Configuration,
    mut spawn: F,
) -> Result<u64, ServiceError>
where
    F: FnMut(u64, Snapshot) -> io::Result<ActionLoop>,
{
    if let Some(old) = state.active.take() {
        old.join();
    }

    state.generation += 1;
    let generation = state.generation;
    match spawn(generation, Snapshot::from(&config)) {
        Ok(action_loop) => {
            state.config = config;
            state.active = Some(action_loop);
            Ok(generation)
        }
        Err(e) => {
            error!("Failed to spawn action loop {}: {}", generation, e);
            if state.phase == Phase::Running {
                state.generation += 1;
                match spawn(state.generation, Snapshot::from(&state.config)) {
                    Ok(action_loop) => state.active = Some(action_loop),
                    Err(e) => error!("Failed to restart previous action loop: {}", e),
                }
            }
            Err(ServiceError::Spawn(e))
        }
    }
}
