//! Periodic keep-alive worker
//!
//! An `ActionLoop` owns one background thread that presses the configured key,
//! then waits for the interval, until it is cancelled. A loop never changes its
//! key or interval; a new configuration means a new loop.

pub mod cancel;
pub mod key_presser;

pub use cancel::CancellationToken;
pub use key_presser::{EnigoKeyPresser, KeyPresser};

use crate::config_file::Configuration;
use crate::utils::keycode::ActionKey;
use log::{debug, info, warn};
use std::io;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// Lifecycle of a loop; `Cancelled` is terminal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Running,
    Cancelled,
}

/// The settings a loop was started with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Snapshot {
    pub interval: Duration,
    pub key: ActionKey,
}

impl From<&Configuration> for Snapshot {
    fn from(config: &Configuration) -> Self {
        Self {
            interval: config.interval(),
            key: config.action_key,
        }
    }
}

/// Point-in-time view of a loop, for status displays
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoopStatus {
    pub generation: u64,
    pub state: LoopState,
    pub snapshot: Snapshot,
}

pub struct ActionLoop {
    generation: u64,
    snapshot: Snapshot,
    token: CancellationToken,
    handle: Option<JoinHandle<()>>,
}

impl ActionLoop {
    /// Start a worker thread that presses `snapshot.key` every `snapshot.interval`
    ///
    /// The first press happens immediately.
    pub fn spawn(
        generation: u64,
        snapshot: Snapshot,
        presser: Arc<dyn KeyPresser>,
    ) -> io::Result<Self> {
        let token = CancellationToken::new();
        let worker_token = token.clone();

        let handle = thread::Builder::new()
            .name(format!("action-loop-{}", generation))
            .spawn(move || run(generation, snapshot, presser, worker_token))?;

        Ok(Self {
            generation,
            snapshot,
            token,
            handle: Some(handle),
        })
    }

    /// Request the worker to stop; it will not press again
    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn state(&self) -> LoopState {
        if self.token.is_cancelled() {
            LoopState::Cancelled
        } else {
            LoopState::Running
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn snapshot(&self) -> Snapshot {
        self.snapshot
    }

    pub fn status(&self) -> LoopStatus {
        LoopStatus {
            generation: self.generation,
            state: self.state(),
            snapshot: self.snapshot,
        }
    }

    /// Whether the worker thread has exited
    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().map_or(true, |h| h.is_finished())
    }

    /// Cancel and wait for the worker thread to exit
    pub fn join(mut self) {
        self.cancel();
        self.wait();
    }

    fn wait(&mut self) {
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                warn!("Action loop {} panicked", self.generation);
            }
        }
    }
}

impl Drop for ActionLoop {
    fn drop(&mut self) {
        // Detach rather than join; the worker exits on its own once woken
        self.cancel();
    }
}

fn run(
    generation: u64,
    snapshot: Snapshot,
    presser: Arc<dyn KeyPresser>,
    token: CancellationToken,
) {
    info!(
        "Action loop {} started: pressing {} every {}s",
        generation,
        snapshot.key,
        snapshot.interval.as_secs_f64()
    );

    let mut presses = 0u64;
    while !token.is_cancelled() {
        match presser.press(snapshot.key) {
            Ok(()) => {
                presses += 1;
                debug!("Action loop {}: pressed {}", generation, snapshot.key);
            }
            Err(e) => warn!("Action loop {}: {}", generation, e),
        }

        if token.wait_timeout(snapshot.interval) {
            break;
        }
    }

    info!(
        "Action loop {} stopped after {} presses",
        generation, presses
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ActionError;
    use parking_lot::Mutex;
    use std::time::Instant;

    #[derive(Default)]
    struct CountingPresser {
        keys: Mutex<Vec<ActionKey>>,
    }

    impl KeyPresser for CountingPresser {
        fn press(&self, key: ActionKey) -> Result<(), ActionError> {
            self.keys.lock().push(key);
            Ok(())
        }
    }

    fn snapshot(millis: u64) -> Snapshot {
        Snapshot {
            interval: Duration::from_millis(millis),
            key: ActionKey::F15,
        }
    }

    #[test]
    fn test_first_press_is_immediate() {
        let presser = Arc::new(CountingPresser::default());
        let action_loop = ActionLoop::spawn(1, snapshot(60_000), presser.clone()).unwrap();

        let deadline = Instant::now() + Duration::from_secs(5);
        while presser.keys.lock().is_empty() && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(5));
        }

        assert_eq!(*presser.keys.lock(), vec![ActionKey::F15]);
        assert_eq!(action_loop.state(), LoopState::Running);
        action_loop.join();
    }

    #[test]
    fn test_join_is_prompt_with_long_interval() {
        let presser = Arc::new(CountingPresser::default());
        let action_loop = ActionLoop::spawn(7, snapshot(3_600_000), presser).unwrap();
        assert_eq!(action_loop.generation(), 7);

        thread::sleep(Duration::from_millis(20));
        let started = Instant::now();
        action_loop.join();
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[test]
    fn test_cancel_sets_state_and_stops_worker() {
        let presser = Arc::new(CountingPresser::default());
        let action_loop = ActionLoop::spawn(2, snapshot(10), presser.clone()).unwrap();

        thread::sleep(Duration::from_millis(50));
        action_loop.cancel();
        assert_eq!(action_loop.state(), LoopState::Cancelled);

        let deadline = Instant::now() + Duration::from_secs(5);
        while !action_loop.is_finished() && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(5));
        }
        assert!(action_loop.is_finished());

        let count = presser.keys.lock().len();
        thread::sleep(Duration::from_millis(50));
        assert_eq!(presser.keys.lock().len(), count, "no presses after cancel");
    }
}
