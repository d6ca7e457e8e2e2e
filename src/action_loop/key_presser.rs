use crate::error::ActionError;
use crate::utils::keycode::ActionKey;
use enigo::{Direction, Enigo, Key, Keyboard, Settings};
use log::{debug, info};
use parking_lot::Mutex;

/// Performs the keep-alive action
pub trait KeyPresser: Send + Sync {
    /// Press and release `key` once
    fn press(&self, key: ActionKey) -> Result<(), ActionError>;
}

/// Synthesizes key presses with enigo
///
/// The input connection is opened on first use and dropped after a failure,
/// so a backend that is briefly unavailable (locked session, display server
/// restart) is retried on the next tick.
#[derive(Default)]
pub struct EnigoKeyPresser {
    enigo: Mutex<Option<Enigo>>,
}

impl EnigoKeyPresser {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyPresser for EnigoKeyPresser {
    fn press(&self, key: ActionKey) -> Result<(), ActionError> {
        let enigo_key = enigo_key(key).ok_or(ActionError::Unsupported(key))?;

        let mut slot = self.enigo.lock();
        if slot.is_none() {
            let enigo = Enigo::new(&Settings::default())
                .map_err(|e| ActionError::Unavailable(e.to_string()))?;
            info!("Input injection connected");
            *slot = Some(enigo);
        }
        let Some(enigo) = slot.as_mut() else {
            return Err(ActionError::Unavailable("no input connection".to_string()));
        };

        if let Err(e) = enigo.key(enigo_key, Direction::Click) {
            *slot = None;
            return Err(ActionError::Input(e.to_string()));
        }

        debug!("Key pressed: {}", key);
        Ok(())
    }
}

/// Map a keep-alive key to the enigo key, if the platform can synthesize it
pub fn enigo_key(key: ActionKey) -> Option<Key> {
    match key {
        ActionKey::F13 => Some(Key::F13),
        ActionKey::F14 => Some(Key::F14),
        ActionKey::F15 => Some(Key::F15),
        ActionKey::F16 => Some(Key::F16),
        ActionKey::F17 => Some(Key::F17),
        ActionKey::F18 => Some(Key::F18),
        ActionKey::F19 => Some(Key::F19),
        ActionKey::F20 => Some(Key::F20),
        #[cfg(not(target_os = "macos"))]
        ActionKey::F21 => Some(Key::F21),
        #[cfg(not(target_os = "macos"))]
        ActionKey::F22 => Some(Key::F22),
        #[cfg(not(target_os = "macos"))]
        ActionKey::F23 => Some(Key::F23),
        #[cfg(not(target_os = "macos"))]
        ActionKey::F24 => Some(Key::F24),
        // macOS keyboards stop at F20
        #[cfg(target_os = "macos")]
        ActionKey::F21 | ActionKey::F22 | ActionKey::F23 | ActionKey::F24 => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_common_keys_are_mapped() {
        for key in [ActionKey::F13, ActionKey::F15, ActionKey::F20] {
            assert!(enigo_key(key).is_some(), "{} should be mapped", key);
        }
    }

    #[test]
    #[cfg(target_os = "macos")]
    fn test_high_function_keys_unsupported_on_macos() {
        let presser = EnigoKeyPresser::new();
        assert!(matches!(
            presser.press(ActionKey::F24),
            Err(ActionError::Unsupported(ActionKey::F24))
        ));
    }
}
