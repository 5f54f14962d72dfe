//! Recording actuator backends for unit tests.

use anyhow::Result;
use std::sync::{Arc, Mutex};

use crate::actuator::{KeyCode, KeySignal, VolumeControl, VolumeStep};

/// Records every volume step with its feedback flag. Clones share the log.
#[derive(Clone, Default)]
pub struct VolumeLog(Arc<Mutex<Vec<(VolumeStep, bool)>>>);

impl VolumeLog {
    pub fn steps(&self) -> Vec<(VolumeStep, bool)> {
        self.0.lock().unwrap().clone()
    }
}

impl VolumeControl for VolumeLog {
    fn adjust(&mut self, step: VolumeStep, audible_feedback: bool) -> Result<()> {
        self.0.lock().unwrap().push((step, audible_feedback));
        Ok(())
    }
}

/// Records every key code sent
#[derive(Default)]
pub struct KeyLog(Mutex<Vec<KeyCode>>);

impl KeyLog {
    pub fn keys(&self) -> Vec<KeyCode> {
        self.0.lock().unwrap().clone()
    }
}

impl KeySignal for KeyLog {
    fn send_key(&self, key: KeyCode) -> Result<()> {
        self.0.lock().unwrap().push(key);
        Ok(())
    }
}
