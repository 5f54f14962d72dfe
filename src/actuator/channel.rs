use std::sync::Arc;
use tracing::{debug, warn};

use super::keycode::{KeyCode, KeySignal};
use super::Actuator;
use crate::gesture::{ChannelIntent, SharedIntents};

/// Reads Channel-Intent each tick and sends one channel key while held.
pub struct ChannelActuator {
    intents: Arc<SharedIntents>,
    signal: Arc<dyn KeySignal>,
}

impl ChannelActuator {
    pub fn new(intents: Arc<SharedIntents>, signal: Arc<dyn KeySignal>) -> Self {
        Self { intents, signal }
    }
}

impl Actuator for ChannelActuator {
    fn tick(&mut self) {
        let intent = self.intents.channel.load();
        debug!(?intent, "channel tick");
        let key = match intent {
            ChannelIntent::Up => KeyCode::ChannelUp,
            ChannelIntent::Down => KeyCode::ChannelDown,
            ChannelIntent::NoChange => return,
        };
        if let Err(e) = self.signal.send_key(key) {
            warn!(code = key.code(), "channel signal failed: {:#}", e);
        }
    }
}
