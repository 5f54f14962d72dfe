use anyhow::Result;
use std::sync::Arc;
use tracing::info;

use crate::actuator::{ActuatorLoop, ChannelActuator, KeySignal, VolumeActuator, VolumeControl};
use crate::config::SessionConfig;
use crate::gesture::{classify, ChannelIntent, SharedIntents, VolumeIntent};
use crate::pose::Pose;

/// One gesture-control session: the intent cells plus both actuator loops.
///
/// The host drives it with `on_frame` for every processed pose and `stop` at the end.
pub struct GestureSession {
    intents: Arc<SharedIntents>,
    volume_loop: ActuatorLoop,
    channel_loop: ActuatorLoop,
}

impl GestureSession {
    pub fn start<C: VolumeControl + 'static>(
        config: &SessionConfig,
        volume: C,
        audible_feedback: bool,
        signal: Arc<dyn KeySignal>,
    ) -> Result<Self> {
        let intents = Arc::new(SharedIntents::new());

        let mut volume_loop = ActuatorLoop::new("volume", config.volume_period());
        let mut channel_loop = ActuatorLoop::new("channel", config.channel_period());
        volume_loop.start(VolumeActuator::new(intents.clone(), volume, audible_feedback))?;
        // volume_loop is dropped (and signalled) if this fails
        channel_loop.start(ChannelActuator::new(intents.clone(), signal))?;

        info!(
            volume_period_ms = config.volume_period_ms,
            channel_period_ms = config.channel_period_ms,
            "gesture session started"
        );
        Ok(Self {
            intents,
            volume_loop,
            channel_loop,
        })
    }

    /// Classify a frame and publish both intents. Never blocks on the loops.
    pub fn on_frame(&self, pose: &Pose) -> (VolumeIntent, ChannelIntent) {
        let (volume, channel) = classify(pose);
        self.intents.publish(volume, channel);
        (volume, channel)
    }

    pub fn intents(&self) -> &SharedIntents {
        &self.intents
    }

    pub fn is_running(&self) -> bool {
        use crate::actuator::LoopState::Running;
        self.volume_loop.state() == Running && self.channel_loop.state() == Running
    }

    /// Signal both loops, then wait for them to finish their in-flight tick.
    pub fn stop(&mut self) {
        self.intents.clear();
        self.volume_loop.request_stop();
        self.channel_loop.request_stop();
        self.volume_loop.join();
        self.channel_loop.join();
        info!("gesture session stopped");
    }
}
