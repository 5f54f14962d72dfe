use anyhow::{Context, Result};
use std::process::Command;
use std::sync::Arc;
use tracing::{debug, warn};

use super::keycode::{KeyCode, KeySignal};
use super::Actuator;
use crate::config::{VolumeBackend, VolumeConfig};
use crate::gesture::{SharedIntents, VolumeIntent};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VolumeStep {
    Raise,
    Lower,
}

/// Platform volume API
pub trait VolumeControl: Send {
    /// One discrete step. `audible_feedback` asks the backend to play a sound.
    fn adjust(&mut self, step: VolumeStep, audible_feedback: bool) -> Result<()>;
}

impl VolumeControl for Box<dyn VolumeControl> {
    fn adjust(&mut self, step: VolumeStep, audible_feedback: bool) -> Result<()> {
        (**self).adjust(step, audible_feedback)
    }
}

/// Volume through external commands, e.g. `pactl set-sink-volume`
pub struct CommandVolume {
    raise: Vec<String>,
    lower: Vec<String>,
    feedback: Vec<String>,
}

impl CommandVolume {
    pub fn new(raise: Vec<String>, lower: Vec<String>, feedback: Vec<String>) -> Result<Self> {
        if raise.is_empty() || lower.is_empty() {
            anyhow::bail!("raise_command and lower_command must not be empty");
        }
        Ok(Self {
            raise,
            lower,
            feedback,
        })
    }

    pub fn from_config(config: &VolumeConfig) -> Result<Self> {
        Self::new(
            config.raise_command.clone(),
            config.lower_command.clone(),
            config.feedback_command.clone(),
        )
    }
}

fn run(argv: &[String]) -> Result<()> {
    let (program, args) = argv.split_first().context("empty command")?;
    let status = Command::new(program)
        .args(args)
        .status()
        .with_context(|| format!("Failed to run {}", program))?;
    if !status.success() {
        anyhow::bail!("{} exited with {}", program, status);
    }
    Ok(())
}

impl VolumeControl for CommandVolume {
    fn adjust(&mut self, step: VolumeStep, audible_feedback: bool) -> Result<()> {
        match step {
            VolumeStep::Raise => run(&self.raise)?,
            VolumeStep::Lower => run(&self.lower)?,
        }
        if audible_feedback && !self.feedback.is_empty() {
            run(&self.feedback)?;
        }
        Ok(())
    }
}

/// Volume as key codes 24 / 25 to the receiver. Feedback is the receiver's job.
pub struct KeyCodeVolume {
    signal: Arc<dyn KeySignal>,
}

impl KeyCodeVolume {
    pub fn new(signal: Arc<dyn KeySignal>) -> Self {
        Self { signal }
    }
}

impl VolumeControl for KeyCodeVolume {
    fn adjust(&mut self, step: VolumeStep, _audible_feedback: bool) -> Result<()> {
        let key = match step {
            VolumeStep::Raise => KeyCode::VolumeUp,
            VolumeStep::Lower => KeyCode::VolumeDown,
        };
        self.signal.send_key(key)
    }
}

/// Build the configured backend
pub fn backend_from_config(
    config: &VolumeConfig,
    signal: Arc<dyn KeySignal>,
) -> Result<Box<dyn VolumeControl>> {
    let control: Box<dyn VolumeControl> = match config.backend {
        VolumeBackend::Command => Box::new(CommandVolume::from_config(config)?),
        VolumeBackend::Keycode => Box::new(KeyCodeVolume::new(signal)),
    };
    Ok(control)
}

/// Reads Volume-Intent each tick; one step per tick while a gesture is held.
pub struct VolumeActuator<C: VolumeControl> {
    intents: Arc<SharedIntents>,
    control: C,
    audible_feedback: bool,
}

impl<C: VolumeControl> VolumeActuator<C> {
    pub fn new(intents: Arc<SharedIntents>, control: C, audible_feedback: bool) -> Self {
        Self {
            intents,
            control,
            audible_feedback,
        }
    }
}

impl<C: VolumeControl + 'static> Actuator for VolumeActuator<C> {
    fn tick(&mut self) {
        let intent = self.intents.volume.load();
        debug!(?intent, "volume tick");
        let step = match intent {
            VolumeIntent::Increase => VolumeStep::Raise,
            VolumeIntent::Decrease => VolumeStep::Lower,
            VolumeIntent::NoChange => return,
        };
        if let Err(e) = self.control.adjust(step, self.audible_feedback) {
            warn!(?step, "volume step failed: {:#}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{KeyLog, VolumeLog};

    struct Failing;

    impl VolumeControl for Failing {
        fn adjust(&mut self, _: VolumeStep, _: bool) -> Result<()> {
            anyhow::bail!("mixer unavailable")
        }
    }

    #[test]
    fn test_tick_follows_intent() {
        let intents = Arc::new(SharedIntents::new());
        let recorder = VolumeLog::default();
        let mut actuator = VolumeActuator::new(intents.clone(), recorder.clone(), true);

        actuator.tick();
        intents.volume.store(VolumeIntent::Increase);
        actuator.tick();
        actuator.tick();
        intents.volume.store(VolumeIntent::Decrease);
        actuator.tick();

        assert_eq!(
            recorder.steps(),
            vec![
                (VolumeStep::Raise, true),
                (VolumeStep::Raise, true),
                (VolumeStep::Lower, true),
            ]
        );
    }

    #[test]
    fn test_failed_step_does_not_panic() {
        let intents = Arc::new(SharedIntents::new());
        intents.volume.store(VolumeIntent::Increase);
        let mut actuator = VolumeActuator::new(intents, Failing, false);
        actuator.tick();
        actuator.tick();
    }

    #[test]
    fn test_keycode_volume() {
        let log = Arc::new(KeyLog::default());
        let mut control = KeyCodeVolume::new(log.clone());
        control.adjust(VolumeStep::Raise, true).unwrap();
        control.adjust(VolumeStep::Lower, false).unwrap();
        assert_eq!(
            log.keys(),
            vec![KeyCode::VolumeUp, KeyCode::VolumeDown]
        );
    }

    #[test]
    fn test_command_volume_requires_commands() {
        assert!(CommandVolume::new(vec![], vec!["true".into()], vec![]).is_err());
    }

    #[test]
    fn test_command_volume_runs_commands() {
        let mut ok = CommandVolume::new(vec!["true".into()], vec!["true".into()], vec![]).unwrap();
        assert!(ok.adjust(VolumeStep::Raise, true).is_ok());

        let mut bad = CommandVolume::new(
            vec!["false".into()],
            vec!["true".into()],
            vec!["false".into()],
        )
        .unwrap();
        assert!(bad.adjust(VolumeStep::Raise, false).is_err());
        assert!(bad.adjust(VolumeStep::Lower, false).is_ok());
        assert!(bad.adjust(VolumeStep::Lower, true).is_err());
    }
}
