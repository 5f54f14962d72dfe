//! Fixed-period actuator threads.
//!
//! Each loop wakes on its own deadline, independent of frame arrival, and runs one
//! `Actuator::tick`. A stop request wakes the thread immediately; the tick that is
//! already running finishes first.

pub mod channel;
pub mod keycode;
pub mod volume;

pub use channel::ChannelActuator;
pub use keycode::{KeyCode, KeySignal, OscKeySender};
pub use volume::{CommandVolume, KeyCodeVolume, VolumeActuator, VolumeControl, VolumeStep};

use anyhow::{Context, Result};
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, info, trace};

/// One unit of periodic work
pub trait Actuator: Send + 'static {
    fn tick(&mut self);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Idle,
    Running,
    Stopping,
    Stopped,
}

impl LoopState {
    fn to_raw(self) -> u8 {
        match self {
            Self::Idle => 0,
            Self::Running => 1,
            Self::Stopping => 2,
            Self::Stopped => 3,
        }
    }

    fn from_raw(raw: u8) -> Self {
        match raw {
            0 => Self::Idle,
            1 => Self::Running,
            2 => Self::Stopping,
            _ => Self::Stopped,
        }
    }
}

struct SharedState(AtomicU8);

impl SharedState {
    fn get(&self) -> LoopState {
        LoopState::from_raw(self.0.load(Ordering::Acquire))
    }

    fn set(&self, state: LoopState) {
        self.0.store(state.to_raw(), Ordering::Release);
    }

    /// Running → Stopping. Returns false if the loop was not running.
    fn begin_stop(&self) -> bool {
        self.0
            .compare_exchange(
                LoopState::Running.to_raw(),
                LoopState::Stopping.to_raw(),
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .is_ok()
    }
}

/// Background thread running an `Actuator` every `period`
pub struct ActuatorLoop {
    name: String,
    period: Duration,
    state: Arc<SharedState>,
    handle: Option<thread::JoinHandle<()>>,
}

impl ActuatorLoop {
    pub fn new(name: &str, period: Duration) -> Self {
        Self {
            name: name.to_string(),
            period,
            state: Arc::new(SharedState(AtomicU8::new(LoopState::Idle.to_raw()))),
            handle: None,
        }
    }

    pub fn state(&self) -> LoopState {
        self.state.get()
    }

    /// Idle → Running. A loop runs at most once.
    pub fn start<A: Actuator>(&mut self, mut actuator: A) -> Result<()> {
        if self.state.get() != LoopState::Idle {
            anyhow::bail!("{} loop already started ({:?})", self.name, self.state.get());
        }
        if self.period.is_zero() {
            anyhow::bail!("{} loop period must be non-zero", self.name);
        }
        self.state.set(LoopState::Running);

        let state = self.state.clone();
        let name = self.name.clone();
        let period = self.period;
        let spawned = thread::Builder::new()
            .name(format!("{}-actuator", self.name))
            .spawn(move || {
                info!(actuator = %name, period_ms = period.as_millis() as u64, "loop started");
                let mut next_tick = Instant::now() + period;
                while wait_until(&state, &name, next_tick) {
                    actuator.tick();
                    next_tick += period;
                    let now = Instant::now();
                    // A slow tick skips missed deadlines instead of bursting.
                    if next_tick <= now {
                        next_tick = now + period;
                    }
                }
                state.set(LoopState::Stopped);
                info!(actuator = %name, "loop exited");
            });

        match spawned {
            Ok(handle) => {
                self.handle = Some(handle);
                Ok(())
            }
            Err(e) => {
                self.state.set(LoopState::Stopped);
                Err(e).with_context(|| format!("Failed to spawn {} loop", self.name))
            }
        }
    }

    /// Running → Stopping, and wake the thread so it exits without waiting out
    /// the rest of its period. Does not wait.
    pub fn request_stop(&self) {
        if self.state.begin_stop() {
            debug!(actuator = %self.name, "stop requested");
            if let Some(handle) = &self.handle {
                handle.thread().unpark();
            }
        } else if self.state.get() == LoopState::Idle {
            self.state.set(LoopState::Stopped);
        }
    }

    /// Wait for the thread to exit. Returns after the in-flight tick completes.
    pub fn join(&mut self) {
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                self.state.set(LoopState::Stopped);
                tracing::error!(actuator = %self.name, "loop thread panicked");
            }
        }
    }

    pub fn stop(&mut self) {
        self.request_stop();
        self.join();
    }
}

impl Drop for ActuatorLoop {
    /// Signal only; the thread is left detached so it never holds up shutdown.
    fn drop(&mut self) {
        self.request_stop();
    }
}

/// Park until `deadline`. Returns false as soon as the loop is no longer running.
fn wait_until(state: &SharedState, name: &str, deadline: Instant) -> bool {
    loop {
        if state.get() != LoopState::Running {
            return false;
        }
        let now = Instant::now();
        if now >= deadline {
            return true;
        }
        thread::park_timeout(deadline - now);
        if state.get() == LoopState::Running && Instant::now() < deadline {
            trace!(actuator = %name, "woke before deadline, waiting again");
        }
    }
}
