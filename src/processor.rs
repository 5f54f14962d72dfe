use anyhow::Result;
use std::time::Duration;
use tracing::{info, warn};

use crate::pose::Pose;
use crate::protocol::RemoteFrame;
use crate::session::GestureSession;

/// Capability interface for a pose detector variant.
///
/// `process` runs `detect` and routes the result to exactly one of the two hooks.
pub trait FrameProcessor {
    type Frame;
    type Output;

    fn detect(&mut self, frame: Self::Frame) -> Result<Self::Output>;
    fn on_success(&mut self, output: Self::Output);
    fn on_failure(&mut self, error: anyhow::Error);

    fn process(&mut self, frame: Self::Frame) {
        match self.detect(frame) {
            Ok(output) => self.on_success(output),
            Err(e) => self.on_failure(e),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub frames: u64,
    pub failures: u64,
}

/// Poses detected on a remote host and streamed in over the pose protocol
pub struct RemotePoseProcessor<'a> {
    session: &'a GestureSession,
    stats: FrameStats,
    window: FrameStats,
    window_start_us: Option<u64>,
}

impl<'a> RemotePoseProcessor<'a> {
    const STATS_INTERVAL: Duration = Duration::from_secs(1);

    pub fn new(session: &'a GestureSession) -> Self {
        Self {
            session,
            stats: FrameStats::default(),
            window: FrameStats::default(),
            window_start_us: None,
        }
    }

    pub fn stats(&self) -> FrameStats {
        self.stats
    }

    /// Process a frame stamped by the sender and log once per second of stream time.
    pub fn process_at(&mut self, timestamp_us: u64, frame: RemoteFrame) {
        self.process(frame);

        let start = *self.window_start_us.get_or_insert(timestamp_us);
        let elapsed_us = timestamp_us.saturating_sub(start);
        if elapsed_us >= Self::STATS_INTERVAL.as_micros() as u64 {
            let fps = self.window.frames as f64 * 1_000_000.0 / elapsed_us as f64;
            info!(
                fps = %format!("{:.1}", fps),
                failures = self.window.failures,
                volume = ?self.session.intents().volume.load(),
                channel = ?self.session.intents().channel.load(),
                "pose stream"
            );
            self.window = FrameStats::default();
            self.window_start_us = Some(timestamp_us);
        }
    }
}

impl FrameProcessor for RemotePoseProcessor<'_> {
    type Frame = RemoteFrame;
    type Output = Pose;

    fn detect(&mut self, frame: RemoteFrame) -> Result<Pose> {
        match frame {
            RemoteFrame::Pose(pose) => Ok(pose),
            RemoteFrame::Failed { reason } => Err(anyhow::anyhow!("remote detector: {}", reason)),
        }
    }

    fn on_success(&mut self, pose: Pose) {
        self.stats.frames += 1;
        self.window.frames += 1;
        self.session.on_frame(&pose);
    }

    /// The intents keep their last value; the next good frame overwrites them.
    fn on_failure(&mut self, error: anyhow::Error) {
        self.stats.failures += 1;
        self.window.failures += 1;
        warn!("pose detection failed: {:#}", error);
    }
}
