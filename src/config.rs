use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub receiver: ReceiverConfig,
    #[serde(default)]
    pub volume: VolumeConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub log: LogConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SessionConfig {
    /// Volume actuator tick period (ms)
    #[serde(default = "default_volume_period_ms")]
    pub volume_period_ms: u64,
    /// Channel actuator tick period (ms)
    #[serde(default = "default_channel_period_ms")]
    pub channel_period_ms: u64,
}

fn default_volume_period_ms() -> u64 { 500 }
fn default_channel_period_ms() -> u64 { 1000 }

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            volume_period_ms: default_volume_period_ms(),
            channel_period_ms: default_channel_period_ms(),
        }
    }
}

impl SessionConfig {
    pub fn volume_period(&self) -> Duration {
        Duration::from_millis(self.volume_period_ms)
    }

    pub fn channel_period(&self) -> Duration {
        Duration::from_millis(self.channel_period_ms)
    }
}

/// Receiver application for key code signals
#[derive(Debug, Deserialize, Clone)]
pub struct ReceiverConfig {
    /// UDP target
    #[serde(default = "default_receiver_addr")]
    pub addr: String,
    /// OSC address the receiver listens on
    #[serde(default = "default_osc_path")]
    pub osc_path: String,
    /// Package name of the receiving application
    #[serde(default = "default_package")]
    pub package: String,
}

fn default_receiver_addr() -> String { "127.0.0.1:39580".to_string() }
fn default_osc_path() -> String { "/dtv/key_code".to_string() }
fn default_package() -> String { "com.sony.dtv.tvx".to_string() }

impl Default for ReceiverConfig {
    fn default() -> Self {
        Self {
            addr: default_receiver_addr(),
            osc_path: default_osc_path(),
            package: default_package(),
        }
    }
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum VolumeBackend {
    /// Run external commands (pactl, amixer, ...)
    #[default]
    Command,
    /// Send volume key codes to the receiver
    Keycode,
}

#[derive(Debug, Deserialize, Clone)]
pub struct VolumeConfig {
    #[serde(default)]
    pub backend: VolumeBackend,
    #[serde(default = "default_audible_feedback")]
    pub audible_feedback: bool,
    #[serde(default = "default_raise_command")]
    pub raise_command: Vec<String>,
    #[serde(default = "default_lower_command")]
    pub lower_command: Vec<String>,
    /// Played after a step when audible feedback is on. Empty disables it.
    #[serde(default = "default_feedback_command")]
    pub feedback_command: Vec<String>,
}

fn default_audible_feedback() -> bool { true }

fn default_raise_command() -> Vec<String> {
    ["pactl", "set-sink-volume", "@DEFAULT_SINK@", "+5%"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_lower_command() -> Vec<String> {
    ["pactl", "set-sink-volume", "@DEFAULT_SINK@", "-5%"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_feedback_command() -> Vec<String> {
    [
        "paplay",
        "/usr/share/sounds/freedesktop/stereo/audio-volume-change.oga",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

impl Default for VolumeConfig {
    fn default() -> Self {
        Self {
            backend: VolumeBackend::default(),
            audible_feedback: default_audible_feedback(),
            raise_command: default_raise_command(),
            lower_command: default_lower_command(),
            feedback_command: default_feedback_command(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// Pose stream listen address
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,
}

fn default_listen_addr() -> String { "0.0.0.0:39581".to_string() }

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct LogConfig {
    #[serde(default = "default_log_dir")]
    pub dir: PathBuf,
    /// Filter directive, overridden by RUST_LOG
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_dir() -> PathBuf { PathBuf::from("logs") }
fn default_log_level() -> String { "info".to_string() }

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            dir: default_log_dir(),
            level: default_log_level(),
        }
    }
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content).context("Invalid config")?;
        Ok(config)
    }

    /// Missing file → defaults. Invalid file → defaults with a warning on stderr,
    /// since logging is configured from this file and is not up yet.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        if !path.exists() {
            return Self::default();
        }
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Config {} ignored: {:#}", path.display(), e);
                Self::default()
            }
        }
    }
}
