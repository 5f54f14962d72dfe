use anyhow::{Context, Result};
use std::fs::File;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::LogConfig;

/// Log to stderr and to `<dir>/<name>_<timestamp>.log`. Returns the log file path.
pub fn init(config: &LogConfig, name: &str) -> Result<PathBuf> {
    std::fs::create_dir_all(&config.dir)
        .with_context(|| format!("Failed to create {}", config.dir.display()))?;
    let ts = chrono::Local::now().format("%Y%m%d_%H%M%S");
    let path = config.dir.join(format!("{}_{}.log", name, ts));
    let file = File::create(&path)
        .with_context(|| format!("Failed to create {}", path.display()))?;

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .context("Invalid log level")?;

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
        .try_init()
        .context("Logger already initialized")?;

    Ok(path)
}
