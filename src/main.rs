use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

use gesture_remote::actuator::{volume, KeySignal, OscKeySender};
use gesture_remote::config::Config;
use gesture_remote::logging;
use gesture_remote::server;
use gesture_remote::session::GestureSession;

const CONFIG_PATH: &str = "config.toml";

#[derive(Parser)]
#[command(about = "Turn a streamed body pose into volume and channel commands")]
struct Args {
    /// Config file
    #[arg(short, long, default_value = CONFIG_PATH)]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = Config::load_or_default(&args.config);
    let log_path = logging::init(&config.log, "gesture_remote")?;

    info!("Gesture Remote ({})", env!("CARGO_PKG_VERSION"));
    info!(log = %log_path.display(), "logging");
    info!(listen = %config.server.listen_addr, "pose stream");
    info!(
        target = %config.receiver.addr,
        package = %config.receiver.package,
        "key code receiver"
    );
    info!(backend = ?config.volume.backend, feedback = config.volume.audible_feedback, "volume");

    let signal: Arc<dyn KeySignal> = Arc::new(OscKeySender::from_config(&config.receiver)?);
    let volume_control = volume::backend_from_config(&config.volume, signal.clone())?;
    let mut session = GestureSession::start(
        &config.session,
        volume_control,
        config.volume.audible_feedback,
        signal,
    )?;

    let listener = TcpListener::bind(&config.server.listen_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.server.listen_addr))?;

    let result = tokio::select! {
        r = server::serve(listener, &session) => r,
        _ = tokio::signal::ctrl_c() => {
            info!("interrupted");
            Ok(())
        }
    };

    info!("Shutting down...");
    session.stop();
    result
}
