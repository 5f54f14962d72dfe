//! Stream recorded poses (JSON lines) to a running gesture server.
//!
//! Each line is one `Pose`, e.g.
//! `{"landmarks":[{"kind":"RIGHT_WRIST","x":60,"y":50},{"kind":"RIGHT_SHOULDER","x":80,"y":150}]}`.
//! Lines that do not parse are sent as detector failures.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::net::TcpStream;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use gesture_remote::pose::Pose;
use gesture_remote::protocol::{self, ClientMessage, RemoteFrame, ServerMessage};

#[derive(Parser)]
struct Args {
    /// JSON-lines pose recording
    input: PathBuf,
    /// Gesture server address
    #[arg(short, long, default_value = "127.0.0.1:39581")]
    server: String,
    /// Frames per second
    #[arg(long, default_value_t = 30.0)]
    fps: f64,
    /// Replay the file this many times
    #[arg(long, default_value_t = 1)]
    repeat: u32,
    /// Ask the server to stop its session when done
    #[arg(long)]
    stop: bool,
}

fn parse_line(line: &str) -> RemoteFrame {
    match serde_json::from_str::<Pose>(line) {
        Ok(pose) => RemoteFrame::Pose(pose),
        Err(e) => RemoteFrame::Failed {
            reason: format!("unparseable pose: {}", e),
        },
    }
}

async fn load_frames(path: &PathBuf) -> Result<Vec<RemoteFrame>> {
    let file = tokio::fs::File::open(path)
        .await
        .with_context(|| format!("Failed to open {}", path.display()))?;
    let mut lines = BufReader::new(file).lines();
    let mut frames = Vec::new();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        frames.push(parse_line(line));
    }
    Ok(frames)
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    if !(args.fps > 0.0) {
        anyhow::bail!("--fps must be positive");
    }
    let frames = load_frames(&args.input).await?;
    let failed = frames
        .iter()
        .filter(|f| matches!(f, RemoteFrame::Failed { .. }))
        .count();
    info!(frames = frames.len(), unparseable = failed, "loaded {}", args.input.display());

    let socket = TcpStream::connect(&args.server)
        .await
        .with_context(|| format!("Failed to connect to {}", args.server))?;
    socket.set_nodelay(true)?;
    let mut stream = protocol::message_stream(socket);

    match protocol::recv_message::<ServerMessage>(&mut stream).await? {
        Some(ServerMessage::Ready) => info!("server ready"),
        other => anyhow::bail!("unexpected handshake: {:?}", other),
    }

    let frame_duration = Duration::from_secs_f64(1.0 / args.fps);
    let start = Instant::now();
    let mut ticker = tokio::time::interval(frame_duration);
    for _ in 0..args.repeat {
        for frame in &frames {
            ticker.tick().await;
            let msg = ClientMessage::Frame {
                timestamp_us: start.elapsed().as_micros() as u64,
                frame: frame.clone(),
            };
            protocol::send_message(&mut stream, &msg).await?;
        }
    }
    info!(elapsed = ?start.elapsed(), "replay done");

    if args.stop {
        protocol::send_message(&mut stream, &ClientMessage::Stop).await?;
        match protocol::recv_message::<ServerMessage>(&mut stream).await? {
            Some(ServerMessage::Stopped) => info!("server stopped"),
            other => warn!("unexpected reply to stop: {:?}", other),
        }
    }
    Ok(())
}
