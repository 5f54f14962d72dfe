//! Pose-stream server: one pose source at a time feeding a gesture session.

use anyhow::{Context, Result};
use tokio::net::{TcpListener, TcpStream};
use tracing::{info, warn};

use crate::processor::RemotePoseProcessor;
use crate::protocol::{self, ClientMessage, ServerMessage};
use crate::session::GestureSession;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientEnd {
    Disconnected,
    StopRequested,
}

/// Run the handshake, then feed frames until the source sends `Stop` or hangs up.
pub async fn handle_client(stream: TcpStream, session: &GestureSession) -> Result<ClientEnd> {
    let mut stream = protocol::message_stream(stream);
    protocol::send_message(&mut stream, &ServerMessage::Ready).await?;

    let mut processor = RemotePoseProcessor::new(session);
    let end = loop {
        let msg: Option<ClientMessage> = protocol::recv_message(&mut stream).await?;
        match msg {
            Some(ClientMessage::Frame { timestamp_us, frame }) => {
                processor.process_at(timestamp_us, frame);
            }
            Some(ClientMessage::Stop) => {
                protocol::send_message(&mut stream, &ServerMessage::Stopped).await?;
                break ClientEnd::StopRequested;
            }
            None => break ClientEnd::Disconnected,
        }
    };

    let stats = processor.stats();
    info!(frames = stats.frames, failures = stats.failures, "client finished");
    Ok(end)
}

/// Accept and serve one pose source. A source that goes away without `Stop`
/// leaves both intents at `NoChange`.
pub async fn serve_one(listener: &TcpListener, session: &GestureSession) -> Result<ClientEnd> {
    let (socket, peer) = listener.accept().await.context("accept failed")?;
    socket.set_nodelay(true)?;
    info!(%peer, "pose source connected");

    let end = match handle_client(socket, session).await {
        Ok(ClientEnd::StopRequested) => {
            info!(%peer, "stop requested by pose source");
            return Ok(ClientEnd::StopRequested);
        }
        Ok(ClientEnd::Disconnected) => {
            info!(%peer, "pose source disconnected");
            ClientEnd::Disconnected
        }
        Err(e) => {
            warn!(%peer, "pose source error: {:#}", e);
            ClientEnd::Disconnected
        }
    };
    // No frames → no gesture; don't keep acting on the last one.
    session.intents().clear();
    Ok(end)
}

/// Serve pose sources one at a time until one of them asks to stop.
pub async fn serve(listener: TcpListener, session: &GestureSession) -> Result<()> {
    while serve_one(&listener, session).await? != ClientEnd::StopRequested {}
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SessionConfig;
    use crate::gesture::{ChannelIntent, VolumeIntent};
    use crate::pose::{Landmark, LandmarkType, Pose};
    use crate::protocol::RemoteFrame;
    use crate::test_support::{KeyLog, VolumeLog};
    use std::sync::Arc;

    fn session() -> GestureSession {
        GestureSession::start(
            &SessionConfig::default(),
            VolumeLog::default(),
            false,
            Arc::new(KeyLog::default()),
        )
        .unwrap()
    }

    fn arm_in_high() -> ClientMessage {
        ClientMessage::Frame {
            timestamp_us: 0,
            frame: RemoteFrame::Pose(Pose::new(vec![
                Landmark::new(LandmarkType::RightShoulder, 80.0, 150.0),
                Landmark::new(LandmarkType::RightWrist, 60.0, 50.0),
            ])),
        }
    }

    /// Connect, expect `Ready`, send `messages`, then either wait for `Stopped`
    /// (when the last message is `Stop`) or hang up.
    async fn pose_source(addr: std::net::SocketAddr, messages: Vec<ClientMessage>) {
        let mut stream = protocol::message_stream(TcpStream::connect(addr).await.unwrap());
        let ready: Option<ServerMessage> = protocol::recv_message(&mut stream).await.unwrap();
        assert_eq!(ready, Some(ServerMessage::Ready));

        let stops = messages.last() == Some(&ClientMessage::Stop);
        for msg in &messages {
            protocol::send_message(&mut stream, msg).await.unwrap();
        }
        if stops {
            let reply: Option<ServerMessage> = protocol::recv_message(&mut stream).await.unwrap();
            assert_eq!(reply, Some(ServerMessage::Stopped));
        }
    }

    #[tokio::test]
    async fn test_stop_message_ends_client() {
        let mut session = session();
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let client = tokio::spawn(pose_source(addr, vec![arm_in_high(), ClientMessage::Stop]));
        let end = serve_one(&listener, &session).await.unwrap();
        client.await.unwrap();

        assert_eq!(end, ClientEnd::StopRequested);
        assert_eq!(session.intents().volume.load(), VolumeIntent::Increase);
        session.stop();
    }

    #[tokio::test]
    async fn test_serve_returns_after_stop() {
        let mut session = session();
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let client = tokio::spawn(async move {
            pose_source(addr, vec![arm_in_high()]).await;
            pose_source(addr, vec![ClientMessage::Stop]).await;
        });
        serve(listener, &session).await.unwrap();
        client.await.unwrap();
        session.stop();
    }

    #[tokio::test]
    async fn test_frames_applied_before_hang_up() {
        let mut session = session();
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let client = tokio::spawn(pose_source(addr, vec![arm_in_high()]));
        let (socket, _) = listener.accept().await.unwrap();
        let end = handle_client(socket, &session).await.unwrap();
        client.await.unwrap();

        assert_eq!(end, ClientEnd::Disconnected);
        assert_eq!(session.intents().volume.load(), VolumeIntent::Increase);
        session.stop();
    }

    #[tokio::test]
    async fn test_hang_up_mid_gesture_clears_intents() {
        let mut session = session();
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let client = tokio::spawn(pose_source(addr, vec![arm_in_high()]));
        let end = serve_one(&listener, &session).await.unwrap();
        client.await.unwrap();

        assert_eq!(end, ClientEnd::Disconnected);
        assert_eq!(session.intents().volume.load(), VolumeIntent::NoChange);
        assert_eq!(session.intents().channel.load(), ChannelIntent::NoChange);
        session.stop();
    }
}
