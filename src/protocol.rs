//! TCP protocol for pose-source ↔ gesture-server communication.

use bytes::Bytes;
use futures::{Sink, SinkExt, StreamExt};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tokio::net::TcpStream;
use tokio_util::codec::{Framed, LengthDelimitedCodec};

use crate::pose::Pose;

/// Result of running the remote pose detector on one camera frame
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub enum RemoteFrame {
    Pose(Pose),
    Failed { reason: String },
}

/// Pose source → server
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub enum ClientMessage {
    Frame { timestamp_us: u64, frame: RemoteFrame },
    /// End the gesture session
    Stop,
}

/// Server → pose source
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub enum ServerMessage {
    Ready,
    Stopped,
}

pub type MessageStream = Framed<TcpStream, LengthDelimitedCodec>;

/// Create a framed message stream with length-delimited framing.
pub fn message_stream(stream: TcpStream) -> MessageStream {
    let codec = LengthDelimitedCodec::builder()
        .max_frame_length(16 * 1024 * 1024) // 16MB
        .new_codec();
    Framed::new(stream, codec)
}

/// Send a serializable message (bincode + length prefix).
pub async fn send_message<T: Serialize>(
    stream: &mut MessageStream,
    msg: &T,
) -> anyhow::Result<()> {
    send_to_sink(stream, msg).await
}

/// Same as `send_message`, for the write half of a split stream.
pub async fn send_to_sink<S, T>(sink: &mut S, msg: &T) -> anyhow::Result<()>
where
    S: Sink<Bytes, Error = std::io::Error> + Unpin,
    T: Serialize,
{
    let data = bincode::serialize(msg)?;
    sink.send(Bytes::from(data)).await?;
    Ok(())
}

/// Receive and deserialize a message. `Ok(None)` when the peer closed cleanly.
pub async fn recv_message<T: DeserializeOwned>(
    stream: &mut MessageStream,
) -> anyhow::Result<Option<T>> {
    match stream.next().await {
        Some(Ok(bytes)) => Ok(Some(bincode::deserialize(&bytes)?)),
        Some(Err(e)) => Err(e.into()),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pose::{Landmark, LandmarkType};
    use tokio::net::TcpListener;

    #[tokio::test]
    async fn test_frame_over_tcp() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let pose = Pose::new(vec![
            Landmark::new(LandmarkType::RightWrist, 60.0, 50.0).with_visibility(0.8),
            Landmark::new(LandmarkType::RightShoulder, 80.0, 150.0),
        ]);
        let sent = ClientMessage::Frame {
            timestamp_us: 42,
            frame: RemoteFrame::Pose(pose),
        };
        let expected = sent.clone();

        let client = tokio::spawn(async move {
            let mut stream = message_stream(TcpStream::connect(addr).await.unwrap());
            send_message(&mut stream, &sent).await.unwrap();
            send_message(&mut stream, &ClientMessage::Stop).await.unwrap();
            let reply: Option<ServerMessage> = recv_message(&mut stream).await.unwrap();
            assert_eq!(reply, Some(ServerMessage::Stopped));
        });

        let (socket, _) = listener.accept().await.unwrap();
        let mut stream = message_stream(socket);
        let first: Option<ClientMessage> = recv_message(&mut stream).await.unwrap();
        assert_eq!(first, Some(expected));
        let second: Option<ClientMessage> = recv_message(&mut stream).await.unwrap();
        assert_eq!(second, Some(ClientMessage::Stop));
        send_message(&mut stream, &ServerMessage::Stopped).await.unwrap();

        client.await.unwrap();
    }

    #[tokio::test]
    async fn test_recv_after_close_is_none() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let client = tokio::spawn(async move {
            let stream = TcpStream::connect(addr).await.unwrap();
            drop(stream);
        });

        let (socket, _) = listener.accept().await.unwrap();
        client.await.unwrap();
        let mut stream = message_stream(socket);
        let msg: Option<ClientMessage> = recv_message(&mut stream).await.unwrap();
        assert!(msg.is_none());
    }
}
