use anyhow::{Context, Result};
use rosc::{encoder, OscMessage, OscPacket, OscType};
use std::net::UdpSocket;
use tracing::debug;

use crate::config::ReceiverConfig;

/// Consumer-electronics key codes understood by the receiver
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum KeyCode {
    VolumeUp = 24,
    VolumeDown = 25,
    ChannelUp = 166,
    ChannelDown = 167,
}

impl KeyCode {
    pub fn code(self) -> i32 {
        self as i32
    }
}

/// Directional signal to the receiver application
pub trait KeySignal: Send + Sync {
    fn send_key(&self, key: KeyCode) -> Result<()>;
}

/// Build the key code message.
/// Args: package, key code
pub fn build_key_message(osc_path: &str, package: &str, key: KeyCode) -> OscMessage {
    OscMessage {
        addr: osc_path.to_string(),
        args: vec![
            OscType::String(package.to_string()),
            OscType::Int(key.code()),
        ],
    }
}

pub fn encode_osc_message(msg: &OscMessage) -> Result<Vec<u8>> {
    let packet = OscPacket::Message(msg.clone());
    let encoded = encoder::encode(&packet)?;
    Ok(encoded)
}

/// Sends key codes as OSC over UDP
pub struct OscKeySender {
    socket: UdpSocket,
    target_addr: String,
    osc_path: String,
    package: String,
}

impl OscKeySender {
    pub fn new(target_addr: &str, osc_path: &str, package: &str) -> Result<Self> {
        if !osc_path.starts_with('/') {
            anyhow::bail!("OSC path must start with '/': {}", osc_path);
        }
        let socket = UdpSocket::bind("0.0.0.0:0").context("Failed to bind UDP socket")?;
        Ok(Self {
            socket,
            target_addr: target_addr.to_string(),
            osc_path: osc_path.to_string(),
            package: package.to_string(),
        })
    }

    pub fn from_config(config: &ReceiverConfig) -> Result<Self> {
        Self::new(&config.addr, &config.osc_path, &config.package)
    }
}

impl KeySignal for OscKeySender {
    fn send_key(&self, key: KeyCode) -> Result<()> {
        let msg = build_key_message(&self.osc_path, &self.package, key);
        let data = encode_osc_message(&msg)?;
        self.socket
            .send_to(&data, &self.target_addr)
            .with_context(|| format!("Failed to send key code to {}", self.target_addr))?;
        debug!(code = key.code(), target = %self.target_addr, "key code sent");
        Ok(())
    }
}
