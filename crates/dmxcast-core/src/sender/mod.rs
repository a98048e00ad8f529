//! Frame transmission.
//!
//! [`FrameSink`] is the capability interface between frame producers
//! (controller, engine) and transports: anything that can push one universe
//! frame somewhere. [`ArtNetSender`] is the real implementation: it owns
//! the rate gate, the wrapping sequence counter and the retry budget, and
//! delegates socket handling to a [`Transport`]. Test doubles implement
//! [`FrameSink`] or [`Transport`] directly.

mod artnet;
mod error;
mod transport;

pub use artnet::ArtNetSender;
pub use error::SendError;
pub use transport::{Transport, UdpTransport};

use std::net::{SocketAddr, ToSocketAddrs};
use std::time::Duration;

use crate::{ARTNET_PORT, DEFAULT_FPS};

/// Anything that can transmit one universe frame.
pub trait FrameSink {
    /// Transmit `payload` as one frame. Returns `Ok(false)` when the call
    /// was skipped by rate limiting, `Ok(true)` when a packet went out.
    fn send(&mut self, payload: &[u8], force: bool) -> Result<bool, SendError>;
}

/// Construction parameters for an [`ArtNetSender`].
///
/// `fps` must be positive. `retries` is the number of re-attempts after the
/// first failed transmit, so a send makes at most `retries + 1` attempts.
#[derive(Debug, Clone)]
pub struct SenderConfig {
    pub host: String,
    pub port: u16,
    pub universe: u16,
    pub fps: f64,
    pub timeout: Option<Duration>,
    pub retries: u32,
    pub reuse_socket: bool,
    pub physical: u8,
}

impl Default for SenderConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: ARTNET_PORT,
            universe: 0,
            fps: DEFAULT_FPS,
            timeout: Some(Duration::from_secs(1)),
            retries: 3,
            reuse_socket: true,
            physical: 0,
        }
    }
}

impl SenderConfig {
    /// Resolve `host:port` to a socket address.
    pub fn target(&self) -> Result<SocketAddr, SendError> {
        let target = format!("{}:{}", self.host, self.port);
        (self.host.as_str(), self.port)
            .to_socket_addrs()
            .map_err(|err| SendError::InvalidTarget {
                target: target.clone(),
                message: err.to_string(),
            })?
            .next()
            .ok_or(SendError::InvalidTarget {
                target,
                message: "no addresses resolved".to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::SenderConfig;

    #[test]
    fn default_target_resolves() {
        let config = SenderConfig::default();
        let target = config.target().unwrap();
        assert_eq!(target.port(), 6454);
    }

    #[test]
    fn invalid_host_is_rejected() {
        let config = SenderConfig {
            host: "not an address".to_string(),
            ..SenderConfig::default()
        };
        let err = config.target().unwrap_err();
        assert!(err.to_string().contains("not an address"));
    }
}
