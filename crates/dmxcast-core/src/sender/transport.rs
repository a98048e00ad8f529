use std::io;
use std::net::{SocketAddr, UdpSocket};
use std::time::Duration;

/// One-way datagram transport driven by [`super::ArtNetSender`].
pub trait Transport {
    /// Transmit one packet to the configured target.
    fn transmit(&mut self, packet: &[u8]) -> io::Result<()>;

    /// Release any socket held across calls. Idempotent.
    fn close(&mut self);
}

/// UDP transport.
///
/// Reuse mode keeps one socket for the transport's lifetime; ephemeral mode
/// opens a fresh socket per attempt and drops it on every exit path.
#[derive(Debug)]
pub struct UdpTransport {
    target: SocketAddr,
    timeout: Option<Duration>,
    reuse_socket: bool,
    socket: Option<UdpSocket>,
}

impl UdpTransport {
    pub fn new(
        target: SocketAddr,
        timeout: Option<Duration>,
        reuse_socket: bool,
    ) -> io::Result<Self> {
        let socket = if reuse_socket {
            Some(Self::open(timeout)?)
        } else {
            None
        };
        Ok(Self {
            target,
            timeout,
            reuse_socket,
            socket,
        })
    }

    fn open(timeout: Option<Duration>) -> io::Result<UdpSocket> {
        let socket = UdpSocket::bind(("0.0.0.0", 0))?;
        socket.set_broadcast(true)?;
        socket.set_write_timeout(timeout)?;
        Ok(socket)
    }
}

impl Transport for UdpTransport {
    fn transmit(&mut self, packet: &[u8]) -> io::Result<()> {
        if self.reuse_socket {
            if self.socket.is_none() {
                self.socket = Some(Self::open(self.timeout)?);
            }
            let socket = self
                .socket
                .as_ref()
                .ok_or_else(|| io::Error::other("socket closed"))?;
            socket.send_to(packet, self.target)?;
        } else {
            let socket = Self::open(self.timeout)?;
            socket.send_to(packet, self.target)?;
        }
        Ok(())
    }

    fn close(&mut self) {
        self.socket = None;
    }
}
