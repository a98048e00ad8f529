use std::thread;
use std::time::{Duration, Instant};

use super::error::SendError;
use super::transport::{Transport, UdpTransport};
use super::{FrameSink, SenderConfig};
use crate::protocols::artnet::build_artdmx_packet;

/// Fixed pause between failed transmit attempts.
const RETRY_BACKOFF: Duration = Duration::from_millis(10);

/// Rate-limited, retrying ArtDMX sender.
///
/// Owns the wrapping sequence counter and the last-send timestamp; socket
/// lifecycle is delegated to the [`Transport`]. One sender instance should
/// be driven by a single logical writer at a time; the rate gate and the
/// sequence counter are not locked separately from the send path.
///
/// # Examples
/// ```no_run
/// use dmxcast_core::{ArtNetSender, SenderConfig};
///
/// let config = SenderConfig {
///     host: "192.168.1.50".to_string(),
///     ..SenderConfig::default()
/// };
/// let mut sender = ArtNetSender::new(&config)?;
/// let sent = sender.send(&[255; 512], false)?;
/// assert!(sent);
/// # Ok::<(), dmxcast_core::SendError>(())
/// ```
pub struct ArtNetSender<T: Transport = UdpTransport> {
    transport: T,
    universe: u16,
    physical: u8,
    retries: u32,
    min_interval: Duration,
    sequence: u8,
    last_send: Option<Instant>,
}

impl ArtNetSender<UdpTransport> {
    /// Create a sender over UDP. In reuse mode the socket is opened eagerly
    /// and kept for the sender's lifetime.
    pub fn new(config: &SenderConfig) -> Result<Self, SendError> {
        let target = config.target()?;
        let transport = UdpTransport::new(target, config.timeout, config.reuse_socket)
            .map_err(SendError::Socket)?;
        Ok(Self::with_transport(config, transport))
    }
}

impl<T: Transport> ArtNetSender<T> {
    /// Create a sender over an arbitrary transport.
    pub fn with_transport(config: &SenderConfig, transport: T) -> Self {
        Self {
            transport,
            universe: config.universe,
            physical: config.physical,
            retries: config.retries,
            min_interval: Duration::try_from_secs_f64(1.0 / config.fps)
                .unwrap_or(Duration::ZERO),
            sequence: 0,
            last_send: None,
        }
    }

    /// Transmit `payload` as one ArtDMX frame.
    ///
    /// Unless `force` is set, the call is a silent no-op (`Ok(false)`) when
    /// less than `1/fps` has elapsed since the last successful send. On
    /// success the sequence counter advances by 1 mod 256; a skipped call
    /// never touches it.
    pub fn send(&mut self, payload: &[u8], force: bool) -> Result<bool, SendError> {
        if !force
            && self
                .last_send
                .is_some_and(|last| last.elapsed() < self.min_interval)
        {
            return Ok(false);
        }

        let packet = build_artdmx_packet(payload, self.universe, self.sequence, self.physical);
        self.transmit_with_retry(&packet)?;
        self.sequence = self.sequence.wrapping_add(1);
        self.last_send = Some(Instant::now());
        tracing::trace!(
            universe = self.universe,
            sequence = self.sequence,
            "ArtDMX frame sent"
        );
        Ok(true)
    }

    fn transmit_with_retry(&mut self, packet: &[u8]) -> Result<(), SendError> {
        let attempts = self.retries.saturating_add(1);
        let mut attempt = 0u32;
        loop {
            attempt += 1;
            let err = match self.transport.transmit(packet) {
                Ok(()) => return Ok(()),
                Err(err) => err,
            };
            tracing::debug!(attempt, error = %err, "ArtDMX transmit attempt failed");
            if attempt >= attempts {
                return Err(SendError::Io {
                    attempts: attempt,
                    source: err,
                });
            }
            thread::sleep(RETRY_BACKOFF);
        }
    }

    /// Sequence value the next transmitted frame will carry.
    pub fn sequence(&self) -> u8 {
        self.sequence
    }

    /// Release the transport's socket. Idempotent.
    pub fn close(&mut self) {
        self.transport.close();
    }
}

impl<T: Transport> FrameSink for ArtNetSender<T> {
    fn send(&mut self, payload: &[u8], force: bool) -> Result<bool, SendError> {
        ArtNetSender::send(self, payload, force)
    }
}

impl<T: Transport> Drop for ArtNetSender<T> {
    fn drop(&mut self) {
        self.transport.close();
    }
}

#[cfg(test)]
mod tests {
    use std::io;
    use std::sync::{Arc, Mutex};

    use super::super::transport::Transport;
    use super::super::{SendError, SenderConfig};
    use super::ArtNetSender;
    use crate::protocols::artnet::layout;

    /// Transport double that fails the first `failures` transmits.
    #[derive(Default)]
    struct FlakyTransport {
        failures: u32,
        calls: u32,
        sent: Arc<Mutex<Vec<Vec<u8>>>>,
        closed: u32,
    }

    impl FlakyTransport {
        fn failing(failures: u32) -> Self {
            Self {
                failures,
                ..Self::default()
            }
        }
    }

    impl Transport for FlakyTransport {
        fn transmit(&mut self, packet: &[u8]) -> io::Result<()> {
            self.calls += 1;
            if self.calls <= self.failures {
                return Err(io::Error::new(io::ErrorKind::Other, "network error"));
            }
            self.sent.lock().unwrap().push(packet.to_vec());
            Ok(())
        }

        fn close(&mut self) {
            self.closed += 1;
        }
    }

    fn config(fps: f64, retries: u32) -> SenderConfig {
        SenderConfig {
            fps,
            retries,
            ..SenderConfig::default()
        }
    }

    #[test]
    fn retry_succeeds_after_one_failure() {
        let sent = Arc::new(Mutex::new(Vec::new()));
        let transport = FlakyTransport {
            failures: 1,
            sent: Arc::clone(&sent),
            ..FlakyTransport::default()
        };
        let mut sender = ArtNetSender::with_transport(&config(1000.0, 1), transport);

        let result = sender.send(&[0u8; 512], true).unwrap();
        assert!(result);
        // One failed attempt, one successful packet.
        assert_eq!(sent.lock().unwrap().len(), 1);
    }

    #[test]
    fn exhausted_retries_surface_last_error() {
        let mut sender =
            ArtNetSender::with_transport(&config(1000.0, 2), FlakyTransport::failing(u32::MAX));

        let err = sender.send(&[0u8; 512], true).unwrap_err();
        match err {
            SendError::Io { attempts, .. } => assert_eq!(attempts, 3),
            other => panic!("unexpected error: {other}"),
        }
        // A failed send never advances the sequence.
        assert_eq!(sender.sequence(), 0);
    }

    #[test]
    fn sequence_increments_per_transmitted_frame() {
        let sent = Arc::new(Mutex::new(Vec::new()));
        let transport = FlakyTransport {
            sent: Arc::clone(&sent),
            ..FlakyTransport::default()
        };
        let mut sender = ArtNetSender::with_transport(&config(1000.0, 0), transport);

        sender.send(&[0u8; 512], true).unwrap();
        sender.send(&[0u8; 512], true).unwrap();

        let sent = sent.lock().unwrap();
        assert_eq!(sent[0][layout::SEQUENCE_OFFSET], 0);
        assert_eq!(sent[1][layout::SEQUENCE_OFFSET], 1);
    }

    #[test]
    fn sequence_wraps_at_256() {
        let mut sender =
            ArtNetSender::with_transport(&config(1000.0, 0), FlakyTransport::default());
        for _ in 0..256 {
            sender.send(&[], true).unwrap();
        }
        assert_eq!(sender.sequence(), 0);
    }

    #[test]
    fn rate_gate_skips_and_preserves_sequence() {
        let mut sender =
            ArtNetSender::with_transport(&config(2.0, 0), FlakyTransport::default());

        assert!(sender.send(&[0u8; 512], false).unwrap());
        assert_eq!(sender.sequence(), 1);
        // Immediately after a successful send at 2 fps the gate is closed.
        assert!(!sender.send(&[0u8; 512], false).unwrap());
        assert_eq!(sender.sequence(), 1);
        // A forced send bypasses the gate.
        assert!(sender.send(&[0u8; 512], true).unwrap());
        assert_eq!(sender.sequence(), 2);
    }

    #[test]
    fn close_releases_transport() {
        let mut sender =
            ArtNetSender::with_transport(&config(1000.0, 0), FlakyTransport::default());
        sender.close();
        sender.close();
    }
}
