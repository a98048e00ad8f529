//! dmxcast core library for driving lighting rigs over Art-Net.
//!
//! This crate implements the output pipeline used by the CLI: a thread-safe
//! universe buffer feeds the transmission engine, which snapshots channel
//! state and drives the Art-Net sender (builder/transport/retry) over UDP
//! at a bounded frame rate. Packet building is byte-oriented and
//! side-effect free; all I/O is isolated in the `sender` transport. Wire
//! conventions are captured in `protocols` so the sender stays minimal.
//!
//! Invariants:
//! - The universe always holds exactly 512 channel values; reads leave by
//!   value, never by reference.
//! - Every transmitted ArtDMX packet is exactly 530 bytes.
//! - The sequence counter advances by 1 mod 256 per transmitted frame and
//!   never on a rate-limited skip.
//! - `Engine::stop` always ends with a forced blackout frame.
//!
//! Version française (résumé):
//! Cette crate fournit le cœur d'émission : tampon d'univers -> moteur ->
//! émetteur Art-Net (builder/transport/reprise) -> UDP. Les E/S restent
//! dans `sender`, les conventions de protocole dans `protocols`. Garanties :
//! paquets de 530 octets, séquence modulo 256, blackout forcé à l'arrêt.
//!
//! # Examples
//! ```no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! use dmxcast_core::fixtures::Catalog;
//! use dmxcast_core::{ArtNetSender, Controller, Engine, SenderConfig};
//!
//! let config = SenderConfig {
//!     host: "192.168.1.50".to_string(),
//!     ..SenderConfig::default()
//! };
//! let sender = ArtNetSender::new(&config)?;
//! let controller = Arc::new(Controller::new(sender, Catalog::embedded()?));
//!
//! controller.buffer().set_channel(1, 200)?;
//!
//! let mut engine = Engine::new(Arc::clone(&controller), 30.0);
//! engine.start();
//! // ... mutate the buffer while the loop transmits ...
//! engine.stop(Duration::from_secs(1));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod controller;
mod engine;
pub mod fixtures;
pub mod protocols;
mod sender;
mod universe;

pub use controller::{Controller, ControllerError};
pub use engine::Engine;
pub use sender::{ArtNetSender, FrameSink, SendError, SenderConfig, Transport, UdpTransport};
pub use universe::{UniverseBuffer, UniverseError};

/// Number of channels in one DMX universe.
pub const DMX_CHANNELS: usize = 512;
/// Default Art-Net UDP port.
pub const ARTNET_PORT: u16 = 6454;
/// Default transmission rate in frames per second.
pub const DEFAULT_FPS: f64 = 60.0;
