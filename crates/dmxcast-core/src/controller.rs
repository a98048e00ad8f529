use std::sync::{Mutex, PoisonError};

use thiserror::Error;

use crate::DMX_CHANNELS;
use crate::fixtures::{Catalog, Fixture};
use crate::sender::{FrameSink, SendError};
use crate::universe::{UniverseBuffer, UniverseError};

#[derive(Debug, Error)]
pub enum ControllerError {
    #[error(transparent)]
    Universe(#[from] UniverseError),
    #[error(transparent)]
    Send(#[from] SendError),
}

/// High-level coordinator over the universe buffer, the frame sink and the
/// fixture catalog.
///
/// The sink sits behind a mutex so the engine thread and ad hoc callers
/// serialize on the send path; the buffer carries its own lock. Channel
/// updates are pure state changes; nothing here transmits implicitly.
///
/// # Examples
/// ```no_run
/// use dmxcast_core::fixtures::Catalog;
/// use dmxcast_core::{ArtNetSender, Controller, SenderConfig};
///
/// let sender = ArtNetSender::new(&SenderConfig::default())?;
/// let controller = Controller::new(sender, Catalog::embedded()?);
///
/// controller.buffer().set_channel(1, 200)?;
/// controller.send_frame(false)?;
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct Controller {
    buffer: UniverseBuffer,
    sink: Mutex<Box<dyn FrameSink + Send>>,
    catalog: Catalog,
    debug_frames: bool,
    debug_limit: Mutex<Option<u16>>,
}

impl Controller {
    pub fn new(sink: impl FrameSink + Send + 'static, catalog: Catalog) -> Self {
        Self {
            buffer: UniverseBuffer::new(),
            sink: Mutex::new(Box::new(sink)),
            catalog,
            debug_frames: false,
            debug_limit: Mutex::new(None),
        }
    }

    /// Enable per-frame debug dumps (logged at `debug` level).
    pub fn with_debug_frames(mut self, enabled: bool) -> Self {
        self.debug_frames = enabled;
        self
    }

    pub fn buffer(&self) -> &UniverseBuffer {
        &self.buffer
    }

    pub fn fixtures(&self) -> &[Fixture] {
        &self.catalog.fixtures
    }

    pub fn fixture(&self, id: &str) -> Option<&Fixture> {
        self.catalog.fixture(id)
    }

    /// Apply `(channel, value)` updates to the buffer as one atomic batch.
    pub fn apply(&self, updates: &[(u16, u8)]) -> Result<(), UniverseError> {
        self.buffer.set_channels(updates)
    }

    /// Snapshot the buffer and hand the frame to the sink.
    pub fn send_frame(&self, force: bool) -> Result<bool, SendError> {
        let frame = self.buffer.snapshot();
        let sent = self
            .sink
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .send(&frame, force)?;
        if sent && self.debug_frames {
            self.log_frame(&frame);
        }
        Ok(sent)
    }

    /// Zero every channel; optionally transmit the dark frame.
    pub fn blackout(&self, send: bool, force: bool) -> Result<bool, SendError> {
        self.buffer.zero_all();
        if send { self.send_frame(force) } else { Ok(false) }
    }

    /// Apply every fixture's arm values as one atomic batch; optionally
    /// transmit the resulting frame.
    pub fn arm_fixtures(&self, send: bool, force: bool) -> Result<bool, ControllerError> {
        let mut updates = Vec::new();
        for fixture in &self.catalog.fixtures {
            // Arm maps are validated against the patch at catalog load.
            if let Ok(mut fixture_updates) = fixture.arm_updates() {
                updates.append(&mut fixture_updates);
            }
        }
        self.apply(&updates)?;
        if send {
            Ok(self.send_frame(force)?)
        } else {
            Ok(false)
        }
    }

    /// Record `fixture` as the most recently configured unit. Debug dumps
    /// are trimmed to its highest patched channel.
    pub fn mark_configured(&self, fixture: &Fixture) {
        if let Some(max) = fixture.max_channel() {
            *self
                .debug_limit
                .lock()
                .unwrap_or_else(PoisonError::into_inner) = Some(max);
        }
    }

    fn log_frame(&self, frame: &[u8; DMX_CHANNELS]) {
        let limit = self
            .debug_limit
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .map(usize::from)
            .unwrap_or(DMX_CHANNELS);
        let dump = frame[..limit]
            .iter()
            .map(|value| format!("{value:02X}"))
            .collect::<Vec<_>>()
            .join(" ");
        tracing::debug!(channels = limit, "frame {dump}");
    }
}
