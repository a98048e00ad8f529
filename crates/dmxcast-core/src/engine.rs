use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crate::controller::Controller;
use crate::sender::SendError;

/// Periodic transmission loop.
///
/// One background worker snapshots the buffer and sends it at the target
/// rate. Cancellation is cooperative: the stop flag is checked between
/// ticks, so a tick already in flight (for example blocked in a retry
/// backoff) completes before the loop exits.
///
/// `stop` always ends with a forced blackout frame, even when the engine
/// was never started.
pub struct Engine {
    controller: Arc<Controller>,
    interval: Duration,
    worker: Option<Worker>,
}

struct Worker {
    stop: Arc<AtomicBool>,
    done: Receiver<()>,
    handle: JoinHandle<()>,
}

impl Engine {
    pub fn new(controller: Arc<Controller>, fps: f64) -> Self {
        Self {
            controller,
            interval: Duration::try_from_secs_f64(1.0 / fps).unwrap_or(Duration::ZERO),
            worker: None,
        }
    }

    /// Spawn the transmit loop. A no-op when already running.
    pub fn start(&mut self) {
        if self.worker.is_some() {
            return;
        }
        let stop = Arc::new(AtomicBool::new(false));
        let (done_tx, done) = mpsc::channel();
        let controller = Arc::clone(&self.controller);
        let interval = self.interval;
        let stop_flag = Arc::clone(&stop);
        let handle = thread::spawn(move || {
            run_loop(&controller, interval, &stop_flag);
            let _ = done_tx.send(());
        });
        self.worker = Some(Worker { stop, done, handle });
    }

    /// Signal the loop to end, wait up to `timeout` for the worker, then
    /// unconditionally send a forced blackout frame. Never fails; blackout
    /// errors are logged and swallowed. Idempotent.
    pub fn stop(&mut self, timeout: Duration) {
        if let Some(worker) = self.worker.take() {
            worker.stop.store(true, Ordering::Relaxed);
            match worker.done.recv_timeout(timeout) {
                Ok(()) | Err(RecvTimeoutError::Disconnected) => {
                    let _ = worker.handle.join();
                }
                Err(RecvTimeoutError::Timeout) => {
                    tracing::warn!(?timeout, "transmit loop still busy at stop; detaching");
                }
            }
        }
        if let Err(err) = self.controller.blackout(true, true) {
            tracing::warn!(error = %err, "final blackout failed");
        }
    }

    /// Send exactly one non-forced frame synchronously.
    pub fn run_once(&self) -> Result<bool, SendError> {
        self.controller.send_frame(false)
    }

    pub fn is_running(&self) -> bool {
        self.worker.is_some()
    }
}

fn run_loop(controller: &Controller, interval: Duration, stop: &AtomicBool) {
    let mut next_tick = Instant::now();
    while !stop.load(Ordering::Relaxed) {
        let now = Instant::now();
        if now < next_tick {
            thread::sleep(next_tick - now);
        }
        // Late ticks run immediately; at most one frame per tick.
        if let Err(err) = controller.send_frame(false) {
            tracing::warn!(error = %err, "frame transmission failed");
        }
        next_tick += interval;
    }
}
