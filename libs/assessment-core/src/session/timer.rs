//! Exam countdown timers.
//!
//! A timer facility hands out a [`TimerHandle`] that yields one tick per
//! period until cancelled. The session drains pending ticks on its own
//! thread, so ticks never mutate session state concurrently.

use std::sync::mpsc::{channel, Receiver, RecvTimeoutError, Sender};
use std::thread;
use std::time::Duration;

/// Source of periodic ticks.
pub trait TimerFacility {
    /// Start a repeating timer, or `None` if no timer is available.
    fn start(&self, period: Duration) -> Option<TimerHandle>;
}

/// Cancellable handle to a running timer.
///
/// Dropping the handle cancels the timer.
#[derive(Debug)]
pub struct TimerHandle {
    ticks: Receiver<()>,
    stop_tx: Option<Sender<()>>,
}

impl TimerHandle {
    /// Wrap a tick receiver and the sender that stops its source.
    pub fn new(ticks: Receiver<()>, stop_tx: Sender<()>) -> Self {
        Self {
            ticks,
            stop_tx: Some(stop_tx),
        }
    }

    /// Number of ticks delivered since the last call.
    pub fn take_ticks(&self) -> usize {
        if self.is_cancelled() {
            return 0;
        }
        self.ticks.try_iter().count()
    }

    /// Stop the timer. No further ticks are reported.
    pub fn cancel(&mut self) {
        if let Some(tx) = self.stop_tx.take() {
            let _ = tx.send(());
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.stop_tx.is_none()
    }
}

impl Drop for TimerHandle {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Timer running on a background thread.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadTimer;

impl TimerFacility for ThreadTimer {
    fn start(&self, period: Duration) -> Option<TimerHandle> {
        let (tick_tx, tick_rx) = channel();
        let (stop_tx, stop_rx) = channel::<()>();

        let spawned = thread::Builder::new()
            .name("exam-countdown".to_string())
            .spawn(move || loop {
                match stop_rx.recv_timeout(period) {
                    Err(RecvTimeoutError::Timeout) => {
                        if tick_tx.send(()).is_err() {
                            break;
                        }
                    }
                    // Stop requested or handle dropped
                    _ => break,
                }
            });

        match spawned {
            Ok(_) => Some(TimerHandle::new(tick_rx, stop_tx)),
            Err(e) => {
                tracing::warn!("Failed to spawn countdown thread: {}", e);
                None
            }
        }
    }
}

/// Host without any timer facility.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoTimer;

impl TimerFacility for NoTimer {
    fn start(&self, _period: Duration) -> Option<TimerHandle> {
        None
    }
}
