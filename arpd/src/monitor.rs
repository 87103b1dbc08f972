//! Pacing for the statistics monitor of the binary.

use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

/// Decides when the next periodic report is due.
#[derive(Debug, Clone, Copy)]
pub struct Ticker {
    interval: Option<Duration>,
    last: Instant,
}

impl Ticker {
    /// A ticker that fires every `interval` after `now`, or never if `interval` is `None`.
    pub fn new(interval: Option<Duration>, now: Instant) -> Self {
        Self {
            interval,
            last: now,
        }
    }

    /// Returns true once a full interval has passed since the last time it returned true.
    pub fn tick(&mut self, now: Instant) -> bool {
        match self.interval {
            Some(interval) if now.saturating_duration_since(self.last) >= interval => {
                self.last = now;
                true
            }
            _ => false,
        }
    }
}

/// The monitor keeps going while `run` is set and the worker is alive.
pub fn keep_running<T>(run: &AtomicBool, worker: &JoinHandle<T>) -> bool {
    run.load(Ordering::Acquire) && !worker.is_finished()
}
