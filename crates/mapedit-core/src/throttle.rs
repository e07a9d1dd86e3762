//! Coalescing of expensive recomputation on high-frequency input.

// Use web-time on WASM, std::time otherwise
#[cfg(not(target_arch = "wasm32"))]
use std::time::{Duration, Instant};
#[cfg(target_arch = "wasm32")]
use web_time::{Duration, Instant};

/// Tracks whether deferred work is pending and whether its window has passed.
///
/// The cheap part of an update happens on every event; the expensive part
/// runs at most once per `interval` while events keep arriving, plus once
/// more when the host ticks after the burst ends.
#[derive(Debug, Clone)]
pub struct Throttle {
    interval: Duration,
    last_run: Option<Instant>,
    pending: bool,
}

impl Throttle {
    /// Create a throttle with the given window.
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_run: None,
            pending: false,
        }
    }

    /// Create a throttle from a window in milliseconds.
    pub fn from_millis(ms: u64) -> Self {
        Self::new(Duration::from_millis(ms))
    }

    /// Mark work as pending.
    pub fn mark_dirty(&mut self) {
        self.pending = true;
    }

    /// Check if work is waiting to be run.
    pub fn is_pending(&self) -> bool {
        self.pending
    }

    /// Check if pending work may run now.
    pub fn should_run(&self) -> bool {
        if !self.pending {
            return false;
        }
        match self.last_run {
            Some(last) => last.elapsed() >= self.interval,
            None => true,
        }
    }

    /// Record that the work ran.
    pub fn mark_ran(&mut self) {
        self.pending = false;
        self.last_run = Some(Instant::now());
    }

    /// Forget pending work without running it.
    pub fn reset(&mut self) {
        self.pending = false;
    }
}
