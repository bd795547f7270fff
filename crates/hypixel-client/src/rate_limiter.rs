//! Open/closed gate shared by every outbound request.
//!
//! The executor calls [`RateLimiter::acquire`] before each attempt and
//! [`RateLimiter::release`] after reading the response. `release` closes the
//! gate and schedules a single reopen; a later `release` replaces the pending
//! reopen instead of stacking with it.

use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;

struct PendingReopen {
    generation: u64,
    timer: Option<JoinHandle<()>>,
}

struct Gate {
    open: watch::Sender<bool>,
    reopen: Mutex<PendingReopen>,
}

/// Binary open/closed gate with a single replaceable reopen timer.
pub struct RateLimiter {
    gate: Arc<Gate>,
    closes: AtomicU64,
}

impl RateLimiter {
    /// Creates an open gate.
    pub fn new() -> Self {
        let (open, _) = watch::channel(true);
        Self {
            gate: Arc::new(Gate {
                open,
                reopen: Mutex::new(PendingReopen { generation: 0, timer: None }),
            }),
            closes: AtomicU64::new(0),
        }
    }

    /// Waits until the gate is open. Returns without yielding if it already is.
    ///
    /// All waiters are woken together when the gate reopens; there is no
    /// FIFO ordering between them.
    pub async fn acquire(&self) {
        let mut rx = self.gate.open.subscribe();
        // The sender lives in `self.gate`, so the channel stays open while we wait.
        let _ = rx.wait_for(|open| *open).await;
    }

    /// Closes the gate now and reopens it after `delay`.
    ///
    /// Must be called from within a tokio runtime.
    pub fn release(&self, delay: Duration) {
        let mut pending = self.gate.reopen.lock();
        pending.generation = pending.generation.wrapping_add(1);
        let ticket = pending.generation;

        self.gate.open.send_replace(false);
        self.closes.fetch_add(1, Ordering::Relaxed);

        let gate = Arc::clone(&self.gate);
        let timer = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let pending = gate.reopen.lock();
            // A newer release owns the gate now.
            if pending.generation == ticket {
                gate.open.send_replace(true);
            }
        });

        if let Some(previous) = pending.timer.replace(timer) {
            previous.abort();
        }

        tracing::debug!("Rate-limit gate closed for {}s", delay.as_secs_f64());
    }

    pub fn is_open(&self) -> bool {
        *self.gate.open.borrow()
    }

    /// Number of times the gate has been closed since creation.
    pub fn close_count(&self) -> u64 {
        self.closes.load(Ordering::Relaxed)
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for RateLimiter {
    fn drop(&mut self) {
        if let Some(timer) = self.gate.reopen.lock().timer.take() {
            timer.abort();
        }
    }
}
