//! Injectable time source for perceived upload progress.
//!
//! The controller only exposes a `tick()` method; something has to call it
//! every interval while a submission is in flight. `TokioScheduler` does
//! that on the runtime in production, `ManualScheduler` lets tests drive
//! ticks deterministically without real time passing.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

// ═══════════════════════════════════════════════════════════
// Scheduler contract
// ═══════════════════════════════════════════════════════════

/// Capability to run a callback repeatedly until the returned guard is
/// cancelled or dropped.
pub trait ProgressScheduler: Send + Sync {
    fn schedule_repeating(
        &self,
        interval: Duration,
        tick: Box<dyn FnMut() + Send>,
    ) -> TickerGuard;
}

/// Cancellation handle for a scheduled ticker. Dropping it cancels, so a
/// driver that returns early (error paths included) never leaks a ticker.
pub struct TickerGuard {
    cancel: Option<Box<dyn FnOnce() + Send>>,
}

impl TickerGuard {
    pub fn new(cancel: impl FnOnce() + Send + 'static) -> Self {
        Self {
            cancel: Some(Box::new(cancel)),
        }
    }

    pub fn cancel(mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl Drop for TickerGuard {
    fn drop(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

// ═══════════════════════════════════════════════════════════
// Tokio-backed scheduler
// ═══════════════════════════════════════════════════════════

/// Production scheduler: one spawned task per ticker.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioScheduler;

impl ProgressScheduler for TokioScheduler {
    fn schedule_repeating(
        &self,
        interval: Duration,
        mut tick: Box<dyn FnMut() + Send>,
    ) -> TickerGuard {
        let handle = tokio::spawn(async move {
            let mut timer = tokio::time::interval(interval);
            // The first interval tick fires immediately; progress starts
            // after one full interval has passed.
            timer.tick().await;
            timer.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            loop {
                timer.tick().await;
                tick();
            }
        });
        TickerGuard::new(move || handle.abort())
    }
}

// ═══════════════════════════════════════════════════════════
// Manual scheduler for tests
// ═══════════════════════════════════════════════════════════

type TickFn = Box<dyn FnMut() + Send>;

/// Test scheduler: holds registered tickers and fires them only when told.
#[derive(Clone, Default)]
pub struct ManualScheduler {
    next_id: Arc<AtomicU64>,
    tickers: Arc<Mutex<HashMap<u64, TickFn>>>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run every registered ticker once, as if one interval elapsed.
    pub fn fire(&self) {
        let mut tickers = self.tickers.lock().unwrap_or_else(|e| e.into_inner());
        for tick in tickers.values_mut() {
            tick();
        }
    }

    /// Number of tickers currently armed.
    pub fn active(&self) -> usize {
        self.tickers
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .len()
    }
}

impl ProgressScheduler for ManualScheduler {
    fn schedule_repeating(
        &self,
        _interval: Duration,
        tick: Box<dyn FnMut() + Send>,
    ) -> TickerGuard {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.tickers
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(id, tick);
        let tickers = Arc::clone(&self.tickers);
        TickerGuard::new(move || {
            tickers.lock().unwrap_or_else(|e| e.into_inner()).remove(&id);
        })
    }
}
