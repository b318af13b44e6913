use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Minimal counters for operational visibility.
#[derive(Clone, Default, Debug)]
pub struct Counters {
    /// Connections handed to the market feed.
    pub sessions_opened: Arc<AtomicU64>,
    /// Connections torn down because the watched pair set changed.
    pub restarts: Arc<AtomicU64>,
    /// Connections that ended with a retryable error.
    pub reconnects: Arc<AtomicU64>,

    pub ticks: Arc<AtomicU64>,
    pub ticks_ignored: Arc<AtomicU64>,

    pub firings: Arc<AtomicU64>,
    pub notify_failures: Arc<AtomicU64>,
}

impl Counters {
    pub(crate) fn bump(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn get(counter: &AtomicU64) -> u64 {
        counter.load(Ordering::Relaxed)
    }
}
