//! Run time window tracking

use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

/// Earliest start and latest end observed across all workers of a run
///
/// Both bounds are updated under one lock and only ever move outward, so the
/// final window spans the true first start to the true last end regardless of
/// the order in which workers report.
#[derive(Debug, Default)]
pub struct TimeWindow {
    bounds: Mutex<Bounds>,
}

#[derive(Debug, Default, Clone, Copy)]
struct Bounds {
    start: Option<Instant>,
    end: Option<Instant>,
}

impl TimeWindow {
    /// Create an empty window
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that a worker is starting now
    pub fn record_start(&self) {
        self.record_start_at(Instant::now());
    }

    /// Record that a worker finished now
    pub fn record_end(&self) {
        self.record_end_at(Instant::now());
    }

    /// Lower the tracked start to `at` if it is earlier
    pub fn record_start_at(&self, at: Instant) {
        let mut bounds = self.lock();
        if bounds.start.map_or(true, |start| at < start) {
            bounds.start = Some(at);
        }
    }

    /// Raise the tracked end to `at` if it is later
    pub fn record_end_at(&self, at: Instant) {
        let mut bounds = self.lock();
        if bounds.end.map_or(true, |end| at > end) {
            bounds.end = Some(at);
        }
    }

    /// Earliest recorded start
    pub fn start(&self) -> Option<Instant> {
        self.lock().start
    }

    /// Latest recorded end
    pub fn end(&self) -> Option<Instant> {
        self.lock().end
    }

    /// Span from the earliest start to the latest end
    ///
    /// Only meaningful once every worker has recorded its end. Zero when
    /// nothing was recorded.
    pub fn elapsed(&self) -> Duration {
        match *self.lock() {
            Bounds {
                start: Some(start),
                end: Some(end),
            } => end.saturating_duration_since(start),
            _ => Duration::ZERO,
        }
    }

    // Bounds stay consistent even if a holder panicked: each update is a
    // single field store.
    fn lock(&self) -> MutexGuard<'_, Bounds> {
        self.bounds.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
