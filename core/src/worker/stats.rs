//! Worker statistics tracking

use std::time::{Duration, Instant};

/// Statistics tracked by each worker
#[derive(Debug, Default, Clone)]
pub struct WorkerStats {
    /// Attempts that produced a status code
    pub completed: u64,

    /// Attempts that failed without a status
    pub errors: u64,

    /// Whether the loop ended on a fatal request error
    pub stopped_on_fatal: bool,

    /// Worker start time
    pub started_at: Option<Instant>,

    /// Worker end time
    pub ended_at: Option<Instant>,
}

impl WorkerStats {
    /// Create new empty stats
    pub fn new() -> Self {
        Self::default()
    }

    /// Start tracking and return the recorded start time
    pub fn start(&mut self) -> Instant {
        let now = Instant::now();
        self.started_at = Some(now);
        now
    }

    /// Stop tracking and return the recorded end time
    pub fn stop(&mut self) -> Instant {
        let now = Instant::now();
        self.ended_at = Some(now);
        now
    }

    /// Get total number of attempts (completed + errors)
    pub fn total_requests(&self) -> u64 {
        self.completed + self.errors
    }

    /// Get success rate (0.0 - 1.0)
    pub fn success_rate(&self) -> f64 {
        if self.total_requests() == 0 {
            0.0
        } else {
            self.completed as f64 / self.total_requests() as f64
        }
    }

    /// Get elapsed time since start
    pub fn elapsed(&self) -> Option<Duration> {
        self.started_at.map(|start| {
            self.ended_at
                .map(|end| end.duration_since(start))
                .unwrap_or_else(|| start.elapsed())
        })
    }

    /// Record an attempt that produced a status
    pub fn record_success(&mut self) {
        self.completed += 1;
    }

    /// Record a failed attempt
    pub fn record_error(&mut self) {
        self.errors += 1;
    }
}
