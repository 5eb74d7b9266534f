//! Outcome aggregation from concurrent workers
//!
//! Workers never touch the histogram. Each holds an [`OutcomeReporter`] that
//! sends status codes and errors over two bounded channels to one drain task,
//! the only writer. The drain finishes when every reporter has been dropped.

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::channel::ChannelConfig;
use crate::error::{BenchError, BenchResult};
use crate::metrics::{Outcome, StatusHistogram};
use crate::traits::RequestError;
use crate::worker::WorkerStats;

/// Producer handle given to each worker
#[derive(Debug, Clone)]
pub struct OutcomeReporter {
    status_tx: mpsc::Sender<u16>,
    error_tx: mpsc::Sender<RequestError>,
}

impl OutcomeReporter {
    /// Record one attempt that produced a status code
    pub async fn report_status(&self, code: u16) -> BenchResult<()> {
        self.status_tx
            .send(code)
            .await
            .map_err(|_| BenchError::aggregation("status channel closed"))
    }

    /// Record one attempt that failed without a status
    pub async fn report_error(&self, error: RequestError) -> BenchResult<()> {
        self.error_tx
            .send(error)
            .await
            .map_err(|_| BenchError::aggregation("error channel closed"))
    }

    /// Record an outcome of either kind
    pub async fn report(&self, outcome: Outcome) -> BenchResult<()> {
        match outcome {
            Outcome::Status(code) => self.report_status(code).await,
            Outcome::Error(error) => self.report_error(error).await,
        }
    }
}

/// Tallies produced by the drain task
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AggregatedOutcomes {
    /// Requests per status code
    pub histogram: StatusHistogram,

    /// Attempts that failed without a status
    pub errors: u64,
}

impl AggregatedOutcomes {
    /// Total outcomes recorded
    pub fn total(&self) -> u64 {
        self.histogram.total() + self.errors
    }
}

/// Single-consumer accumulator for one run
#[derive(Debug)]
pub struct ResultAggregator {
    reporter: OutcomeReporter,
    drain: JoinHandle<AggregatedOutcomes>,
}

impl ResultAggregator {
    /// Open the outcome channels and start the drain task
    ///
    /// Must be called from within a tokio runtime.
    pub fn new(config: &ChannelConfig) -> Self {
        let (status_tx, status_rx) = mpsc::channel(config.status_buffer.max(1));
        let (error_tx, error_rx) = mpsc::channel(config.error_buffer.max(1));

        let drain = tokio::spawn(drain_outcomes(status_rx, error_rx));

        Self {
            reporter: OutcomeReporter {
                status_tx,
                error_tx,
            },
            drain,
        }
    }

    /// A new producer handle
    pub fn reporter(&self) -> OutcomeReporter {
        self.reporter.clone()
    }

    /// Close the channels and wait for the drain to finish
    ///
    /// Only call this once every worker has terminated. Any reporter still
    /// alive keeps the channels open and this future pending.
    pub async fn finalize(self) -> BenchResult<AggregatedOutcomes> {
        let Self { reporter, drain } = self;
        drop(reporter);

        drain
            .await
            .map_err(|e| BenchError::aggregation(format!("drain task failed: {e}")))
    }
}

async fn drain_outcomes(
    mut status_rx: mpsc::Receiver<u16>,
    mut error_rx: mpsc::Receiver<RequestError>,
) -> AggregatedOutcomes {
    let mut tally = AggregatedOutcomes::default();
    let mut status_open = true;
    let mut errors_open = true;

    // Both channels are polled together so a full status buffer never waits
    // behind the error channel.
    while status_open || errors_open {
        tokio::select! {
            code = status_rx.recv(), if status_open => match code {
                Some(code) => tally.histogram.record(code),
                None => status_open = false,
            },
            error = error_rx.recv(), if errors_open => match error {
                Some(_) => tally.errors += 1,
                None => errors_open = false,
            },
        }
    }

    tracing::debug!(
        statuses = tally.histogram.total(),
        errors = tally.errors,
        "Outcome drain finished"
    );
    tally
}

/// Per-worker counters summed across a run
#[derive(Debug, Clone, Default)]
pub struct AggregatedStats {
    /// Number of workers that returned stats
    pub total_workers: usize,

    /// Attempts that produced a status
    pub total_completed: u64,

    /// Attempts that failed
    pub total_errors: u64,

    /// Workers that stopped on a fatal request error
    pub fatal_stops: usize,
}

impl AggregatedStats {
    /// Get the total number of attempts (completed + errors)
    pub fn total_requests(&self) -> u64 {
        self.total_completed + self.total_errors
    }
}

/// Sum statistics from multiple workers
pub fn aggregate_worker_stats(stats: &[WorkerStats]) -> AggregatedStats {
    AggregatedStats {
        total_workers: stats.len(),
        total_completed: stats.iter().map(|s| s.completed).sum(),
        total_errors: stats.iter().map(|s| s.errors).sum(),
        fatal_stops: stats.iter().filter(|s| s.stopped_on_fatal).count(),
    }
}
