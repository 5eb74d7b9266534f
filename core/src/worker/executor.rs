//! Worker execution loop

use crate::budget::BudgetCounter;
use crate::metrics::Outcome;
use crate::orchestrator::OutcomeReporter;
use crate::request::RequestSpec;
use crate::traits::{HttpClient, RequestError};
use crate::window::TimeWindow;

use super::stats::WorkerStats;

use futures::FutureExt;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tokio::sync::oneshot;

/// Worker executes requests in a loop: acquire -> execute -> report -> release
///
/// Workers are tokio tasks managed by the Orchestrator. All workers of a run
/// share the client, the request descriptor, the budget and the time window
/// via Arc, and each owns a clone of the outcome reporter.
pub struct Worker {
    /// Unique worker identifier
    id: usize,

    /// Request executor (shared across workers via Arc)
    client: Arc<dyn HttpClient>,

    /// Request sent on every attempt
    request: Arc<RequestSpec>,

    /// Run-wide admission gate
    budget: Arc<BudgetCounter>,

    /// Outcome channel to the aggregator
    reporter: OutcomeReporter,

    /// Run-wide start/end tracking
    window: Arc<TimeWindow>,
}

impl Worker {
    /// Create a new worker
    pub fn new(
        id: usize,
        client: Arc<dyn HttpClient>,
        request: Arc<RequestSpec>,
        budget: Arc<BudgetCounter>,
        reporter: OutcomeReporter,
        window: Arc<TimeWindow>,
    ) -> Self {
        Self {
            id,
            client,
            request,
            budget,
            reporter,
            window,
        }
    }

    /// Run the worker loop until the budget is exhausted
    ///
    /// `started` is signalled as soon as the task is running, before the
    /// first request. Returns the worker's own counters; the authoritative
    /// tallies go through the reporter.
    pub async fn run(self, started: Option<oneshot::Sender<()>>) -> WorkerStats {
        if let Some(started) = started {
            let _ = started.send(());
        }

        let mut stats = WorkerStats::new();
        self.window.record_start_at(stats.start());

        tracing::debug!(worker_id = self.id, "Worker started");

        self.run_loop(&mut stats).await;

        self.window.record_end_at(stats.stop());
        tracing::debug!(
            worker_id = self.id,
            completed = stats.completed,
            errors = stats.errors,
            elapsed_ms = ?stats.elapsed().map(|d| d.as_millis()),
            "Worker finished"
        );

        stats
    }

    async fn run_loop(&self, stats: &mut WorkerStats) {
        while let Some(slot) = self.budget.acquire().await {
            let outcome = Outcome::from(self.execute_once().await);

            let fatal = match &outcome {
                Outcome::Status(_) => {
                    stats.record_success();
                    false
                }
                Outcome::Error(e) => {
                    stats.record_error();
                    tracing::warn!(
                        worker_id = self.id,
                        kind = e.label(),
                        error = %e,
                        "Request failed"
                    );
                    e.is_fatal()
                }
            };

            let reported = self.reporter.report(outcome).await;
            self.budget.release(slot);

            if let Err(e) = reported {
                tracing::debug!(
                    worker_id = self.id,
                    error = %e,
                    "Outcome channel closed, worker stopping"
                );
                break;
            }

            if fatal {
                stats.stopped_on_fatal = true;
                tracing::warn!(
                    worker_id = self.id,
                    "Unrecoverable request error, worker stopping"
                );
                break;
            }
        }
    }

    /// One attempt; a panicking executor becomes a fatal error so the
    /// attempt is still counted
    async fn execute_once(&self) -> Result<u16, RequestError> {
        match AssertUnwindSafe(self.client.execute(&self.request))
            .catch_unwind()
            .await
        {
            Ok(result) => result,
            Err(payload) => Err(RequestError::Panicked(panic_message(payload.as_ref()))),
        }
    }

    /// Get the worker ID
    pub fn id(&self) -> usize {
        self.id
    }
}

impl std::fmt::Debug for Worker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Worker")
            .field("id", &self.id)
            .field("client", &self.client.name())
            .field("request", &self.request)
            .field("concurrency", &self.budget.concurrency())
            .finish()
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
