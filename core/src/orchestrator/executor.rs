//! Orchestrator execution logic

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{oneshot, watch};
use tokio::task::JoinHandle;

use crate::budget::BudgetCounter;
use crate::channel::ChannelConfig;
use crate::config::RunConfig;
use crate::error::BenchResult;
use crate::metrics::RunReport;
use crate::request::RequestSpec;
use crate::traits::HttpClient;
use crate::window::TimeWindow;
use crate::worker::{Worker, WorkerBuilder};

use super::aggregator::{aggregate_worker_stats, ResultAggregator};

/// Orchestrator manages the run lifecycle
///
/// Every call to [`run`](Self::run) gets its own budget, time window and
/// outcome channels, so one orchestrator can run repeatedly and runs never
/// share state.
///
/// Shutdown is a flag rather than a message: a request made before a run
/// has started is seen by that run, which then admits nothing. The flag is
/// cleared when the run returns.
pub struct Orchestrator {
    /// Run configuration
    pub(crate) config: RunConfig,

    /// Request executor (shared across workers)
    pub(crate) client: Arc<dyn HttpClient>,

    /// Request sent on every attempt (shared across workers)
    pub(crate) request: Arc<RequestSpec>,

    /// Outcome channel sizing
    pub(crate) channel_config: ChannelConfig,

    /// Shutdown flag
    pub(crate) shutdown_tx: Arc<watch::Sender<bool>>,
}

impl Orchestrator {
    /// Create a new orchestrator
    ///
    /// Use `OrchestratorBuilder` for a more ergonomic construction.
    pub fn new(
        config: RunConfig,
        client: Arc<dyn HttpClient>,
        request: RequestSpec,
        channel_config: ChannelConfig,
    ) -> Self {
        let (shutdown_tx, _) = watch::channel(false);

        Self {
            config,
            client,
            request: Arc::new(request),
            channel_config,
            shutdown_tx: Arc::new(shutdown_tx),
        }
    }

    /// Get a receiver for the shutdown flag
    pub fn shutdown_receiver(&self) -> watch::Receiver<bool> {
        self.shutdown_tx.subscribe()
    }

    /// Stop admitting new requests in the current or next run
    ///
    /// Requests already in flight complete and are recorded.
    pub fn shutdown(&self) {
        self.shutdown_tx.send_replace(true);
    }

    /// Whether a shutdown is pending
    pub fn is_shutdown_requested(&self) -> bool {
        *self.shutdown_tx.borrow()
    }

    /// Get the run configuration
    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    /// Run the load test
    ///
    /// Spawns one worker per concurrency level, waits for all of them to
    /// finish, and returns the aggregated report. Request failures never make
    /// this return an error.
    pub async fn run(&self) -> BenchResult<RunReport> {
        let result = self.execute_run().await;
        self.shutdown_tx.send_replace(false);
        result
    }

    async fn execute_run(&self) -> BenchResult<RunReport> {
        let started_at = chrono::Utc::now();
        let concurrency = self.config.concurrency;

        let budget = Arc::new(BudgetCounter::new(self.config.requests, concurrency));
        let window = Arc::new(TimeWindow::new());
        let aggregator = ResultAggregator::new(&self.channel_config);

        tracing::info!(
            requests = self.config.requests,
            concurrency,
            request = %self.request,
            client = self.client.name(),
            "Starting run"
        );

        let workers = (0..concurrency)
            .map(|worker_id| {
                WorkerBuilder::new(worker_id)
                    .client(Arc::clone(&self.client))
                    .request(Arc::clone(&self.request))
                    .budget(Arc::clone(&budget))
                    .reporter(aggregator.reporter())
                    .window(Arc::clone(&window))
                    .build()
            })
            .collect::<BenchResult<Vec<Worker>>>()?;

        let shutdown_watch = self.watch_shutdown(&budget);

        // Spawn worker tasks, one at a time, each confirmed running
        let mut handles = Vec::with_capacity(workers.len());
        for worker in workers {
            let worker_id = worker.id();
            let (started_tx, started_rx) = oneshot::channel();
            handles.push(tokio::spawn(worker.run(Some(started_tx))));

            if started_rx.await.is_err() {
                tracing::warn!(worker_id, "Worker exited before signalling start");
            }
        }

        tracing::debug!(workers = handles.len(), "All workers started");

        // Wait for all workers to complete
        let mut results = Vec::with_capacity(handles.len());
        for (idx, handle) in handles.into_iter().enumerate() {
            match handle.await {
                Ok(stats) => {
                    tracing::debug!(
                        worker_id = idx,
                        completed = stats.completed,
                        errors = stats.errors,
                        "Worker completed"
                    );
                    results.push(stats);
                }
                Err(e) => {
                    tracing::error!(worker_id = idx, error = %e, "Worker task panicked");
                    // Continue collecting other results
                }
            }
        }

        if let Some(handle) = shutdown_watch {
            handle.abort();
        }

        let elapsed = window.elapsed();
        let outcomes = aggregator.finalize().await?;

        let aggregated = aggregate_worker_stats(&results);
        if aggregated.total_requests() != outcomes.total() {
            tracing::warn!(
                worker_attempts = aggregated.total_requests(),
                recorded = outcomes.total(),
                "Worker counters disagree with recorded outcomes"
            );
        }

        let report = RunReport {
            histogram: outcomes.histogram,
            errors: outcomes.errors,
            elapsed,
            requests: self.config.requests,
            started_at,
        };

        tracing::info!(
            elapsed_secs = elapsed.as_secs_f64(),
            attempts = report.attempts(),
            errors = report.errors,
            fatal_stops = aggregated.fatal_stops,
            rps = report.throughput(),
            "Run completed"
        );

        Ok(report)
    }

    /// Close `budget` once shutdown is requested
    ///
    /// A flag already set closes it before any worker exists.
    fn watch_shutdown(&self, budget: &Arc<BudgetCounter>) -> Option<JoinHandle<()>> {
        let mut shutdown_rx = self.shutdown_tx.subscribe();

        if *shutdown_rx.borrow_and_update() {
            tracing::info!("Shutdown requested before start, admitting no requests");
            budget.close();
            return None;
        }

        let budget = Arc::clone(budget);
        Some(tokio::spawn(async move {
            if shutdown_rx.wait_for(|stop| *stop).await.is_ok() {
                tracing::info!(
                    remaining = budget.remaining().max(0),
                    "Shutdown requested, admitting no further requests"
                );
                budget.close();
            }
        }))
    }

    /// Stop the helper task, then clear any flag it set after the run ended
    async fn finish_trigger(&self, handle: JoinHandle<()>) {
        handle.abort();
        let _ = handle.await;
        self.shutdown_tx.send_replace(false);
    }

    /// Run with Ctrl+C signal handling
    ///
    /// Ctrl+C stops admission; the run then completes with what was issued.
    pub async fn run_with_signal_handling(&self) -> BenchResult<RunReport> {
        let shutdown_tx = Arc::clone(&self.shutdown_tx);

        // Spawn signal handler task
        let signal_handle = tokio::spawn(async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => {
                    tracing::info!("Received Ctrl+C, initiating graceful shutdown...");
                    shutdown_tx.send_replace(true);
                }
                Err(e) => {
                    tracing::error!(error = %e, "Failed to listen for Ctrl+C");
                }
            }
        });

        let result = self.run().await;

        // Abort signal handler if still running
        self.finish_trigger(signal_handle).await;

        result
    }

    /// Run with a timeout
    ///
    /// Stops admission once `timeout` has passed.
    pub async fn run_with_timeout(&self, timeout: Duration) -> BenchResult<RunReport> {
        let shutdown_tx = Arc::clone(&self.shutdown_tx);

        // Spawn timeout task
        let timeout_handle = tokio::spawn(async move {
            tokio::time::sleep(timeout).await;
            tracing::info!("Timeout reached, initiating shutdown...");
            shutdown_tx.send_replace(true);
        });

        let result = self.run().await;

        // Abort timeout task if still running
        self.finish_trigger(timeout_handle).await;

        result
    }
}

impl std::fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator")
            .field("config", &self.config)
            .field("client", &self.client.name())
            .field("request", &self.request)
            .field("shutdown_requested", &self.is_shutdown_requested())
            .finish()
    }
}
