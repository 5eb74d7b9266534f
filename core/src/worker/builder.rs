//! Builder pattern for Worker construction

use crate::budget::BudgetCounter;
use crate::error::{BenchError, BenchResult};
use crate::orchestrator::OutcomeReporter;
use crate::request::RequestSpec;
use crate::traits::HttpClient;
use crate::window::TimeWindow;

use super::executor::Worker;

use std::sync::Arc;

/// Builder for creating Worker instances
///
/// # Example
/// ```ignore
/// let worker = WorkerBuilder::new(0)
///     .client(client)
///     .request(request)
///     .budget(budget)
///     .reporter(aggregator.reporter())
///     .window(window)
///     .build()?;
/// ```
#[derive(Default)]
pub struct WorkerBuilder {
    id: usize,
    client: Option<Arc<dyn HttpClient>>,
    request: Option<Arc<RequestSpec>>,
    budget: Option<Arc<BudgetCounter>>,
    reporter: Option<OutcomeReporter>,
    window: Option<Arc<TimeWindow>>,
}

impl WorkerBuilder {
    /// Create a new builder with the given worker ID
    pub fn new(id: usize) -> Self {
        Self {
            id,
            ..Default::default()
        }
    }

    /// Set the request executor
    pub fn client(mut self, client: Arc<dyn HttpClient>) -> Self {
        self.client = Some(client);
        self
    }

    /// Set the request descriptor
    pub fn request(mut self, request: Arc<RequestSpec>) -> Self {
        self.request = Some(request);
        self
    }

    /// Set the shared budget
    pub fn budget(mut self, budget: Arc<BudgetCounter>) -> Self {
        self.budget = Some(budget);
        self
    }

    /// Set the outcome reporter
    pub fn reporter(mut self, reporter: OutcomeReporter) -> Self {
        self.reporter = Some(reporter);
        self
    }

    /// Set the shared time window
    pub fn window(mut self, window: Arc<TimeWindow>) -> Self {
        self.window = Some(window);
        self
    }

    /// Build the Worker
    ///
    /// # Errors
    /// Returns an error if any required field is missing.
    pub fn build(self) -> BenchResult<Worker> {
        let client = self.client.ok_or(BenchError::missing_config("client"))?;
        let request = self.request.ok_or(BenchError::missing_config("request"))?;
        let budget = self.budget.ok_or(BenchError::missing_config("budget"))?;
        let reporter = self
            .reporter
            .ok_or(BenchError::missing_config("reporter"))?;
        let window = self.window.ok_or(BenchError::missing_config("window"))?;

        Ok(Worker::new(self.id, client, request, budget, reporter, window))
    }
}
