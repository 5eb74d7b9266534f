//! Builder pattern for Orchestrator construction

use std::sync::Arc;

use crate::channel::ChannelConfig;
use crate::config::RunConfig;
use crate::error::{BenchError, BenchResult};
use crate::request::RequestSpec;
use crate::traits::HttpClient;

use super::executor::Orchestrator;

/// Builder for creating an Orchestrator with proper configuration
///
/// # Example
///
/// ```ignore
/// let orchestrator = OrchestratorBuilder::new()
///     .concurrency(10)
///     .requests(1000)
///     .client(client)
///     .request(request)
///     .build()?;
/// ```
pub struct OrchestratorBuilder {
    config: RunConfig,
    client: Option<Arc<dyn HttpClient>>,
    request: Option<RequestSpec>,
    channel_config: ChannelConfig,
}

impl OrchestratorBuilder {
    /// Create a new orchestrator builder with default configuration
    pub fn new() -> Self {
        Self {
            config: RunConfig::default(),
            client: None,
            request: None,
            channel_config: ChannelConfig::default(),
        }
    }

    /// Set the full run configuration
    pub fn config(mut self, config: RunConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the number of workers
    pub fn concurrency(mut self, concurrency: usize) -> Self {
        self.config.concurrency = concurrency;
        self
    }

    /// Set the total request budget
    pub fn requests(mut self, requests: u64) -> Self {
        self.config.requests = requests;
        self
    }

    /// Set the request executor
    pub fn client(mut self, client: Arc<dyn HttpClient>) -> Self {
        self.client = Some(client);
        self
    }

    /// Set the request sent on every attempt
    pub fn request(mut self, request: RequestSpec) -> Self {
        self.request = Some(request);
        self
    }

    /// Set the channel configuration
    pub fn channel_config(mut self, config: ChannelConfig) -> Self {
        self.channel_config = config;
        self
    }

    /// Build the orchestrator
    ///
    /// # Errors
    ///
    /// Returns an error if the client or request are not set, or if
    /// configuration validation fails.
    pub fn build(self) -> BenchResult<Orchestrator> {
        let client = self
            .client
            .ok_or_else(|| BenchError::missing_config("client"))?;

        let request = self
            .request
            .ok_or_else(|| BenchError::missing_config("request"))?;

        self.config
            .validate()
            .map_err(|e| BenchError::config(e.to_string()))?;

        Ok(Orchestrator::new(
            self.config,
            client,
            request,
            self.channel_config,
        ))
    }
}

impl Default for OrchestratorBuilder {
    fn default() -> Self {
        Self::new()
    }
}
