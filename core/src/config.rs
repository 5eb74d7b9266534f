//! Run configuration types

use serde::{Deserialize, Serialize};

/// Run configuration
///
/// Sizes the request budget for one run: how many requests in total, and how
/// many workers pull from that budget concurrently.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunConfig {
    /// Total number of requests to issue across all workers
    pub requests: u64,

    /// Number of concurrent worker tasks
    pub concurrency: usize,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            requests: 100,
            concurrency: 1,
        }
    }
}

impl RunConfig {
    /// Create a new config with the given concurrency
    pub fn new(concurrency: usize) -> Self {
        Self {
            concurrency,
            ..Default::default()
        }
    }

    /// Set the total request budget
    pub fn with_requests(mut self, requests: u64) -> Self {
        self.requests = requests;
        self
    }

    /// Validate the configuration
    ///
    /// A zero request budget is accepted and yields an empty report.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.concurrency == 0 {
            return Err(ConfigError::InvalidConcurrency(
                "concurrency must be at least 1".into(),
            ));
        }

        if i64::try_from(self.requests).is_err() {
            return Err(ConfigError::InvalidRequestCount(format!(
                "request count {} exceeds {}",
                self.requests,
                i64::MAX
            )));
        }

        Ok(())
    }
}

/// Configuration validation errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Invalid concurrency value
    #[error("Invalid concurrency: {0}")]
    InvalidConcurrency(String),

    /// Invalid request count
    #[error("Invalid request count: {0}")]
    InvalidRequestCount(String),
}
