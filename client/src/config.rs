//! HTTP transport configuration

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration validation error.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ClientConfigError {
    /// A timeout value is zero.
    #[error("invalid {name} timeout: {value:?}")]
    InvalidTimeout {
        /// Which timeout was rejected
        name: &'static str,
        /// The rejected value
        value: Duration,
    },

    /// The user agent is empty.
    #[error("user agent must not be empty")]
    EmptyUserAgent,
}

/// Settings for the shared reqwest client.
///
/// Defaults suit a load generator: a generous idle pool so every worker
/// keeps its connection, and timeouts bounded so a stuck server cannot hang
/// a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Whole-attempt timeout, including reading the body
    #[serde(default = "default_request_timeout")]
    #[serde(with = "humantime_serde")]
    pub request_timeout: Duration,

    /// Connection establishment timeout
    #[serde(default = "default_connect_timeout")]
    #[serde(with = "humantime_serde")]
    pub connect_timeout: Duration,

    /// TCP keepalive interval
    #[serde(default = "default_tcp_keepalive")]
    #[serde(with = "humantime_serde")]
    pub tcp_keepalive: Option<Duration>,

    /// Maximum idle connections kept per host
    #[serde(default = "default_pool_max_idle_per_host")]
    pub pool_max_idle_per_host: usize,

    /// User agent string
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_request_timeout() -> Duration {
    Duration::from_secs(10)
}

fn default_connect_timeout() -> Duration {
    Duration::from_secs(60)
}

fn default_tcp_keepalive() -> Option<Duration> {
    Some(Duration::from_secs(60))
}

fn default_pool_max_idle_per_host() -> usize {
    50_000
}

fn default_user_agent() -> String {
    format!("http-bench/{}", env!("CARGO_PKG_VERSION"))
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            request_timeout: default_request_timeout(),
            connect_timeout: default_connect_timeout(),
            tcp_keepalive: default_tcp_keepalive(),
            pool_max_idle_per_host: default_pool_max_idle_per_host(),
            user_agent: default_user_agent(),
        }
    }
}

impl ClientConfig {
    /// Set the request timeout.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Set the connection timeout.
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Set or disable TCP keepalive.
    pub fn with_tcp_keepalive(mut self, keepalive: Option<Duration>) -> Self {
        self.tcp_keepalive = keepalive;
        self
    }

    /// Set the idle pool size.
    pub fn with_pool_max_idle(mut self, max_idle: usize) -> Self {
        self.pool_max_idle_per_host = max_idle;
        self
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ClientConfigError> {
        if self.request_timeout.is_zero() {
            return Err(ClientConfigError::InvalidTimeout {
                name: "request",
                value: self.request_timeout,
            });
        }
        if self.connect_timeout.is_zero() {
            return Err(ClientConfigError::InvalidTimeout {
                name: "connect",
                value: self.connect_timeout,
            });
        }
        if self.user_agent.trim().is_empty() {
            return Err(ClientConfigError::EmptyUserAgent);
        }
        Ok(())
    }
}
