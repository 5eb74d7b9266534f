//! reqwest-backed request executor

use async_trait::async_trait;
use http_bench_core::{HttpClient, RequestError, RequestSpec};
use reqwest::header::HOST;
use reqwest::Client;
use thiserror::Error;

use crate::config::{ClientConfig, ClientConfigError};

/// Failure to construct a [`ReqwestClient`].
#[derive(Debug, Error)]
pub enum ClientError {
    /// The configuration was rejected before building.
    #[error(transparent)]
    InvalidConfig(#[from] ClientConfigError),

    /// reqwest could not build the client.
    #[error("failed to build http client: {0}")]
    Build(#[from] reqwest::Error),
}

/// Shared HTTP client with connection pooling.
///
/// One instance serves every worker in a run. reqwest pools connections
/// internally, so concurrent `execute` calls reuse idle keep-alive
/// connections to the target.
///
/// Every attempt reads the response body to the end before returning the
/// status. An attempt is an error only if no status was obtained or the body
/// could not be read.
#[derive(Debug, Clone)]
pub struct ReqwestClient {
    /// The underlying reqwest client
    client: Client,

    /// Configuration used to create this client
    config: ClientConfig,
}

impl ReqwestClient {
    /// Create a new client with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or the HTTP client
    /// cannot be built.
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        config.validate()?;

        let mut builder = Client::builder()
            .pool_max_idle_per_host(config.pool_max_idle_per_host)
            .timeout(config.request_timeout)
            .connect_timeout(config.connect_timeout)
            .user_agent(&config.user_agent);

        if let Some(keepalive) = config.tcp_keepalive {
            builder = builder.tcp_keepalive(keepalive);
        }

        let client = builder.build()?;

        Ok(Self { client, config })
    }

    /// Create a client with default configuration.
    pub fn with_defaults() -> Result<Self, ClientError> {
        Self::new(ClientConfig::default())
    }

    /// Get the configuration for this client.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    fn classify(&self, err: reqwest::Error) -> RequestError {
        if err.is_timeout() {
            RequestError::Timeout(self.config.request_timeout)
        } else if err.is_connect() {
            RequestError::Connect(err.to_string())
        } else if err.is_body() || err.is_decode() {
            RequestError::Body(err.to_string())
        } else if err.is_builder() {
            RequestError::InvalidRequest(err.to_string())
        } else {
            RequestError::Transport(err.to_string())
        }
    }
}

#[async_trait]
impl HttpClient for ReqwestClient {
    fn name(&self) -> &str {
        "reqwest"
    }

    async fn execute(&self, request: &RequestSpec) -> Result<u16, RequestError> {
        let mut builder = self
            .client
            .request(request.method().clone(), request.url().clone())
            .headers(request.headers().clone());

        if let Some(host) = request.host() {
            builder = builder.header(HOST, host);
        }

        if let Some(body) = request.body() {
            builder = builder.body(body.clone());
        }

        let mut response = builder.send().await.map_err(|e| self.classify(e))?;
        let status = response.status().as_u16();

        // Read to the end so the connection goes back to the pool
        while response
            .chunk()
            .await
            .map_err(|e| self.classify(e))?
            .is_some()
        {}

        tracing::trace!(status, url = %request.url(), "Attempt completed");
        Ok(status)
    }
}
