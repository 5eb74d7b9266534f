//! CLI argument parsing and run dispatch

mod report;

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use http_bench_client::{ClientConfig, ReqwestClient};
use http_bench_core::{OrchestratorBuilder, RequestSpec, RunConfig};

pub use report::render_summary;

/// http-bench - Concurrent HTTP load generator
#[derive(Parser, Debug)]
#[command(name = "http-bench")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Target URL
    #[arg(short, long, env = "HTTP_BENCH_URL")]
    pub url: String,

    /// Total number of requests to send
    #[arg(short = 'n', long, default_value = "100")]
    pub requests: u64,

    /// Number of concurrent workers
    #[arg(short, long, default_value = "1")]
    pub concurrency: usize,

    /// HTTP method
    #[arg(short = 'X', long, default_value = "GET")]
    pub method: String,

    /// Request body
    #[arg(short, long)]
    pub data: Option<String>,

    /// Request headers, e.g. "Accept: text/plain; Host: api.example.com"
    #[arg(short = 'H', long)]
    pub headers: Option<String>,

    /// Per-request timeout in seconds
    #[arg(long, default_value = "10")]
    pub timeout: u64,

    /// Connection timeout in seconds
    #[arg(long, default_value = "60")]
    pub connect_timeout: u64,

    /// Stop admitting new requests after this many seconds
    #[arg(long)]
    pub duration_limit: Option<u64>,

    /// Print the report as JSON
    #[arg(long)]
    pub json: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// Run the load test described by the arguments
    pub async fn run(&self) -> Result<()> {
        let config = RunConfig::new(self.concurrency).with_requests(self.requests);
        let request = self.request_spec().context("Failed to prepare request")?;
        let client = ReqwestClient::new(self.client_config())
            .context("Failed to build HTTP client")?;

        tracing::info!(
            request = %request,
            requests = config.requests,
            concurrency = config.concurrency,
            "Configured run"
        );

        let orchestrator = Arc::new(
            OrchestratorBuilder::new()
                .config(config)
                .client(Arc::new(client))
                .request(request)
                .build()
                .context("Invalid run configuration")?,
        );

        let limit = self.duration_limit.map(|secs| {
            let orchestrator = Arc::clone(&orchestrator);
            tokio::spawn(async move {
                tokio::time::sleep(Duration::from_secs(secs)).await;
                tracing::info!(limit_secs = secs, "Duration limit reached");
                orchestrator.shutdown();
            })
        });

        let result = orchestrator.run_with_signal_handling().await;

        if let Some(handle) = limit {
            handle.abort();
        }

        let report = result.context("Run failed")?;

        if self.json {
            let json = serde_json::to_string_pretty(&report).context("Failed to encode report")?;
            println!("{json}");
        } else {
            print!("{}", render_summary(&report));
        }

        Ok(())
    }

    /// Build the request sent on every attempt
    pub fn request_spec(&self) -> Result<RequestSpec> {
        let mut spec = RequestSpec::new(&self.method, &self.url)?;

        if let Some(ref headers) = self.headers {
            spec = spec
                .with_headers(headers)
                .with_context(|| format!("Failed to parse headers: {headers}"))?;
        }

        if let Some(ref data) = self.data {
            spec = spec.with_body(data.clone());
        }

        Ok(spec)
    }

    /// Transport settings derived from the timeout flags
    pub fn client_config(&self) -> ClientConfig {
        ClientConfig::default()
            .with_request_timeout(Duration::from_secs(self.timeout))
            .with_connect_timeout(Duration::from_secs(self.connect_timeout))
    }
}
