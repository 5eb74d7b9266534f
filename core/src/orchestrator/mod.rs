//! Orchestrator for run lifecycle management
//!
//! The Orchestrator coordinates one complete load run:
//! - Sizing a fresh request budget and time window per run
//! - Spawning worker tasks and waiting until each has started
//! - Draining outcomes through a single-consumer aggregator
//! - Assembling the final [`RunReport`](crate::metrics::RunReport)
//! - Stopping admission early on Ctrl+C or a timeout
//!
//! # Example
//!
//! ```ignore
//! use http_bench_core::{OrchestratorBuilder, RequestSpec};
//!
//! let orchestrator = OrchestratorBuilder::new()
//!     .concurrency(10)
//!     .requests(1000)
//!     .client(client)
//!     .request(RequestSpec::get("http://localhost:8080/")?)
//!     .build()?;
//!
//! let report = orchestrator.run_with_signal_handling().await?;
//! ```

mod aggregator;
mod builder;
mod executor;

pub use aggregator::{
    aggregate_worker_stats, AggregatedOutcomes, AggregatedStats, OutcomeReporter,
    ResultAggregator,
};
pub use builder::OrchestratorBuilder;
pub use executor::Orchestrator;
