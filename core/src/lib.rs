//! http-bench-core: Dispatch engine for concurrent HTTP load runs
//!
//! This crate holds everything a load run needs except the HTTP transport
//! itself, including:
//!
//! - The request budget and concurrency slots shared by all workers
//! - The time window spanning the first worker start to the last worker end
//! - Outcome aggregation into a status histogram plus an error count
//! - Workers and the orchestrator that spawns, joins and reports on them
//! - The [`HttpClient`] seam that a transport implements
//!
//! Request failures are data, not errors: they are counted in the
//! [`RunReport`]. Only setup and lifecycle problems surface as [`BenchError`].

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod budget;
pub mod channel;
pub mod config;
pub mod error;
pub mod metrics;
pub mod orchestrator;
pub mod request;
pub mod traits;
pub mod window;
pub mod worker;

pub use budget::{BudgetCounter, BudgetSlot};
pub use channel::ChannelConfig;
pub use config::{ConfigError, RunConfig};
pub use error::*;
pub use metrics::*;
pub use orchestrator::{Orchestrator, OrchestratorBuilder, OutcomeReporter, ResultAggregator};
pub use request::RequestSpec;
pub use traits::*;
pub use window::TimeWindow;
pub use worker::{Worker, WorkerBuilder, WorkerStats};
