//! Worker module for executing load requests
//!
//! The Worker is the core execution unit in http-bench, responsible for the
//! simple but critical loop: **acquire -> execute -> report -> release**.
//!
//! Each Worker is a tokio task that:
//!
//! 1. Signals the orchestrator that it is running and records its start time
//! 2. Claims one work unit and a concurrency slot from the [`BudgetCounter`]
//! 3. Executes the shared request via an [`HttpClient`]
//! 4. Sends the status code or error to the aggregator
//! 5. Releases the slot
//! 6. Repeats until the budget is exhausted, then records its end time
//!
//! A fatal request error is counted like any other failure and ends only the
//! worker that hit it.
//!
//! [`BudgetCounter`]: crate::budget::BudgetCounter
//! [`HttpClient`]: crate::traits::HttpClient
//!
//! # Example
//!
//! ```ignore
//! use http_bench_core::worker::WorkerBuilder;
//!
//! let worker = WorkerBuilder::new(0)
//!     .client(client)
//!     .request(request)
//!     .budget(budget)
//!     .reporter(aggregator.reporter())
//!     .window(window)
//!     .build()?;
//!
//! let stats = worker.run(None).await;
//! println!("Completed: {}", stats.completed);
//! ```

mod builder;
mod executor;
mod stats;

pub use builder::WorkerBuilder;
pub use executor::Worker;
pub use stats::WorkerStats;
