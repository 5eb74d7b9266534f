//! http-bench-client: reqwest implementation of the request executor
//!
//! Provides [`ReqwestClient`], the production [`HttpClient`] used by the
//! `http-bench` binary, and the [`ClientConfig`] that tunes its connection
//! pool and timeouts.
//!
//! [`HttpClient`]: http_bench_core::HttpClient

#![warn(missing_docs)]

mod client;
mod config;

pub use client::{ClientError, ReqwestClient};
pub use config::{ClientConfig, ClientConfigError};
