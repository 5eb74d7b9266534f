//! Error types for http-bench-core

use std::fmt;

use thiserror::Error;

/// Category of a [`BenchError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Invalid or inconsistent configuration
    Config,
    /// A required builder field was never set
    MissingConfig,
    /// The request descriptor could not be built
    Request,
    /// Worker lifecycle failure
    Orchestration,
    /// Outcome channel or drain task failure
    Aggregation,
    /// The run was shut down while the operation was pending
    Shutdown,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::Config => "configuration error",
            ErrorKind::MissingConfig => "missing configuration",
            ErrorKind::Request => "invalid request",
            ErrorKind::Orchestration => "orchestration error",
            ErrorKind::Aggregation => "aggregation error",
            ErrorKind::Shutdown => "shutdown",
        };
        f.write_str(name)
    }
}

/// Core error type
///
/// Only setup and lifecycle failures surface as `BenchError`. Per-request
/// failures are recorded as outcomes and never abort a run.
#[derive(Error, Debug, Clone)]
#[error("{kind}: {message}")]
pub struct BenchError {
    /// Error category
    pub kind: ErrorKind,
    /// Human readable detail
    pub message: String,
}

impl BenchError {
    /// Create an error of the given kind
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Invalid configuration
    pub fn config(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Config, message)
    }

    /// A builder was asked to build without a required field
    pub fn missing_config(field: &str) -> Self {
        Self::new(
            ErrorKind::MissingConfig,
            format!("required field `{field}` was not set"),
        )
    }

    /// The request descriptor is invalid
    pub fn request(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Request, message)
    }

    /// Worker spawn or join failure
    pub fn orchestration(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Orchestration, message)
    }

    /// Outcome channel or drain failure
    pub fn aggregation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Aggregation, message)
    }

    /// Operation abandoned because the run is shutting down
    pub fn shutdown() -> Self {
        Self::new(ErrorKind::Shutdown, "run is shutting down")
    }
}

/// Result type alias
pub type BenchResult<T> = std::result::Result<T, BenchError>;
