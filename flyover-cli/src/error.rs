//! CLI error type.

use flyover::scenario::ScenarioError;
use thiserror::Error;

/// Errors surfaced to the CLI user.
#[derive(Debug, Error)]
pub enum CliError {
    /// Scenario loading or validation failed.
    #[error("{0}")]
    Scenario(#[from] ScenarioError),

    /// Runtime or file I/O failure.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON output failed to serialize.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// The service could not be brought up.
    #[error("startup failed: {0}")]
    Startup(String),
}
