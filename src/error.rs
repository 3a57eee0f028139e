//! Error handling for the pingsweep scanner
//!
//! Per-target probe failures never show up here: they are folded into a
//! [`ProbeStatus::Error`](crate::probe::ProbeStatus::Error) outcome by the
//! prober. This module only covers the boundaries of a run (input parsing,
//! configuration and report persistence), which are fatal.

use thiserror::Error;

/// Main error type for sweep operations
#[derive(Debug, Error)]
pub enum SweepError {
    #[error("Invalid target: {0}")]
    InvalidTarget(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Output error: {0}")]
    OutputError(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl SweepError {
    /// Errors caused by what the operator passed in, as opposed to the
    /// environment failing underneath us.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            SweepError::InvalidTarget(_) | SweepError::ConfigError(_) | SweepError::ParseError(_)
        )
    }
}

impl From<serde_json::Error> for SweepError {
    fn from(err: serde_json::Error) -> Self {
        SweepError::OutputError(err.to_string())
    }
}

impl From<toml::de::Error> for SweepError {
    fn from(err: toml::de::Error) -> Self {
        SweepError::ConfigError(format!("Failed to parse TOML: {}", err))
    }
}
