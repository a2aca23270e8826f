//! Configuration error types

use thiserror::Error;

use crate::timer::MAX_DOTS;

/// Reasons a raw duration/interval pair cannot become a timer configuration.
///
/// Variants are checked in declaration order; the first failing rule wins.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    #[error("total duration must be greater than zero")]
    InvalidTotal,

    #[error("interval must be greater than zero")]
    InvalidInterval,

    #[error("interval cannot be longer than the total duration")]
    IntervalExceedsTotal,

    #[error("too many intervals (more than {}), use a longer interval", MAX_DOTS)]
    TooManyIntervals,
}

impl ConfigError {
    /// Stable machine-readable name of the error kind
    pub fn kind(&self) -> &'static str {
        match self {
            ConfigError::InvalidTotal => "invalid_total",
            ConfigError::InvalidInterval => "invalid_interval",
            ConfigError::IntervalExceedsTotal => "interval_exceeds_total",
            ConfigError::TooManyIntervals => "too_many_intervals",
        }
    }
}

/// Failure of a command issued against the running application
#[derive(Error, Debug)]
pub enum CommandError {
    /// Inputs did not resolve to a valid configuration
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Request payload could not be parsed
    #[error("Invalid request body: {0}")]
    InvalidRequest(String),

    /// Shared state lock was poisoned
    #[error("Failed to lock {0}")]
    Lock(String),
}
