use std::time::Duration;

use thiserror::Error;

/// Errors from the anomaly matrix engine.
///
/// Only configuration and provider failures abort a run. Missing per-day
/// data is never an error; the classifier degrades it to no-anomaly.
#[derive(Debug, Error)]
pub enum MatrixError {
    #[error("configuration error at `{key}`: {detail}")]
    Configuration { key: String, detail: String },

    #[error("no polarity registered for metric: {0}")]
    PolarityNotRegistered(String),

    #[error("provider failed for segment pair ({segment_a}, {segment_b}): {detail}")]
    Provider {
        segment_a: String,
        segment_b: String,
        detail: String,
    },

    #[error("provider response for segment pair ({segment_a}, {segment_b}) is missing metric `{metric}`")]
    MissingSeries {
        segment_a: String,
        segment_b: String,
        metric: String,
    },

    #[error("provider timed out after {timeout:?} for segment pair ({segment_a}, {segment_b})")]
    ProviderTimeout {
        segment_a: String,
        segment_b: String,
        timeout: Duration,
    },

    #[error("duplicate matrix cell: ({segment_a}, {segment_b}, {metric})")]
    DuplicateCell {
        segment_a: String,
        segment_b: String,
        metric: String,
    },

    #[error("matrix incomplete: expected {expected} cells, got {actual}")]
    IncompleteMatrix { expected: usize, actual: usize },

    #[error("matrix cell references unknown {kind} `{id}`")]
    UnknownCellReference { kind: &'static str, id: String },

    #[error("persistence error: {0}")]
    PersistenceError(String),
}

impl MatrixError {
    /// Shorthand for a configuration error on a named key.
    pub fn config(key: impl Into<String>, detail: impl Into<String>) -> Self {
        MatrixError::Configuration {
            key: key.into(),
            detail: detail.into(),
        }
    }

    /// Whether this error originates from configuration (as opposed to the provider).
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            MatrixError::Configuration { .. } | MatrixError::PolarityNotRegistered(_)
        )
    }

    /// Whether this error originates from the time-series provider.
    pub fn is_provider(&self) -> bool {
        matches!(
            self,
            MatrixError::Provider { .. }
                | MatrixError::MissingSeries { .. }
                | MatrixError::ProviderTimeout { .. }
        )
    }
}

impl From<std::io::Error> for MatrixError {
    fn from(e: std::io::Error) -> Self {
        MatrixError::PersistenceError(e.to_string())
    }
}

impl From<serde_json::Error> for MatrixError {
    fn from(e: serde_json::Error) -> Self {
        MatrixError::PersistenceError(e.to_string())
    }
}

impl From<config::ConfigError> for MatrixError {
    fn from(e: config::ConfigError) -> Self {
        MatrixError::config("config", e.to_string())
    }
}

/// Convenience type alias for matrix results.
pub type MatrixResult<T> = Result<T, MatrixError>;
