//! Result and error types for visreg.

use crate::orchestrator::ComparisonResult;
use thiserror::Error;

/// Result type for visreg operations
pub type VisregResult<T> = Result<T, VisregError>;

/// A single failing entry of a batch assertion
#[derive(Debug, Clone, PartialEq)]
pub struct BatchFailure {
    /// Logical baseline name
    pub name: String,
    /// Difference percentage, `None` when the entry errored before comparing
    pub diff_percent: Option<f64>,
    /// Human-readable reason
    pub reason: String,
}

impl BatchFailure {
    /// One summary line, e.g. `b: 10.00% diff`
    #[must_use]
    pub fn summary_line(&self) -> String {
        match self.diff_percent {
            Some(pct) => format!("{}: {pct:.2}% diff", self.name),
            None => format!("{}: error: {}", self.name, self.reason),
        }
    }
}

/// Errors that can occur in visreg
#[derive(Debug, Error)]
pub enum VisregError {
    /// No baseline stored under the requested name
    #[error("Baseline not found for '{name}' at {path}")]
    NotFound {
        /// Logical baseline name
        name: String,
        /// Location that was searched
        path: String,
    },

    /// Bytes could not be decoded as a raster image
    #[error("Failed to decode image: {message}")]
    Decode {
        /// Error message
        message: String,
    },

    /// Diff image could not be encoded
    #[error("Failed to encode image: {message}")]
    Encode {
        /// Error message
        message: String,
    },

    /// Pixel data does not fit the declared dimensions
    #[error("Invalid pixel buffer: {message}")]
    InvalidBuffer {
        /// Error message
        message: String,
    },

    /// Tolerance, threshold, naming or config file problem
    #[error("Configuration error: {message}")]
    Configuration {
        /// Error message
        message: String,
    },

    /// Capture provider failed to produce an image
    #[error("Capture failed: {message}")]
    Capture {
        /// Error message
        message: String,
    },

    /// A single visual assertion failed
    #[error("{message}")]
    VisualComparison {
        /// Formatted failure message
        message: String,
        /// Full comparison result
        result: Box<ComparisonResult>,
    },

    /// One or more entries of a batch assertion failed
    #[error("{message}")]
    BatchComparison {
        /// Multi-line summary of every failure
        message: String,
        /// Failing entries
        failures: Vec<BatchFailure>,
        /// Results of every entry that could be compared
        results: Vec<ComparisonResult>,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl VisregError {
    /// Create a configuration error
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create a decode error
    #[must_use]
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }

    /// Create a capture error
    #[must_use]
    pub fn capture(message: impl Into<String>) -> Self {
        Self::Capture {
            message: message.into(),
        }
    }

    /// The comparison result carried by a single visual assertion failure
    #[must_use]
    pub fn comparison_result(&self) -> Option<&ComparisonResult> {
        match self {
            Self::VisualComparison { result, .. } => Some(&**result),
            _ => None,
        }
    }
}
