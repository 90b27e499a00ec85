//! Error types for the CLI

use thiserror::Error;

/// Result type for CLI operations
pub type CliResult<T> = Result<T, CliError>;

/// Errors that can occur in the CLI
#[derive(Debug, Error)]
pub enum CliError {
    /// A comparison ran and did not pass
    #[error("Visual comparison failed for '{name}': {message}")]
    ComparisonFailed {
        /// Baseline name or file pair
        name: String,
        /// Outcome message of the comparison
        message: String,
    },

    /// IO error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// visreg library error
    #[error(transparent)]
    Visreg(#[from] visreg::VisregError),
}

impl CliError {
    /// Failure for a comparison result that did not pass
    #[must_use]
    pub fn comparison_failed(result: &visreg::ComparisonResult) -> Self {
        Self::ComparisonFailed {
            name: result.baseline_name.clone(),
            message: result.message.clone(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use visreg::{ComparisonConfig, ComparisonResult, PixelComparison};

    #[test]
    fn test_comparison_failed_names_baseline() {
        let mismatch = PixelComparison::DimensionMismatch {
            baseline: (2, 2),
            actual: (3, 2),
        };
        let result =
            ComparisonResult::from_comparison("hero", &mismatch, &ComparisonConfig::default());
        let err = CliError::comparison_failed(&result);
        assert_eq!(
            err.to_string(),
            "Visual comparison failed for 'hero': Dimension mismatch: baseline is 2x2, actual is 3x2"
        );
    }

    #[test]
    fn test_visreg_error_is_transparent() {
        let err: CliError = visreg::VisregError::config("pixel tolerance must be within [0, 1], got 2").into();
        assert_eq!(
            err.to_string(),
            "Configuration error: pixel tolerance must be within [0, 1], got 2"
        );
    }
}
