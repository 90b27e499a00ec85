//! Comparison thresholds and project-level settings.

use crate::result::{VisregError, VisregResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default per-channel tolerance as a fraction of 255
pub const DEFAULT_PIXEL_TOLERANCE: f64 = 0.1;

/// Default fraction of pixels allowed to differ
pub const DEFAULT_DIFF_THRESHOLD: f64 = 0.01;

/// The two independent thresholds of a comparison
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComparisonConfig {
    /// Per-channel tolerance (0.0-1.0) as a fraction of the 0-255 range
    pub pixel_tolerance: f64,
    /// Maximum fraction (0.0-1.0) of pixels that may differ
    pub diff_threshold: f64,
}

impl Default for ComparisonConfig {
    fn default() -> Self {
        Self {
            pixel_tolerance: DEFAULT_PIXEL_TOLERANCE,
            diff_threshold: DEFAULT_DIFF_THRESHOLD,
        }
    }
}

impl ComparisonConfig {
    /// Create the default configuration
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the per-pixel tolerance
    ///
    /// # Errors
    ///
    /// Returns [`VisregError::Configuration`] if `value` is outside `[0, 1]`.
    pub fn with_pixel_tolerance(mut self, value: f64) -> VisregResult<Self> {
        self.pixel_tolerance = check_unit_range("pixel tolerance", value)?;
        Ok(self)
    }

    /// Set the whole-image diff threshold
    ///
    /// # Errors
    ///
    /// Returns [`VisregError::Configuration`] if `value` is outside `[0, 1]`.
    pub fn with_diff_threshold(mut self, value: f64) -> VisregResult<Self> {
        self.diff_threshold = check_unit_range("diff threshold", value)?;
        Ok(self)
    }

    /// Check both values, e.g. after deserializing
    ///
    /// # Errors
    ///
    /// Returns [`VisregError::Configuration`] for the first value out of range.
    pub fn validate(&self) -> VisregResult<()> {
        check_unit_range("pixel tolerance", self.pixel_tolerance)?;
        check_unit_range("diff threshold", self.diff_threshold)?;
        Ok(())
    }

    /// Diff threshold expressed as a percentage
    #[must_use]
    pub fn threshold_percent(&self) -> f64 {
        self.diff_threshold * 100.0
    }
}

fn check_unit_range(what: &str, value: f64) -> VisregResult<f64> {
    if value.is_finite() && (0.0..=1.0).contains(&value) {
        Ok(value)
    } else {
        Err(VisregError::config(format!(
            "{what} must be within [0, 1], got {value}"
        )))
    }
}

/// Project-level settings: artifact roots plus thresholds
///
/// Loaded from YAML, e.g.
///
/// ```yaml
/// baseline_dir: tests/baselines
/// comparison:
///   pixel_tolerance: 0.05
///   diff_threshold: 0.001
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VisregConfig {
    /// Root of approved baseline images
    pub baseline_dir: PathBuf,
    /// Root of the most recent captures
    pub actual_dir: PathBuf,
    /// Root of generated diff images
    pub diff_dir: PathBuf,
    /// Thresholds
    pub comparison: ComparisonConfig,
}

impl Default for VisregConfig {
    fn default() -> Self {
        Self {
            baseline_dir: PathBuf::from("__baselines__"),
            actual_dir: PathBuf::from("__actual__"),
            diff_dir: PathBuf::from("__diffs__"),
            comparison: ComparisonConfig::default(),
        }
    }
}

impl VisregConfig {
    /// Create the default configuration
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Put all three artifact roots under one directory
    #[must_use]
    pub fn with_root(mut self, root: impl AsRef<Path>) -> Self {
        let root = root.as_ref();
        self.baseline_dir = root.join("baselines");
        self.actual_dir = root.join("actual");
        self.diff_dir = root.join("diffs");
        self
    }

    /// Set the thresholds
    #[must_use]
    pub const fn with_comparison(mut self, comparison: ComparisonConfig) -> Self {
        self.comparison = comparison;
        self
    }

    /// Parse and validate YAML
    ///
    /// # Errors
    ///
    /// Returns a YAML error for malformed input or a configuration error for
    /// out-of-range thresholds.
    pub fn from_yaml_str(yaml: &str) -> VisregResult<Self> {
        let config: Self = serde_yaml_ng::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a YAML file
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the file cannot be read, otherwise as
    /// [`Self::from_yaml_str`].
    pub fn load(path: impl AsRef<Path>) -> VisregResult<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::from_yaml_str(&text)
    }

    /// Serialize to YAML
    ///
    /// # Errors
    ///
    /// Returns a YAML error if serialization fails.
    pub fn to_yaml(&self) -> VisregResult<String> {
        Ok(serde_yaml_ng::to_string(self)?)
    }

    /// Check thresholds and that the three roots are distinct
    ///
    /// # Errors
    ///
    /// Returns [`VisregError::Configuration`] on the first violation.
    pub fn validate(&self) -> VisregResult<()> {
        self.comparison.validate()?;
        if self.baseline_dir == self.actual_dir || self.baseline_dir == self.diff_dir {
            return Err(VisregError::config(format!(
                "baseline directory {} must differ from actual and diff directories",
                self.baseline_dir.display()
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ComparisonConfig::default();
        assert!((config.pixel_tolerance - 0.1).abs() < f64::EPSILON);
        assert!((config.diff_threshold - 0.01).abs() < f64::EPSILON);
        assert!((config.threshold_percent() - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_builder_accepts_bounds() {
        let config = ComparisonConfig::new()
            .with_pixel_tolerance(0.0)
            .unwrap()
            .with_diff_threshold(1.0)
            .unwrap();
        assert_eq!(config.pixel_tolerance, 0.0);
        assert_eq!(config.diff_threshold, 1.0);
    }

    #[test]
    fn test_builder_rejects_out_of_range() {
        assert!(ComparisonConfig::new().with_pixel_tolerance(1.01).is_err());
        assert!(ComparisonConfig::new().with_pixel_tolerance(-0.1).is_err());
        assert!(ComparisonConfig::new().with_diff_threshold(f64::NAN).is_err());
        let err = ComparisonConfig::new().with_diff_threshold(2.0).unwrap_err();
        assert!(matches!(err, VisregError::Configuration { .. }));
        assert!(err.to_string().contains("diff threshold"));
    }

    #[test]
    fn test_yaml_partial_uses_defaults() {
        let config = VisregConfig::from_yaml_str(
            "baseline_dir: tests/baselines\ncomparison:\n  diff_threshold: 0.05\n",
        )
        .unwrap();
        assert_eq!(config.baseline_dir, PathBuf::from("tests/baselines"));
        assert_eq!(config.diff_dir, PathBuf::from("__diffs__"));
        assert!((config.comparison.diff_threshold - 0.05).abs() < f64::EPSILON);
        assert!((config.comparison.pixel_tolerance - 0.1).abs() < f64::EPSILON);
    }

    #[test]
    fn test_yaml_rejects_bad_threshold() {
        let err = VisregConfig::from_yaml_str("comparison:\n  pixel_tolerance: 3\n").unwrap_err();
        assert!(matches!(err, VisregError::Configuration { .. }));
    }

    #[test]
    fn test_yaml_rejects_shared_roots() {
        let err =
            VisregConfig::from_yaml_str("baseline_dir: out\nactual_dir: out\n").unwrap_err();
        assert!(matches!(err, VisregError::Configuration { .. }));
    }

    #[test]
    fn test_yaml_round_trip_and_load() {
        let dir = tempfile::TempDir::new().unwrap();
        let config = VisregConfig::new().with_root(dir.path());
        let path = dir.path().join("visreg.yaml");
        std::fs::write(&path, config.to_yaml().unwrap()).unwrap();
        assert_eq!(VisregConfig::load(&path).unwrap(), config);
    }

    #[test]
    fn test_load_missing_file_is_io() {
        let err = VisregConfig::load("/nonexistent/visreg.yaml").unwrap_err();
        assert!(matches!(err, VisregError::Io(_)));
    }
}
