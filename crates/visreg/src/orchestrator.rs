//! Comparison orchestration: baseline lookup, bootstrap, artifacts.
//!
//! ```text
//! capture bytes ──► save actual ──► baseline? ──no──► seed baseline ──► "Baseline created"
//!                                      │
//!                                     yes
//!                                      ▼
//!                      decode both ──► PixelComparator ──► ComparisonResult
//!                                                   │
//!                                        diff image ├──► repository (diff root)
//!                                                   └──► report sink "<name> - Diff"
//! ```

use crate::capture::{CaptureTarget, ScreenCapture};
use crate::codec::{ImageCodec, PngCodec};
use crate::comparator::{PixelComparator, PixelComparison, PixelDiff};
use crate::config::{ComparisonConfig, VisregConfig};
use crate::report::{NullReportSink, ReportSink};
use crate::repository::{BaselineRepository, FsBaselineRepository};
use crate::result::VisregResult;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Message of a result that seeded a new baseline
pub const BASELINE_CREATED: &str = "Baseline created";

/// How a comparison was decided
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    /// No baseline existed; the capture became the baseline
    BaselineCreated,
    /// Pixels were compared
    Compared,
    /// Sizes differed; always a failure
    DimensionMismatch {
        /// Baseline `(width, height)`
        baseline: (u32, u32),
        /// Actual `(width, height)`
        actual: (u32, u32),
    },
}

/// Outcome of one visual comparison
///
/// Never mutated after construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonResult {
    /// Logical baseline name
    pub baseline_name: String,
    /// Whether the comparison is within threshold
    pub passed: bool,
    /// Percentage of differing pixels (0.0-100.0)
    pub diff_percent: f64,
    /// Number of differing pixels
    pub diff_pixel_count: u64,
    /// Number of pixels compared
    pub total_pixels: u64,
    /// Human-readable outcome
    pub message: String,
    /// How the result was decided
    pub outcome: Outcome,
    /// Baseline location
    pub baseline_path: Option<String>,
    /// Location of the capture that was compared
    pub actual_path: Option<String>,
    /// Diff image location, only when pixels differ
    pub diff_path: Option<String>,
}

impl ComparisonResult {
    /// Judge a pixel comparison against `config`, with no artifact locations
    ///
    /// A dimension mismatch always fails at 100%, counting every actual pixel.
    #[must_use]
    pub fn from_comparison(
        name: &str,
        comparison: &PixelComparison,
        config: &ComparisonConfig,
    ) -> Self {
        let threshold_percent = config.threshold_percent();
        let (passed, diff_pixel_count, total_pixels, message, outcome) = match *comparison {
            PixelComparison::DimensionMismatch {
                baseline: (bw, bh),
                actual: (aw, ah),
            } => {
                let total = u64::from(aw) * u64::from(ah);
                (
                    false,
                    total,
                    total,
                    format!("Dimension mismatch: baseline is {bw}x{bh}, actual is {aw}x{ah}"),
                    Outcome::DimensionMismatch {
                        baseline: (bw, bh),
                        actual: (aw, ah),
                    },
                )
            }
            PixelComparison::Compared(ref diff) => {
                let diff_percent = diff.diff_percent();
                let message = if diff.diff_pixel_count == 0 {
                    "Images match".to_string()
                } else {
                    format!(
                        "{diff_percent:.2}% of pixels differ ({}/{}, threshold {threshold_percent:.2}%)",
                        diff.diff_pixel_count, diff.total_pixels
                    )
                };
                (
                    diff_percent <= threshold_percent,
                    diff.diff_pixel_count,
                    diff.total_pixels,
                    message,
                    Outcome::Compared,
                )
            }
        };

        Self {
            baseline_name: name.to_string(),
            passed,
            diff_percent: comparison.diff_percent(),
            diff_pixel_count,
            total_pixels,
            message,
            outcome,
            baseline_path: None,
            actual_path: None,
            diff_path: None,
        }
    }

    /// Whether this comparison seeded a new baseline
    #[must_use]
    pub fn is_baseline_created(&self) -> bool {
        self.outcome == Outcome::BaselineCreated
    }

    /// Whether the images had different sizes
    #[must_use]
    pub const fn is_dimension_mismatch(&self) -> bool {
        matches!(self.outcome, Outcome::DimensionMismatch { .. })
    }
}

/// Compares captures against stored baselines
///
/// Cheap to clone: clones share the repository and report sink, so a
/// re-configured handle (`with_diff_threshold`, ...) still sees the same
/// baselines.
pub struct VisualComparator<R = FsBaselineRepository> {
    repository: Arc<R>,
    codec: PngCodec,
    sink: Arc<dyn ReportSink>,
    config: ComparisonConfig,
}

impl<R> Clone for VisualComparator<R> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            codec: self.codec,
            sink: Arc::clone(&self.sink),
            config: self.config,
        }
    }
}

impl<R: fmt::Debug> fmt::Debug for VisualComparator<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VisualComparator")
            .field("repository", &self.repository)
            .field("codec", &self.codec)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl VisualComparator {
    /// File-system comparator from project settings
    #[must_use]
    pub fn from_config(config: &VisregConfig) -> Self {
        VisualComparator::new(FsBaselineRepository::from_config(config))
            .with_config(config.comparison)
    }
}

impl<R: BaselineRepository> VisualComparator<R> {
    /// Create a comparator with PNG codec, no report sink and default thresholds
    #[must_use]
    pub fn new(repository: R) -> Self {
        Self::with_shared_repository(Arc::new(repository))
    }

    /// As [`Self::new`], sharing an existing repository
    #[must_use]
    pub fn with_shared_repository(repository: Arc<R>) -> Self {
        Self {
            repository,
            codec: PngCodec,
            sink: Arc::new(NullReportSink),
            config: ComparisonConfig::default(),
        }
    }

    /// Forward diff images to `sink`
    #[must_use]
    pub fn with_report_sink(mut self, sink: Arc<dyn ReportSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Replace both thresholds
    #[must_use]
    pub fn with_config(mut self, config: ComparisonConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the per-pixel tolerance
    ///
    /// # Errors
    ///
    /// Returns a configuration error if `value` is outside `[0, 1]`.
    pub fn with_pixel_tolerance(mut self, value: f64) -> VisregResult<Self> {
        self.config = self.config.with_pixel_tolerance(value)?;
        Ok(self)
    }

    /// Set the whole-image diff threshold
    ///
    /// # Errors
    ///
    /// Returns a configuration error if `value` is outside `[0, 1]`.
    pub fn with_diff_threshold(mut self, value: f64) -> VisregResult<Self> {
        self.config = self.config.with_diff_threshold(value)?;
        Ok(self)
    }

    /// Current thresholds
    #[must_use]
    pub fn config(&self) -> &ComparisonConfig {
        &self.config
    }

    /// Underlying repository
    #[must_use]
    pub fn repository(&self) -> &R {
        &self.repository
    }

    /// Compare a capture against the baseline stored under `name`
    ///
    /// The capture is always stored as the latest actual. If no baseline
    /// exists the capture becomes the baseline and the result passes. A
    /// visual mismatch is reported in the result, never as an error.
    ///
    /// # Errors
    ///
    /// Returns a decode error if either image cannot be decoded, an encode
    /// error if the diff image cannot be encoded, or an I/O error from the
    /// repository.
    pub fn compare(&self, name: &str, actual: &[u8]) -> VisregResult<ComparisonResult> {
        let actual_path = self.repository.save_actual(name, actual)?;
        // Decoded up front so an unreadable capture never becomes a baseline.
        let actual_pixels = self.codec.decode(actual)?;
        let baseline_path = self.repository.baseline_location(name)?;

        if self.repository.save_if_absent(name, actual)? {
            info!(name, baseline = %baseline_path, "no baseline found, capture stored as baseline");
            return Ok(ComparisonResult {
                baseline_name: name.to_string(),
                passed: true,
                diff_percent: 0.0,
                diff_pixel_count: 0,
                total_pixels: actual_pixels.pixel_count(),
                message: BASELINE_CREATED.to_string(),
                outcome: Outcome::BaselineCreated,
                baseline_path: Some(baseline_path),
                actual_path: Some(actual_path),
                diff_path: None,
            });
        }

        let baseline_pixels = self.codec.decode(&self.repository.load(name)?)?;
        let comparison = PixelComparator::new(self.config.pixel_tolerance)
            .compare(&baseline_pixels, &actual_pixels);

        let diff_path = match comparison {
            PixelComparison::Compared(PixelDiff {
                diff_image: Some(ref image),
                ..
            }) => Some(self.store_diff(name, &self.codec.encode(image)?)?),
            _ => None,
        };
        let result = ComparisonResult {
            baseline_path: Some(baseline_path),
            actual_path: Some(actual_path),
            diff_path,
            ..ComparisonResult::from_comparison(name, &comparison, &self.config)
        };

        if result.passed {
            debug!(name, diff_percent = result.diff_percent, "visual comparison passed");
        } else {
            warn!(
                name,
                diff_percent = result.diff_percent,
                threshold = self.config.threshold_percent(),
                message = %result.message,
                "visual comparison failed"
            );
        }
        Ok(result)
    }

    /// Persist a diff image and attach it to the report
    fn store_diff(&self, name: &str, encoded: &[u8]) -> VisregResult<String> {
        let path = self.repository.save_diff(name, encoded)?;
        let label = format!("{name} - Diff");
        if let Err(e) = self.sink.attach(
            &label,
            self.codec.mime_type(),
            encoded,
            self.codec.extension(),
        ) {
            warn!(name, error = %e, "could not attach diff image to report");
        }
        Ok(path)
    }

    /// Compare a capture of a single bounded element
    ///
    /// # Errors
    ///
    /// As [`Self::compare`].
    pub fn compare_element_region(
        &self,
        name: &str,
        region: &[u8],
    ) -> VisregResult<ComparisonResult> {
        debug!(name, bytes = region.len(), "comparing element region");
        self.compare(name, region)
    }

    /// Capture `target` with `provider` and compare it
    ///
    /// # Errors
    ///
    /// Returns the provider's error, otherwise as [`Self::compare`].
    pub fn compare_capture<P: ScreenCapture + ?Sized>(
        &self,
        name: &str,
        provider: &P,
        target: CaptureTarget,
    ) -> VisregResult<ComparisonResult> {
        debug!(name, capture = %target, "capturing");
        let bytes = provider.capture(&target)?;
        self.compare(name, &bytes)
    }

    /// Compare every entry; one entry's error does not stop the others
    pub fn compare_batch<I, K, V>(&self, entries: I) -> Vec<(String, VisregResult<ComparisonResult>)>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<[u8]>,
    {
        entries
            .into_iter()
            .map(|(name, bytes)| {
                let name = name.as_ref().to_string();
                let result = self.compare(&name, bytes.as_ref());
                (name, result)
            })
            .collect()
    }

    /// Write or overwrite the baseline for `name`
    ///
    /// # Errors
    ///
    /// Returns a repository error.
    pub fn save_baseline(&self, name: &str, bytes: &[u8]) -> VisregResult<()> {
        self.repository.save(name, bytes)
    }

    /// Read the baseline for `name`
    ///
    /// # Errors
    ///
    /// Returns [`crate::VisregError::NotFound`] if there is none.
    pub fn load_baseline(&self, name: &str) -> VisregResult<Vec<u8>> {
        self.repository.load(name)
    }

    /// Whether a baseline exists for `name`
    ///
    /// # Errors
    ///
    /// Returns a configuration error on a name-key collision.
    pub fn baseline_exists(&self, name: &str) -> VisregResult<bool> {
        self.repository.exists(name)
    }

    /// Approve `bytes` as the new baseline for `name`
    ///
    /// # Errors
    ///
    /// Returns a decode error if `bytes` is not an image, or a repository error.
    pub fn update_baseline(&self, name: &str, bytes: &[u8]) -> VisregResult<()> {
        self.codec.decode(bytes)?;
        self.repository.update(name, bytes)
    }

    /// Remove actual and diff artifacts, keeping baselines
    ///
    /// # Errors
    ///
    /// Returns a repository error.
    pub fn clear_artifacts(&self) -> VisregResult<()> {
        self.repository.clear_artifacts()
    }
}
