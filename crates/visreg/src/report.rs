//! Report sinks for diff attachments, and run summaries.

use crate::naming::sanitize_name;
use crate::orchestrator::ComparisonResult;
use crate::result::VisregResult;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

/// Accepts named binary attachments for a human-readable test report
///
/// Attaching is fire-and-forget from the comparison's point of view: an
/// error here is logged and never fails the comparison.
pub trait ReportSink: Send + Sync {
    /// Attach `bytes` under `label`
    ///
    /// # Errors
    ///
    /// Implementation specific; the orchestrator only logs it.
    fn attach(
        &self,
        label: &str,
        mime_type: &str,
        bytes: &[u8],
        suggested_extension: &str,
    ) -> VisregResult<()>;
}

/// Discards every attachment
#[derive(Debug, Clone, Copy, Default)]
pub struct NullReportSink;

impl ReportSink for NullReportSink {
    fn attach(&self, _: &str, _: &str, _: &[u8], _: &str) -> VisregResult<()> {
        Ok(())
    }
}

/// An attachment captured by [`MemoryReportSink`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    /// Label, e.g. `"header - Diff"`
    pub label: String,
    /// MIME type
    pub mime_type: String,
    /// Payload
    pub bytes: Vec<u8>,
    /// Suggested file extension
    pub extension: String,
}

/// Keeps attachments in memory
#[derive(Debug, Default)]
pub struct MemoryReportSink {
    attachments: Mutex<Vec<Attachment>>,
}

impl MemoryReportSink {
    /// Create an empty sink
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything attached so far
    #[must_use]
    pub fn attachments(&self) -> Vec<Attachment> {
        self.attachments
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl ReportSink for MemoryReportSink {
    fn attach(
        &self,
        label: &str,
        mime_type: &str,
        bytes: &[u8],
        suggested_extension: &str,
    ) -> VisregResult<()> {
        self.attachments
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Attachment {
                label: label.to_string(),
                mime_type: mime_type.to_string(),
                bytes: bytes.to_vec(),
                extension: suggested_extension.to_string(),
            });
        Ok(())
    }
}

/// Writes each attachment to `<dir>/<sanitized label>.<ext>`
#[derive(Debug, Clone)]
pub struct DirectoryReportSink {
    dir: PathBuf,
}

impl DirectoryReportSink {
    /// Create a sink writing into `dir`
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl ReportSink for DirectoryReportSink {
    fn attach(
        &self,
        label: &str,
        _mime_type: &str,
        bytes: &[u8],
        suggested_extension: &str,
    ) -> VisregResult<()> {
        fs::create_dir_all(&self.dir)?;
        let path = self
            .dir
            .join(format!("{}.{suggested_extension}", sanitize_name(label)));
        fs::write(path, bytes)?;
        Ok(())
    }
}

/// Aggregate of a set of comparison results
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ComparisonSummary {
    /// Number of comparisons
    pub total: usize,
    /// Comparisons that passed
    pub passed: usize,
    /// Comparisons that failed
    pub failed: usize,
    /// Comparisons that created a new baseline
    pub baselines_created: usize,
    /// Every result, in evaluation order
    pub results: Vec<ComparisonResult>,
}

impl ComparisonSummary {
    /// Summarize `results`
    #[must_use]
    pub fn from_results(results: Vec<ComparisonResult>) -> Self {
        let passed = results.iter().filter(|r| r.passed).count();
        let baselines_created = results.iter().filter(|r| r.is_baseline_created()).count();
        Self {
            total: results.len(),
            passed,
            failed: results.len() - passed,
            baselines_created,
            results,
        }
    }

    /// Whether every comparison passed
    #[must_use]
    pub const fn all_passed(&self) -> bool {
        self.failed == 0
    }

    /// Pretty JSON
    ///
    /// # Errors
    ///
    /// Returns a JSON error if serialization fails.
    pub fn to_json(&self) -> VisregResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Write pretty JSON to `path`, creating parent directories
    ///
    /// # Errors
    ///
    /// Returns a JSON or I/O error.
    pub fn write_json(&self, path: impl AsRef<Path>) -> VisregResult<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, self.to_json()?)?;
        Ok(())
    }
}
