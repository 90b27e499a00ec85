//! visreg: visual regression comparison engine
//!
//! Decides whether a fresh screen capture still matches an approved
//! baseline image, within a per-channel tolerance and a whole-image diff
//! threshold, and leaves behind the artifacts a human needs to triage a
//! failure (baseline, actual and a red-on-gray diff image).
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐  bytes  ┌──────────────────┐       ┌────────────────────┐
//! │ ScreenCapture│────────►│ VisualComparator │──────►│ BaselineRepository │
//! └──────────────┘         │  (orchestrator)  │◄──────│  baseline/actual/  │
//!                          └────────┬─────────┘       │  diff roots        │
//!                     ImageCodec    │                 └────────────────────┘
//!                   ┌───────────────▼───┐
//!                   │ PixelComparator   │──► ComparisonResult ──► assert_match
//!                   └───────────────────┘          │              assert_all_match
//!                                                  └──► ReportSink ("<name> - Diff")
//! ```
//!
//! # Example
//!
//! ```no_run
//! use visreg::{VisregConfig, VisualComparator};
//!
//! # fn main() -> visreg::VisregResult<()> {
//! let comparator = VisualComparator::from_config(&VisregConfig::default())
//!     .with_diff_threshold(0.005)?;
//! let capture = std::fs::read("checkout.png")?;
//! comparator.assert_match("checkout-summary", &capture)?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod assertion;
mod capture;
mod codec;
mod comparator;
mod config;
mod naming;
mod orchestrator;
mod pixel;
mod report;
mod repository;
mod result;

pub use capture::{CaptureTarget, Region, ScreenCapture};
pub use codec::{ImageCodec, PngCodec};
pub use comparator::{PixelComparator, PixelComparison, PixelDiff};
pub use config::{
    ComparisonConfig, VisregConfig, DEFAULT_DIFF_THRESHOLD, DEFAULT_PIXEL_TOLERANCE,
};
pub use naming::sanitize_name;
pub use orchestrator::{ComparisonResult, Outcome, VisualComparator, BASELINE_CREATED};
pub use pixel::{Channels, PixelBuffer, Rgba};
pub use report::{
    Attachment, ComparisonSummary, DirectoryReportSink, MemoryReportSink, NullReportSink,
    ReportSink,
};
pub use repository::{BaselineRepository, FsBaselineRepository, MemoryBaselineRepository};
pub use result::{BatchFailure, VisregError, VisregResult};

/// Prelude for convenient imports
pub mod prelude {
    pub use super::capture::*;
    pub use super::codec::*;
    pub use super::comparator::*;
    pub use super::config::*;
    pub use super::orchestrator::*;
    pub use super::pixel::*;
    pub use super::report::*;
    pub use super::repository::*;
    pub use super::result::*;
}
