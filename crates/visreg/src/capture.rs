//! Screen-capture provider interface.
//!
//! visreg never drives a browser; whatever does implements [`ScreenCapture`]
//! and hands back encoded image bytes.

use crate::result::VisregResult;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A rectangle in page coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Region {
    /// X coordinate of top-left corner
    pub x: u32,
    /// Y coordinate of top-left corner
    pub y: u32,
    /// Width of the region
    pub width: u32,
    /// Height of the region
    pub height: u32,
}

impl Region {
    /// Create a new region
    #[must_use]
    pub const fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}+{}+{}", self.width, self.height, self.x, self.y)
    }
}

/// What to capture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CaptureTarget {
    /// The whole scrollable page
    FullPage,
    /// The visible viewport
    Viewport,
    /// A bounded element
    Element(Region),
}

impl fmt::Display for CaptureTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FullPage => f.write_str("full-page"),
            Self::Viewport => f.write_str("viewport"),
            Self::Element(region) => write!(f, "element {region}"),
        }
    }
}

/// Supplies encoded screen captures
pub trait ScreenCapture {
    /// Capture the target as encoded image bytes (e.g. PNG)
    ///
    /// # Errors
    ///
    /// Returns [`crate::VisregError::Capture`] or an I/O error if the capture
    /// cannot be produced.
    fn capture(&self, target: &CaptureTarget) -> VisregResult<Vec<u8>>;
}

impl<F> ScreenCapture for F
where
    F: Fn(&CaptureTarget) -> VisregResult<Vec<u8>>,
{
    fn capture(&self, target: &CaptureTarget) -> VisregResult<Vec<u8>> {
        self(target)
    }
}
