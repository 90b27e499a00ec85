//! Per-pixel tolerance comparison and diff image synthesis.

use crate::pixel::{PixelBuffer, Rgba};

/// Outcome of comparing two pixel buffers
#[derive(Debug, Clone, PartialEq)]
pub enum PixelComparison {
    /// Sizes differ; no pixels were compared
    DimensionMismatch {
        /// Baseline `(width, height)`
        baseline: (u32, u32),
        /// Actual `(width, height)`
        actual: (u32, u32),
    },
    /// Every pixel was compared
    Compared(PixelDiff),
}

/// Counts and diff image of a same-size comparison
#[derive(Debug, Clone, PartialEq)]
pub struct PixelDiff {
    /// Pixels whose R, G or B delta exceeded the tolerance
    pub diff_pixel_count: u64,
    /// Pixels compared
    pub total_pixels: u64,
    /// Largest channel delta seen anywhere
    pub max_channel_delta: u8,
    /// Red-on-grayscale visualization, present only when `diff_pixel_count > 0`
    pub diff_image: Option<PixelBuffer>,
}

impl PixelDiff {
    /// `100 * diff_pixel_count / total_pixels`; `0` for an empty image
    #[must_use]
    pub fn diff_percent(&self) -> f64 {
        if self.total_pixels == 0 {
            0.0
        } else {
            self.diff_pixel_count as f64 / self.total_pixels as f64 * 100.0
        }
    }
}

impl PixelComparison {
    /// Difference percentage; a dimension mismatch counts as 100%
    #[must_use]
    pub fn diff_percent(&self) -> f64 {
        match self {
            Self::DimensionMismatch { .. } => 100.0,
            Self::Compared(diff) => diff.diff_percent(),
        }
    }

    /// Whether the two buffers had different sizes
    #[must_use]
    pub const fn is_dimension_mismatch(&self) -> bool {
        matches!(self, Self::DimensionMismatch { .. })
    }
}

/// Compares pixel buffers channel by channel
#[derive(Debug, Clone, Copy)]
pub struct PixelComparator {
    channel_tolerance: f64,
}

impl PixelComparator {
    /// Create a comparator; `pixel_tolerance` is a fraction of 255
    #[must_use]
    pub fn new(pixel_tolerance: f64) -> Self {
        Self {
            channel_tolerance: pixel_tolerance * 255.0,
        }
    }

    /// Whether two pixels match: every RGB delta `<= tolerance * 255`
    #[must_use]
    pub fn matches(&self, baseline: Rgba, actual: Rgba) -> bool {
        self.within_tolerance(baseline.max_channel_delta(actual))
    }

    fn within_tolerance(&self, max_channel_delta: u8) -> bool {
        f64::from(max_channel_delta) <= self.channel_tolerance
    }

    /// Compare `actual` against `baseline`
    ///
    /// Mismatched pixels are painted opaque red in the diff image; matching
    /// pixels are painted as the gray luminance of the actual pixel.
    #[must_use]
    pub fn compare(&self, baseline: &PixelBuffer, actual: &PixelBuffer) -> PixelComparison {
        if baseline.dimensions() != actual.dimensions() {
            return PixelComparison::DimensionMismatch {
                baseline: baseline.dimensions(),
                actual: actual.dimensions(),
            };
        }

        let (width, height) = actual.dimensions();
        let mut diff_image = PixelBuffer::filled(width, height, Rgba::gray(0));
        let mut diff_pixel_count = 0u64;
        let mut max_channel_delta = 0u8;

        for y in 0..height {
            for x in 0..width {
                let expected = baseline.pixel(x, y);
                let got = actual.pixel(x, y);
                let delta = expected.max_channel_delta(got);
                max_channel_delta = max_channel_delta.max(delta);

                if self.within_tolerance(delta) {
                    diff_image.set_pixel(x, y, Rgba::gray(got.luminance()));
                } else {
                    diff_pixel_count += 1;
                    diff_image.set_pixel(x, y, Rgba::RED);
                }
            }
        }

        PixelComparison::Compared(PixelDiff {
            diff_pixel_count,
            total_pixels: actual.pixel_count(),
            max_channel_delta,
            diff_image: (diff_pixel_count > 0).then_some(diff_image),
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn black(w: u32, h: u32) -> PixelBuffer {
        PixelBuffer::filled(w, h, Rgba::opaque(0, 0, 0))
    }

    fn compared(result: PixelComparison) -> PixelDiff {
        match result {
            PixelComparison::Compared(diff) => diff,
            other => panic!("expected Compared, got {other:?}"),
        }
    }

    #[test]
    fn test_identical_has_no_diff_image() {
        let diff = compared(PixelComparator::new(0.1).compare(&black(2, 2), &black(2, 2)));
        assert_eq!(diff.diff_pixel_count, 0);
        assert_eq!(diff.total_pixels, 4);
        assert_eq!(diff.diff_percent(), 0.0);
        assert!(diff.diff_image.is_none());
    }

    #[test]
    fn test_single_white_pixel() {
        let mut actual = black(2, 2);
        actual.set_pixel(1, 0, Rgba::opaque(255, 255, 255));

        let diff = compared(PixelComparator::new(0.1).compare(&black(2, 2), &actual));
        assert_eq!(diff.diff_pixel_count, 1);
        assert_eq!(diff.diff_percent(), 25.0);
        assert_eq!(diff.max_channel_delta, 255);

        let image = diff.diff_image.unwrap();
        assert_eq!(image.pixel(1, 0), Rgba::RED);
        assert_eq!(image.pixel(0, 0), Rgba::gray(0));
        assert_eq!(image.pixel(0, 1), Rgba::gray(0));
        assert_eq!(image.pixel(1, 1), Rgba::gray(0));
    }

    #[test]
    fn test_matching_pixels_use_actual_luminance() {
        let baseline = PixelBuffer::from_fn(2, 1, |x, _| {
            if x == 0 {
                Rgba::opaque(200, 100, 50)
            } else {
                Rgba::opaque(0, 0, 0)
            }
        });
        let mut actual = baseline.clone();
        actual.set_pixel(0, 0, Rgba::opaque(205, 100, 50));
        actual.set_pixel(1, 0, Rgba::opaque(0, 0, 255));

        let image = compared(PixelComparator::new(0.1).compare(&baseline, &actual))
            .diff_image
            .unwrap();
        // 0.299*205 + 0.587*100 + 0.114*50 = 125.695
        assert_eq!(image.pixel(0, 0), Rgba::gray(125));
        assert_eq!(image.pixel(1, 0), Rgba::RED);
    }

    #[test]
    fn test_tolerance_boundary_inclusive() {
        // 0.2 * 255 = 51
        let comparator = PixelComparator::new(0.2);
        let base = Rgba::opaque(100, 100, 100);
        assert!(comparator.matches(base, Rgba::opaque(151, 100, 100)));
        assert!(comparator.matches(base, Rgba::opaque(100, 49, 100)));
        assert!(!comparator.matches(base, Rgba::opaque(152, 100, 100)));
        assert!(!comparator.matches(base, Rgba::opaque(100, 100, 48)));
    }

    #[test]
    fn test_zero_tolerance_is_exact() {
        let comparator = PixelComparator::new(0.0);
        assert!(comparator.matches(Rgba::opaque(1, 2, 3), Rgba::opaque(1, 2, 3)));
        assert!(!comparator.matches(Rgba::opaque(1, 2, 3), Rgba::opaque(1, 2, 4)));
    }

    #[test]
    fn test_alpha_ignored() {
        let comparator = PixelComparator::new(0.0);
        assert!(comparator.matches(Rgba([9, 9, 9, 0]), Rgba([9, 9, 9, 255])));
    }

    #[test]
    fn test_dimension_mismatch() {
        let result = PixelComparator::new(1.0).compare(&black(10, 10), &black(12, 10));
        assert_eq!(
            result,
            PixelComparison::DimensionMismatch {
                baseline: (10, 10),
                actual: (12, 10),
            }
        );
        assert!(result.is_dimension_mismatch());
        assert_eq!(result.diff_percent(), 100.0);
    }

    #[test]
    fn test_empty_image() {
        let diff = compared(PixelComparator::new(0.1).compare(&black(0, 0), &black(0, 0)));
        assert_eq!(diff.total_pixels, 0);
        assert_eq!(diff.diff_percent(), 0.0);
    }

    proptest! {
        #[test]
        fn prop_diff_count_agrees_with_matches(
            width in 1u32..8,
            height in 1u32..8,
            shift in 0u8..=255,
            tolerance in 0.0f64..=1.0
        ) {
            let base = PixelBuffer::from_fn(width, height, |x, y| Rgba::opaque(x as u8 * 30, y as u8 * 30, 7));
            let actual = PixelBuffer::from_fn(width, height, |x, y| {
                Rgba::opaque(x as u8 * 30, (y as u8 * 30).wrapping_add(shift ^ x as u8), 7)
            });
            let comparator = PixelComparator::new(tolerance);
            let expected = (0..height)
                .flat_map(|y| (0..width).map(move |x| (x, y)))
                .filter(|&(x, y)| !comparator.matches(base.pixel(x, y), actual.pixel(x, y)))
                .count() as u64;
            let diff = compared(comparator.compare(&base, &actual));
            prop_assert_eq!(diff.diff_pixel_count, expected);
        }

        #[test]
        fn prop_self_comparison_is_identity(
            width in 1u32..16,
            height in 1u32..16,
            seed in 0u8..=255
        ) {
            let img = PixelBuffer::from_fn(width, height, |x, y| {
                Rgba::opaque(seed.wrapping_add(x as u8), seed ^ y as u8, (x * y) as u8)
            });
            let diff = compared(PixelComparator::new(0.0).compare(&img, &img));
            prop_assert_eq!(diff.diff_pixel_count, 0);
            prop_assert!(diff.diff_image.is_none());
        }

        #[test]
        fn prop_count_bounded_by_total(
            width in 1u32..12,
            height in 1u32..12,
            shift in 0u8..=255,
            tolerance in 0.0f64..=1.0
        ) {
            let base = PixelBuffer::from_fn(width, height, |x, y| Rgba::opaque(x as u8 * 20, y as u8 * 20, 0));
            let actual = PixelBuffer::from_fn(width, height, |x, y| {
                Rgba::opaque((x as u8 * 20).wrapping_add(shift), y as u8 * 20, 0)
            });
            let diff = compared(PixelComparator::new(tolerance).compare(&base, &actual));
            prop_assert!(diff.diff_pixel_count <= diff.total_pixels);
            prop_assert!((0.0..=100.0).contains(&diff.diff_percent()));
            prop_assert_eq!(diff.diff_image.is_some(), diff.diff_pixel_count > 0);
        }

        #[test]
        fn prop_looser_tolerance_never_adds_diffs(
            delta in 0u8..=255,
            low in 0.0f64..=1.0,
            extra in 0.0f64..=1.0
        ) {
            let high = (low + extra).min(1.0);
            let base = Rgba::opaque(0, 0, 0);
            let actual = Rgba::opaque(delta, 0, 0);
            if PixelComparator::new(low).matches(base, actual) {
                prop_assert!(PixelComparator::new(high).matches(base, actual));
            }
        }
    }
}
