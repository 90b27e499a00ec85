//! In-memory decoded image representation.

use crate::result::{VisregError, VisregResult};

/// Channel layout of a [`PixelBuffer`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channels {
    /// 3 bytes per pixel
    Rgb,
    /// 4 bytes per pixel
    Rgba,
}

impl Channels {
    /// Bytes per pixel
    #[must_use]
    pub const fn count(self) -> usize {
        match self {
            Self::Rgb => 3,
            Self::Rgba => 4,
        }
    }
}

/// An 8-bit RGBA color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgba(pub [u8; 4]);

impl Rgba {
    /// Opaque red, used to highlight mismatches
    pub const RED: Self = Self([255, 0, 0, 255]);

    /// Opaque color from RGB components
    #[must_use]
    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self([r, g, b, 255])
    }

    /// Opaque gray of the given level
    #[must_use]
    pub const fn gray(level: u8) -> Self {
        Self([level, level, level, 255])
    }

    /// ITU-R BT.601 luma (`0.299R + 0.587G + 0.114B`), truncated
    #[must_use]
    pub fn luminance(self) -> u8 {
        let [r, g, b, _] = self.0;
        // Fixed-point weights keep white at exactly 255.
        let luma = 299 * u32::from(r) + 587 * u32::from(g) + 114 * u32::from(b);
        (luma / 1000) as u8
    }

    /// Largest absolute difference across R, G and B; alpha is ignored
    #[must_use]
    pub fn max_channel_delta(self, other: Self) -> u8 {
        let [r1, g1, b1, _] = self.0;
        let [r2, g2, b2, _] = other.0;
        r1.abs_diff(r2).max(g1.abs_diff(g2)).max(b1.abs_diff(b2))
    }
}

/// Decoded image: dimensions plus row-major 8-bit pixels
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    channels: Channels,
    data: Vec<u8>,
}

impl PixelBuffer {
    /// Wrap raw row-major pixel data
    ///
    /// # Errors
    ///
    /// Returns [`VisregError::InvalidBuffer`] if `data` does not hold exactly
    /// `width * height` pixels of the given layout.
    pub fn from_raw(
        width: u32,
        height: u32,
        channels: Channels,
        data: Vec<u8>,
    ) -> VisregResult<Self> {
        let expected = width as usize * height as usize * channels.count();
        if data.len() != expected {
            return Err(VisregError::InvalidBuffer {
                message: format!(
                    "{width}x{height} {channels:?} needs {expected} bytes, got {}",
                    data.len()
                ),
            });
        }
        Ok(Self {
            width,
            height,
            channels,
            data,
        })
    }

    /// Solid RGBA image
    #[must_use]
    pub fn filled(width: u32, height: u32, color: Rgba) -> Self {
        let count = width as usize * height as usize;
        let data = color.0.repeat(count);
        Self {
            width,
            height,
            channels: Channels::Rgba,
            data,
        }
    }

    /// Build an RGBA image by evaluating `f` at every coordinate
    #[must_use]
    pub fn from_fn(width: u32, height: u32, mut f: impl FnMut(u32, u32) -> Rgba) -> Self {
        let mut data = Vec::with_capacity(width as usize * height as usize * 4);
        for y in 0..height {
            for x in 0..width {
                data.extend_from_slice(&f(x, y).0);
            }
        }
        Self {
            width,
            height,
            channels: Channels::Rgba,
            data,
        }
    }

    /// Image width in pixels
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Image height in pixels
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// `(width, height)`
    #[must_use]
    pub const fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Channel layout
    #[must_use]
    pub const fn channels(&self) -> Channels {
        self.channels
    }

    /// Number of pixels
    #[must_use]
    pub const fn pixel_count(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    /// Raw row-major bytes
    #[must_use]
    pub fn as_raw(&self) -> &[u8] {
        &self.data
    }

    /// Pixel at `(x, y)`; RGB pixels report alpha 255
    ///
    /// # Panics
    ///
    /// Panics if the coordinate is out of bounds.
    #[must_use]
    pub fn pixel(&self, x: u32, y: u32) -> Rgba {
        assert!(
            x < self.width && y < self.height,
            "pixel ({x}, {y}) outside {}x{}",
            self.width,
            self.height
        );
        let n = self.channels.count();
        let offset = (y as usize * self.width as usize + x as usize) * n;
        let px = &self.data[offset..offset + n];
        match self.channels {
            Channels::Rgb => Rgba([px[0], px[1], px[2], 255]),
            Channels::Rgba => Rgba([px[0], px[1], px[2], px[3]]),
        }
    }

    /// Overwrite the pixel at `(x, y)`; alpha is dropped for RGB buffers
    ///
    /// # Panics
    ///
    /// Panics if the coordinate is out of bounds.
    pub fn set_pixel(&mut self, x: u32, y: u32, color: Rgba) {
        assert!(
            x < self.width && y < self.height,
            "pixel ({x}, {y}) outside {}x{}",
            self.width,
            self.height
        );
        let n = self.channels.count();
        let offset = (y as usize * self.width as usize + x as usize) * n;
        self.data[offset..offset + n].copy_from_slice(&color.0[..n]);
    }

    /// Iterate pixels in row-major order
    pub fn pixels(&self) -> impl Iterator<Item = Rgba> + '_ {
        let channels = self.channels;
        self.data
            .chunks_exact(channels.count())
            .map(move |px| match channels {
                Channels::Rgb => Rgba([px[0], px[1], px[2], 255]),
                Channels::Rgba => Rgba([px[0], px[1], px[2], px[3]]),
            })
    }
}
