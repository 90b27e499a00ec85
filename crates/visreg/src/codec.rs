//! Raster codec seam between encoded bytes and [`PixelBuffer`].
//!
//! The comparator only ever sees pixel buffers; everything format-specific
//! lives behind [`ImageCodec`].

use crate::pixel::{Channels, PixelBuffer};
use crate::result::{VisregError, VisregResult};
use image::{ExtendedColorType, ImageEncoder};

/// Decode and encode raster images
pub trait ImageCodec: Send + Sync {
    /// Decode encoded bytes into a pixel buffer
    ///
    /// # Errors
    ///
    /// Returns [`VisregError::Decode`] if the bytes are not a decodable image.
    fn decode(&self, bytes: &[u8]) -> VisregResult<PixelBuffer>;

    /// Encode a pixel buffer
    ///
    /// # Errors
    ///
    /// Returns [`VisregError::Encode`] if encoding fails.
    fn encode(&self, buffer: &PixelBuffer) -> VisregResult<Vec<u8>>;

    /// MIME type of encoded output
    fn mime_type(&self) -> &'static str;

    /// File extension of encoded output, without the dot
    fn extension(&self) -> &'static str;
}

/// PNG codec backed by the `image` crate
///
/// Decoding accepts any format the enabled `image` features understand;
/// encoding always produces PNG.
#[derive(Debug, Clone, Copy, Default)]
pub struct PngCodec;

impl ImageCodec for PngCodec {
    fn decode(&self, bytes: &[u8]) -> VisregResult<PixelBuffer> {
        let img =
            image::load_from_memory(bytes).map_err(|e| VisregError::decode(e.to_string()))?;

        let (width, height) = (img.width(), img.height());
        if img.color().has_alpha() {
            PixelBuffer::from_raw(width, height, Channels::Rgba, img.to_rgba8().into_raw())
        } else {
            PixelBuffer::from_raw(width, height, Channels::Rgb, img.to_rgb8().into_raw())
        }
    }

    fn encode(&self, buffer: &PixelBuffer) -> VisregResult<Vec<u8>> {
        let color_type = match buffer.channels() {
            Channels::Rgb => ExtendedColorType::Rgb8,
            Channels::Rgba => ExtendedColorType::Rgba8,
        };

        let mut out = Vec::new();
        let encoder = image::codecs::png::PngEncoder::new(&mut out);
        encoder
            .write_image(buffer.as_raw(), buffer.width(), buffer.height(), color_type)
            .map_err(|e| VisregError::Encode {
                message: e.to_string(),
            })?;
        Ok(out)
    }

    fn mime_type(&self) -> &'static str {
        "image/png"
    }

    fn extension(&self) -> &'static str {
        "png"
    }
}
