//! Lossless image I/O.
//!
//! Only PNG and BMP carriers are accepted: any lossy re-encoding destroys the
//! low bits the engine writes. Output is always PNG.

use crate::error::{Result, StegoError};
use crate::grid::PixelGrid;
use image::{DynamicImage, GrayImage, ImageFormat, RgbImage, RgbaImage};
use std::io::Cursor;
use std::path::Path;
use tracing::{debug, warn};

/// Largest carrier file accepted for decoding
pub const MAX_CARRIER_BYTES: usize = 5 * 1024 * 1024;

/// Converts between encoded image bytes and pixel grids
pub trait ImageCodec {
    fn decode(&self, bytes: &[u8]) -> Result<PixelGrid>;
    fn encode(&self, grid: &PixelGrid) -> Result<Vec<u8>>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct LosslessCodec;

impl ImageCodec for LosslessCodec {
    fn decode(&self, bytes: &[u8]) -> Result<PixelGrid> {
        if bytes.len() > MAX_CARRIER_BYTES {
            return Err(StegoError::UnsupportedFormat(format!(
                "carrier is {} bytes, limit is {}",
                bytes.len(),
                MAX_CARRIER_BYTES
            )));
        }

        let format = image::guess_format(bytes)
            .map_err(|_| StegoError::UnsupportedFormat("unrecognised image data".into()))?;
        if !matches!(format, ImageFormat::Png | ImageFormat::Bmp) {
            return Err(StegoError::UnsupportedFormat(format!(
                "{:?} is not a lossless carrier (use PNG or BMP)",
                format
            )));
        }

        let image = image::load_from_memory_with_format(bytes, format)
            .map_err(|e| StegoError::Image(e.to_string()))?;
        debug!(?format, width = image.width(), height = image.height(), "decoded carrier");

        let has_alpha = image.color().has_alpha();
        match (&image, has_alpha) {
            (DynamicImage::ImageRgb8(_), false) | (DynamicImage::ImageRgba8(_), true) => {}
            _ => warn!(color = ?image.color(), "converting carrier to 8-bit RGB"),
        }

        let (width, height) = (image.width() as usize, image.height() as usize);
        if has_alpha {
            PixelGrid::new(height, width, 4, image.into_rgba8().into_raw())
        } else {
            PixelGrid::new(height, width, 3, image.into_rgb8().into_raw())
        }
    }

    fn encode(&self, grid: &PixelGrid) -> Result<Vec<u8>> {
        let (width, height) = dimensions(grid.width(), grid.height())?;
        let samples = grid.samples().to_vec();
        let image = if grid.channels() == 4 {
            RgbaImage::from_raw(width, height, samples).map(DynamicImage::ImageRgba8)
        } else {
            RgbImage::from_raw(width, height, samples).map(DynamicImage::ImageRgb8)
        }
        .ok_or_else(|| StegoError::Image("sample buffer does not match dimensions".into()))?;

        write_png(&image)
    }
}

/// Read and decode a carrier file
pub fn read_image(path: &Path) -> Result<PixelGrid> {
    let bytes = std::fs::read(path)?;
    LosslessCodec.decode(&bytes)
}

/// Encode a grid as PNG and write it to `path`
pub fn write_image(path: &Path, grid: &PixelGrid) -> Result<()> {
    let bytes = LosslessCodec.encode(grid)?;
    std::fs::write(path, bytes)?;
    Ok(())
}

/// Encode single-channel samples as a greyscale PNG
pub fn encode_grey_png(height: usize, width: usize, samples: Vec<u8>) -> Result<Vec<u8>> {
    let (width, height) = dimensions(width, height)?;
    let image = GrayImage::from_raw(width, height, samples)
        .ok_or_else(|| StegoError::Image("sample buffer does not match dimensions".into()))?;
    write_png(&DynamicImage::ImageLuma8(image))
}

fn write_png(image: &DynamicImage) -> Result<Vec<u8>> {
    let mut out = Cursor::new(Vec::new());
    image
        .write_to(&mut out, ImageFormat::Png)
        .map_err(|e| StegoError::Image(e.to_string()))?;
    Ok(out.into_inner())
}

fn dimensions(width: usize, height: usize) -> Result<(u32, u32)> {
    let too_large = || StegoError::Image(format!("{}x{} exceeds image limits", width, height));
    let w = u32::try_from(width).map_err(|_| too_large())?;
    let h = u32::try_from(height).map_err(|_| too_large())?;
    Ok((w, h))
}
