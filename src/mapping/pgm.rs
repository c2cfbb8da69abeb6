//! Binary PGM (`P5`) raster loading
//!
//! Decoding is done by the `image` crate's PNM decoder, which scales every
//! sample to the full 16-bit range whatever the header's max intensity.
//! Only `P5` input is accepted.

use image::imageops::{self, FilterType};
use image::{ImageBuffer, ImageFormat, Luma};
use nalgebra as na;

use crate::common::{SandboxError, SandboxResult};

type Gray16 = ImageBuffer<Luma<u16>, Vec<u16>>;

/// Decoded single-channel raster
#[derive(Debug, Clone)]
pub struct GrayRaster {
    pixels: Gray16,
}

impl GrayRaster {
    pub fn new(pixels: Gray16) -> Self {
        Self { pixels }
    }

    pub fn width(&self) -> usize {
        self.pixels.width() as usize
    }

    pub fn height(&self) -> usize {
        self.pixels.height() as usize
    }

    /// Intensity at (row, col), scaled to `0..=u16::MAX`
    pub fn pixel(&self, row: usize, col: usize) -> u16 {
        self.pixels.get_pixel(col as u32, row as u32)[0]
    }

    fn is_dark(value: u16) -> bool {
        (value as f64) < u16::MAX as f64 / 2.0
    }

    /// Occupancy in [0, 1] at raster resolution: pixels darker than half the
    /// max intensity are obstacles.
    pub fn occupancy(&self) -> na::DMatrix<f64> {
        na::DMatrix::from_fn(self.height(), self.width(), |r, c| {
            if Self::is_dark(self.pixel(r, c)) {
                1.0
            } else {
                0.0
            }
        })
    }

    /// Binary occupancy resampled (nearest neighbour) to `rows` x `cols`
    pub fn to_occupancy(&self, rows: usize, cols: usize) -> na::DMatrix<u8> {
        let resampled = imageops::resize(&self.pixels, cols as u32, rows as u32, FilterType::Nearest);
        na::DMatrix::from_fn(rows, cols, |r, c| {
            let value = resampled.get_pixel(c as u32, r as u32)[0];
            if Self::is_dark(value) {
                1u8
            } else {
                0u8
            }
        })
    }
}

/// Decode a binary PGM image
pub fn parse(bytes: &[u8]) -> SandboxResult<GrayRaster> {
    if !bytes.starts_with(b"P5") {
        return Err(SandboxError::MapFormat("expected a binary PGM (P5) raster".to_string()));
    }
    let pixels = image::load_from_memory_with_format(bytes, ImageFormat::Pnm)
        .map_err(|e| SandboxError::MapFormat(e.to_string()))?
        .into_luma16();
    if pixels.width() == 0 || pixels.height() == 0 {
        return Err(SandboxError::MapFormat(format!(
            "empty raster {}x{}",
            pixels.width(),
            pixels.height()
        )));
    }
    Ok(GrayRaster::new(pixels))
}
