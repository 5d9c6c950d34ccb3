//! Hard two-level thresholding of rendered screenshots.
//!
//! Each RGB channel is cut at 128 and a pixel only counts as ink when all
//! three channels land on the dark side. This is deliberately brittle: it
//! works for high-contrast rendered text on a light background and nothing
//! else. Anti-aliased edges simply fall to one side.

use image::{DynamicImage, RgbImage};
use std::path::Path;
use thiserror::Error;

use crate::grid::{Pixel, PixelGrid};

/// Channel values strictly above this are treated as light.
pub const CHANNEL_THRESHOLD: u8 = 128;

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("Failed to load image: {0}")]
    Load(#[from] image::ImageError),
}

/// Open an image file and binarize it.
pub fn load_grid(path: &Path) -> Result<PixelGrid, DecodeError> {
    let img = image::open(path)?;
    Ok(binarize(&img))
}

/// Decode raw image bytes (PNG / JPEG / …) and binarize them.
pub fn grid_from_bytes(data: &[u8]) -> Result<PixelGrid, DecodeError> {
    let img = image::load_from_memory(data)?;
    Ok(binarize(&img))
}

pub fn binarize(img: &DynamicImage) -> PixelGrid {
    binarize_rgb(&img.to_rgb8())
}

pub fn binarize_rgb(rgb: &RgbImage) -> PixelGrid {
    PixelGrid::from_fn(rgb.height() as usize, rgb.width() as usize, |row, col| {
        let p = rgb.get_pixel(col as u32, row as u32);
        classify(p[0], p[1], p[2])
    })
}

fn classify(r: u8, g: u8, b: u8) -> Pixel {
    let level = |v: u8| -> u32 { if v > CHANNEL_THRESHOLD { 255 } else { 0 } };
    if level(r) + level(g) + level(b) == 0 {
        Pixel::Ink
    } else {
        Pixel::Background
    }
}
