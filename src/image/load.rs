//! Image loading utilities.

use std::path::Path;

use image::{imageops::FilterType, RgbImage};

use crate::error::{Error, Result};

/// Load an image from disk as 8-bit RGB, resized to `size x size`.
///
/// Downscaling uses a triangle filter, which averages over the source
/// footprint much like area interpolation.
///
/// # Errors
///
/// Returns an error if the image cannot be loaded or decoded.
pub fn load_image<P: AsRef<Path>>(path: P, size: u32) -> Result<RgbImage> {
    let path = path.as_ref();

    let img = image::open(path).map_err(|source| Error::ImageLoad {
        path: path.to_path_buf(),
        source,
    })?;

    Ok(img.resize_exact(size, size, FilterType::Triangle).to_rgb8())
}
