//! Image saving utilities.

use std::path::Path;

use image::{DynamicImage, GrayImage, ImageBuffer, Luma, Rgb, RgbImage};
use ndarray::{ArrayView2, ArrayView3};

use crate::error::{Error, Result};

use super::RGB_CHANNELS;

/// Save an `(H, W, 3)` array with values in `[0, 255]` as an image file.
///
/// The format is inferred from the extension; `quality` only applies to JPEG.
///
/// # Errors
///
/// Returns an error if the array is not RGB or the image cannot be saved.
pub fn save_image<P: AsRef<Path>>(hwc: &ArrayView3<'_, f32>, path: P, quality: u8) -> Result<()> {
    let img = hwc_to_image(hwc)?;
    write_image(&DynamicImage::ImageRgb8(img), path, quality)
}

/// Save an `(H, W)` mask with values in `[0, 1]` as a grayscale image.
///
/// # Errors
///
/// Returns an error if the image cannot be saved.
#[allow(clippy::cast_possible_truncation)]
pub fn save_mask<P: AsRef<Path>>(mask: &ArrayView2<'_, f32>, path: P) -> Result<()> {
    let (height, width) = mask.dim();
    // Safe: mask dimensions come from decoded images, which are u32-sized
    let img: GrayImage = ImageBuffer::from_fn(width as u32, height as u32, |x, y| {
        Luma([to_u8(mask[[y as usize, x as usize]] * 255.0)])
    });
    write_image(&DynamicImage::ImageLuma8(img), path, 100)
}

/// Convert an `(H, W, 3)` array with values in `[0, 255]` to an RGB image.
///
/// # Errors
///
/// Returns an error if the last axis is not 3 channels.
#[allow(clippy::cast_possible_truncation)]
pub fn hwc_to_image(hwc: &ArrayView3<'_, f32>) -> Result<RgbImage> {
    let (height, width, channels) = hwc.dim();
    if channels != RGB_CHANNELS {
        return Err(Error::shape(
            "(H, W, 3) image",
            format!("({height}, {width}, {channels}) image"),
        ));
    }

    // Safe: image dimensions are u32-sized
    Ok(ImageBuffer::from_fn(width as u32, height as u32, |x, y| {
        let (y, x) = (y as usize, x as usize);
        Rgb([
            to_u8(hwc[[y, x, 0]]),
            to_u8(hwc[[y, x, 1]]),
            to_u8(hwc[[y, x, 2]]),
        ])
    }))
}

/// Write an image, choosing the encoder from the file extension.
///
/// # Errors
///
/// Returns an error if the file cannot be written.
pub fn write_image<P: AsRef<Path>>(img: &DynamicImage, path: P, quality: u8) -> Result<()> {
    let path = path.as_ref();

    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("png")
        .to_lowercase();

    match extension.as_str() {
        "jpg" | "jpeg" => {
            let mut output = std::fs::File::create(path)?;
            let encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(&mut output, quality);
            img.to_rgb8()
                .write_with_encoder(encoder)
                .map_err(|source| Error::ImageSave {
                    path: path.to_path_buf(),
                    source,
                })?;
        }
        _ => {
            img.save(path).map_err(|source| Error::ImageSave {
                path: path.to_path_buf(),
                source,
            })?;
        }
    }

    tracing::debug!("wrote {}", path.display());

    Ok(())
}

/// Clamp a `[0, 255]` value into a byte.
#[inline]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn to_u8(value: f32) -> u8 {
    // Safe: clamped to [0, 255] range before casting
    value.clamp(0.0, 255.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{Array2, Array3};

    #[test]
    fn test_to_u8_clamp() {
        assert_eq!(to_u8(-3.0), 0);
        assert_eq!(to_u8(127.9), 127);
        assert_eq!(to_u8(300.0), 255);
    }

    #[test]
    fn test_hwc_to_image() {
        let hwc = Array3::from_shape_fn((2, 3, 3), |(y, x, c)| (y * 100 + x * 10 + c) as f32);
        let img = hwc_to_image(&hwc.view()).unwrap();
        assert_eq!(img.dimensions(), (3, 2));
        assert_eq!(img.get_pixel(2, 1), &Rgb([120, 121, 122]));
    }

    #[test]
    fn test_hwc_rejects_gray() {
        let hwc = Array3::<f32>::zeros((2, 2, 1));
        assert!(matches!(
            hwc_to_image(&hwc.view()),
            Err(Error::ShapeMismatch { .. })
        ));
    }

    #[test]
    fn test_save_png_and_jpeg() {
        let dir = tempfile::tempdir().unwrap();
        let hwc = Array3::<f32>::from_elem((8, 8, 3), 200.0);

        save_image(&hwc.view(), dir.path().join("a.png"), 90).unwrap();
        save_image(&hwc.view(), dir.path().join("a.jpg"), 90).unwrap();

        let png = image::open(dir.path().join("a.png")).unwrap().to_rgb8();
        assert_eq!(png.get_pixel(0, 0), &Rgb([200, 200, 200]));
        assert!(dir.path().join("a.jpg").exists());
    }

    #[test]
    fn test_save_mask() {
        let dir = tempfile::tempdir().unwrap();
        let mut mask = Array2::<f32>::zeros((4, 4));
        mask[[1, 2]] = 1.0;
        let path = dir.path().join("mask.png");

        save_mask(&mask.view(), &path).unwrap();

        let gray = image::open(&path).unwrap().to_luma8();
        assert_eq!(gray.get_pixel(2, 1), &Luma([255]));
        assert_eq!(gray.get_pixel(0, 0), &Luma([0]));
    }
}
