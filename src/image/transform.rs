//! Conversion between 8-bit images and network-ready tensors.

use image::RgbImage;
use ndarray::{Array3, ArrayView3, Axis};

/// Per-channel mean of the ImageNet training set.
pub const IMAGENET_MEAN: [f32; 3] = [0.485, 0.456, 0.406];

/// Per-channel standard deviation of the ImageNet training set.
pub const IMAGENET_STD: [f32; 3] = [0.229, 0.224, 0.225];

/// Image to tensor conversion, optionally with ImageNet normalization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageTransform {
    pub normalize: bool,
}

impl Default for ImageTransform {
    fn default() -> Self {
        Self { normalize: true }
    }
}

impl ImageTransform {
    /// Convert an RGB image to a `(3, H, W)` tensor.
    ///
    /// Pixels are scaled to `[0, 1]` and, when `normalize` is set, shifted
    /// and scaled per channel by [`IMAGENET_MEAN`] and [`IMAGENET_STD`].
    #[must_use]
    pub fn transform(&self, image: &RgbImage) -> Array3<f32> {
        let (width, height) = image.dimensions();
        let mut tensor = Array3::<f32>::zeros((3, height as usize, width as usize));

        for (x, y, pixel) in image.enumerate_pixels() {
            let (x, y) = (x as usize, y as usize);
            for c in 0..3 {
                let value = f32::from(pixel[c]) / 255.0;
                tensor[[c, y, x]] = if self.normalize {
                    (value - IMAGENET_MEAN[c]) / IMAGENET_STD[c]
                } else {
                    value
                };
            }
        }

        tensor
    }

    /// Convert a tensor back to `[0, 255]` values.
    ///
    /// A 3-channel `(C, H, W)` tensor is moved to `(H, W, C)` first; any
    /// other layout is only rescaled. Normalization is not undone.
    #[must_use]
    pub fn detransform(&self, tensor: &ArrayView3<'_, f32>) -> Array3<f32> {
        let scaled = tensor.mapv(|v| v * 255.0);
        if scaled.len_of(Axis(0)) == 3 {
            scaled.permuted_axes([1, 2, 0]).as_standard_layout().into_owned()
        } else {
            scaled
        }
    }
}
