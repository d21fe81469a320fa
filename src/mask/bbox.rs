//! Bounding box sampling and box-to-mask rasterization.

use std::ops::Range;

use ndarray::{s, Array4};
use rand::Rng;

use crate::error::{Error, Result};
use crate::tensor::Mask;

/// Rectangular region in pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BoundingBox {
    pub top: usize,
    pub left: usize,
    pub height: usize,
    pub width: usize,
}

impl BoundingBox {
    #[must_use]
    pub const fn new(top: usize, left: usize, height: usize, width: usize) -> Self {
        Self {
            top,
            left,
            height,
            width,
        }
    }

    /// Row span clamped to an image of `limit` rows.
    #[must_use]
    pub fn rows(&self, limit: usize) -> Range<usize> {
        clamp_span(self.top, self.top + self.height, limit)
    }

    /// Column span clamped to an image of `limit` columns.
    #[must_use]
    pub fn cols(&self, limit: usize) -> Range<usize> {
        clamp_span(self.left, self.left + self.width, limit)
    }
}

fn clamp_span(start: usize, end: usize, limit: usize) -> Range<usize> {
    let end = end.min(limit);
    start.min(end)..end
}

/// Geometry for random bounding box sampling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BboxConfig {
    /// Image size as (height, width).
    pub image: (usize, usize),

    /// Box size as (height, width).
    pub mask: (usize, usize),

    /// Minimum distance from the image border as (height, width).
    pub margin: (usize, usize),

    /// Share one box across the whole batch.
    pub batch_same: bool,
}

impl Default for BboxConfig {
    fn default() -> Self {
        Self {
            image: (256, 256),
            mask: (128, 128),
            margin: (0, 0),
            batch_same: true,
        }
    }
}

impl BboxConfig {
    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Range`] if a box of the configured size cannot be
    /// placed inside the margins.
    pub fn validate(&self) -> Result<()> {
        self.top_range()?;
        self.left_range()?;
        Ok(())
    }

    fn top_range(&self) -> Result<Range<usize>> {
        sample_range("top", self.image.0, self.mask.0, self.margin.0)
    }

    fn left_range(&self) -> Result<Range<usize>> {
        sample_range("left", self.image.1, self.mask.1, self.margin.1)
    }
}

fn sample_range(
    name: &'static str,
    image: usize,
    mask: usize,
    margin: usize,
) -> Result<Range<usize>> {
    let high = image.saturating_sub(margin + mask);
    if high <= margin {
        return Err(Error::Range {
            name,
            low: margin,
            high,
        });
    }
    Ok(margin..high)
}

/// Sample one bounding box per batch element.
///
/// Offsets are drawn uniformly from `[margin, image - margin - mask)`. With
/// `batch_same` a single draw is replicated across the batch.
///
/// # Errors
///
/// Returns [`Error::Range`] if the sampling range is empty.
pub fn random_bbox<R: Rng + ?Sized>(
    rng: &mut R,
    batch_size: usize,
    config: &BboxConfig,
) -> Result<Vec<BoundingBox>> {
    let tops = config.top_range()?;
    let lefts = config.left_range()?;
    let (height, width) = config.mask;

    let boxes = if config.batch_same {
        let bbox = BoundingBox::new(
            rng.random_range(tops),
            rng.random_range(lefts),
            height,
            width,
        );
        vec![bbox; batch_size]
    } else {
        (0..batch_size)
            .map(|_| {
                BoundingBox::new(
                    rng.random_range(tops.clone()),
                    rng.random_range(lefts.clone()),
                    height,
                    width,
                )
            })
            .collect()
    };

    tracing::debug!(batch_size, batch_same = config.batch_same, "sampled bounding boxes");

    Ok(boxes)
}

/// Rasterize boxes into an `(N, 1, height, width)` mask.
///
/// Each box is shrunk on all sides by an independent random jitter in
/// `[0, max_delta / 2]`, so shared boxes still yield different holes.
#[must_use]
pub fn bbox_to_mask<R: Rng + ?Sized>(
    rng: &mut R,
    boxes: &[BoundingBox],
    height: usize,
    width: usize,
    max_delta: (usize, usize),
) -> Mask {
    let mut mask = Array4::<f32>::zeros((boxes.len(), 1, height, width));

    for (i, bbox) in boxes.iter().enumerate() {
        let delta_h = rng.random_range(0..=max_delta.0 / 2);
        let delta_w = rng.random_range(0..=max_delta.1 / 2);

        let rows = clamp_span(
            bbox.top + delta_h,
            (bbox.top + bbox.height).saturating_sub(delta_h),
            height,
        );
        let cols = clamp_span(
            bbox.left + delta_w,
            (bbox.left + bbox.width).saturating_sub(delta_w),
            width,
        );

        mask.slice_mut(s![i, .., rows, cols]).fill(1.0);
    }

    mask
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_batch_same_replicates_box() {
        let mut rng = StdRng::seed_from_u64(7);
        let boxes = random_bbox(&mut rng, 4, &BboxConfig::default()).unwrap();
        assert_eq!(boxes.len(), 4);
        assert!(boxes.iter().all(|b| *b == boxes[0]));
        assert!(boxes[0].top < 128 && boxes[0].left < 128);
        assert_eq!((boxes[0].height, boxes[0].width), (128, 128));
    }

    #[test]
    fn test_independent_boxes_differ() {
        let mut rng = StdRng::seed_from_u64(11);
        let config = BboxConfig {
            batch_same: false,
            ..BboxConfig::default()
        };
        let boxes = random_bbox(&mut rng, 16, &config).unwrap();
        assert!(boxes.iter().any(|b| *b != boxes[0]));
    }

    #[test]
    fn test_margins_respected() {
        let mut rng = StdRng::seed_from_u64(3);
        let config = BboxConfig {
            image: (64, 80),
            mask: (32, 32),
            margin: (8, 10),
            batch_same: false,
        };
        for bbox in random_bbox(&mut rng, 64, &config).unwrap() {
            assert!((8..24).contains(&bbox.top));
            assert!((10..38).contains(&bbox.left));
        }
    }

    #[test]
    fn test_empty_range_rejected() {
        let mut rng = StdRng::seed_from_u64(0);
        let config = BboxConfig {
            image: (128, 256),
            mask: (128, 128),
            ..BboxConfig::default()
        };
        let err = random_bbox(&mut rng, 2, &config).unwrap_err();
        assert!(matches!(err, Error::Range { name: "top", .. }));

        let config = BboxConfig {
            image: (256, 256),
            mask: (100, 100),
            margin: (80, 0),
            batch_same: true,
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_mask_zero_outside_one_inside() {
        let mut rng = StdRng::seed_from_u64(42);
        let boxes = [BoundingBox::new(40, 60, 128, 128)];
        let mask = bbox_to_mask(&mut rng, &boxes, 256, 256, (32, 32));
        assert_eq!(mask.dim(), (1, 1, 256, 256));

        let ones: Vec<(usize, usize)> = mask
            .indexed_iter()
            .filter(|(_, &v)| v == 1.0)
            .map(|((_, _, y, x), _)| (y, x))
            .collect();
        let top = ones.iter().map(|p| p.0).min().unwrap();
        let bottom = ones.iter().map(|p| p.0).max().unwrap();
        let left = ones.iter().map(|p| p.1).min().unwrap();
        let right = ones.iter().map(|p| p.1).max().unwrap();

        let delta_h = top - 40;
        let delta_w = left - 60;
        assert!(delta_h <= 16 && delta_w <= 16);
        // Jitter is symmetric on both sides of the box.
        assert_eq!(bottom, 40 + 128 - delta_h - 1);
        assert_eq!(right, 60 + 128 - delta_w - 1);
        // Solid rectangle: every pixel inside is set, nothing outside is.
        assert_eq!(ones.len(), (bottom - top + 1) * (right - left + 1));
        assert!(mask.iter().all(|&v| v == 0.0 || v == 1.0));
    }

    #[test]
    fn test_shared_boxes_get_independent_jitter() {
        let mut rng = StdRng::seed_from_u64(5);
        let boxes = vec![BoundingBox::new(64, 64, 128, 128); 32];
        let mask = bbox_to_mask(&mut rng, &boxes, 256, 256, (32, 32));
        let areas: Vec<f32> = mask.outer_iter().map(|m| m.sum()).collect();
        assert!(areas.iter().any(|&a| a != areas[0]));
    }

    #[test]
    fn test_jitter_larger_than_box_gives_empty_hole() {
        let mut rng = StdRng::seed_from_u64(1);
        let boxes = [BoundingBox::new(10, 10, 2, 2)];
        let mask = bbox_to_mask(&mut rng, &boxes, 32, 32, (64, 64));
        assert!(mask.sum() <= 4.0);
    }

    #[test]
    fn test_box_spans_clamp_to_image() {
        let bbox = BoundingBox::new(20, 30, 16, 16);
        assert_eq!(bbox.rows(24), 20..24);
        assert_eq!(bbox.cols(64), 30..46);
        assert_eq!(BoundingBox::new(40, 0, 4, 4).rows(32), 32..32);
    }
}
