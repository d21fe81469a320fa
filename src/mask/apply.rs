//! Applying random holes to image batches.

use std::fmt;
use std::str::FromStr;

use ndarray::{Array4, ArrayView4};
use rand::Rng;

use crate::error::{Error, Result};
use crate::tensor::{ImageBatch, Mask};

use super::bbox::{bbox_to_mask, BoundingBox};

/// Side length in pixels of one mosaic block.
pub const DEFAULT_MOSAIC_UNIT: usize = 12;

/// How the masked region is filled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MaskKind {
    /// Zero out the masked region.
    #[default]
    Hole,
    /// Replace the masked region with a blocky low-resolution copy.
    Mosaic,
}

impl FromStr for MaskKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "hole" => Ok(Self::Hole),
            "mosaic" => Ok(Self::Mosaic),
            other => Err(Error::UnsupportedMaskType(other.to_string())),
        }
    }
}

impl fmt::Display for MaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Hole => "hole",
            Self::Mosaic => "mosaic",
        })
    }
}

/// Configuration for [`mask_image`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MaskConfig {
    /// Maximum jitter as (height, width); each side shrinks by up to half.
    pub max_delta: (usize, usize),

    /// Fill strategy.
    pub kind: MaskKind,

    /// Mosaic block size, used by [`MaskKind::Mosaic`].
    pub mosaic_unit: usize,
}

impl Default for MaskConfig {
    fn default() -> Self {
        Self {
            max_delta: (32, 32),
            kind: MaskKind::Hole,
            mosaic_unit: DEFAULT_MOSAIC_UNIT,
        }
    }
}

impl MaskConfig {
    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the mosaic block size is zero.
    pub fn validate(&self) -> Result<()> {
        if self.mosaic_unit == 0 {
            return Err(Error::invalid("mosaic_unit", "must be greater than 0"));
        }
        Ok(())
    }
}

/// Mask `x` with one jittered hole per bounding box.
///
/// The mask is generated alongside `x` in host memory, so both can be
/// combined elementwise without any transfer.
///
/// # Returns
///
/// The masked batch and the `(N, 1, H, W)` mask that was applied.
///
/// # Errors
///
/// Returns an error if the configuration is invalid or the number of boxes
/// differs from the batch size.
pub fn mask_image<R: Rng + ?Sized>(
    rng: &mut R,
    x: &ArrayView4<'_, f32>,
    boxes: &[BoundingBox],
    config: &MaskConfig,
) -> Result<(ImageBatch, Mask)> {
    config.validate()?;

    let (batch, _, height, width) = x.dim();
    if boxes.len() != batch {
        return Err(Error::shape(
            format!("{batch} bounding boxes"),
            format!("{} bounding boxes", boxes.len()),
        ));
    }

    let mask = bbox_to_mask(rng, boxes, height, width, config.max_delta);
    let keep = mask.mapv(|m| 1.0 - m);

    let result = match config.kind {
        MaskKind::Hole => x * &keep,
        MaskKind::Mosaic => {
            let unit = config.mosaic_unit;
            let small_h = (height / unit).max(1);
            let small_w = (width / unit).max(1);
            #[allow(clippy::cast_precision_loss)]
            let down = resize_nearest(x, (small_h, small_w), (unit as f32, unit as f32));
            #[allow(clippy::cast_precision_loss)]
            let up = resize_nearest(
                &down.view(),
                (height, width),
                (small_h as f32 / height as f32, small_w as f32 / width as f32),
            );
            up * &mask + x * &keep
        }
    };

    tracing::debug!(kind = %config.kind, batch, "masked image batch");

    Ok((result, mask))
}

/// Nearest-neighbour resize with explicit source-per-destination scales.
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
fn resize_nearest(
    input: &ArrayView4<'_, f32>,
    size: (usize, usize),
    scale: (f32, f32),
) -> Array4<f32> {
    let (batch, channels, in_h, in_w) = input.dim();
    let source = |dst: usize, scale: f32, limit: usize| {
        ((dst as f32 * scale).floor() as usize).min(limit - 1)
    };

    let rows: Vec<usize> = (0..size.0).map(|y| source(y, scale.0, in_h)).collect();
    let cols: Vec<usize> = (0..size.1).map(|x| source(x, scale.1, in_w)).collect();

    Array4::from_shape_fn((batch, channels, size.0, size.1), |(b, c, y, x)| {
        input[[b, c, rows[y], cols[x]]]
    })
}
