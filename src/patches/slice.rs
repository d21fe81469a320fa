//! Per-sample region cropping.

use ndarray::{s, stack, ArrayView3, ArrayView4, Axis};

use crate::error::{Error, Result};
use crate::mask::BoundingBox;
use crate::tensor::ImageBatch;

/// Crop `x[i, :, top..top + height, left..left + width]` for every sample
/// and stack the crops into a new batch.
///
/// # Errors
///
/// Returns [`Error::ShapeMismatch`] if there is not exactly one box per
/// sample or the crops do not all have the same extent.
pub fn local_patch(x: &ArrayView4<'_, f32>, boxes: &[BoundingBox]) -> Result<ImageBatch> {
    let (batch, _, height, width) = x.dim();
    if boxes.len() != batch {
        return Err(Error::shape(
            format!("{batch} bounding boxes"),
            format!("{} bounding boxes", boxes.len()),
        ));
    }

    let crops: Vec<ArrayView3<'_, f32>> = boxes
        .iter()
        .enumerate()
        .map(|(i, bbox)| x.slice(s![i, .., bbox.rows(height), bbox.cols(width)]))
        .collect();

    stack(Axis(0), &crops).map_err(|_| {
        let extents: Vec<String> = crops
            .iter()
            .map(|c| format!("{}x{}", c.dim().1, c.dim().2))
            .collect();
        Error::shape("equally sized crops", extents.join(", "))
    })
}
