//! Tensor aliases shared by the patch, mask and flow utilities.

mod reduce;

pub use reduce::{reduce_mean, reduce_std, reduce_sum};

use ndarray::{Array4, ArrayView4, ArrayViewD, Ix4};

use crate::error::{Error, Result};

/// Image batch in NCHW format (batch, channels, height, width).
pub type ImageBatch = Array4<f32>;

/// Binary mask in N1HW format with values in {0, 1}.
pub type Mask = Array4<f32>;

/// Optical flow batch in NHWC format with two channels (u, v).
pub type FlowField = Array4<f32>;

/// View a dynamic-rank tensor as an image batch.
///
/// # Errors
///
/// Returns [`Error::Precondition`] if the tensor is not rank 4.
pub fn as_batch<'a>(x: &ArrayViewD<'a, f32>) -> Result<ArrayView4<'a, f32>> {
    x.clone()
        .into_dimensionality::<Ix4>()
        .map_err(|_| Error::Precondition {
            expected: 4,
            actual: x.ndim(),
        })
}
