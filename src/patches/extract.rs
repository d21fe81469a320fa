//! Unfold-style patch extraction.

use ndarray::{s, Array3, ArrayView4, CowArray, Ix4};

use crate::error::{Error, Result};

use super::padding::{same_padding, Padding, PatchParams};

/// Extract all sliding-window patches from `images`.
///
/// Each patch is flattened channel-major (`c * kh * kw + i * kw + j`) and
/// patches are ordered row-major over the output grid.
///
/// # Returns
///
/// Tensor of shape `(batch, channels * kh * kw, num_patches)`.
///
/// # Errors
///
/// Returns an error if `params` is invalid, or if with [`Padding::Valid`]
/// the dilated kernel does not fit inside the input.
#[allow(clippy::cast_possible_wrap)]
pub fn extract_image_patches(
    images: &ArrayView4<'_, f32>,
    params: &PatchParams,
    padding: Padding,
) -> Result<Array3<f32>> {
    params.validate()?;

    let padded: CowArray<'_, f32, Ix4> = match padding {
        Padding::Same => same_padding(images, params)?.into(),
        Padding::Valid => images.view().into(),
    };

    let (batch, channels, rows, cols) = padded.dim();
    let (kh, kw) = params.kernel;
    let (sh, sw) = params.stride;
    let (rh, rw) = params.rate;
    let (effective_rows, effective_cols) = params.effective_kernel();

    if rows < effective_rows || cols < effective_cols {
        return Err(Error::invalid(
            "kernel",
            format!("{effective_rows}x{effective_cols} window exceeds input {rows}x{cols}"),
        ));
    }

    let out_rows = (rows - effective_rows) / sh + 1;
    let out_cols = (cols - effective_cols) / sw + 1;

    tracing::debug!(
        %padding,
        out_rows,
        out_cols,
        "extracting {}x{} patches",
        kh,
        kw
    );

    let mut patches = Array3::<f32>::zeros((batch, channels * kh * kw, out_rows * out_cols));
    let (row_step, col_step) = (sh as isize, sw as isize);

    for b in 0..batch {
        for c in 0..channels {
            for i in 0..kh {
                for j in 0..kw {
                    let row0 = i * rh;
                    let col0 = j * rw;
                    let taps = padded.slice(s![
                        b,
                        c,
                        row0..row0 + (out_rows - 1) * sh + 1;row_step,
                        col0..col0 + (out_cols - 1) * sw + 1;col_step
                    ]);
                    let mut dst = patches.slice_mut(s![b, c * kh * kw + i * kw + j, ..]);
                    for (d, &v) in dst.iter_mut().zip(taps.iter()) {
                        *d = v;
                    }
                }
            }
        }
    }

    Ok(patches)
}
