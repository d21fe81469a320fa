//! Window parameters and TensorFlow-style "same" padding.

use std::fmt;
use std::str::FromStr;

use ndarray::{s, Array4, ArrayView4};

use crate::error::{Error, Result};
use crate::tensor::ImageBatch;

/// Padding mode for patch extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Padding {
    /// Zero-pad so the output grid is `ceil(dim / stride)` along each axis.
    #[default]
    Same,
    /// No padding; only windows fully inside the input are produced.
    Valid,
}

impl FromStr for Padding {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "same" => Ok(Self::Same),
            "valid" => Ok(Self::Valid),
            other => Err(Error::UnsupportedPadding(other.to_string())),
        }
    }
}

impl fmt::Display for Padding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Same => "same",
            Self::Valid => "valid",
        })
    }
}

/// Kernel size, stride and dilation rate as (rows, cols) pairs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PatchParams {
    pub kernel: (usize, usize),
    pub stride: (usize, usize),
    pub rate: (usize, usize),
}

impl Default for PatchParams {
    fn default() -> Self {
        Self {
            kernel: (3, 3),
            stride: (1, 1),
            rate: (1, 1),
        }
    }
}

impl PatchParams {
    /// Square kernel with unit stride and rate.
    #[must_use]
    pub const fn square(kernel: usize) -> Self {
        Self {
            kernel: (kernel, kernel),
            stride: (1, 1),
            rate: (1, 1),
        }
    }

    /// Validate the parameters.
    ///
    /// # Errors
    ///
    /// Returns an error if any kernel size, stride or rate is zero.
    pub fn validate(&self) -> Result<()> {
        for (name, (rows, cols)) in [
            ("kernel", self.kernel),
            ("stride", self.stride),
            ("rate", self.rate),
        ] {
            if rows == 0 || cols == 0 {
                return Err(Error::invalid(name, "must be greater than 0"));
            }
        }
        Ok(())
    }

    /// Kernel extent once dilation is applied.
    #[must_use]
    pub const fn effective_kernel(&self) -> (usize, usize) {
        (
            (self.kernel.0 - 1) * self.rate.0 + 1,
            (self.kernel.1 - 1) * self.rate.1 + 1,
        )
    }
}

/// Zero padding applied on each side of the spatial axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SamePadding {
    pub top: usize,
    pub bottom: usize,
    pub left: usize,
    pub right: usize,
}

impl SamePadding {
    /// Compute the padding for a `rows x cols` input.
    ///
    /// The remainder of an odd total goes to the bottom/right side.
    ///
    /// # Errors
    ///
    /// Returns an error if `params` is invalid.
    pub fn compute(rows: usize, cols: usize, params: &PatchParams) -> Result<Self> {
        params.validate()?;

        let (effective_rows, effective_cols) = params.effective_kernel();
        let total_rows = axis_padding(rows, params.stride.0, effective_rows);
        let total_cols = axis_padding(cols, params.stride.1, effective_cols);

        let top = total_rows / 2;
        let left = total_cols / 2;

        Ok(Self {
            top,
            bottom: total_rows - top,
            left,
            right: total_cols - left,
        })
    }

    /// Total padding along the row axis.
    #[must_use]
    pub const fn rows(&self) -> usize {
        self.top + self.bottom
    }

    /// Total padding along the column axis.
    #[must_use]
    pub const fn cols(&self) -> usize {
        self.left + self.right
    }
}

fn axis_padding(size: usize, stride: usize, effective_kernel: usize) -> usize {
    let out = size.div_ceil(stride);
    ((out.saturating_sub(1)) * stride + effective_kernel).saturating_sub(size)
}

/// Zero-pad `images` so that sliding windows tile the strided output exactly.
///
/// Returns a new tensor; the input is left untouched.
///
/// # Errors
///
/// Returns an error if `params` is invalid.
pub fn same_padding(images: &ArrayView4<'_, f32>, params: &PatchParams) -> Result<ImageBatch> {
    let (batch, channels, rows, cols) = images.dim();
    let pad = SamePadding::compute(rows, cols, params)?;

    tracing::debug!(?pad, rows, cols, "same padding");

    let mut padded = Array4::<f32>::zeros((batch, channels, rows + pad.rows(), cols + pad.cols()));
    padded
        .slice_mut(s![.., .., pad.top..pad.top + rows, pad.left..pad.left + cols])
        .assign(images);

    Ok(padded)
}
