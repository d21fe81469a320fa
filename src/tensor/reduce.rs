//! Multi-axis reductions over dynamic-rank tensors.
//!
//! Axes are reduced one at a time in descending order so that the indices of
//! the axes still to be reduced stay valid when `keepdim` is false.

use ndarray::{ArrayD, ArrayViewD, Axis};

use crate::error::{Error, Result};

/// Mean over `axes` (all axes when `None` or empty).
///
/// # Errors
///
/// Returns an error if an axis is out of range or has zero length.
pub fn reduce_mean(
    x: &ArrayViewD<'_, f32>,
    axes: Option<&[usize]>,
    keepdim: bool,
) -> Result<ArrayD<f32>> {
    reduce(x, axes, keepdim, |t, axis| {
        t.mean_axis(axis)
            .ok_or_else(|| Error::shape("non-empty axis", format!("empty axis {}", axis.index())))
    })
}

/// Unbiased standard deviation over `axes` (all axes when `None` or empty).
///
/// # Errors
///
/// Returns an error if an axis is out of range or has zero length.
pub fn reduce_std(
    x: &ArrayViewD<'_, f32>,
    axes: Option<&[usize]>,
    keepdim: bool,
) -> Result<ArrayD<f32>> {
    reduce(x, axes, keepdim, |t, axis| {
        if t.len_of(axis) == 0 {
            return Err(Error::shape(
                "non-empty axis",
                format!("empty axis {}", axis.index()),
            ));
        }
        Ok(t.std_axis(axis, 1.0))
    })
}

/// Sum over `axes` (all axes when `None` or empty).
///
/// # Errors
///
/// Returns an error if an axis is out of range.
pub fn reduce_sum(
    x: &ArrayViewD<'_, f32>,
    axes: Option<&[usize]>,
    keepdim: bool,
) -> Result<ArrayD<f32>> {
    reduce(x, axes, keepdim, |t, axis| Ok(t.sum_axis(axis)))
}

fn reduce<F>(
    x: &ArrayViewD<'_, f32>,
    axes: Option<&[usize]>,
    keepdim: bool,
    op: F,
) -> Result<ArrayD<f32>>
where
    F: Fn(&ArrayViewD<'_, f32>, Axis) -> Result<ArrayD<f32>>,
{
    let ndim = x.ndim();
    let mut axes: Vec<usize> = match axes {
        Some(axes) if !axes.is_empty() => axes.to_vec(),
        _ => (0..ndim).collect(),
    };

    if let Some(&bad) = axes.iter().find(|&&axis| axis >= ndim) {
        return Err(Error::invalid(
            "axis",
            format!("axis {bad} out of range for rank-{ndim} tensor"),
        ));
    }

    axes.sort_unstable_by(|a, b| b.cmp(a));
    axes.dedup();

    let mut current = x.to_owned();
    for axis in axes {
        let mut reduced = op(&current.view(), Axis(axis))?;
        if keepdim {
            reduced.insert_axis_inplace(Axis(axis));
        }
        current = reduced;
    }

    Ok(current)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{array, IxDyn};

    #[test]
    fn test_sum_all_axes() {
        let x = array![[1.0_f32, 2.0], [3.0, 4.0]].into_dyn();
        let total = reduce_sum(&x.view(), None, false).unwrap();
        assert_eq!(total.ndim(), 0);
        assert!((total[IxDyn(&[])] - 10.0).abs() < 1e-6);
    }

    #[test]
    fn test_mean_keepdim_preserves_rank() {
        let x = ArrayD::<f32>::ones(IxDyn(&[2, 3, 4, 5]));
        let mean = reduce_mean(&x.view(), Some(&[1, 2, 3]), true).unwrap();
        assert_eq!(mean.shape(), &[2, 1, 1, 1]);
        assert!(mean.iter().all(|&v| (v - 1.0).abs() < 1e-6));
    }

    #[test]
    fn test_ascending_axes_are_reordered() {
        let x = ArrayD::from_shape_fn(IxDyn(&[2, 3, 4]), |idx| idx[2] as f32);
        // Reducing axis 0 first would shift axis 2 out of range.
        let sum = reduce_sum(&x.view(), Some(&[0, 2]), false).unwrap();
        assert_eq!(sum.shape(), &[3]);
        assert!(sum.iter().all(|&v| (v - 12.0).abs() < 1e-6));
    }

    #[test]
    fn test_std_is_unbiased() {
        let x = array![1.0_f32, 2.0, 3.0, 4.0].into_dyn();
        let std = reduce_std(&x.view(), None, false).unwrap();
        let expected = (5.0_f32 / 3.0).sqrt();
        assert!((std[IxDyn(&[])] - expected).abs() < 1e-5);
    }

    #[test]
    fn test_out_of_range_axis() {
        let x = ArrayD::<f32>::zeros(IxDyn(&[2, 2]));
        let err = reduce_sum(&x.view(), Some(&[2]), false).unwrap_err();
        assert!(matches!(err, Error::InvalidParameter { .. }));
    }
}
