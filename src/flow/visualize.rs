//! Flow field to RGB conversion.

use std::f64::consts::PI;
use std::str::FromStr;

use ndarray::{s, Array3, Array4, ArrayView2, ArrayView4, Axis, Zip};

use crate::error::{Error, Result};
use crate::tensor::FlowField;

use super::wheel::{ColorWheel, WHEEL_SIZE};

/// Flow components with a larger magnitude are treated as unknown.
pub const UNKNOWN_FLOW_THRESHOLD: f32 = 1e7;

/// How the flow magnitude is normalized across a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Normalization {
    /// Sample `i` is scaled by the largest radius among samples `0..=i`.
    ///
    /// Later samples can therefore be dimmed by an earlier, stronger one,
    /// while an early sample is unaffected by what follows it.
    #[default]
    Running,
    /// Every sample is scaled by the largest radius in the whole batch.
    Batch,
}

impl FromStr for Normalization {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "running" => Ok(Self::Running),
            "batch" => Ok(Self::Batch),
            other => Err(Error::invalid(
                "normalization",
                format!("unknown mode {other:?} (expected running or batch)"),
            )),
        }
    }
}

/// Convert a `(N, H, W, 2)` flow batch into `(N, H, W, 3)` RGB images.
///
/// The output holds whole numbers in `[0, 255]`. Unknown flow (either
/// component beyond [`UNKNOWN_FLOW_THRESHOLD`]) is treated as zero motion and
/// NaN flow renders black. The input is not modified.
///
/// # Errors
///
/// Returns an error if the last axis does not have length 2.
pub fn flow_to_image(
    flow: &ArrayView4<'_, f32>,
    normalization: Normalization,
) -> Result<FlowField> {
    let (batch, height, width, components) = flow.dim();
    if components != 2 {
        return Err(Error::shape(
            "(N, H, W, 2) flow",
            format!("(N, H, W, {components}) flow"),
        ));
    }

    let mut known = flow.to_owned();
    for mut uv in known.lanes_mut(Axis(3)) {
        if uv.iter().any(|c| c.abs() > UNKNOWN_FLOW_THRESHOLD) {
            uv.fill(0.0);
        }
    }

    let peaks: Vec<f64> = known
        .outer_iter()
        .map(|sample| {
            Zip::from(sample.slice(s![.., .., 0]))
                .and(sample.slice(s![.., .., 1]))
                .fold(0.0_f64, |acc, &u, &v| acc.max(f64::from(u).hypot(f64::from(v))))
        })
        .collect();

    let scales: Vec<f64> = match normalization {
        Normalization::Running => peaks
            .iter()
            .scan(0.0_f64, |running, &peak| {
                *running = running.max(peak);
                Some(*running)
            })
            .collect(),
        Normalization::Batch => {
            let peak = peaks.iter().copied().fold(0.0_f64, f64::max);
            vec![peak; batch]
        }
    };

    tracing::debug!(?normalization, ?scales, "normalizing flow");

    let mut out = Array4::<f32>::zeros((batch, height, width, 3));
    for ((sample, scale), mut image) in known
        .outer_iter()
        .zip(scales)
        .zip(out.outer_iter_mut())
    {
        let norm = scale + f64::EPSILON;
        let u = sample.slice(s![.., .., 0]).mapv(|c| f64::from(c) / norm);
        let v = sample.slice(s![.., .., 1]).mapv(|c| f64::from(c) / norm);
        let colors = compute_color(&u.view(), &v.view());
        Zip::from(&mut image)
            .and(&colors)
            .for_each(|dst, &src| *dst = f32::from(src));
    }

    Ok(out)
}

/// Color-code a flow field whose magnitude is roughly within the unit disk.
///
/// Hue follows the flow direction around the color wheel and saturation
/// follows the magnitude; pixels beyond radius 1 are dimmed. NaN pixels are
/// black.
///
/// # Panics
///
/// Panics if `u` and `v` have different shapes.
#[must_use]
pub fn compute_color(u: &ArrayView2<'_, f64>, v: &ArrayView2<'_, f64>) -> Array3<u8> {
    let wheel = ColorWheel::global();
    let (height, width) = u.dim();
    let mut img = Array3::<u8>::zeros((height, width, 3));

    Zip::indexed(u).and(v).for_each(|(y, x), &du, &dv| {
        for (c, value) in pixel_color(wheel, du, dv).into_iter().enumerate() {
            img[[y, x, c]] = value;
        }
    });

    img
}

#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
fn pixel_color(wheel: &ColorWheel, u: f64, v: f64) -> [u8; 3] {
    if u.is_nan() || v.is_nan() {
        return [0; 3];
    }

    let rad = u.hypot(v);
    let angle = (-v).atan2(-u) / PI;
    let fk = (angle + 1.0) / 2.0 * (WHEEL_SIZE - 1) as f64 + 1.0;
    let k0 = fk.floor() as usize;
    let k1 = if k0 + 1 == WHEEL_SIZE + 1 { 1 } else { k0 + 1 };
    let f = fk - k0 as f64;

    let c0 = wheel.get(k0 - 1);
    let c1 = wheel.get(k1 - 1);

    let mut rgb = [0u8; 3];
    for (i, px) in rgb.iter_mut().enumerate() {
        let mut col = (1.0 - f) * c0[i] / 255.0 + f * c1[i] / 255.0;
        if rad <= 1.0 {
            col = 1.0 - rad * (1.0 - col);
        } else {
            col *= 0.75;
        }
        *px = (255.0 * col).floor() as u8;
    }
    rgb
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{array, Array2};

    fn uniform_flow(samples: &[(f32, f32)], size: usize) -> Array4<f32> {
        Array4::from_shape_fn((samples.len(), size, size, 2), |(n, _, _, c)| {
            if c == 0 {
                samples[n].0
            } else {
                samples[n].1
            }
        })
    }

    #[test]
    fn test_zero_flow_is_white() {
        let flow = Array4::<f32>::zeros((1, 4, 4, 2));
        let img = flow_to_image(&flow.view(), Normalization::Running).unwrap();
        assert_eq!(img.dim(), (1, 4, 4, 3));
        assert!(img.iter().all(|&v| v == 255.0));
    }

    #[test]
    fn test_unit_flow_hits_wheel_entries() {
        // Motion towards +x maps to the first wheel entry (red).
        let flow = uniform_flow(&[(1.0, 0.0)], 2);
        let img = flow_to_image(&flow.view(), Normalization::Batch).unwrap();
        assert_eq!(img[[0, 0, 0, 0]], 255.0);
        assert_eq!(img[[0, 0, 0, 1]], 0.0);
        assert_eq!(img[[0, 0, 0, 2]], 0.0);
    }

    #[test]
    fn test_output_is_quantized() {
        let flow = Array4::from_shape_fn((2, 8, 8, 2), |(n, y, x, c)| {
            let (fy, fx) = (y as f32 - 3.5, x as f32 - 3.5);
            let scale = (n + 1) as f32;
            if c == 0 {
                fx * scale
            } else {
                fy * scale
            }
        });
        let img = flow_to_image(&flow.view(), Normalization::Running).unwrap();
        assert!(img.iter().all(|&v| v.fract() == 0.0 && (0.0..=255.0).contains(&v)));
    }

    #[test]
    fn test_running_normalization_depends_on_order() {
        let weak_first = uniform_flow(&[(0.5, 0.0), (2.0, 0.0)], 2);
        let strong_first = uniform_flow(&[(2.0, 0.0), (0.5, 0.0)], 2);

        let a = flow_to_image(&weak_first.view(), Normalization::Running).unwrap();
        let b = flow_to_image(&strong_first.view(), Normalization::Running).unwrap();

        // A lone weak sample is normalized to full saturation...
        let saturated = a.slice(s![0, 0, 0, ..]).to_owned();
        // ...but is washed out when a stronger sample precedes it.
        let washed = b.slice(s![1, 0, 0, ..]).to_owned();
        assert_ne!(saturated, washed);

        let batch = flow_to_image(&weak_first.view(), Normalization::Batch).unwrap();
        assert_eq!(batch.slice(s![0, 0, 0, ..]), washed);
    }

    #[test]
    fn test_unknown_flow_is_zeroed_without_mutating_input() {
        let mut flow = uniform_flow(&[(0.5, 0.5)], 2);
        flow[[0, 1, 1, 0]] = 1e9;
        let before = flow.clone();

        let img = flow_to_image(&flow.view(), Normalization::Running).unwrap();
        assert_eq!(flow, before);
        assert!(img.slice(s![0, 1, 1, ..]).iter().all(|&v| v == 255.0));
    }

    #[test]
    fn test_nan_flow_is_black() {
        let mut flow = uniform_flow(&[(0.5, 0.5)], 2);
        flow[[0, 0, 1, 1]] = f32::NAN;

        let img = flow_to_image(&flow.view(), Normalization::Running).unwrap();
        assert!(img.slice(s![0, 0, 1, ..]).iter().all(|&v| v == 0.0));
        assert!(img.slice(s![0, 0, 0, ..]).iter().any(|&v| v > 0.0));
    }

    #[test]
    fn test_large_radius_is_dimmed() {
        let u = array![[2.0_f64]];
        let v = Array2::<f64>::zeros((1, 1));
        let img = compute_color(&u.view(), &v.view());
        // 255 * 0.75 = 191.25
        assert_eq!(img[[0, 0, 0]], 191);
        assert_eq!(img[[0, 0, 1]], 0);
    }

    #[test]
    fn test_normalization_parse() {
        assert_eq!("batch".parse::<Normalization>().unwrap(), Normalization::Batch);
        assert!("per-sample".parse::<Normalization>().is_err());
    }

    #[test]
    fn test_wrong_component_count() {
        let flow = Array4::<f32>::zeros((1, 2, 2, 3));
        assert!(matches!(
            flow_to_image(&flow.view(), Normalization::Running),
            Err(Error::ShapeMismatch { .. })
        ));
    }
}
