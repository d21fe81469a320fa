//! Spatially discounted loss weights.
//!
//! Pixels near the border of a hole are weighted close to 1 and the weight
//! decays geometrically towards the centre, where the reconstruction is
//! inherently ambiguous.

use ndarray::{Array4, ArrayView4};

use crate::error::{Error, Result};

/// Parameters of a spatial discount mask.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DiscountConfig {
    /// Per-pixel decay factor.
    pub gamma: f64,

    /// Mask height in pixels.
    pub height: usize,

    /// Mask width in pixels.
    pub width: usize,

    /// When false the mask is uniformly one.
    pub enabled: bool,
}

impl Default for DiscountConfig {
    fn default() -> Self {
        Self {
            gamma: 0.9,
            height: 128,
            width: 128,
            enabled: true,
        }
    }
}

impl DiscountConfig {
    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if gamma is not a positive finite number or either
    /// dimension is zero.
    pub fn validate(&self) -> Result<()> {
        if !self.gamma.is_finite() || self.gamma <= 0.0 {
            return Err(Error::invalid("gamma", "must be a positive finite number"));
        }
        if self.height == 0 || self.width == 0 {
            return Err(Error::invalid("mask_shape", "dimensions must be greater than 0"));
        }
        Ok(())
    }
}

/// Immutable `(1, 1, H, W)` weight map, built once per configuration.
#[derive(Debug, Clone)]
pub struct SpatialDiscountMask {
    config: DiscountConfig,
    weights: Array4<f32>,
}

impl SpatialDiscountMask {
    /// Build the weight map.
    ///
    /// `w(i, j) = max(gamma^min(i, H - i), gamma^min(j, W - j))`.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
    pub fn new(config: DiscountConfig) -> Result<Self> {
        config.validate()?;

        let DiscountConfig {
            gamma,
            height,
            width,
            enabled,
        } = config;

        let weights = if enabled {
            let decay = |d: usize| gamma.powi(d as i32);
            Array4::from_shape_fn((1, 1, height, width), |(_, _, i, j)| {
                decay(i.min(height - i)).max(decay(j.min(width - j))) as f32
            })
        } else {
            Array4::ones((1, 1, height, width))
        };

        tracing::debug!(?config, "built spatial discount mask");

        Ok(Self { config, weights })
    }

    /// Configuration the mask was built from.
    #[must_use]
    pub const fn config(&self) -> &DiscountConfig {
        &self.config
    }

    /// The `(1, 1, H, W)` weights.
    #[must_use]
    pub const fn weights(&self) -> &Array4<f32> {
        &self.weights
    }

    /// Weight a per-pixel map of shape `(N, C, H, W)`.
    ///
    /// # Errors
    ///
    /// Returns an error if the spatial size differs from the mask.
    pub fn apply(&self, values: &ArrayView4<'_, f32>) -> Result<Array4<f32>> {
        let (_, _, height, width) = values.dim();
        if (height, width) != (self.config.height, self.config.width) {
            return Err(Error::shape(
                format!("{}x{}", self.config.height, self.config.width),
                format!("{height}x{width}"),
            ));
        }
        Ok(values * &self.weights)
    }
}
