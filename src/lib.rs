//! # `inpaint-tools`
//!
//! Data loading and tensor utilities for training image-inpainting GANs.
//!
//! All tensors are [`ndarray`] arrays in NCHW layout. The crate covers the
//! pieces a contextual-attention inpainting model needs around its network:
//! unfold-style patch extraction with "same"/"valid" padding, random
//! bounding boxes and jittered hole masks, spatially discounted loss
//! weights, per-sample region crops and optical flow visualization.
//!
//! ## Example
//!
//! ```no_run
//! use inpaint_tools::mask::{mask_image, random_bbox, BboxConfig, MaskConfig};
//! use inpaint_tools::tensor::ImageBatch;
//!
//! # fn main() -> inpaint_tools::Result<()> {
//! let mut rng = rand::rng();
//! let images = ImageBatch::zeros((4, 3, 256, 256));
//!
//! let boxes = random_bbox(&mut rng, 4, &BboxConfig::default())?;
//! let (masked, mask) = mask_image(&mut rng, &images.view(), &boxes, &MaskConfig::default())?;
//! # Ok(())
//! # }
//! ```

pub mod dataset;
pub mod error;
pub mod flow;
pub mod image;
pub mod mask;
pub mod patches;
pub mod tensor;
pub mod timing;

pub use error::{Error, Result};
