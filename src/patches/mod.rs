//! Sliding-window patch extraction and per-sample region slicing.

mod extract;
mod padding;
mod slice;

pub use extract::extract_image_patches;
pub use padding::{same_padding, Padding, PatchParams, SamePadding};
pub use slice::local_patch;
