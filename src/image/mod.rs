//! Image loading, conversion, and saving utilities.

mod load;
mod save;
mod transform;

pub use load::load_image;
pub use save::{hwc_to_image, save_image, save_mask, write_image};
pub use transform::{ImageTransform, IMAGENET_MEAN, IMAGENET_STD};

/// Side length images are resized to before batching.
pub const DEFAULT_IMAGE_SIZE: u32 = 256;

/// Number of channels in RGB images.
pub const RGB_CHANNELS: usize = 3;
