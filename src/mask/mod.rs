//! Random hole generation, masking strategies and loss discounting.

mod apply;
mod bbox;
mod discount;

pub use apply::{mask_image, MaskConfig, MaskKind, DEFAULT_MOSAIC_UNIT};
pub use bbox::{bbox_to_mask, random_bbox, BboxConfig, BoundingBox};
pub use discount::{DiscountConfig, SpatialDiscountMask};
