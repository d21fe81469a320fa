//! Optical flow visualization using the Middlebury color wheel.

mod visualize;
mod wheel;

pub use visualize::{compute_color, flow_to_image, Normalization, UNKNOWN_FLOW_THRESHOLD};
pub use wheel::{ColorWheel, ARC_LENGTHS, WHEEL_SIZE};
