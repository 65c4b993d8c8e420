//! Image transformation operations: crop, rotation and flips.
//!
//! The free functions in this module work on decoded pixels and draw into a
//! surface obtained from a [`SurfaceFactory`](crate::surface::SurfaceFactory).
//! [`ImageTransform`] wraps them into the operations the intake form calls:
//! transform, then encode to a data URL, either directly or once a pending
//! source has finished decoding.
//!
//! # Coordinate System
//!
//! - Crop regions are in source pixels, origin top-left
//! - Rotation angles are in degrees, positive = clockwise

mod crop;
mod flip;
mod image_transform;
mod rotation;

pub use crop::{apply_crop, CropRegion};
pub use flip::apply_flip;
pub use image_transform::ImageTransform;
pub use rotation::{apply_rotation, compute_rotated_bounds, RotationAngle};

use crate::decode::SourceImage;
use crate::TransformError;

/// Reject sources that hold no pixels.
pub(crate) fn ensure_source(image: &SourceImage) -> Result<(), TransformError> {
    if image.is_empty() {
        return Err(TransformError::InvalidSource(
            "image holds no pixels".to_string(),
        ));
    }
    Ok(())
}
