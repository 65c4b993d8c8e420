//! Errors reported by the transform operations.

use thiserror::Error;

use crate::decode::DecodeError;
use crate::encode::EncodeError;

/// Error returned by crop, rotate and the editor render.
///
/// None of these are fatal: the caller can re-prompt the user and call again
/// with corrected input.
#[derive(Debug, Error)]
pub enum TransformError {
    /// The source image is unset, never finished loading, or holds no pixels.
    #[error("Invalid source image: {0}")]
    InvalidSource(String),

    /// The crop region has a zero width or height.
    #[error("Invalid crop region: {width}x{height} (width and height must be positive)")]
    InvalidRegion { width: u32, height: u32 },

    /// The rotation angle is NaN or infinite.
    #[error("Invalid rotation angle: {0}")]
    InvalidAngle(f64),

    /// The source image failed to decode.
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// The destination surface could not be encoded.
    #[error(transparent)]
    Encode(#[from] EncodeError),

    /// The destination surface exceeds the configured limits.
    #[error("Surface of {width}x{height} exceeds the configured limits")]
    SurfaceTooLarge { width: u32, height: u32 },

    /// The pending operation was cancelled before it completed.
    #[error("Operation cancelled")]
    Cancelled,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let err = TransformError::InvalidRegion {
            width: 0,
            height: 10,
        };
        assert_eq!(
            err.to_string(),
            "Invalid crop region: 0x10 (width and height must be positive)"
        );

        let err = TransformError::from(DecodeError::InvalidFormat);
        assert_eq!(err.to_string(), "Invalid or unsupported image format");
    }
}
