//! Image encoding for SnapForm.
//!
//! This module provides functionality for:
//! - Encoding RGBA pixels to JPEG (lossy, alpha flattened) or PNG (lossless)
//! - Wrapping the encoded bytes in a `data:` URL ([`EncodedImage`])
//!
//! # Examples
//!
//! ```ignore
//! use snapform_core::encode::{EncodedImage, OutputFormat};
//!
//! let url = EncodedImage::encode(&image, OutputFormat::default())?;
//! assert!(url.as_str().starts_with("data:image/jpeg;base64,"));
//! ```

mod jpeg;
mod output;
mod png;

use thiserror::Error;

pub use jpeg::{encode_jpeg, DEFAULT_JPEG_QUALITY};
pub use output::{EncodedImage, OutputFormat};
pub use png::encode_png;

/// Errors that can occur during encoding.
#[derive(Debug, Error)]
pub enum EncodeError {
    /// Pixel data length doesn't match expected dimensions
    #[error("Invalid pixel data: expected {expected} bytes (width * height * 4), got {actual}")]
    InvalidPixelData { expected: usize, actual: usize },

    /// Width or height is zero
    #[error("Invalid dimensions: width ({width}) and height ({height}) must be non-zero")]
    InvalidDimensions { width: u32, height: u32 },

    /// The underlying encoder failed
    #[error("Encoding failed: {0}")]
    EncodingFailed(String),
}

/// Check that `pixels` is a non-empty RGBA buffer of the given size.
pub(crate) fn validate_rgba(pixels: &[u8], width: u32, height: u32) -> Result<(), EncodeError> {
    if width == 0 || height == 0 {
        return Err(EncodeError::InvalidDimensions { width, height });
    }

    let expected = (width as usize) * (height as usize) * 4;
    if pixels.len() != expected {
        return Err(EncodeError::InvalidPixelData {
            expected,
            actual: pixels.len(),
        });
    }

    Ok(())
}
