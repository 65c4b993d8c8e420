//! Image decoding for SnapForm.
//!
//! This module provides functionality for:
//! - Parsing `data:` URLs produced by the capture canvas or file uploads
//! - Decoding JPEG and PNG bytes with EXIF orientation correction
//! - The immutable [`SourceImage`] every transform reads from
//!
//! # Architecture
//!
//! Decoding itself is synchronous. The asynchronous decode boundary (waiting
//! for an image to finish loading) lives in [`crate::pending`].

mod bytes;
mod data_url;
mod types;

pub use bytes::{decode_bytes, get_orientation};
pub use data_url::{decode_data_url, parse_data_url, DataUrl};
pub use types::{DecodeError, Orientation, SourceImage};
