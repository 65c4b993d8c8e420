//! Snapform Core - image processing for the intake form
//!
//! This crate provides the image work behind the intake form's photo fields:
//! cropping and rotating a picked photo into a data URL, decoding data URLs
//! and encoded bytes, and rendering the photo editor's filters, flips and
//! annotation strokes.
//!
//! Transforms draw into surfaces obtained from an injected
//! [`SurfaceFactory`]; [`MemorySurfaceFactory`] is the default. Operations
//! that wait for an image to load return a cancellable [`Pending`] result.

pub mod annotate;
pub mod config;
pub mod decode;
pub mod editor;
pub mod encode;
mod error;
pub mod filters;
pub mod pending;
pub mod surface;
pub mod transform;

pub use annotate::{Point, Stroke, StrokeColor};
pub use config::TransformConfig;
pub use decode::{decode_bytes, decode_data_url, DecodeError, SourceImage};
pub use editor::PhotoEditor;
pub use encode::{EncodeError, EncodedImage, OutputFormat};
pub use error::TransformError;
pub use filters::FilterSettings;
pub use pending::{image_channel, CancelHandle, LoadCompleter, Pending, PendingImage};
pub use surface::{MemorySurfaceFactory, PixelSurface, RasterSurface, SurfaceFactory};
pub use transform::{apply_crop, apply_rotation, CropRegion, ImageTransform, RotationAngle};
