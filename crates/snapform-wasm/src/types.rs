//! WASM-compatible wrapper types for image data.
//!
//! This module provides JavaScript-friendly types that wrap the core SnapForm
//! types, and the helpers that turn JavaScript option objects and core errors
//! into their Rust and JavaScript counterparts.

use std::fmt::Display;

use snapform_core::{SourceImage, TransformConfig};
use wasm_bindgen::prelude::*;

/// A decoded RGBA image held in WASM memory.
///
/// Use this when the same photo is cropped or rotated several times: it is
/// decoded once and every transform reads the shared pixels.
///
/// # Memory Management
///
/// `pixels()` copies the data into a JavaScript `Uint8Array`. The `free()`
/// method releases WASM memory early; wasm-bindgen's finalizer will otherwise
/// handle cleanup.
#[wasm_bindgen]
pub struct JsSourceImage {
    inner: SourceImage,
}

#[wasm_bindgen]
impl JsSourceImage {
    /// Create an image from RGBA pixel data (4 bytes per pixel, row-major).
    #[wasm_bindgen(constructor)]
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> Result<JsSourceImage, JsValue> {
        SourceImage::from_rgba(width, height, pixels)
            .map(Self::from_source)
            .map_err(to_js_error)
    }

    /// Get the image width in pixels
    #[wasm_bindgen(getter)]
    pub fn width(&self) -> u32 {
        self.inner.width()
    }

    /// Get the image height in pixels
    #[wasm_bindgen(getter)]
    pub fn height(&self) -> u32 {
        self.inner.height()
    }

    /// Get the number of bytes in the pixel buffer (width * height * 4)
    #[wasm_bindgen(getter)]
    pub fn byte_length(&self) -> usize {
        self.inner.pixels().len()
    }

    /// Returns RGBA pixel data as Uint8Array.
    pub fn pixels(&self) -> Vec<u8> {
        self.inner.pixels().to_vec()
    }

    /// Explicitly free WASM memory.
    pub fn free(self) {}
}

impl JsSourceImage {
    pub(crate) fn from_source(inner: SourceImage) -> Self {
        Self { inner }
    }

    pub(crate) fn source(&self) -> &SourceImage {
        &self.inner
    }
}

/// Convert a core error into the string rejected to JavaScript.
pub(crate) fn to_js_error(e: impl Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

/// Read a `TransformConfig` from an options object; `undefined` and `null`
/// give the defaults.
pub(crate) fn config_from_js(options: JsValue) -> Result<TransformConfig, JsValue> {
    if options.is_undefined() || options.is_null() {
        return Ok(TransformConfig::default());
    }
    serde_wasm_bindgen::from_value(options).map_err(to_js_error)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn image(width: u32, height: u32) -> JsSourceImage {
        JsSourceImage::from_source(
            SourceImage::from_rgba(width, height, vec![7u8; (width * height * 4) as usize])
                .unwrap(),
        )
    }

    #[test]
    fn test_js_source_image_dimensions() {
        let img = image(100, 50);
        assert_eq!(img.width(), 100);
        assert_eq!(img.height(), 50);
        assert_eq!(img.byte_length(), 20000);
    }

    #[test]
    fn test_js_source_image_pixels() {
        let pixels = vec![255u8, 128, 64, 32, 16, 8, 4, 2];
        let img = JsSourceImage::from_source(SourceImage::from_rgba(2, 1, pixels.clone()).unwrap());
        assert_eq!(img.pixels(), pixels);
        assert_eq!(img.source().pixel(1, 0), Some([16, 8, 4, 2]));
    }
}
