//! SnapForm WASM - WebAssembly bindings for the intake form's photo fields
//!
//! This crate exposes the snapform-core transforms to the browser.
//!
//! # Module Structure
//!
//! - `transform` - Crop and rotate to data URL, as cancellable promises
//! - `editor` - Photo editor state, strokes and rendering
//! - `encode` - Decoding and encoding helpers
//! - `types` - WASM-compatible wrapper types for image data
//!
//! # Usage
//!
//! ```typescript
//! import init, { crop_image, rotate_image } from '@snapform/wasm';
//!
//! await init();
//!
//! const job = rotate_image(photoDataUrl, 90);
//! form.photo = await job.promise;
//! ```

use wasm_bindgen::prelude::*;

mod editor;
mod encode;
mod source;
mod transform;
mod types;

// Re-export public types
pub use editor::JsPhotoEditor;
pub use encode::{decode_data_url, decode_image, encode_data_url, encode_jpeg};
pub use transform::{crop_decoded, crop_image, rotate_decoded, rotate_image, JsPendingTransform};
pub use types::JsSourceImage;

/// Initialize the WASM module (called automatically on load)
#[wasm_bindgen(start)]
pub fn init() {}

/// Get the version of the WASM module
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!version().is_empty());
    }
}
