//! Image encoding and decoding WASM bindings.
//!
//! # Functions
//!
//! - [`decode_image`] - Decode JPEG or PNG bytes into a `JsSourceImage`
//! - [`decode_data_url`] - Decode a `data:image/...;base64,` URL
//! - [`encode_data_url`] - Encode a `JsSourceImage` as a data URL
//! - [`encode_jpeg`] - Encode RGBA pixel data to JPEG bytes
//!
//! # Example
//!
//! ```typescript
//! const image = decode_image(new Uint8Array(await file.arrayBuffer()));
//! const preview = encode_data_url(image, { output: { type: "jpeg", quality: 80 } });
//! ```

use snapform_core::{decode, encode, EncodedImage};
use wasm_bindgen::prelude::*;

use crate::types::{config_from_js, to_js_error, JsSourceImage};

/// Decode JPEG or PNG bytes, applying EXIF orientation.
#[wasm_bindgen]
pub fn decode_image(bytes: &[u8]) -> Result<JsSourceImage, JsValue> {
    decode::decode_bytes(bytes)
        .map(JsSourceImage::from_source)
        .map_err(to_js_error)
}

/// Decode a base64 image data URL.
#[wasm_bindgen]
pub fn decode_data_url(url: &str) -> Result<JsSourceImage, JsValue> {
    decode::decode_data_url(url)
        .map(JsSourceImage::from_source)
        .map_err(to_js_error)
}

/// Encode an image as a data URL with the configured output format
/// (JPEG at quality 92 unless `options.output` says otherwise).
#[wasm_bindgen]
pub fn encode_data_url(image: &JsSourceImage, options: JsValue) -> Result<String, JsValue> {
    let config = config_from_js(options)?;
    EncodedImage::encode(image.source(), config.output)
        .map(EncodedImage::into_string)
        .map_err(to_js_error)
}

/// Encode RGBA pixel data to JPEG bytes.
///
/// Transparent pixels are flattened onto black. Quality is clamped to 1-100.
#[wasm_bindgen]
pub fn encode_jpeg(pixels: &[u8], width: u32, height: u32, quality: u8) -> Result<Vec<u8>, JsValue> {
    encode::encode_jpeg(pixels, width, height, quality).map_err(to_js_error)
}


#[cfg(all(test, target_arch = "wasm32"))]
mod wasm_tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    fn test_encode_jpeg_basic() {
        let jpeg = encode_jpeg(&vec![128u8; 20 * 20 * 4], 20, 20, 90).unwrap();
        assert_eq!(&jpeg[0..2], &[0xFF, 0xD8]);
    }

    #[wasm_bindgen_test]
    fn test_encode_jpeg_invalid_pixel_data() {
        assert!(encode_jpeg(&vec![128u8; 50], 20, 20, 90).is_err());
    }

    #[wasm_bindgen_test]
    fn test_data_url_cycle() {
        let img = JsSourceImage::new(3, 3, vec![10u8; 3 * 3 * 4]).unwrap();
        let options = js_sys::JSON::parse(r#"{"output": {"type": "png"}}"#).unwrap();
        let url = encode_data_url(&img, options).unwrap();
        assert!(url.starts_with("data:image/png;base64,"));

        let back = decode_data_url(&url).unwrap();
        assert_eq!(back.pixels(), img.pixels());
    }

    #[wasm_bindgen_test]
    fn test_decode_garbage() {
        assert!(decode_image(&[1, 2, 3]).is_err());
        assert!(decode_data_url("not a data url").is_err());
    }
}
