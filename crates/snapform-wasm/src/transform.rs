//! WASM bindings for crop and rotate.
//!
//! `crop_image` and `rotate_image` accept a source that may still be loading
//! and return a [`JsPendingTransform`]: a promise for the resulting data URL
//! plus a `cancel()` method. The promise only settles after the source has
//! decoded and the transform has run.
//!
//! # Example (TypeScript)
//!
//! ```typescript
//! const job = crop_image(fileInput.dataUrl, { x: 50, y: 50, width: 100, height: 80 });
//! const dataUrl = await job.promise;
//!
//! const rotation = rotate_image(loadPhoto(), 90, { output: { type: "png" } });
//! cancelButton.onclick = () => rotation.cancel();
//! ```

use js_sys::Promise;
use snapform_core::{
    CancelHandle, CropRegion, EncodedImage, ImageTransform, Pending, RotationAngle,
    TransformConfig, TransformError,
};
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::future_to_promise;

use crate::source::resolve_source;
use crate::types::{config_from_js, to_js_error, JsSourceImage};

/// A transform in progress.
#[wasm_bindgen]
pub struct JsPendingTransform {
    promise: Promise,
    cancel: CancelHandle,
}

#[wasm_bindgen]
impl JsPendingTransform {
    /// Resolves to the data URL, or rejects with an error message.
    #[wasm_bindgen(getter)]
    pub fn promise(&self) -> Promise {
        self.promise.clone()
    }

    /// Abort the transform. The promise rejects with "Operation cancelled"
    /// unless it already settled.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }
}

impl JsPendingTransform {
    pub(crate) fn spawn(pending: Pending<EncodedImage>) -> Self {
        let cancel = pending.cancel_handle();
        let promise = future_to_promise(async move {
            match pending.await {
                Ok(encoded) => Ok(JsValue::from_str(encoded.as_str())),
                Err(e) => {
                    if !matches!(e, TransformError::Cancelled) {
                        web_sys::console::error_1(&JsValue::from_str(&format!(
                            "snapform: transform failed: {e}"
                        )));
                    }
                    Err(to_js_error(e))
                }
            }
        });
        Self { promise, cancel }
    }
}

/// Crop a source image to a pixel region.
///
/// # Arguments
///
/// * `source` - Data URL string, `Uint8Array` of encoded bytes, or a
///   `Promise` resolving to either
/// * `region` - `{ x, y, width, height }` in source pixels
/// * `options` - Optional `{ output, maxSurfaceDimension, maxSurfaceArea }`
///
/// # Returns
///
/// A pending transform whose promise resolves to a data URL exactly
/// `width` x `height` pixels in size. Regions running past the source are
/// clipped, leaving the outside blank.
///
/// # Errors
///
/// Throws synchronously if `region` or `options` are malformed.
#[wasm_bindgen]
pub fn crop_image(
    source: JsValue,
    region: JsValue,
    options: JsValue,
) -> Result<JsPendingTransform, JsValue> {
    let region: CropRegion = serde_wasm_bindgen::from_value(region).map_err(to_js_error)?;
    let transform = ImageTransform::from_config(&config_from_js(options)?);
    Ok(JsPendingTransform::spawn(
        transform.crop_pending(resolve_source(source), region),
    ))
}

/// Rotate a source image clockwise about its centre.
///
/// Multiples of 90 degrees are lossless; 90 and 270 swap width and height.
/// Other angles keep the extent of the nearest quarter turn, clipping the
/// corners.
#[wasm_bindgen]
pub fn rotate_image(
    source: JsValue,
    angle_degrees: f64,
    options: JsValue,
) -> Result<JsPendingTransform, JsValue> {
    let transform = ImageTransform::from_config(&config_from_js(options)?);
    Ok(JsPendingTransform::spawn(
        transform.rotate_pending(resolve_source(source), angle_degrees),
    ))
}

/// Crop an already decoded image, returning the data URL directly.
#[wasm_bindgen]
pub fn crop_decoded(
    image: &JsSourceImage,
    region: JsValue,
    options: JsValue,
) -> Result<String, JsValue> {
    let region: CropRegion = serde_wasm_bindgen::from_value(region).map_err(to_js_error)?;
    crop_with(image, region, &config_from_js(options)?).map_err(to_js_error)
}

/// Rotate an already decoded image, returning the data URL directly.
#[wasm_bindgen]
pub fn rotate_decoded(
    image: &JsSourceImage,
    angle_degrees: f64,
    options: JsValue,
) -> Result<String, JsValue> {
    rotate_with(image, angle_degrees.into(), &config_from_js(options)?).map_err(to_js_error)
}

fn crop_with(
    image: &JsSourceImage,
    region: CropRegion,
    config: &TransformConfig,
) -> Result<String, TransformError> {
    ImageTransform::from_config(config)
        .crop(image.source(), region)
        .map(EncodedImage::into_string)
}

fn rotate_with(
    image: &JsSourceImage,
    angle: RotationAngle,
    config: &TransformConfig,
) -> Result<String, TransformError> {
    ImageTransform::from_config(config)
        .rotate(image.source(), angle)
        .map(EncodedImage::into_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use snapform_core::{decode_data_url, OutputFormat, SourceImage};

    fn test_image(width: u32, height: u32) -> JsSourceImage {
        let pixels: Vec<u8> = (0..(width * height * 4) as usize)
            .map(|i| (i % 256) as u8)
            .collect();
        JsSourceImage::from_source(SourceImage::from_rgba(width, height, pixels).unwrap())
    }

    fn png() -> TransformConfig {
        TransformConfig::new().with_output(OutputFormat::Png)
    }

    #[test]
    fn test_crop_with() {
        let url = crop_with(&test_image(400, 300), CropRegion::new(50, 50, 100, 80), &png()).unwrap();
        assert!(url.starts_with("data:image/png;base64,"));
        assert_eq!(decode_data_url(&url).unwrap().dimensions(), (100, 80));
    }

    #[test]
    fn test_crop_with_zero_region() {
        let result = crop_with(&test_image(10, 10), CropRegion::new(0, 0, 0, 5), &png());
        assert!(matches!(result, Err(TransformError::InvalidRegion { .. })));
    }

    #[test]
    fn test_rotate_with_quarter_turn() {
        let url = rotate_with(&test_image(100, 50), RotationAngle::degrees(90.0), &png()).unwrap();
        assert_eq!(decode_data_url(&url).unwrap().dimensions(), (50, 100));
    }

    #[test]
    fn test_rotate_with_free_angle_keeps_extent() {
        let url = rotate_with(&test_image(100, 50), RotationAngle::degrees(15.0), &png()).unwrap();
        assert_eq!(decode_data_url(&url).unwrap().dimensions(), (100, 50));
    }

    #[test]
    fn test_default_output_is_jpeg() {
        let url = rotate_with(&test_image(8, 8), RotationAngle::degrees(0.0), &TransformConfig::default()).unwrap();
        assert!(url.starts_with("data:image/jpeg;base64,"));
    }
}

#[cfg(all(test, target_arch = "wasm32"))]
mod wasm_tests {
    use super::*;
    use wasm_bindgen_futures::JsFuture;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    fn png_source() -> JsValue {
        let img = snapform_core::SourceImage::from_rgba(4, 2, vec![90u8; 4 * 2 * 4]).unwrap();
        JsValue::from_str(
            EncodedImage::encode(&img, snapform_core::OutputFormat::Png)
                .unwrap()
                .as_str(),
        )
    }

    fn region(x: u32, y: u32, width: u32, height: u32) -> JsValue {
        serde_wasm_bindgen::to_value(&CropRegion::new(x, y, width, height)).unwrap()
    }

    #[wasm_bindgen_test]
    async fn test_crop_image_resolves() {
        let job = crop_image(png_source(), region(1, 0, 2, 2), JsValue::UNDEFINED).unwrap();
        let url = JsFuture::from(job.promise()).await.unwrap().as_string().unwrap();
        assert!(url.starts_with("data:image/jpeg;base64,"));
    }

    #[wasm_bindgen_test]
    async fn test_rotate_image_from_promise() {
        let source = Promise::resolve(&png_source());
        let job = rotate_image(source.into(), 90.0, JsValue::UNDEFINED).unwrap();
        let url = JsFuture::from(job.promise()).await.unwrap().as_string().unwrap();
        let decoded = snapform_core::decode_data_url(&url).unwrap();
        assert_eq!(decoded.dimensions(), (2, 4));
    }

    #[wasm_bindgen_test]
    async fn test_cancel_rejects() {
        let job = rotate_image(png_source(), 90.0, JsValue::UNDEFINED).unwrap();
        job.cancel();
        let err = JsFuture::from(job.promise()).await.unwrap_err();
        assert_eq!(err.as_string().unwrap(), "Operation cancelled");
    }

    #[wasm_bindgen_test]
    fn test_malformed_region_throws() {
        let result = crop_image(png_source(), JsValue::from_str("nope"), JsValue::UNDEFINED);
        assert!(result.is_err());
    }
}
