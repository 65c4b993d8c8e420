//! Resolving JavaScript image sources.
//!
//! A source handed to `crop_image` and friends may be:
//!
//! - a data URL string
//! - a `Uint8Array` holding an encoded JPEG or PNG
//! - a `Promise` resolving to either of the above (an image still loading)
//!
//! Each becomes a future that resolves once the image is decoded.

use futures::future::LocalBoxFuture;
use futures::FutureExt;
use js_sys::{Promise, Uint8Array};
use snapform_core::{decode_bytes, decode_data_url, DecodeError, SourceImage, TransformError};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;

pub(crate) type SourceFuture = LocalBoxFuture<'static, Result<SourceImage, TransformError>>;

/// Turn a JavaScript source into a future for its decoded image.
pub(crate) fn resolve_source(source: JsValue) -> SourceFuture {
    match source.dyn_into::<Promise>() {
        Ok(promise) => async move {
            let loaded = JsFuture::from(promise)
                .await
                .map_err(|e| DecodeError::LoadFailed(describe_rejection(&e)))?;
            decode_loaded(loaded)
        }
        .boxed_local(),
        Err(value) => async move { decode_loaded(value) }.boxed_local(),
    }
}

/// Decode a loaded value: a data URL string or encoded bytes.
fn decode_loaded(value: JsValue) -> Result<SourceImage, TransformError> {
    if let Some(url) = value.as_string() {
        return Ok(decode_data_url(&url)?);
    }
    if let Some(bytes) = value.dyn_ref::<Uint8Array>() {
        return Ok(decode_bytes(&bytes.to_vec())?);
    }
    if value.is_undefined() || value.is_null() {
        return Err(TransformError::InvalidSource(
            "no image has been selected".to_string(),
        ));
    }
    Err(TransformError::InvalidSource(
        "expected a data URL string or a Uint8Array".to_string(),
    ))
}

fn describe_rejection(reason: &JsValue) -> String {
    reason
        .as_string()
        .or_else(|| {
            reason
                .dyn_ref::<js_sys::Error>()
                .map(|e| String::from(e.message()))
        })
        .unwrap_or_else(|| "image failed to load".to_string())
}
