//! CSS-style colour filters
//!
//! Applies the editor's four filters to RGBA pixel data, with the same
//! semantics as the CSS filter functions of the same name.
//!
//! ## Filter Order
//! 1. Brightness
//! 2. Contrast
//! 3. Saturate
//! 4. Grayscale
//!
//! Values are clamped to [0, 1] after each filter. Alpha is never touched.

use serde::{Deserialize, Serialize};

use crate::decode::SourceImage;
use crate::TransformError;

/// Filter amounts in percent, as set by the editor's sliders.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterSettings {
    /// Brightness (0 to 200, default 100)
    pub brightness: f32,
    /// Contrast (0 to 200, default 100)
    pub contrast: f32,
    /// Saturation (0 to 200, default 100)
    pub saturate: f32,
    /// Grayscale (0 to 100, default 0)
    pub grayscale: f32,
}

impl Default for FilterSettings {
    fn default() -> Self {
        Self {
            brightness: 100.0,
            contrast: 100.0,
            saturate: 100.0,
            grayscale: 0.0,
        }
    }
}

impl FilterSettings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if all values are at their defaults
    pub fn is_default(&self) -> bool {
        *self == Self::default()
    }

    /// Apply the filters to a copy of `image`.
    pub fn apply(&self, image: &SourceImage) -> Result<SourceImage, TransformError> {
        if self.is_default() {
            return Ok(image.clone());
        }
        let mut pixels = image.pixels().to_vec();
        apply_filters(&mut pixels, self);
        SourceImage::from_rgba(image.width(), image.height(), pixels)
    }
}

/// Apply all filters to RGBA pixel data in place.
///
/// # Arguments
/// * `pixels` - RGBA pixel data (4 bytes per pixel, row-major order)
/// * `settings` - The filter amounts to apply
pub fn apply_filters(pixels: &mut [u8], settings: &FilterSettings) {
    if settings.is_default() {
        return;
    }

    let brightness = (settings.brightness / 100.0).max(0.0);
    let contrast = (settings.contrast / 100.0).max(0.0);
    let saturate = (settings.saturate / 100.0).max(0.0);
    let grayscale = (settings.grayscale / 100.0).clamp(0.0, 1.0);

    for chunk in pixels.chunks_exact_mut(4) {
        let mut rgb = [
            chunk[0] as f32 / 255.0,
            chunk[1] as f32 / 255.0,
            chunk[2] as f32 / 255.0,
        ];

        rgb = clamp_rgb(apply_brightness(rgb, brightness));
        rgb = clamp_rgb(apply_contrast(rgb, contrast));
        rgb = clamp_rgb(apply_saturate(rgb, saturate));
        rgb = clamp_rgb(apply_grayscale(rgb, grayscale));

        for (dst, v) in chunk.iter_mut().zip(rgb) {
            *dst = (v * 255.0).round() as u8;
        }
    }
}

#[inline]
fn clamp_rgb([r, g, b]: [f32; 3]) -> [f32; 3] {
    [r.clamp(0.0, 1.0), g.clamp(0.0, 1.0), b.clamp(0.0, 1.0)]
}

/// Formula: `output = input * amount`
#[inline]
fn apply_brightness([r, g, b]: [f32; 3], amount: f32) -> [f32; 3] {
    if amount == 1.0 {
        return [r, g, b];
    }
    [r * amount, g * amount, b * amount]
}

/// Formula: `output = (input - 0.5) * amount + 0.5`
#[inline]
fn apply_contrast([r, g, b]: [f32; 3], amount: f32) -> [f32; 3] {
    if amount == 1.0 {
        return [r, g, b];
    }
    [
        (r - 0.5) * amount + 0.5,
        (g - 0.5) * amount + 0.5,
        (b - 0.5) * amount + 0.5,
    ]
}

/// CSS `saturate()` colour matrix.
#[inline]
fn apply_saturate([r, g, b]: [f32; 3], s: f32) -> [f32; 3] {
    if s == 1.0 {
        return [r, g, b];
    }
    [
        (0.213 + 0.787 * s) * r + (0.715 - 0.715 * s) * g + (0.072 - 0.072 * s) * b,
        (0.213 - 0.213 * s) * r + (0.715 + 0.285 * s) * g + (0.072 - 0.072 * s) * b,
        (0.213 - 0.213 * s) * r + (0.715 - 0.715 * s) * g + (0.072 + 0.928 * s) * b,
    ]
}

/// Grayscale matrix, interpolating towards Rec. 709 luminance.
#[inline]
fn apply_grayscale([r, g, b]: [f32; 3], amount: f32) -> [f32; 3] {
    if amount == 0.0 {
        return [r, g, b];
    }
    let a = 1.0 - amount;
    [
        (0.2126 + 0.7874 * a) * r + (0.7152 - 0.7152 * a) * g + (0.0722 - 0.0722 * a) * b,
        (0.2126 - 0.2126 * a) * r + (0.7152 + 0.2848 * a) * g + (0.0722 - 0.0722 * a) * b,
        (0.2126 - 0.2126 * a) * r + (0.7152 - 0.7152 * a) * g + (0.0722 + 0.9278 * a) * b,
    ]
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn prop_alpha_preserved(
            pixel in prop::array::uniform4(any::<u8>()),
            brightness in 0.0f32..200.0,
            contrast in 0.0f32..200.0,
            saturate in 0.0f32..200.0,
            grayscale in 0.0f32..100.0,
        ) {
            let mut pixels = pixel.to_vec();
            let settings = FilterSettings { brightness, contrast, saturate, grayscale };
            apply_filters(&mut pixels, &settings);
            prop_assert_eq!(pixels[3], pixel[3]);
        }

        #[test]
        fn prop_dimming_never_brightens(
            pixel in prop::array::uniform4(any::<u8>()),
            brightness in 0.0f32..100.0,
        ) {
            let mut pixels = pixel.to_vec();
            let settings = FilterSettings { brightness, ..Default::default() };
            apply_filters(&mut pixels, &settings);
            for c in 0..3 {
                prop_assert!(pixels[c] <= pixel[c]);
            }
        }
    }
}
