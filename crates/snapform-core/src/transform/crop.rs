//! Image cropping.
//!
//! Crop regions are in source pixel coordinates. The destination surface is
//! always exactly the requested size: a region that runs past the source is
//! clipped, and the part outside the source stays transparent.
//!
//! # Coordinate System
//!
//! - (0, 0) = top-left pixel of the source
//! - `x`/`y` grow right/down

use serde::{Deserialize, Serialize};

use super::ensure_source;
use crate::decode::SourceImage;
use crate::surface::{RasterSurface, SurfaceFactory};
use crate::TransformError;

/// Rectangle to cut out of a source image, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CropRegion {
    /// Left edge.
    pub x: u32,
    /// Top edge.
    pub y: u32,
    /// Width of the region (must be positive).
    pub width: u32,
    /// Height of the region (must be positive).
    pub height: u32,
}

impl CropRegion {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// The region covering the whole image.
    pub fn full(image: &SourceImage) -> Self {
        Self::new(0, 0, image.width(), image.height())
    }

    /// Build a pixel region from normalized coordinates (0.0 to 1.0), as
    /// reported by crop widgets working in percentages.
    ///
    /// Values are clamped to the image and the result is at least 1x1.
    pub fn from_normalized(
        source_width: u32,
        source_height: u32,
        left: f64,
        top: f64,
        width: f64,
        height: f64,
    ) -> Self {
        let src_w = source_width as f64;
        let src_h = source_height as f64;

        let px_left = (left.clamp(0.0, 1.0) * src_w).round() as u32;
        let px_top = (top.clamp(0.0, 1.0) * src_h).round() as u32;
        let px_width = (width.clamp(0.0, 1.0) * src_w).round() as u32;
        let px_height = (height.clamp(0.0, 1.0) * src_h).round() as u32;

        let px_left = px_left.min(source_width.saturating_sub(1));
        let px_top = px_top.min(source_height.saturating_sub(1));
        let px_right = (px_left + px_width).min(source_width);
        let px_bottom = (px_top + px_height).min(source_height);

        Self::new(
            px_left,
            px_top,
            px_right.saturating_sub(px_left).max(1),
            px_bottom.saturating_sub(px_top).max(1),
        )
    }

    /// True if the region lies entirely inside a `width` x `height` image.
    pub fn is_within(&self, width: u32, height: u32) -> bool {
        (self.x as u64 + self.width as u64) <= width as u64
            && (self.y as u64 + self.height as u64) <= height as u64
    }
}

/// Copy `region` out of `image` into a fresh surface of the region's size.
///
/// # Errors
///
/// - `InvalidSource` if the image holds no pixels
/// - `InvalidRegion` if the region has a zero width or height
/// - `SurfaceTooLarge` if the factory refuses the destination size
pub fn apply_crop<F: SurfaceFactory>(
    factory: &F,
    image: &SourceImage,
    region: CropRegion,
) -> Result<SourceImage, TransformError> {
    ensure_source(image)?;
    if region.width == 0 || region.height == 0 {
        return Err(TransformError::InvalidRegion {
            width: region.width,
            height: region.height,
        });
    }

    let mut surface = factory.create(region.width, region.height)?;

    // Intersection of the region with the source
    let x_end = region.x.saturating_add(region.width).min(image.width());
    let y_end = region.y.saturating_add(region.height).min(image.height());

    if region.x < x_end && region.y < y_end {
        let span = (region.x as usize * 4)..(x_end as usize * 4);
        for src_y in region.y..y_end {
            surface.write_span(0, src_y - region.y, &image.row(src_y)[span.clone()]);
        }
    } else {
        tracing::debug!(?region, "crop region lies outside the source");
    }

    surface.into_image()
}


// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod proptests {
    use super::*;
    use crate::surface::MemorySurfaceFactory;
    use proptest::prelude::*;

    fn create_test_image(width: u32, height: u32) -> SourceImage {
        let mut pixels = Vec::with_capacity((width * height * 4) as usize);
        for y in 0..height {
            for x in 0..width {
                pixels.extend_from_slice(&[x as u8, y as u8, 0, 255]);
            }
        }
        SourceImage::from_rgba(width, height, pixels).unwrap()
    }

    /// Region strategy that may run past a 64x64 source.
    fn region_strategy() -> impl Strategy<Value = CropRegion> {
        (0u32..80, 0u32..80, 1u32..40, 1u32..40).prop_map(|(x, y, w, h)| CropRegion::new(x, y, w, h))
    }

    proptest! {
        /// Property: Output dimensions always equal the requested region.
        #[test]
        fn prop_output_matches_region(region in region_strategy()) {
            let img = create_test_image(64, 64);
            let result = apply_crop(&MemorySurfaceFactory::default(), &img, region).unwrap();

            prop_assert_eq!(result.dimensions(), (region.width, region.height));
        }

        /// Property: Every output pixel is either the matching source pixel or transparent.
        #[test]
        fn prop_pixels_copied_or_blank(region in region_strategy()) {
            let img = create_test_image(64, 64);
            let result = apply_crop(&MemorySurfaceFactory::default(), &img, region).unwrap();

            for y in 0..region.height {
                for x in 0..region.width {
                    let expected = img
                        .pixel(region.x + x, region.y + y)
                        .unwrap_or([0, 0, 0, 0]);
                    prop_assert_eq!(result.pixel(x, y), Some(expected));
                }
            }
        }

        /// Property: Normalized regions always land inside the image.
        #[test]
        fn prop_normalized_within_bounds(
            (width, height) in (4u32..=100, 4u32..=100),
            (left, top, w, h) in (-0.5f64..=1.5, -0.5f64..=1.5, 0.0f64..=1.5, 0.0f64..=1.5),
        ) {
            let region = CropRegion::from_normalized(width, height, left, top, w, h);

            prop_assert!(region.width >= 1 && region.height >= 1);
            prop_assert!(region.is_within(width, height));
        }
    }
}
