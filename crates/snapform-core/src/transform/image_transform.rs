//! Crop/rotate to data URL.

use std::future::Future;

use super::{apply_crop, apply_rotation, CropRegion, RotationAngle};
use crate::config::TransformConfig;
use crate::decode::SourceImage;
use crate::encode::{EncodedImage, OutputFormat};
use crate::pending::Pending;
use crate::surface::{MemorySurfaceFactory, SurfaceFactory};
use crate::TransformError;

/// Stateless crop and rotate operations producing encoded data URLs.
///
/// Each call allocates its own destination surface from the factory; the
/// source is only read. A transform can be cloned freely and shared by any
/// number of pending operations.
///
/// # Example
///
/// ```ignore
/// use snapform_core::{CropRegion, ImageTransform, PendingImage};
///
/// let transform = ImageTransform::new();
/// let cropped = transform.crop(&image, CropRegion::new(50, 50, 100, 80))?;
/// assert_eq!(cropped.dimensions(), (100, 80));
///
/// let rotated = transform.rotate_pending(PendingImage::from_data_url(url), 90.0).await?;
/// ```
#[derive(Debug, Clone)]
pub struct ImageTransform<F = MemorySurfaceFactory> {
    factory: F,
    output: OutputFormat,
}

impl ImageTransform<MemorySurfaceFactory> {
    /// Transform with in-memory surfaces and default settings.
    pub fn new() -> Self {
        Self::from_config(&TransformConfig::default())
    }

    /// Transform with in-memory surfaces limited as configured.
    pub fn from_config(config: &TransformConfig) -> Self {
        Self {
            factory: MemorySurfaceFactory::from_config(config),
            output: config.output,
        }
    }
}

impl Default for ImageTransform<MemorySurfaceFactory> {
    fn default() -> Self {
        Self::new()
    }
}

impl<F: SurfaceFactory> ImageTransform<F> {
    /// Transform drawing into surfaces from `factory`.
    pub fn with_factory(factory: F, output: OutputFormat) -> Self {
        Self { factory, output }
    }

    /// Output format of produced data URLs.
    pub fn output(&self) -> OutputFormat {
        self.output
    }

    /// Surface factory in use.
    pub fn factory(&self) -> &F {
        &self.factory
    }

    /// Crop `source` to `region` and encode the result.
    ///
    /// The output is always `region.width` x `region.height`; parts of the
    /// region outside the source are blank.
    pub fn crop(
        &self,
        source: &SourceImage,
        region: CropRegion,
    ) -> Result<EncodedImage, TransformError> {
        tracing::debug!(?region, source = ?source.dimensions(), "crop");
        let cropped = apply_crop(&self.factory, source, region)?;
        self.encode(&cropped)
    }

    /// Rotate `source` clockwise about its centre and encode the result.
    pub fn rotate(
        &self,
        source: &SourceImage,
        angle: impl Into<RotationAngle>,
    ) -> Result<EncodedImage, TransformError> {
        let angle = angle.into();
        tracing::debug!(
            degrees = angle.as_degrees(),
            source = ?source.dimensions(),
            "rotate"
        );
        let rotated = apply_rotation(&self.factory, source, angle)?;
        self.encode(&rotated)
    }

    /// Encode an image with this transform's output format.
    pub fn encode(&self, image: &SourceImage) -> Result<EncodedImage, TransformError> {
        Ok(EncodedImage::encode(image, self.output)?)
    }
}

impl<F: SurfaceFactory + Clone + 'static> ImageTransform<F> {
    /// Crop once `source` has finished decoding.
    ///
    /// The returned result resolves after decode and encode, fails with the
    /// source's decode error, or resolves to `Cancelled` if cancelled first.
    pub fn crop_pending<S>(&self, source: S, region: CropRegion) -> Pending<EncodedImage>
    where
        S: Future<Output = Result<SourceImage, TransformError>> + 'static,
    {
        let transform = self.clone();
        Pending::new(async move {
            let image = source.await?;
            transform.crop(&image, region)
        })
    }

    /// Rotate once `source` has finished decoding.
    pub fn rotate_pending<S>(
        &self,
        source: S,
        angle: impl Into<RotationAngle>,
    ) -> Pending<EncodedImage>
    where
        S: Future<Output = Result<SourceImage, TransformError>> + 'static,
    {
        let transform = self.clone();
        let angle = angle.into();
        Pending::new(async move {
            let image = source.await?;
            transform.rotate(&image, angle)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::DecodeError;
    use crate::pending::{image_channel, PendingImage};
    use futures::executor::block_on;

    fn test_image(width: u32, height: u32) -> SourceImage {
        let mut pixels = Vec::with_capacity((width * height * 4) as usize);
        for y in 0..height {
            for x in 0..width {
                pixels.extend_from_slice(&[(x % 251) as u8, (y % 251) as u8, 128, 255]);
            }
        }
        SourceImage::from_rgba(width, height, pixels).unwrap()
    }

    fn png_transform() -> ImageTransform {
        ImageTransform::from_config(&TransformConfig::new().with_output(OutputFormat::Png))
    }

    #[test]
    fn test_crop_scenario() {
        let transform = ImageTransform::new();
        let result = transform
            .crop(&test_image(400, 300), CropRegion::new(50, 50, 100, 80))
            .unwrap();

        assert_eq!(result.dimensions(), (100, 80));
        assert!(result.as_str().starts_with("data:image/jpeg;base64,"));

        let decoded = result.decode().unwrap();
        assert_eq!(decoded.dimensions(), (100, 80));
    }

    #[test]
    fn test_crop_contents_survive_png() {
        let src = test_image(400, 300);
        let result = png_transform()
            .crop(&src, CropRegion::new(50, 50, 100, 80))
            .unwrap()
            .decode()
            .unwrap();

        assert_eq!(result.pixel(0, 0), src.pixel(50, 50));
        assert_eq!(result.pixel(99, 79), src.pixel(149, 129));
    }

    #[test]
    fn test_full_crop_reproduces_source() {
        let src = test_image(64, 48);
        let transform = png_transform();

        let cropped = transform.crop(&src, CropRegion::full(&src)).unwrap();
        let direct = transform.encode(&src).unwrap();

        assert_eq!(cropped, direct);
        assert_eq!(cropped.decode().unwrap(), src);
    }

    #[test]
    fn test_out_of_bounds_crop_scenario() {
        let src = test_image(400, 300);
        let result = png_transform()
            .crop(&src, CropRegion::new(350, 250, 100, 100))
            .unwrap();

        assert_eq!(result.dimensions(), (100, 100));
        let decoded = result.decode().unwrap();
        assert_eq!(decoded.pixel(99, 99), Some([0, 0, 0, 0]));
        assert_eq!(decoded.pixel(10, 10), src.pixel(360, 260));
    }

    #[test]
    fn test_rotate_scenario() {
        let result = ImageTransform::new()
            .rotate(&test_image(400, 300), 90.0)
            .unwrap();
        assert_eq!(result.dimensions(), (300, 400));
    }

    #[test]
    fn test_rotate_zero_keeps_dimensions() {
        let result = ImageTransform::new()
            .rotate(&test_image(400, 300), 0.0)
            .unwrap();
        assert_eq!(result.dimensions(), (400, 300));
    }

    #[test]
    fn test_rotate_four_times_through_data_urls() {
        let transform = png_transform();
        let src = test_image(40, 30);

        let mut current = src.clone();
        for _ in 0..4 {
            current = transform.rotate(&current, 90.0).unwrap().decode().unwrap();
        }

        assert_eq!(current.dimensions(), (40, 30));
        assert_eq!(current, src);
    }

    #[test]
    fn test_crop_pending_waits_for_decode() {
        let transform = ImageTransform::new();
        let (loader, source) = image_channel();
        let pending = transform.crop_pending(source, CropRegion::new(0, 0, 2, 2));

        let png = png_transform().encode(&test_image(5, 5)).unwrap();
        loader.complete_data_url(png.as_str());

        let result = block_on(pending).unwrap();
        assert_eq!(result.dimensions(), (2, 2));
    }

    #[test]
    fn test_rotate_pending_from_data_url() {
        let png = png_transform().encode(&test_image(6, 4)).unwrap();
        let pending = ImageTransform::new()
            .rotate_pending(PendingImage::from_data_url(png.into_string()), 90.0);

        let result = block_on(pending).unwrap();
        assert_eq!(result.dimensions(), (4, 6));
    }

    #[test]
    fn test_rotate_pending_decode_failure() {
        let (loader, source) = image_channel();
        let pending = ImageTransform::new().rotate_pending(source, 90.0);
        loader.fail("404");

        assert!(matches!(
            block_on(pending),
            Err(TransformError::Decode(DecodeError::LoadFailed(_)))
        ));
    }

    #[test]
    fn test_pending_cancelled_before_load() {
        let (loader, source) = image_channel();
        let pending = ImageTransform::new().crop_pending(source, CropRegion::new(0, 0, 1, 1));
        let handle = pending.cancel_handle();

        handle.cancel();
        assert!(matches!(block_on(pending), Err(TransformError::Cancelled)));
        // The pending result dropped its source, so the loader sees it
        assert!(loader.is_cancelled());
    }

    #[test]
    fn test_pending_unset_source() {
        let pending = ImageTransform::new().rotate_pending(PendingImage::unset(), 90.0);
        assert!(matches!(
            block_on(pending),
            Err(TransformError::InvalidSource(_))
        ));
    }

    #[test]
    fn test_pending_invalid_region_after_load() {
        let pending = ImageTransform::new()
            .crop_pending(PendingImage::ready(test_image(4, 4)), CropRegion::new(0, 0, 0, 0));
        assert!(matches!(
            block_on(pending),
            Err(TransformError::InvalidRegion { .. })
        ));
    }
}
