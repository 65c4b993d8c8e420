//! Raster surfaces that transforms draw into.
//!
//! Transforms never allocate pixel buffers directly. They ask a
//! [`SurfaceFactory`] for a destination, write into it, and read the finished
//! image back. The default [`MemorySurfaceFactory`] keeps everything in a
//! plain RGBA buffer, which keeps the transforms testable without a display;
//! a host can inject its own factory (for example one backed by a canvas).

use crate::config::TransformConfig;
use crate::decode::SourceImage;
use crate::TransformError;

/// A writable RGBA pixel grid. New surfaces start fully transparent.
pub trait RasterSurface {
    /// Surface width in pixels.
    fn width(&self) -> u32;

    /// Surface height in pixels.
    fn height(&self) -> u32;

    /// Read the RGBA value at `(x, y)`. Callers stay in bounds.
    fn get_pixel(&self, x: u32, y: u32) -> [u8; 4];

    /// Overwrite the RGBA value at `(x, y)`. Callers stay in bounds.
    fn put_pixel(&mut self, x: u32, y: u32, rgba: [u8; 4]);

    /// Overwrite a horizontal run of pixels starting at `(x, y)`.
    ///
    /// `rgba` holds whole pixels and must fit within the row.
    fn write_span(&mut self, x: u32, y: u32, rgba: &[u8]) {
        for (i, px) in rgba.chunks_exact(4).enumerate() {
            self.put_pixel(x + i as u32, y, [px[0], px[1], px[2], px[3]]);
        }
    }

    /// Composite `rgba` over the existing pixel (source-over).
    fn blend_pixel(&mut self, x: u32, y: u32, rgba: [u8; 4]) {
        let src_a = rgba[3] as f32 / 255.0;
        if src_a >= 1.0 {
            self.put_pixel(x, y, rgba);
            return;
        }
        if src_a <= 0.0 {
            return;
        }

        let dst = self.get_pixel(x, y);
        let dst_a = dst[3] as f32 / 255.0;
        let out_a = src_a + dst_a * (1.0 - src_a);

        let mut out = [0u8; 4];
        for i in 0..3 {
            let c = (rgba[i] as f32 * src_a + dst[i] as f32 * dst_a * (1.0 - src_a)) / out_a;
            out[i] = c.round().clamp(0.0, 255.0) as u8;
        }
        out[3] = (out_a * 255.0).round() as u8;
        self.put_pixel(x, y, out);
    }

    /// Finish drawing and read the surface back as an image.
    fn into_image(self) -> Result<SourceImage, TransformError>
    where
        Self: Sized;
}

/// Creates destination surfaces.
pub trait SurfaceFactory {
    /// Surface type produced by this factory.
    type Surface: RasterSurface;

    /// Allocate a transparent surface of `width` x `height`.
    fn create(&self, width: u32, height: u32) -> Result<Self::Surface, TransformError>;
}

/// In-memory RGBA surface.
#[derive(Debug, Clone)]
pub struct PixelSurface {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl PixelSurface {
    /// Create a transparent surface.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![0u8; (width as usize) * (height as usize) * 4],
        }
    }

    #[inline]
    fn index(&self, x: u32, y: u32) -> usize {
        ((y as usize) * (self.width as usize) + x as usize) * 4
    }
}

impl RasterSurface for PixelSurface {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    fn get_pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let i = self.index(x, y);
        [
            self.pixels[i],
            self.pixels[i + 1],
            self.pixels[i + 2],
            self.pixels[i + 3],
        ]
    }

    #[inline]
    fn put_pixel(&mut self, x: u32, y: u32, rgba: [u8; 4]) {
        let i = self.index(x, y);
        self.pixels[i..i + 4].copy_from_slice(&rgba);
    }

    fn write_span(&mut self, x: u32, y: u32, rgba: &[u8]) {
        let i = self.index(x, y);
        self.pixels[i..i + rgba.len()].copy_from_slice(rgba);
    }

    fn into_image(self) -> Result<SourceImage, TransformError> {
        SourceImage::from_rgba(self.width, self.height, self.pixels)
    }
}

/// Factory for [`PixelSurface`]s with browser-like size limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemorySurfaceFactory {
    max_dimension: u32,
    max_area: u64,
}

impl MemorySurfaceFactory {
    /// Create a factory with explicit limits.
    pub fn new(max_dimension: u32, max_area: u64) -> Self {
        Self {
            max_dimension,
            max_area,
        }
    }

    /// Create a factory using the limits of a [`TransformConfig`].
    pub fn from_config(config: &TransformConfig) -> Self {
        Self::new(config.max_surface_dimension, config.max_surface_area)
    }
}

impl Default for MemorySurfaceFactory {
    fn default() -> Self {
        Self::from_config(&TransformConfig::default())
    }
}

impl SurfaceFactory for MemorySurfaceFactory {
    type Surface = PixelSurface;

    fn create(&self, width: u32, height: u32) -> Result<PixelSurface, TransformError> {
        let area = width as u64 * height as u64;
        if width == 0
            || height == 0
            || width > self.max_dimension
            || height > self.max_dimension
            || area > self.max_area
        {
            tracing::warn!(width, height, "refusing to allocate surface");
            return Err(TransformError::SurfaceTooLarge { width, height });
        }
        Ok(PixelSurface::new(width, height))
    }
}
