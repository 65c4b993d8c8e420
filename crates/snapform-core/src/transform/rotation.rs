//! Image rotation.
//!
//! Angles are in degrees, positive = clockwise (the canvas convention).
//!
//! Quarter turns (multiples of 90°) are exact pixel remaps: 90° and 270°
//! swap width and height, 0° and 180° keep them. Any other angle is drawn
//! about the image centre onto a canvas with the extent of the nearest
//! quarter turn, so corners that fall outside are clipped and the uncovered
//! area stays transparent.
//!
//! For free angles the inverse mapping of a clockwise rotation θ is:
//! ```text
//! src_x =  dx * cos(θ) + dy * sin(θ) + src_cx
//! src_y = -dx * sin(θ) + dy * cos(θ) + src_cy
//! ```
//! where `(dx, dy)` is the destination pixel centre relative to the
//! destination centre.

use std::ops::Add;

use serde::{Deserialize, Serialize};

use super::ensure_source;
use crate::decode::SourceImage;
use crate::surface::{RasterSurface, SurfaceFactory};
use crate::TransformError;

/// Tolerance, in degrees, for treating an angle as a quarter turn.
const QUARTER_TURN_TOLERANCE: f64 = 0.001;

/// A rotation in degrees, clockwise. Any finite value is accepted; callers
/// may keep accumulating (for example adding 90 on every click).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RotationAngle(f64);

impl RotationAngle {
    pub fn degrees(degrees: f64) -> Self {
        Self(degrees)
    }

    /// The raw (unnormalized) degree value.
    pub fn as_degrees(self) -> f64 {
        self.0
    }

    /// The angle folded into `[0, 360)`.
    pub fn normalized(self) -> f64 {
        let n = self.0.rem_euclid(360.0);
        // rem_euclid can round up to exactly 360.0 for tiny negative inputs
        if n >= 360.0 {
            0.0
        } else {
            n
        }
    }

    /// Number of clockwise quarter turns (0-3) if the angle is a multiple of 90°.
    pub fn quarter_turns(self) -> Option<u8> {
        if !self.0.is_finite() {
            return None;
        }
        let turns = self.normalized() / 90.0;
        let nearest = turns.round();
        if (turns - nearest).abs() * 90.0 < QUARTER_TURN_TOLERANCE {
            Some((nearest as u32 % 4) as u8)
        } else {
            None
        }
    }

    /// Number of clockwise quarter turns (0-3) closest to this angle.
    pub fn nearest_quarter_turns(self) -> u8 {
        ((self.normalized() / 90.0).round() as u32 % 4) as u8
    }

    /// True if the destination canvas swaps width and height.
    pub fn swaps_dimensions(self) -> bool {
        self.nearest_quarter_turns() % 2 == 1
    }
}

impl From<f64> for RotationAngle {
    fn from(degrees: f64) -> Self {
        Self(degrees)
    }
}

impl Add<f64> for RotationAngle {
    type Output = RotationAngle;

    fn add(self, degrees: f64) -> RotationAngle {
        RotationAngle(self.0 + degrees)
    }
}

/// Compute the destination canvas size for a rotation.
///
/// The canvas only ever swaps its extents: it takes the size of the nearest
/// quarter turn.
///
/// # Example
///
/// ```
/// use snapform_core::transform::{compute_rotated_bounds, RotationAngle};
///
/// assert_eq!(compute_rotated_bounds(100, 50, RotationAngle::degrees(90.0)), (50, 100));
/// assert_eq!(compute_rotated_bounds(100, 50, RotationAngle::degrees(180.0)), (100, 50));
/// ```
pub fn compute_rotated_bounds(width: u32, height: u32, angle: RotationAngle) -> (u32, u32) {
    if angle.swaps_dimensions() {
        (height, width)
    } else {
        (width, height)
    }
}

/// Rotate an image clockwise about its centre.
///
/// # Errors
///
/// - `InvalidSource` if the image holds no pixels
/// - `InvalidAngle` if the angle is NaN or infinite
/// - `SurfaceTooLarge` if the factory refuses the destination size
pub fn apply_rotation<F: SurfaceFactory>(
    factory: &F,
    image: &SourceImage,
    angle: RotationAngle,
) -> Result<SourceImage, TransformError> {
    ensure_source(image)?;
    if !angle.as_degrees().is_finite() {
        return Err(TransformError::InvalidAngle(angle.as_degrees()));
    }

    match angle.quarter_turns() {
        // Identity: the source buffer is immutable, so sharing it is safe
        Some(0) => Ok(image.clone()),
        Some(turns) => rotate_quarter_turns(factory, image, turns),
        None => rotate_free(factory, image, angle),
    }
}

fn rotate_quarter_turns<F: SurfaceFactory>(
    factory: &F,
    image: &SourceImage,
    turns: u8,
) -> Result<SourceImage, TransformError> {
    let (w, h) = image.dimensions();
    let (dst_w, dst_h) = if turns % 2 == 1 { (h, w) } else { (w, h) };
    let mut surface = factory.create(dst_w, dst_h)?;

    let src = image.pixels();
    let stride = w as usize * 4;
    let mut row = vec![0u8; dst_w as usize * 4];

    for dst_y in 0..dst_h {
        for dst_x in 0..dst_w {
            let (sx, sy) = match turns {
                1 => (dst_y, h - 1 - dst_x),
                2 => (w - 1 - dst_x, h - 1 - dst_y),
                _ => (w - 1 - dst_y, dst_x),
            };
            let si = sy as usize * stride + sx as usize * 4;
            let di = dst_x as usize * 4;
            row[di..di + 4].copy_from_slice(&src[si..si + 4]);
        }
        surface.write_span(0, dst_y, &row);
    }

    surface.into_image()
}

fn rotate_free<F: SurfaceFactory>(
    factory: &F,
    image: &SourceImage,
    angle: RotationAngle,
) -> Result<SourceImage, TransformError> {
    let (src_w, src_h) = (image.width() as f64, image.height() as f64);
    let (dst_w, dst_h) = compute_rotated_bounds(image.width(), image.height(), angle);
    let mut surface = factory.create(dst_w, dst_h)?;

    tracing::debug!(
        degrees = angle.as_degrees(),
        dst_w,
        dst_h,
        "rotating by a non quarter-turn angle"
    );

    let theta = angle.as_degrees().to_radians();
    let (sin, cos) = theta.sin_cos();

    let src_cx = src_w / 2.0;
    let src_cy = src_h / 2.0;
    let dst_cx = dst_w as f64 / 2.0;
    let dst_cy = dst_h as f64 / 2.0;

    for dst_y in 0..dst_h {
        for dst_x in 0..dst_w {
            let dx = dst_x as f64 + 0.5 - dst_cx;
            let dy = dst_y as f64 + 0.5 - dst_cy;

            let src_x = dx * cos + dy * sin + src_cx;
            let src_y = -dx * sin + dy * cos + src_cy;

            // Shift from continuous coordinates to pixel-centre indices
            if let Some(pixel) = sample_bilinear(image, src_x - 0.5, src_y - 0.5) {
                surface.put_pixel(dst_x, dst_y, pixel);
            }
        }
    }

    surface.into_image()
}

/// Get a pixel as [f64; 4] from an image at the given coordinates.
#[inline]
fn get_pixel_f64(image: &SourceImage, px: usize, py: usize) -> [f64; 4] {
    let idx = (py * image.width() as usize + px) * 4;
    let p = &image.pixels()[idx..idx + 4];
    [p[0] as f64, p[1] as f64, p[2] as f64, p[3] as f64]
}

/// Sample a pixel using bilinear interpolation.
///
/// `x`/`y` are in pixel-centre index space. Returns `None` when the point
/// lies more than half a pixel outside the image; edge pixels are extended
/// across that half pixel.
fn sample_bilinear(image: &SourceImage, x: f64, y: f64) -> Option<[u8; 4]> {
    let (w, h) = (image.width() as f64, image.height() as f64);

    if x < -0.5 || y < -0.5 || x >= w - 0.5 || y >= h - 0.5 {
        return None;
    }

    let x = x.clamp(0.0, w - 1.0);
    let y = y.clamp(0.0, h - 1.0);

    let x0 = x.floor() as usize;
    let y0 = y.floor() as usize;
    let x1 = (x0 + 1).min(image.width() as usize - 1);
    let y1 = (y0 + 1).min(image.height() as usize - 1);

    let fx = x - x0 as f64;
    let fy = y - y0 as f64;

    let p00 = get_pixel_f64(image, x0, y0);
    let p10 = get_pixel_f64(image, x1, y0);
    let p01 = get_pixel_f64(image, x0, y1);
    let p11 = get_pixel_f64(image, x1, y1);

    let samples = [p00, p10, p01, p11];
    let weights = [
        (1.0 - fx) * (1.0 - fy),
        fx * (1.0 - fy),
        (1.0 - fx) * fy,
        fx * fy,
    ];

    // Interpolate premultiplied colour so transparent neighbours add no tint
    let mut alpha = 0.0;
    let mut rgb = [0.0f64; 3];
    for (p, weight) in samples.iter().zip(weights) {
        let a = p[3] * weight;
        alpha += a;
        for i in 0..3 {
            rgb[i] += p[i] * a;
        }
    }

    if alpha <= 0.0 {
        return Some([0, 0, 0, 0]);
    }

    let mut result = [0u8; 4];
    for i in 0..3 {
        result[i] = (rgb[i] / alpha).clamp(0.0, 255.0).round() as u8;
    }
    result[3] = alpha.clamp(0.0, 255.0).round() as u8;

    Some(result)
}


// ============================================================================
// Property-Based Tests
// ============================================================================
