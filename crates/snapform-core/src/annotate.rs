//! Free-hand annotation strokes.
//!
//! A stroke is a polyline drawn with a round pen. Points are in the
//! coordinates of the canvas being drawn on, so strokes recorded against a
//! rotated preview land where the user drew them.
//!
//! Rasterisation covers every pixel whose centre lies within `width / 2` of
//! the polyline and composites the stroke colour over it (source-over).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::decode::SourceImage;
use crate::surface::{RasterSurface, SurfaceFactory};
use crate::transform::ensure_source;
use crate::TransformError;

/// Default pen colour for new strokes.
pub const DEFAULT_LINE_COLOR: StrokeColor = StrokeColor([0, 0, 0, 255]);

/// Default pen width in pixels.
pub const DEFAULT_LINE_WIDTH: f32 = 5.0;

/// Errors from building strokes.
#[derive(Debug, Error, PartialEq)]
pub enum AnnotateError {
    #[error("Invalid colour: {0:?} (expected #rgb, #rrggbb or #rrggbbaa)")]
    InvalidColor(String),

    #[error("Invalid line width: {0}")]
    InvalidWidth(f32),
}

/// An RGBA pen colour, written as a CSS hex colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct StrokeColor(pub [u8; 4]);

impl StrokeColor {
    pub fn rgba(self) -> [u8; 4] {
        self.0
    }
}

impl Default for StrokeColor {
    fn default() -> Self {
        DEFAULT_LINE_COLOR
    }
}

impl FromStr for StrokeColor {
    type Err = AnnotateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || AnnotateError::InvalidColor(s.to_string());
        let hex = s.trim().strip_prefix('#').ok_or_else(invalid)?;
        if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(invalid());
        }

        let nibble = |i: usize| u8::from_str_radix(&hex[i..i + 1], 16).map(|v| v * 17);
        let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16);

        let rgba = match hex.len() {
            3 => [nibble(0), nibble(1), nibble(2), Ok(255)],
            6 => [byte(0), byte(2), byte(4), Ok(255)],
            8 => [byte(0), byte(2), byte(4), byte(6)],
            _ => return Err(invalid()),
        };

        let mut out = [0u8; 4];
        for (dst, channel) in out.iter_mut().zip(rgba) {
            *dst = channel.map_err(|_| invalid())?;
        }
        Ok(Self(out))
    }
}

impl TryFrom<String> for StrokeColor {
    type Error = AnnotateError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl fmt::Display for StrokeColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [r, g, b, a] = self.0;
        if a == 255 {
            write!(f, "#{r:02x}{g:02x}{b:02x}")
        } else {
            write!(f, "#{r:02x}{g:02x}{b:02x}{a:02x}")
        }
    }
}

impl From<StrokeColor> for String {
    fn from(color: StrokeColor) -> Self {
        color.to_string()
    }
}

/// A point in canvas pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// A recorded pen stroke.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stroke {
    pub color: StrokeColor,
    pub width: f32,
    pub points: Vec<Point>,
}

impl Stroke {
    /// Start an empty stroke. The width must be positive and finite.
    pub fn new(color: StrokeColor, width: f32) -> Result<Self, AnnotateError> {
        if !width.is_finite() || width <= 0.0 {
            return Err(AnnotateError::InvalidWidth(width));
        }
        Ok(Self {
            color,
            width,
            points: Vec::new(),
        })
    }

    pub fn push(&mut self, point: Point) {
        self.points.push(point);
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Distance from `p` to the nearest point of the polyline.
    pub fn distance_to(&self, p: Point) -> f32 {
        self.segments()
            .map(|(a, b)| segment_distance(p, a, b))
            .fold(f32::INFINITY, f32::min)
    }

    /// The polyline's segments. A single point is a zero-length segment.
    fn segments(&self) -> impl Iterator<Item = (Point, Point)> + '_ {
        let single = match self.points.as_slice() {
            [only] => Some((*only, *only)),
            _ => None,
        };
        single
            .into_iter()
            .chain(self.points.windows(2).map(|seg| (seg[0], seg[1])))
    }
}

/// Pixel bounds of `points` padded by `radius`, clipped to `width` x `height`.
fn padded_bounds(
    points: &[Point],
    radius: f32,
    width: u32,
    height: u32,
) -> Option<(u32, u32, u32, u32)> {
    let (mut min_x, mut min_y) = (f32::INFINITY, f32::INFINITY);
    let (mut max_x, mut max_y) = (f32::NEG_INFINITY, f32::NEG_INFINITY);
    for p in points {
        min_x = min_x.min(p.x - radius);
        min_y = min_y.min(p.y - radius);
        max_x = max_x.max(p.x + radius);
        max_y = max_y.max(p.y + radius);
    }

    if max_x < 0.0 || max_y < 0.0 || min_x >= width as f32 || min_y >= height as f32 {
        return None;
    }

    let x0 = min_x.floor().max(0.0) as u32;
    let y0 = min_y.floor().max(0.0) as u32;
    let x1 = (max_x.ceil() as u32).min(width - 1);
    let y1 = (max_y.ceil() as u32).min(height - 1);
    Some((x0, y0, x1, y1))
}

#[inline]
fn distance(a: Point, b: Point) -> f32 {
    ((a.x - b.x).powi(2) + (a.y - b.y).powi(2)).sqrt()
}

fn segment_distance(p: Point, a: Point, b: Point) -> f32 {
    let (dx, dy) = (b.x - a.x, b.y - a.y);
    let len_sq = dx * dx + dy * dy;
    if len_sq == 0.0 {
        return distance(p, a);
    }
    let t = (((p.x - a.x) * dx + (p.y - a.y) * dy) / len_sq).clamp(0.0, 1.0);
    distance(p, Point::new(a.x + t * dx, a.y + t * dy))
}

/// Pixels covered by one stroke, over the stroke's clipped bounding box.
struct CoverageMask {
    x0: u32,
    y0: u32,
    x1: u32,
    y1: u32,
    covered: Vec<bool>,
}

impl CoverageMask {
    fn new((x0, y0, x1, y1): (u32, u32, u32, u32)) -> Self {
        let len = (x1 - x0 + 1) as usize * (y1 - y0 + 1) as usize;
        Self {
            x0,
            y0,
            x1,
            y1,
            covered: vec![false; len],
        }
    }

    #[inline]
    fn index(&self, x: u32, y: u32) -> usize {
        (y - self.y0) as usize * (self.x1 - self.x0 + 1) as usize + (x - self.x0) as usize
    }

    /// Mark pixels whose centre lies within `radius` of segment `a`-`b`,
    /// scanning only the segment's own padded bounds.
    fn mark_segment(&mut self, a: Point, b: Point, radius: f32) {
        let Some((sx0, sy0, sx1, sy1)) =
            padded_bounds(&[a, b], radius, self.x1 + 1, self.y1 + 1)
        else {
            return;
        };

        for y in sy0.max(self.y0)..=sy1 {
            for x in sx0.max(self.x0)..=sx1 {
                let centre = Point::new(x as f32 + 0.5, y as f32 + 0.5);
                if segment_distance(centre, a, b) <= radius {
                    let i = self.index(x, y);
                    self.covered[i] = true;
                }
            }
        }
    }

    fn covered_pixels(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        let row = (self.x1 - self.x0 + 1) as usize;
        self.covered
            .iter()
            .enumerate()
            .filter(|(_, covered)| **covered)
            .map(move |(i, _)| {
                (
                    self.x0 + (i % row) as u32,
                    self.y0 + (i / row) as u32,
                )
            })
    }
}

/// Draw one stroke onto a surface.
///
/// Each covered pixel is blended exactly once, so a translucent pen does not
/// darken where the polyline overlaps itself.
pub fn draw_stroke<S: RasterSurface>(surface: &mut S, stroke: &Stroke) {
    if stroke.is_empty() {
        return;
    }
    let (w, h) = (surface.width(), surface.height());
    if w == 0 || h == 0 {
        return;
    }

    let radius = stroke.width / 2.0;
    let Some(bounds) = padded_bounds(&stroke.points, radius, w, h) else {
        return;
    };

    let mut mask = CoverageMask::new(bounds);
    for (a, b) in stroke.segments() {
        mask.mark_segment(a, b, radius);
    }

    let color = stroke.color.rgba();
    for (x, y) in mask.covered_pixels() {
        surface.blend_pixel(x, y, color);
    }
}

/// Copy `image` onto a fresh surface and draw `strokes` over it in order.
pub fn apply_strokes<F: SurfaceFactory>(
    factory: &F,
    image: &SourceImage,
    strokes: &[Stroke],
) -> Result<SourceImage, TransformError> {
    ensure_source(image)?;
    if strokes.iter().all(Stroke::is_empty) {
        return Ok(image.clone());
    }

    let (w, h) = image.dimensions();
    let mut surface = factory.create(w, h)?;
    for y in 0..h {
        surface.write_span(0, y, image.row(y));
    }
    for stroke in strokes {
        draw_stroke(&mut surface, stroke);
    }

    tracing::debug!(strokes = strokes.len(), "annotated image");
    surface.into_image()
}
