//! Photo editor state and rendering.
//!
//! [`PhotoEditor`] holds everything the user has set on the editing panel
//! and renders a source image with it:
//!
//! 1. Filters (brightness, contrast, saturate, grayscale)
//! 2. Flips
//! 3. Rotation
//! 4. Annotation strokes, in the coordinates of the rotated canvas
//! 5. Encode (PNG unless configured otherwise)

use std::future::Future;

use crate::annotate::{
    apply_strokes, AnnotateError, Point, Stroke, StrokeColor, DEFAULT_LINE_WIDTH,
};
use crate::decode::SourceImage;
use crate::encode::{EncodedImage, OutputFormat};
use crate::filters::FilterSettings;
use crate::pending::Pending;
use crate::surface::SurfaceFactory;
use crate::transform::{apply_flip, apply_rotation, RotationAngle};
use crate::TransformError;

/// Editing panel state.
#[derive(Debug, Clone, PartialEq)]
pub struct PhotoEditor {
    pub filters: FilterSettings,
    pub rotate: RotationAngle,
    pub flip_horizontal: bool,
    pub flip_vertical: bool,
    /// Pen colour for strokes started from now on.
    pub line_color: StrokeColor,
    /// Pen width for strokes started from now on.
    pub line_width: f32,
    pub output: OutputFormat,
    strokes: Vec<Stroke>,
    active: Option<Stroke>,
}

impl Default for PhotoEditor {
    fn default() -> Self {
        Self {
            filters: FilterSettings::default(),
            rotate: RotationAngle::default(),
            flip_horizontal: false,
            flip_vertical: false,
            line_color: StrokeColor::default(),
            line_width: DEFAULT_LINE_WIDTH,
            output: OutputFormat::Png,
            strokes: Vec::new(),
            active: None,
        }
    }
}

impl PhotoEditor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restore filters, rotation and flips. Strokes are kept.
    pub fn reset_filters(&mut self) {
        self.filters = FilterSettings::default();
        self.rotate = RotationAngle::default();
        self.flip_horizontal = false;
        self.flip_vertical = false;
    }

    /// Start a stroke at `point` with the current pen.
    ///
    /// A stroke already in progress is finished first.
    pub fn begin_stroke(&mut self, point: Point) -> Result<(), AnnotateError> {
        let mut stroke = Stroke::new(self.line_color, self.line_width)?;
        self.end_stroke();
        stroke.push(point);
        self.active = Some(stroke);
        Ok(())
    }

    /// Add a point to the stroke in progress. Ignored when not drawing.
    pub fn extend_stroke(&mut self, point: Point) {
        if let Some(stroke) = self.active.as_mut() {
            stroke.push(point);
        }
    }

    /// Finish the stroke in progress.
    pub fn end_stroke(&mut self) {
        if let Some(stroke) = self.active.take() {
            if !stroke.is_empty() {
                self.strokes.push(stroke);
            }
        }
    }

    /// True while a stroke is in progress.
    pub fn is_drawing(&self) -> bool {
        self.active.is_some()
    }

    /// Remove the most recent finished stroke.
    pub fn undo_stroke(&mut self) -> Option<Stroke> {
        self.strokes.pop()
    }

    /// Remove all strokes, including one in progress.
    pub fn clear_strokes(&mut self) {
        self.strokes.clear();
        self.active = None;
    }

    /// Finished strokes, oldest first.
    pub fn strokes(&self) -> &[Stroke] {
        &self.strokes
    }

    /// Output dimensions for a source of `width` x `height`.
    pub fn output_dimensions(&self, width: u32, height: u32) -> (u32, u32) {
        crate::transform::compute_rotated_bounds(width, height, self.rotate)
    }

    /// Render `source` with the current state, without encoding.
    pub fn render_image<F: SurfaceFactory>(
        &self,
        factory: &F,
        source: &SourceImage,
    ) -> Result<SourceImage, TransformError> {
        tracing::debug!(
            filters = !self.filters.is_default(),
            degrees = self.rotate.as_degrees(),
            strokes = self.strokes.len(),
            "render editor"
        );
        let filtered = self.filters.apply(source)?;
        let flipped = apply_flip(factory, &filtered, self.flip_horizontal, self.flip_vertical)?;
        let rotated = apply_rotation(factory, &flipped, self.rotate)?;

        let strokes: Vec<Stroke> = self
            .strokes
            .iter()
            .chain(self.active.as_ref())
            .cloned()
            .collect();
        apply_strokes(factory, &rotated, &strokes)
    }

    /// Render `source` and encode it as the editor's save would.
    pub fn render<F: SurfaceFactory>(
        &self,
        factory: &F,
        source: &SourceImage,
    ) -> Result<EncodedImage, TransformError> {
        let image = self.render_image(factory, source)?;
        Ok(EncodedImage::encode(&image, self.output)?)
    }

    /// Render once `source` has finished decoding, using a snapshot of the
    /// current state.
    pub fn render_pending<F, S>(&self, factory: F, source: S) -> Pending<EncodedImage>
    where
        F: SurfaceFactory + 'static,
        S: Future<Output = Result<SourceImage, TransformError>> + 'static,
    {
        let editor = self.clone();
        Pending::new(async move {
            let image = source.await?;
            editor.render(&factory, &image)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pending::{image_channel, PendingImage};
    use crate::surface::MemorySurfaceFactory;
    use futures::executor::block_on;

    fn gradient(width: u32, height: u32) -> SourceImage {
        let mut pixels = Vec::with_capacity((width * height * 4) as usize);
        for y in 0..height {
            for x in 0..width {
                pixels.extend_from_slice(&[(x * 10) as u8, (y * 10) as u8, 50, 255]);
            }
        }
        SourceImage::from_rgba(width, height, pixels).unwrap()
    }

    fn factory() -> MemorySurfaceFactory {
        MemorySurfaceFactory::default()
    }

    #[test]
    fn test_default_render_is_identity_png() {
        let src = gradient(8, 6);
        let editor = PhotoEditor::new();
        let out = editor.render(&factory(), &src).unwrap();

        assert_eq!(out.mime(), "image/png");
        assert_eq!(out.decode().unwrap(), src);
    }

    #[test]
    fn test_rotate_and_flip_order() {
        let src = gradient(4, 2);
        let mut editor = PhotoEditor::new();
        editor.flip_horizontal = true;
        editor.rotate = RotationAngle::degrees(90.0);

        let out = editor.render_image(&factory(), &src).unwrap();
        assert_eq!(out.dimensions(), (2, 4));
        // Flip first: top-left becomes source (3, 0); then the quarter turn
        // moves the flipped bottom-left (3, 1) to the top-left
        assert_eq!(out.pixel(0, 0), src.pixel(3, 1));
        assert_eq!(out.pixel(1, 0), src.pixel(3, 0));
    }

    #[test]
    fn test_grayscale_render() {
        let mut editor = PhotoEditor::new();
        editor.filters.grayscale = 100.0;

        let out = editor.render_image(&factory(), &gradient(5, 5)).unwrap();
        for px in out.pixels().chunks_exact(4) {
            assert_eq!(px[0], px[1]);
            assert_eq!(px[1], px[2]);
        }
    }

    #[test]
    fn test_strokes_drawn_after_rotation() {
        let src = gradient(10, 4);
        let mut editor = PhotoEditor::new();
        editor.rotate = RotationAngle::degrees(90.0);
        editor.line_color = "#00ff00".parse().unwrap();
        editor.line_width = 2.0;

        // Output canvas is 4x10; draw along its bottom row
        editor.begin_stroke(Point::new(0.0, 9.5)).unwrap();
        editor.extend_stroke(Point::new(4.0, 9.5));
        editor.end_stroke();

        let out = editor.render_image(&factory(), &src).unwrap();
        assert_eq!(out.dimensions(), (4, 10));
        for x in 0..4 {
            assert_eq!(out.pixel(x, 9), Some([0, 255, 0, 255]));
        }
        assert_ne!(out.pixel(0, 0), Some([0, 255, 0, 255]));
    }

    #[test]
    fn test_stroke_lifecycle() {
        let mut editor = PhotoEditor::new();
        assert!(!editor.is_drawing());

        // Extending without a stroke does nothing
        editor.extend_stroke(Point::new(1.0, 1.0));
        editor.end_stroke();
        assert!(editor.strokes().is_empty());

        editor.begin_stroke(Point::new(0.0, 0.0)).unwrap();
        assert!(editor.is_drawing());
        editor.extend_stroke(Point::new(3.0, 3.0));
        editor.begin_stroke(Point::new(5.0, 5.0)).unwrap();
        editor.end_stroke();

        assert_eq!(editor.strokes().len(), 2);
        assert_eq!(editor.strokes()[0].points.len(), 2);

        let undone = editor.undo_stroke().unwrap();
        assert_eq!(undone.points, vec![Point::new(5.0, 5.0)]);

        editor.begin_stroke(Point::new(1.0, 1.0)).unwrap();
        editor.clear_strokes();
        assert!(editor.strokes().is_empty());
        assert!(!editor.is_drawing());
    }

    #[test]
    fn test_invalid_line_width() {
        let mut editor = PhotoEditor::new();
        editor.line_width = 0.0;
        assert_eq!(
            editor.begin_stroke(Point::new(0.0, 0.0)),
            Err(AnnotateError::InvalidWidth(0.0))
        );
        assert!(!editor.is_drawing());
    }

    #[test]
    fn test_reset_filters_keeps_strokes() {
        let mut editor = PhotoEditor::new();
        editor.filters.brightness = 150.0;
        editor.rotate = RotationAngle::degrees(45.0);
        editor.flip_vertical = true;
        editor.begin_stroke(Point::new(0.0, 0.0)).unwrap();
        editor.end_stroke();

        editor.reset_filters();

        assert!(editor.filters.is_default());
        assert_eq!(editor.rotate, RotationAngle::default());
        assert!(!editor.flip_vertical);
        assert_eq!(editor.strokes().len(), 1);
    }

    #[test]
    fn test_output_dimensions() {
        let mut editor = PhotoEditor::new();
        assert_eq!(editor.output_dimensions(400, 300), (400, 300));
        editor.rotate = RotationAngle::degrees(270.0);
        assert_eq!(editor.output_dimensions(400, 300), (300, 400));
    }

    #[test]
    fn test_render_pending_uses_snapshot() {
        let mut editor = PhotoEditor::new();
        editor.rotate = RotationAngle::degrees(90.0);

        let (loader, source) = image_channel();
        let pending = editor.render_pending(factory(), source);

        // Later edits do not affect the pending render
        editor.rotate = RotationAngle::default();
        loader.complete(gradient(6, 3));

        let out = block_on(pending).unwrap();
        assert_eq!(out.dimensions(), (3, 6));
    }

    #[test]
    fn test_render_pending_unset_source() {
        let pending = PhotoEditor::new().render_pending(factory(), PendingImage::unset());
        assert!(matches!(
            block_on(pending),
            Err(TransformError::InvalidSource(_))
        ));
    }
}
