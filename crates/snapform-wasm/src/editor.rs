//! Photo editor WASM bindings.
//!
//! `JsPhotoEditor` holds the editing panel's state between pointer events
//! and renders the picked photo when the user saves.
//!
//! # Example (TypeScript)
//!
//! ```typescript
//! const editor = new JsPhotoEditor();
//! editor.brightness = 120;
//! editor.line_color = "#ff0000";
//!
//! canvas.onpointerdown = (e) => editor.begin_stroke(e.offsetX, e.offsetY);
//! canvas.onpointermove = (e) => editor.extend_stroke(e.offsetX, e.offsetY);
//! canvas.onpointerup = () => editor.end_stroke();
//!
//! const dataUrl = await editor.render(capturedDataUrl).promise;
//! ```

use serde::{Deserialize, Serialize};
use snapform_core::editor::PhotoEditor;
use snapform_core::{
    FilterSettings, MemorySurfaceFactory, OutputFormat, Point, RotationAngle, StrokeColor,
};
use wasm_bindgen::prelude::*;

use crate::source::resolve_source;
use crate::transform::JsPendingTransform;
use crate::types::{to_js_error, JsSourceImage};

/// Panel settings as stored by the host page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EditorSettings {
    filters: FilterSettings,
    rotate: RotationAngle,
    flip_horizontal: bool,
    flip_vertical: bool,
    line_color: StrokeColor,
    line_width: f32,
    output: OutputFormat,
}

impl EditorSettings {
    fn of(editor: &PhotoEditor) -> Self {
        Self {
            filters: editor.filters,
            rotate: editor.rotate,
            flip_horizontal: editor.flip_horizontal,
            flip_vertical: editor.flip_vertical,
            line_color: editor.line_color,
            line_width: editor.line_width,
            output: editor.output,
        }
    }

    fn apply_to(self, editor: &mut PhotoEditor) {
        editor.filters = self.filters;
        editor.rotate = self.rotate;
        editor.flip_horizontal = self.flip_horizontal;
        editor.flip_vertical = self.flip_vertical;
        editor.line_color = self.line_color;
        editor.line_width = self.line_width;
        editor.output = self.output;
    }
}

/// Photo editor wrapper for JavaScript
#[wasm_bindgen]
pub struct JsPhotoEditor {
    inner: PhotoEditor,
    factory: MemorySurfaceFactory,
}

#[wasm_bindgen]
impl JsPhotoEditor {
    /// Create an editor with default settings (PNG output)
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self {
            inner: PhotoEditor::new(),
            factory: MemorySurfaceFactory::default(),
        }
    }

    /// Get brightness (percent)
    #[wasm_bindgen(getter)]
    pub fn brightness(&self) -> f32 {
        self.inner.filters.brightness
    }

    /// Set brightness (percent)
    #[wasm_bindgen(setter)]
    pub fn set_brightness(&mut self, value: f32) {
        self.inner.filters.brightness = value;
    }

    /// Get contrast (percent)
    #[wasm_bindgen(getter)]
    pub fn contrast(&self) -> f32 {
        self.inner.filters.contrast
    }

    /// Set contrast (percent)
    #[wasm_bindgen(setter)]
    pub fn set_contrast(&mut self, value: f32) {
        self.inner.filters.contrast = value;
    }

    /// Get saturation (percent)
    #[wasm_bindgen(getter)]
    pub fn saturate(&self) -> f32 {
        self.inner.filters.saturate
    }

    /// Set saturation (percent)
    #[wasm_bindgen(setter)]
    pub fn set_saturate(&mut self, value: f32) {
        self.inner.filters.saturate = value;
    }

    /// Get grayscale (percent)
    #[wasm_bindgen(getter)]
    pub fn grayscale(&self) -> f32 {
        self.inner.filters.grayscale
    }

    /// Set grayscale (percent)
    #[wasm_bindgen(setter)]
    pub fn set_grayscale(&mut self, value: f32) {
        self.inner.filters.grayscale = value;
    }

    /// Get rotation in degrees, clockwise
    #[wasm_bindgen(getter)]
    pub fn rotate(&self) -> f64 {
        self.inner.rotate.as_degrees()
    }

    /// Set rotation in degrees, clockwise
    #[wasm_bindgen(setter)]
    pub fn set_rotate(&mut self, value: f64) {
        self.inner.rotate = RotationAngle::degrees(value);
    }

    #[wasm_bindgen(getter)]
    pub fn flip_horizontal(&self) -> bool {
        self.inner.flip_horizontal
    }

    #[wasm_bindgen(setter)]
    pub fn set_flip_horizontal(&mut self, value: bool) {
        self.inner.flip_horizontal = value;
    }

    #[wasm_bindgen(getter)]
    pub fn flip_vertical(&self) -> bool {
        self.inner.flip_vertical
    }

    #[wasm_bindgen(setter)]
    pub fn set_flip_vertical(&mut self, value: bool) {
        self.inner.flip_vertical = value;
    }

    /// Get pen colour as a hex string
    #[wasm_bindgen(getter)]
    pub fn line_color(&self) -> String {
        self.inner.line_color.to_string()
    }

    /// Set pen colour (`#rgb`, `#rrggbb` or `#rrggbbaa`)
    #[wasm_bindgen(setter)]
    pub fn set_line_color(&mut self, value: String) -> Result<(), JsValue> {
        self.inner.line_color = value.parse().map_err(to_js_error)?;
        Ok(())
    }

    /// Get pen width in pixels
    #[wasm_bindgen(getter)]
    pub fn line_width(&self) -> f32 {
        self.inner.line_width
    }

    /// Set pen width in pixels
    #[wasm_bindgen(setter)]
    pub fn set_line_width(&mut self, value: f32) {
        self.inner.line_width = value;
    }

    /// Number of finished strokes
    #[wasm_bindgen(getter)]
    pub fn stroke_count(&self) -> usize {
        self.inner.strokes().len()
    }

    /// Start a stroke at canvas position `(x, y)`.
    pub fn begin_stroke(&mut self, x: f32, y: f32) -> Result<(), JsValue> {
        self.inner.begin_stroke(Point::new(x, y)).map_err(to_js_error)
    }

    pub fn extend_stroke(&mut self, x: f32, y: f32) {
        self.inner.extend_stroke(Point::new(x, y));
    }

    pub fn end_stroke(&mut self) {
        self.inner.end_stroke();
    }

    /// Remove the last stroke. Returns false if there was none.
    pub fn undo_stroke(&mut self) -> bool {
        self.inner.undo_stroke().is_some()
    }

    pub fn clear_strokes(&mut self) {
        self.inner.clear_strokes();
    }

    /// Restore filters, rotation and flips to their defaults
    pub fn reset_filters(&mut self) {
        self.inner.reset_filters();
    }

    /// Render a source (data URL, bytes, or a promise of either).
    pub fn render(&self, source: JsValue) -> JsPendingTransform {
        JsPendingTransform::spawn(
            self.inner
                .render_pending(self.factory, resolve_source(source)),
        )
    }

    /// Render an already decoded image, returning the data URL directly.
    pub fn render_decoded(&self, image: &JsSourceImage) -> Result<String, JsValue> {
        self.inner
            .render(&self.factory, image.source())
            .map(|encoded| encoded.into_string())
            .map_err(to_js_error)
    }

    /// Serialize panel settings to JSON for storage
    pub fn to_json(&self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(&EditorSettings::of(&self.inner)).map_err(to_js_error)
    }

    /// Restore panel settings. Strokes are left as they are.
    pub fn load_json(&mut self, value: JsValue) -> Result<(), JsValue> {
        let settings: EditorSettings = serde_wasm_bindgen::from_value(value).map_err(to_js_error)?;
        settings.apply_to(&mut self.inner);
        Ok(())
    }
}

impl Default for JsPhotoEditor {
    fn default() -> Self {
        Self::new()
    }
}
