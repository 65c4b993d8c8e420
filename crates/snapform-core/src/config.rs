//! Transform configuration.
//!
//! The UI passes this as a plain object; every field is optional and falls
//! back to the defaults below.

use serde::{Deserialize, Serialize};

use crate::encode::OutputFormat;

/// Largest canvas side browsers accept.
pub const DEFAULT_MAX_SURFACE_DIMENSION: u32 = 32_767;

/// Largest canvas area browsers accept (16384 x 16384).
pub const DEFAULT_MAX_SURFACE_AREA: u64 = 268_435_456;

/// Settings shared by every transform call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TransformConfig {
    /// Format of the produced data URL.
    pub output: OutputFormat,
    /// Maximum width or height of a destination surface.
    pub max_surface_dimension: u32,
    /// Maximum pixel count of a destination surface.
    pub max_surface_area: u64,
}

impl Default for TransformConfig {
    fn default() -> Self {
        Self {
            output: OutputFormat::default(),
            max_surface_dimension: DEFAULT_MAX_SURFACE_DIMENSION,
            max_surface_area: DEFAULT_MAX_SURFACE_AREA,
        }
    }
}

impl TransformConfig {
    /// Create a config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the output format.
    pub fn with_output(mut self, output: OutputFormat) -> Self {
        self.output = output;
        self
    }
}
