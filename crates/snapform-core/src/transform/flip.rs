//! Horizontal and vertical mirroring.

use super::ensure_source;
use crate::decode::SourceImage;
use crate::surface::{RasterSurface, SurfaceFactory};
use crate::TransformError;

/// Mirror an image left-to-right and/or top-to-bottom.
///
/// With both flags off the source is returned unchanged.
pub fn apply_flip<F: SurfaceFactory>(
    factory: &F,
    image: &SourceImage,
    horizontal: bool,
    vertical: bool,
) -> Result<SourceImage, TransformError> {
    ensure_source(image)?;
    if !horizontal && !vertical {
        return Ok(image.clone());
    }

    let (w, h) = image.dimensions();
    let mut surface = factory.create(w, h)?;
    let mut row = vec![0u8; w as usize * 4];

    for dst_y in 0..h {
        let src_y = if vertical { h - 1 - dst_y } else { dst_y };
        let src_row = image.row(src_y);

        if horizontal {
            for (dst, src) in row.chunks_exact_mut(4).zip(src_row.chunks_exact(4).rev()) {
                dst.copy_from_slice(src);
            }
            surface.write_span(0, dst_y, &row);
        } else {
            surface.write_span(0, dst_y, src_row);
        }
    }

    surface.into_image()
}
