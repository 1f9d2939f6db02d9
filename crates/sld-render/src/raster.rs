//! SVG → PNG rasterization.
//!
//! The [`Rasterizer`] trait is the seam the editor exports through; the
//! default implementation uses resvg on an opaque white pixmap.

use resvg::tiny_skia;
use resvg::usvg;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RasterError {
    #[error("failed to parse SVG: {0}")]
    Parse(String),
    #[error("computed image dimensions are zero")]
    EmptySurface,
    #[error("failed to allocate a {0}x{1} pixmap")]
    Allocate(u32, u32),
    #[error("failed to encode PNG: {0}")]
    Encode(String),
}

/// Turns an SVG document into encoded PNG bytes.
pub trait Rasterizer {
    /// Rasterize at `scale` × the SVG's intrinsic size.
    fn rasterize(&self, svg: &str, scale: f32) -> Result<Vec<u8>, RasterError>;
}

/// resvg-backed rasterizer with a font database loaded once.
pub struct ResvgRasterizer {
    fontdb: Arc<usvg::fontdb::Database>,
}

impl ResvgRasterizer {
    pub fn new() -> Self {
        let mut fontdb = usvg::fontdb::Database::new();
        fontdb.load_system_fonts();
        log::debug!("rasterizer loaded {} font face(s)", fontdb.len());
        Self {
            fontdb: Arc::new(fontdb),
        }
    }
}

impl Default for ResvgRasterizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Rasterizer for ResvgRasterizer {
    fn rasterize(&self, svg: &str, scale: f32) -> Result<Vec<u8>, RasterError> {
        let opts = usvg::Options {
            font_family: "sans-serif".to_string(),
            fontdb: Arc::clone(&self.fontdb),
            ..usvg::Options::default()
        };
        let tree =
            usvg::Tree::from_str(svg, &opts).map_err(|e| RasterError::Parse(e.to_string()))?;

        let size = tree.size();
        let px_w = (size.width() * scale).ceil() as u32;
        let px_h = (size.height() * scale).ceil() as u32;
        if px_w == 0 || px_h == 0 {
            return Err(RasterError::EmptySurface);
        }

        let mut pixmap =
            tiny_skia::Pixmap::new(px_w, px_h).ok_or(RasterError::Allocate(px_w, px_h))?;
        pixmap.fill(tiny_skia::Color::WHITE);
        resvg::render(
            &tree,
            tiny_skia::Transform::from_scale(scale, scale),
            &mut pixmap.as_mut(),
        );

        pixmap
            .encode_png()
            .map_err(|e| RasterError::Encode(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const PNG_MAGIC: &[u8] = b"\x89PNG\r\n\x1a\n";

    #[test]
    fn rasterizes_at_requested_scale() {
        let svg = r##"<svg xmlns="http://www.w3.org/2000/svg" width="40" height="30"><rect x="5" y="5" width="10" height="10" fill="#111827"/></svg>"##;
        let png = ResvgRasterizer::new().rasterize(svg, 2.0).unwrap();
        assert!(png.starts_with(PNG_MAGIC));
        let pixmap = tiny_skia::Pixmap::decode_png(&png).unwrap();
        assert_eq!((pixmap.width(), pixmap.height()), (80, 60));
        // Unpainted corner is opaque white.
        let corner = pixmap.pixel(0, 0).unwrap();
        assert_eq!((corner.red(), corner.green(), corner.blue(), corner.alpha()), (255, 255, 255, 255));
    }

    #[test]
    fn malformed_svg_is_a_parse_error() {
        let err = ResvgRasterizer::new().rasterize("<svg", 2.0).unwrap_err();
        assert!(matches!(err, RasterError::Parse(_)));
    }
}
