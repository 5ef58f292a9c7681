//! Raster and vector export of the rendered scene.

use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::error::ExportError;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExportFormat {
    Png,
    Svg,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ExportOutcome {
    pub path: PathBuf,
    pub format: ExportFormat,
    /// Why the PNG could not be produced, when SVG was written instead.
    pub fallback_reason: Option<String>,
}

/// Rasterizes an SVG document at `scale` and encodes it as PNG.
#[cfg(feature = "png")]
pub fn export_png(svg: &str, scale: f32) -> Result<Vec<u8>, ExportError> {
    use resvg::{tiny_skia, usvg};

    if !scale.is_finite() || scale <= 0.0 {
        return Err(ExportError::InvalidScale(scale));
    }

    let mut options = usvg::Options::default();
    options.fontdb_mut().load_system_fonts();
    let tree = usvg::Tree::from_str(svg, &options).map_err(|e| ExportError::Svg(e.to_string()))?;

    let size = tree.size().to_int_size();
    let width = (size.width() as f32 * scale).ceil().max(1.0) as u32;
    let height = (size.height() as f32 * scale).ceil().max(1.0) as u32;
    let mut pixmap =
        tiny_skia::Pixmap::new(width, height).ok_or(ExportError::Pixmap { width, height })?;
    resvg::render(
        &tree,
        tiny_skia::Transform::from_scale(scale, scale),
        &mut pixmap.as_mut(),
    );
    pixmap
        .encode_png()
        .map_err(|e| ExportError::Encode(e.to_string()))
}

#[cfg(not(feature = "png"))]
pub fn export_png(_svg: &str, _scale: f32) -> Result<Vec<u8>, ExportError> {
    Err(ExportError::Unsupported)
}

/// Writes `svg` to `path`: as-is for `.svg`, rasterized otherwise. When
/// rasterization fails the SVG is written next to `path` instead.
pub fn export_image(svg: &str, path: &Path, scale: f32) -> Result<ExportOutcome, ExportError> {
    if path.extension().is_some_and(|e| e.eq_ignore_ascii_case("svg")) {
        std::fs::write(path, svg)?;
        info!(path = %path.display(), "exported svg");
        return Ok(ExportOutcome {
            path: path.to_path_buf(),
            format: ExportFormat::Svg,
            fallback_reason: None,
        });
    }

    match export_png(svg, scale) {
        Ok(bytes) => {
            std::fs::write(path, bytes)?;
            info!(path = %path.display(), scale, "exported png");
            Ok(ExportOutcome {
                path: path.to_path_buf(),
                format: ExportFormat::Png,
                fallback_reason: None,
            })
        }
        Err(e) => {
            let svg_path = path.with_extension("svg");
            warn!(error = %e, path = %svg_path.display(), "png export failed; writing svg instead");
            std::fs::write(&svg_path, svg)?;
            Ok(ExportOutcome {
                path: svg_path,
                format: ExportFormat::Svg,
                fallback_reason: Some(e.to_string()),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unparsable_svg_falls_back_to_svg_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.png");
        let outcome = export_image("not an svg", &path, 2.0).unwrap();
        assert_eq!(outcome.format, ExportFormat::Svg);
        assert!(outcome.fallback_reason.is_some());
        assert_eq!(outcome.path, dir.path().join("out.svg"));
        assert_eq!(std::fs::read_to_string(&outcome.path).unwrap(), "not an svg");
    }

    #[test]
    fn svg_extension_writes_vector_directly() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.svg");
        let outcome = export_image("<svg/>", &path, 1.0).unwrap();
        assert_eq!(outcome.format, ExportFormat::Svg);
        assert!(outcome.fallback_reason.is_none());
    }

    #[cfg(feature = "png")]
    #[test]
    fn rejects_non_positive_scale() {
        assert!(matches!(
            export_png("<svg xmlns=\"http://www.w3.org/2000/svg\"/>", 0.0),
            Err(ExportError::InvalidScale(_))
        ));
    }
}
