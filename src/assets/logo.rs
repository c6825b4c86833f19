use std::{path::Path, sync::Arc};

use anyhow::Context as _;

use crate::foundation::error::{PanelError, PanelResult};

/// Decoded logo pixels or vector tree.
#[derive(Clone, Debug)]
pub enum LogoKind {
    /// Straight-alpha RGBA8 raster.
    Raster(Arc<image::RgbaImage>),
    /// Parsed SVG.
    Svg(Arc<usvg::Tree>),
}

/// A logo prepared once per batch and shared by every job.
#[derive(Clone, Debug)]
pub struct PreparedLogo {
    /// Logo identity (file name).
    pub id: String,
    /// Intrinsic width in pixels (SVG user units for vectors).
    pub width: f64,
    /// Intrinsic height in pixels (SVG user units for vectors).
    pub height: f64,
    /// Decoded content.
    pub kind: LogoKind,
}

impl PreparedLogo {
    /// Load a PNG/JPEG/... raster or an `.svg` file.
    ///
    /// The logo is part of the batch configuration, so failures are configuration errors.
    pub fn load(path: &Path) -> PanelResult<Self> {
        let bytes = std::fs::read(path)
            .with_context(|| format!("read logo '{}'", path.display()))
            .map_err(|e| PanelError::configuration(format!("{e:#}")))?;
        let id = crate::assets::source::asset_file_name(path);

        let is_svg = path
            .extension()
            .and_then(|s| s.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("svg"));
        if is_svg {
            Self::from_svg_bytes(id, &bytes)
        } else {
            Self::from_raster_bytes(id, &bytes)
        }
    }

    /// Decode raster logo bytes.
    pub fn from_raster_bytes(id: impl Into<String>, bytes: &[u8]) -> PanelResult<Self> {
        let id = id.into();
        let rgba = image::load_from_memory(bytes)
            .map_err(|e| PanelError::configuration(format!("decode logo '{id}': {e}")))?
            .to_rgba8();
        let (w, h) = rgba.dimensions();
        if w == 0 || h == 0 {
            return Err(PanelError::configuration(format!(
                "logo '{id}' has no pixels"
            )));
        }
        Ok(Self {
            id,
            width: f64::from(w),
            height: f64::from(h),
            kind: LogoKind::Raster(Arc::new(rgba)),
        })
    }

    /// Parse SVG logo bytes.
    pub fn from_svg_bytes(id: impl Into<String>, bytes: &[u8]) -> PanelResult<Self> {
        let id = id.into();
        let opts = usvg::Options::default();
        let tree = usvg::Tree::from_data(bytes, &opts)
            .map_err(|e| PanelError::configuration(format!("parse logo svg '{id}': {e}")))?;
        let size = tree.size();
        Ok(Self {
            id,
            width: f64::from(size.width()),
            height: f64::from(size.height()),
            kind: LogoKind::Svg(Arc::new(tree)),
        })
    }

    /// Height-over-width ratio of the intrinsic size.
    pub fn aspect(&self) -> f64 {
        self.height / self.width
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/logo.rs"]
mod tests;
