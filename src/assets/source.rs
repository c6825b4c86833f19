use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::Context as _;

use crate::foundation::error::{PanelError, PanelResult};

/// File extensions accepted as source images (lowercase).
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp", "gif", "bmp", "tif", "tiff"];

/// A decoded source photograph.
///
/// Decoded once per job and dropped when the job ends. Pixels are opaque RGB8; any alpha in the
/// source file is discarded.
#[derive(Clone, Debug)]
pub struct SourceImage {
    /// Asset identity: the file name, used for override lookup.
    pub id: String,
    /// Originating file path.
    pub path: PathBuf,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Row-major RGB8 pixels.
    pub pixels: Arc<image::RgbImage>,
}

impl SourceImage {
    /// Wrap an already decoded buffer.
    pub fn from_rgb(
        id: impl Into<String>,
        path: impl Into<PathBuf>,
        pixels: image::RgbImage,
    ) -> PanelResult<Self> {
        let id = id.into();
        let (width, height) = pixels.dimensions();
        if width == 0 || height == 0 {
            return Err(PanelError::image_analysis(format!(
                "source image '{id}' has no pixels"
            )));
        }
        Ok(Self {
            id,
            path: path.into(),
            width,
            height,
            pixels: Arc::new(pixels),
        })
    }

    /// Decode encoded image bytes (any format the `image` crate recognizes).
    pub fn decode(
        id: impl Into<String>,
        path: impl Into<PathBuf>,
        bytes: &[u8],
    ) -> PanelResult<Self> {
        let id = id.into();
        let dyn_img = image::load_from_memory(bytes)
            .map_err(|e| PanelError::image_analysis(format!("decode '{id}': {e}")))?;
        Self::from_rgb(id, path, dyn_img.to_rgb8())
    }

    /// Read and decode a file. The id is the file name.
    #[tracing::instrument(level = "debug")]
    pub fn open(path: &Path) -> PanelResult<Self> {
        let bytes = std::fs::read(path).map_err(|e| {
            PanelError::image_analysis(format!("read '{}': {e}", path.display()))
        })?;
        Self::decode(asset_file_name(path), path, &bytes)
    }
}

/// File name of an asset path, used as its identity.
pub fn asset_file_name(path: &Path) -> String {
    path.file_name()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Return `true` when `path` carries a recognized image extension.
pub fn is_image_path(path: &Path) -> bool {
    let Some(ext) = path.extension().and_then(|s| s.to_str()) else {
        return false;
    };
    let ext = ext.to_ascii_lowercase();
    IMAGE_EXTENSIONS.contains(&ext.as_str())
}

/// List image files directly inside `dir`, sorted by file name.
///
/// A missing or unreadable directory is a configuration error: no job can run without it.
pub fn list_images(dir: &Path) -> PanelResult<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(PanelError::configuration(format!(
            "asset directory '{}' does not exist",
            dir.display()
        )));
    }

    let rd = std::fs::read_dir(dir)
        .with_context(|| format!("read asset directory '{}'", dir.display()))
        .map_err(|e| PanelError::configuration(format!("{e:#}")))?;

    let mut out = Vec::new();
    for entry in rd.flatten() {
        let path = entry.path();
        if path.is_file() && is_image_path(&path) {
            out.push(path);
        }
    }
    out.sort_by_key(|p| asset_file_name(p));
    Ok(out)
}

#[cfg(test)]
#[path = "../../tests/unit/assets/source.rs"]
mod tests;
