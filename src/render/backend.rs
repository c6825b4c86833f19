use std::{
    io::Write as _,
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::Context as _;
use serde::{Deserialize, Serialize};

use crate::{
    assets::store::PreparedAssets,
    compose::template::Template,
    foundation::error::{PanelError, PanelResult},
    model::format::OutputFormat,
};

/// Default JPEG quality.
pub const DEFAULT_JPEG_QUALITY: u8 = 92;

/// On-disk encoding of rendered images.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum OutputEncoding {
    /// Baseline JPEG.
    Jpeg {
        /// Quality in `1..=100`.
        quality: u8,
    },
    /// Lossless PNG.
    Png,
}

impl Default for OutputEncoding {
    fn default() -> Self {
        OutputEncoding::Jpeg {
            quality: DEFAULT_JPEG_QUALITY,
        }
    }
}

impl OutputEncoding {
    /// File extension without the dot.
    pub fn extension(self) -> &'static str {
        match self {
            OutputEncoding::Jpeg { .. } => "jpg",
            OutputEncoding::Png => "png",
        }
    }

    /// Encode tightly packed RGB8 pixels.
    pub fn encode(self, pixels: &image::RgbImage) -> PanelResult<Vec<u8>> {
        let mut out = Vec::new();
        match self {
            OutputEncoding::Jpeg { quality } => {
                let enc = image::codecs::jpeg::JpegEncoder::new_with_quality(
                    &mut out,
                    quality.clamp(1, 100),
                );
                pixels
                    .write_with_encoder(enc)
                    .map_err(|e| PanelError::render(format!("jpeg encode failed: {e}")))?;
            }
            OutputEncoding::Png => {
                let enc = image::codecs::png::PngEncoder::new(&mut out);
                pixels
                    .write_with_encoder(enc)
                    .map_err(|e| PanelError::render(format!("png encode failed: {e}")))?;
            }
        }
        Ok(out)
    }
}

/// An encoded image ready to be written.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EncodedImage {
    /// Encoded file bytes.
    pub bytes: Vec<u8>,
    /// Pixel width.
    pub width: u32,
    /// Pixel height.
    pub height: u32,
    /// Encoding of `bytes`.
    pub encoding: OutputEncoding,
}

impl EncodedImage {
    /// Encode `pixels` with `encoding`.
    pub fn encode(pixels: &image::RgbImage, encoding: OutputEncoding) -> PanelResult<Self> {
        Ok(Self {
            bytes: encoding.encode(pixels)?,
            width: pixels.width(),
            height: pixels.height(),
            encoding,
        })
    }
}

/// Turns a [`Template`] into encoded pixels.
///
/// Implementations are shared with a render helper thread per job, so they take `&self`.
pub trait Rasterizer: Send + Sync {
    /// Short backend name for logs.
    fn name(&self) -> &'static str;

    /// Render `template` at exactly `format.width × format.height`.
    fn render(
        &self,
        template: &Template,
        format: &OutputFormat,
        assets: &PreparedAssets,
    ) -> PanelResult<EncodedImage>;
}

/// Builds fresh rasterizer instances for batch workers.
pub trait RasterizerFactory: Send + Sync {
    /// Create a rasterizer. Called once per worker and again whenever a worker recycles.
    fn create(&self) -> PanelResult<Arc<dyn Rasterizer>>;
}

/// Write `image` to `path` atomically, creating parent directories.
///
/// Bytes go to a sibling temp file that is renamed over `path`, so readers never observe a
/// truncated image.
pub fn write_encoded(path: &Path, image: &EncodedImage) -> PanelResult<()> {
    write_atomic(path, &image.bytes).map_err(|e| PanelError::render(format!("{e:#}")))
}

fn write_atomic(path: &Path, bytes: &[u8]) -> anyhow::Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }

    let tmp = temp_sibling(path);
    let res = (|| -> anyhow::Result<()> {
        let mut f = std::fs::File::create(&tmp)
            .with_context(|| format!("create temp file '{}'", tmp.display()))?;
        f.write_all(bytes)
            .with_context(|| format!("write temp file '{}'", tmp.display()))?;
        f.sync_all().ok();
        std::fs::rename(&tmp, path)
            .with_context(|| format!("rename into '{}'", path.display()))?;
        Ok(())
    })();
    if res.is_err() {
        let _ = std::fs::remove_file(&tmp);
    }
    res
}

fn temp_sibling(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".to_string());
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.subsec_nanos())
        .unwrap_or(0);
    path.with_file_name(format!(".{name}.{}-{nanos}.tmp", std::process::id()))
}

#[cfg(test)]
#[path = "../../tests/unit/render/backend.rs"]
mod tests;
