use serde::{Deserialize, Serialize};

use crate::foundation::error::{PanelError, PanelResult};

/// Formats whose height exceeds this multiple of their width are classified as tall.
pub const TALL_ASPECT_THRESHOLD: f64 = 1.5;

/// Target output canvas.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OutputFormat {
    /// Stable format id, used in output file names.
    pub id: String,
    /// Canvas width in pixels.
    pub width: u32,
    /// Canvas height in pixels.
    pub height: u32,
}

impl OutputFormat {
    /// Construct a format. Call [`OutputFormat::validate`] before use in a batch.
    pub fn new(id: impl Into<String>, width: u32, height: u32) -> Self {
        Self {
            id: id.into(),
            width,
            height,
        }
    }

    /// `true` when `height > 1.5 × width` (stories, reels).
    pub fn is_tall(&self) -> bool {
        f64::from(self.height) > TALL_ASPECT_THRESHOLD * f64::from(self.width)
    }

    /// Validate id and dimensions.
    pub fn validate(&self) -> PanelResult<()> {
        if self.id.trim().is_empty() {
            return Err(PanelError::configuration("format id must be non-empty"));
        }
        if self.width == 0 || self.height == 0 {
            return Err(PanelError::configuration(format!(
                "format '{}' must have positive width/height, got {}x{}",
                self.id, self.width, self.height
            )));
        }
        Ok(())
    }
}
