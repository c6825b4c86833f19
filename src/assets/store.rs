use std::sync::Arc;

use crate::{
    assets::{logo::PreparedLogo, source::SourceImage},
    foundation::error::{PanelError, PanelResult},
};

/// Decoded inputs a rasterizer may draw for one job.
///
/// IO is front-loaded here so rasterizers stay IO-free apart from their font database.
#[derive(Clone, Debug, Default)]
pub struct PreparedAssets {
    background: Option<Arc<SourceImage>>,
    logo: Option<Arc<PreparedLogo>>,
}

impl PreparedAssets {
    /// Bundle a job's background and the batch logo.
    pub fn new(background: Option<Arc<SourceImage>>, logo: Option<Arc<PreparedLogo>>) -> Self {
        Self { background, logo }
    }

    /// Background image whose id must match `id`.
    pub fn background(&self, id: &str) -> PanelResult<&SourceImage> {
        match &self.background {
            Some(img) if img.id == id => Ok(img.as_ref()),
            Some(img) => Err(PanelError::render(format!(
                "template references background '{id}' but '{}' was prepared",
                img.id
            ))),
            None => Err(PanelError::render(format!(
                "template references background '{id}' but none was prepared"
            ))),
        }
    }

    /// Logo whose id must match `id`.
    pub fn logo(&self, id: &str) -> PanelResult<&PreparedLogo> {
        match &self.logo {
            Some(logo) if logo.id == id => Ok(logo.as_ref()),
            _ => Err(PanelError::render(format!(
                "template references logo '{id}' which was not prepared"
            ))),
        }
    }
}
