use serde::{Deserialize, Serialize};

use crate::foundation::core::Rgb8;
use crate::foundation::error::{PanelError, PanelResult};

/// Static content bundle for one brand campaign.
///
/// Colors are parsed at deserialization time, so a loaded campaign always carries valid brand
/// colors.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Campaign {
    /// Stable campaign id, used as the source id of campaign jobs.
    pub id: String,
    /// Headline.
    pub title: String,
    /// Secondary line under the headline.
    #[serde(default)]
    pub subtitle: String,
    /// Short kicker above the headline.
    #[serde(default)]
    pub tagline: String,
    /// Call-to-action button label. Empty hides the button.
    #[serde(default)]
    pub cta: String,
    /// Primary brand color (solid background fallback).
    pub primary_color: Rgb8,
    /// Accent brand color (CTA button, tagline).
    pub accent_color: Rgb8,
    /// Explicit background asset file name; bypasses theme matching.
    #[serde(default)]
    pub background: Option<String>,
    /// Candidate background asset file names. Empty means "any image in the asset directory".
    #[serde(default)]
    pub assets: Vec<String>,
    /// Theme keywords matched against asset file names.
    #[serde(default)]
    pub keywords: Vec<String>,
    /// Footer/watermark text; falls back to the catalog brand.
    #[serde(default)]
    pub footer: Option<String>,
}

impl Campaign {
    /// Minimal campaign with empty secondary copy.
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        primary_color: Rgb8,
        accent_color: Rgb8,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            subtitle: String::new(),
            tagline: String::new(),
            cta: String::new(),
            primary_color,
            accent_color,
            background: None,
            assets: Vec::new(),
            keywords: Vec::new(),
            footer: None,
        }
    }

    /// Validate content fields.
    pub fn validate(&self) -> PanelResult<()> {
        if self.id.trim().is_empty() {
            return Err(PanelError::configuration("campaign id must be non-empty"));
        }
        if self.title.trim().is_empty() {
            return Err(PanelError::configuration(format!(
                "campaign '{}' must have a non-empty title",
                self.id
            )));
        }
        for name in self.background.iter().chain(self.assets.iter()) {
            if name.trim().is_empty() || name.contains(['/', '\\']) {
                return Err(PanelError::configuration(format!(
                    "campaign '{}' asset reference \"{name}\" must be a bare file name",
                    self.id
                )));
            }
        }
        Ok(())
    }
}
