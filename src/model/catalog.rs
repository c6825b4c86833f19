use std::{collections::BTreeSet, fs::File, io::BufReader, path::Path, path::PathBuf};

use anyhow::Context as _;
use serde::{Deserialize, Serialize};

use crate::{
    foundation::error::{PanelError, PanelResult},
    model::campaign::Campaign,
    model::format::OutputFormat,
};

/// How a campaign picks its background when neither an explicit background nor a theme match
/// narrows the candidates to one.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "strategy", rename_all = "kebab-case")]
pub enum SelectionStrategy {
    /// xxh3 of the campaign id with `seed`, modulo the candidate count.
    StableHash {
        /// Hash seed. Changing it reshuffles the assignment reproducibly.
        #[serde(default)]
        seed: u64,
    },
    /// First candidate in file-name order.
    First,
}

impl Default for SelectionStrategy {
    fn default() -> Self {
        Self::StableHash { seed: 0 }
    }
}

fn default_brand() -> String {
    "panelcraft".to_string()
}

/// Campaign and format tables shared read-only by every job of a batch.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    /// Brand name, used as the default footer watermark.
    #[serde(default = "default_brand")]
    pub brand: String,
    /// Optional logo file (PNG/JPEG/SVG), relative to the asset directory unless absolute.
    #[serde(default)]
    pub logo: Option<PathBuf>,
    /// Output format table.
    #[serde(default = "Catalog::builtin_formats")]
    pub formats: Vec<OutputFormat>,
    /// Campaign table.
    #[serde(default)]
    pub campaigns: Vec<Campaign>,
    /// Background selection strategy for campaign jobs.
    #[serde(default)]
    pub selection: SelectionStrategy,
}

impl Default for Catalog {
    fn default() -> Self {
        Self {
            brand: default_brand(),
            logo: None,
            formats: Self::builtin_formats(),
            campaigns: Vec::new(),
            selection: SelectionStrategy::default(),
        }
    }
}

impl Catalog {
    /// The default format table: square and portrait feed posts, a 9:16 story, and a link-card
    /// landscape.
    pub fn builtin_formats() -> Vec<OutputFormat> {
        vec![
            OutputFormat::new("square", 1080, 1080),
            OutputFormat::new("portrait", 1080, 1350),
            OutputFormat::new("story", 1080, 1920),
            OutputFormat::new("landscape", 1200, 630),
        ]
    }

    /// Load and validate a catalog JSON file.
    pub fn from_path(path: &Path) -> PanelResult<Self> {
        let f = File::open(path)
            .with_context(|| format!("open catalog '{}'", path.display()))
            .map_err(|e| PanelError::configuration(format!("{e:#}")))?;
        Self::from_reader(BufReader::new(f))
    }

    /// Parse and validate catalog JSON.
    pub fn from_reader(r: impl std::io::Read) -> PanelResult<Self> {
        let catalog: Self = serde_json::from_reader(r)
            .map_err(|e| PanelError::configuration(format!("parse catalog JSON: {e}")))?;
        catalog.validate()?;
        Ok(catalog)
    }

    /// Validate every campaign and format and reject duplicate ids.
    pub fn validate(&self) -> PanelResult<()> {
        if self.formats.is_empty() {
            return Err(PanelError::configuration(
                "catalog must define at least one format",
            ));
        }

        let mut seen = BTreeSet::new();
        for format in &self.formats {
            format.validate()?;
            if !seen.insert(format.id.as_str()) {
                return Err(PanelError::configuration(format!(
                    "duplicate format id '{}'",
                    format.id
                )));
            }
        }

        let mut seen = BTreeSet::new();
        for campaign in &self.campaigns {
            campaign.validate()?;
            if !seen.insert(campaign.id.as_str()) {
                return Err(PanelError::configuration(format!(
                    "duplicate campaign id '{}'",
                    campaign.id
                )));
            }
        }
        Ok(())
    }

    /// Lookup a campaign by id.
    pub fn campaign(&self, id: &str) -> PanelResult<&Campaign> {
        self.campaigns
            .iter()
            .find(|c| c.id == id)
            .ok_or_else(|| PanelError::configuration(format!("unknown campaign '{id}'")))
    }

    /// Lookup a format by id.
    pub fn format(&self, id: &str) -> PanelResult<&OutputFormat> {
        self.formats
            .iter()
            .find(|f| f.id == id)
            .ok_or_else(|| PanelError::configuration(format!("unknown format '{id}'")))
    }

    /// Resolve a list of format ids, or every format when `ids` is empty.
    pub fn resolve_formats(&self, ids: &[String]) -> PanelResult<Vec<&OutputFormat>> {
        if ids.is_empty() {
            return Ok(self.formats.iter().collect());
        }
        ids.iter().map(|id| self.format(id)).collect()
    }

    /// Resolve a list of campaign ids, or every campaign when `ids` is empty.
    pub fn resolve_campaigns(&self, ids: &[String]) -> PanelResult<Vec<&Campaign>> {
        if ids.is_empty() {
            return Ok(self.campaigns.iter().collect());
        }
        ids.iter().map(|id| self.campaign(id)).collect()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/model/catalog.rs"]
mod tests;
