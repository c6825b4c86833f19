use std::{collections::BTreeMap, fs::File, io::BufReader, path::Path};

use anyhow::Context as _;
use serde::{Deserialize, Serialize};

use crate::{
    foundation::error::{PanelError, PanelResult},
    placement::decision::PlacementOverride,
};

/// Per-asset placement overrides keyed by file name.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OverrideTable {
    by_asset: BTreeMap<String, PlacementOverride>,
}

impl OverrideTable {
    /// Load an overrides JSON object `{ "<file name>": { "placement": ... } }`.
    pub fn from_path(path: &Path) -> PanelResult<Self> {
        let f = File::open(path)
            .with_context(|| format!("open overrides '{}'", path.display()))
            .map_err(|e| PanelError::configuration(format!("{e:#}")))?;
        Self::from_reader(BufReader::new(f))
    }

    /// Parse and validate overrides JSON.
    pub fn from_reader(r: impl std::io::Read) -> PanelResult<Self> {
        let table: Self = serde_json::from_reader(r)
            .map_err(|e| PanelError::configuration(format!("parse overrides JSON: {e}")))?;
        table.validate()?;
        Ok(table)
    }

    /// Reject keys that cannot match an asset file name.
    pub fn validate(&self) -> PanelResult<()> {
        for key in self.by_asset.keys() {
            if key.trim().is_empty() || key.contains(['/', '\\']) {
                return Err(PanelError::configuration(format!(
                    "override key \"{key}\" must be a bare file name"
                )));
            }
        }
        Ok(())
    }

    /// Add or replace the override for `asset`.
    pub fn insert(&mut self, asset: impl Into<String>, rule: PlacementOverride) {
        self.by_asset.insert(asset.into(), rule);
    }

    /// Override for an asset file name, if any.
    pub fn get(&self, asset: &str) -> Option<&PlacementOverride> {
        self.by_asset.get(asset)
    }

    /// Number of overrides.
    pub fn len(&self) -> usize {
        self.by_asset.len()
    }

    /// `true` when no overrides are defined.
    pub fn is_empty(&self) -> bool {
        self.by_asset.is_empty()
    }
}
