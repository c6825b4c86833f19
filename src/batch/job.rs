use std::{
    collections::BTreeSet,
    path::{Path, PathBuf},
};

use serde::Serialize;

use crate::{
    assets::source::{asset_file_name, list_images},
    foundation::error::{PanelError, PanelResult},
    foundation::hash::stable_index,
    model::campaign::Campaign,
    model::catalog::{Catalog, SelectionStrategy},
    render::backend::OutputEncoding,
};

/// What the batch iterates over.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BatchMode {
    /// One source per campaign (empty = every campaign); backgrounds are selected per campaign.
    Campaigns(Vec<String>),
    /// One source per image in the asset directory, all carrying one campaign's copy.
    Assets {
        /// Campaign providing the copy.
        campaign: String,
    },
}

/// Everything needed to plan a batch.
#[derive(Clone, Debug)]
pub struct BatchRequest {
    /// Directory holding source images (read-only).
    pub asset_dir: PathBuf,
    /// Directory receiving rendered images.
    pub out_dir: PathBuf,
    /// Format ids to render (empty = every catalog format).
    pub formats: Vec<String>,
    /// Iteration mode.
    pub mode: BatchMode,
    /// Output encoding; decides the file extension.
    pub encoding: OutputEncoding,
}

/// One unit of work: a source rendered into one format.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RenderJob {
    /// Position in the planned batch.
    pub index: usize,
    /// Slugified source id, the prefix of the output file name.
    pub source_id: String,
    /// Campaign providing copy and colors.
    pub campaign_id: String,
    /// Background image, if any.
    pub asset: Option<PathBuf>,
    /// Target format.
    pub format_id: String,
    /// Destination file.
    pub output_path: PathBuf,
}

/// Lowercase ASCII slug: alphanumerics kept, every other run collapsed to a single `-`.
pub fn slugify(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        if ch.is_ascii_alphanumeric() {
            out.push(ch.to_ascii_lowercase());
        } else if !out.is_empty() && !out.ends_with('-') {
            out.push('-');
        }
    }
    while out.ends_with('-') {
        out.pop();
    }
    if out.is_empty() {
        out.push_str("item");
    }
    out
}

/// Pick the background for `campaign` among `images` (sorted paths of the asset directory).
///
/// Order: explicit `background`, then candidates whose file name contains a campaign keyword, then
/// `strategy` over the remaining candidates. `None` means the campaign renders on its solid
/// brand color. An explicit `background` or `assets` entry missing from `images` is a
/// configuration error.
pub fn select_background(
    campaign: &Campaign,
    images: &[PathBuf],
    strategy: &SelectionStrategy,
) -> PanelResult<Option<PathBuf>> {
    let find = |name: &str| images.iter().find(|p| asset_file_name(p) == name);

    if let Some(name) = &campaign.background {
        return find(name.as_str()).cloned().map(Some).ok_or_else(|| {
            PanelError::configuration(format!(
                "campaign '{}' background '{name}' not found in asset directory",
                campaign.id
            ))
        });
    }

    let pool: Vec<&PathBuf> = if campaign.assets.is_empty() {
        images.iter().collect()
    } else {
        campaign
            .assets
            .iter()
            .map(|name| {
                find(name.as_str()).ok_or_else(|| {
                    PanelError::configuration(format!(
                        "campaign '{}' asset '{name}' not found in asset directory",
                        campaign.id
                    ))
                })
            })
            .collect::<PanelResult<_>>()?
    };
    if pool.is_empty() {
        return Ok(None);
    }

    let keywords: Vec<String> = campaign
        .keywords
        .iter()
        .map(|k| k.trim().to_lowercase())
        .filter(|k| !k.is_empty())
        .collect();
    let themed: Vec<&PathBuf> = pool
        .iter()
        .copied()
        .filter(|p| {
            let name = asset_file_name(p).to_lowercase();
            keywords.iter().any(|k| name.contains(k.as_str()))
        })
        .collect();
    let candidates = if themed.is_empty() { pool } else { themed };

    let idx = match strategy {
        SelectionStrategy::StableHash { seed } => {
            stable_index(&campaign.id, *seed, candidates.len())
        }
        SelectionStrategy::First => 0,
    };
    Ok(Some(candidates[idx].clone()))
}

fn output_file(out_dir: &Path, source_id: &str, format_id: &str, ext: &str) -> PathBuf {
    out_dir.join(format!("{source_id}-{}.{ext}", slugify(format_id)))
}

/// Expand `request` into the full cross product of sources × formats.
///
/// Fails with a configuration error on unknown ids, a missing asset directory, an empty plan, or
/// two jobs that would write the same file.
#[tracing::instrument(level = "debug", skip_all, fields(asset_dir = %request.asset_dir.display()))]
pub fn plan_jobs(
    catalog: &Catalog,
    request: &BatchRequest,
    strategy: &SelectionStrategy,
) -> PanelResult<Vec<RenderJob>> {
    let formats = catalog.resolve_formats(&request.formats)?;
    let images = list_images(&request.asset_dir)?;
    let ext = request.encoding.extension();

    // (source id, campaign id, asset)
    let mut sources = Vec::<(String, String, Option<PathBuf>)>::new();
    match &request.mode {
        BatchMode::Campaigns(ids) => {
            for campaign in catalog.resolve_campaigns(ids)? {
                let asset = select_background(campaign, &images, strategy)?;
                sources.push((slugify(&campaign.id), campaign.id.clone(), asset));
            }
        }
        BatchMode::Assets { campaign } => {
            let campaign = catalog.campaign(campaign)?;
            for path in &images {
                let stem = path
                    .file_stem()
                    .map(|s| s.to_string_lossy().into_owned())
                    .unwrap_or_default();
                sources.push((slugify(&stem), campaign.id.clone(), Some(path.clone())));
            }
        }
    }

    if sources.is_empty() {
        return Err(PanelError::configuration(match &request.mode {
            BatchMode::Campaigns(_) => "catalog defines no campaigns to render".to_string(),
            BatchMode::Assets { .. } => format!(
                "no source images in '{}'",
                request.asset_dir.display()
            ),
        }));
    }

    let mut seen = BTreeSet::<PathBuf>::new();
    let mut jobs = Vec::with_capacity(sources.len() * formats.len());
    for (source_id, campaign_id, asset) in &sources {
        for format in &formats {
            let output_path = output_file(&request.out_dir, source_id, &format.id, ext);
            if !seen.insert(output_path.clone()) {
                return Err(PanelError::configuration(format!(
                    "two jobs would write '{}'",
                    output_path.display()
                )));
            }
            jobs.push(RenderJob {
                index: jobs.len(),
                source_id: source_id.clone(),
                campaign_id: campaign_id.clone(),
                asset: asset.clone(),
                format_id: format.id.clone(),
                output_path,
            });
        }
    }

    tracing::info!(
        sources = sources.len(),
        formats = formats.len(),
        jobs = jobs.len(),
        "planned batch"
    );
    Ok(jobs)
}

#[cfg(test)]
#[path = "../../tests/unit/batch/job.rs"]
mod tests;
