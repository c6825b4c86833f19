use serde::Serialize;

use crate::{
    analysis::region::Region,
    assets::source::SourceImage,
    foundation::core::{Rgb8, luminance},
    foundation::error::{PanelError, PanelResult},
};

/// Longest side of the working raster that statistics are computed on.
///
/// Statistics are an approximation: the source is area-averaged down to at most
/// `WORKING_RESOLUTION × WORKING_RESOLUTION` first.
pub const WORKING_RESOLUTION: u32 = 128;

/// Brightness and color summary of one region.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct RegionStatistics {
    /// Mean luminance on a 0..=255 scale.
    pub mean_luminance: f64,
    /// Luminance variance `E[L²] − E[L]²`.
    pub variance: f64,
    /// Mean color, a panel background candidate.
    pub mean_color: Rgb8,
    /// Number of working pixels sampled.
    pub samples: u64,
}

/// Statistics for every catalog [`Region`]. Cannot be partial.
#[derive(Clone, Debug, PartialEq)]
pub struct RegionStatsMap {
    by_region: [RegionStatistics; Region::COUNT],
}

impl RegionStatsMap {
    /// Build a complete map by evaluating `f` for every region.
    pub fn from_fn(mut f: impl FnMut(Region) -> RegionStatistics) -> Self {
        Self {
            by_region: Region::ALL.map(&mut f),
        }
    }

    /// Statistics for `region`.
    pub fn get(&self, region: Region) -> &RegionStatistics {
        &self.by_region[region.index()]
    }

    /// Iterate `(region, stats)` in catalog order.
    pub fn iter(&self) -> impl Iterator<Item = (Region, &RegionStatistics)> {
        Region::ALL.into_iter().zip(self.by_region.iter())
    }
}

impl Serialize for RegionStatsMap {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_map(self.iter().map(|(r, s)| (r.as_str(), s)))
    }
}

/// Compute per-region luminance mean/variance and mean color for `src`.
#[tracing::instrument(level = "debug", skip(src), fields(id = %src.id))]
pub fn compute_region_statistics(src: &SourceImage) -> PanelResult<RegionStatsMap> {
    if src.width == 0 || src.height == 0 {
        return Err(PanelError::image_analysis(format!(
            "source image '{}' has no pixels",
            src.id
        )));
    }

    let tw = src.width.min(WORKING_RESOLUTION);
    let th = src.height.min(WORKING_RESOLUTION);
    let resized;
    let working: &image::RgbImage = if (tw, th) == (src.width, src.height) {
        src.pixels.as_ref()
    } else {
        resized = image::imageops::thumbnail(src.pixels.as_ref(), tw, th);
        &resized
    };

    Ok(RegionStatsMap::from_fn(|region| {
        region_statistics(working, region)
    }))
}

fn region_statistics(img: &image::RgbImage, region: Region) -> RegionStatistics {
    let (x0, x1, y0, y1) = region.bounds().pixel_span(img.width(), img.height());

    let mut sum_l = 0.0f64;
    let mut sum_l2 = 0.0f64;
    let mut sum_rgb = [0.0f64; 3];
    let mut n = 0u64;
    for y in y0..y1 {
        for x in x0..x1 {
            let [r, g, b] = img.get_pixel(x, y).0;
            let (r, g, b) = (f64::from(r), f64::from(g), f64::from(b));
            let l = luminance(r, g, b);
            sum_l += l;
            sum_l2 += l * l;
            sum_rgb[0] += r;
            sum_rgb[1] += g;
            sum_rgb[2] += b;
            n += 1;
        }
    }

    let nf = n.max(1) as f64;
    let mean = sum_l / nf;
    let channel = |s: f64| (s / nf).round().clamp(0.0, 255.0) as u8;
    RegionStatistics {
        mean_luminance: mean,
        variance: (sum_l2 / nf - mean * mean).max(0.0),
        mean_color: Rgb8::new(channel(sum_rgb[0]), channel(sum_rgb[1]), channel(sum_rgb[2])),
        samples: n,
    }
}

#[cfg(test)]
#[path = "../../tests/unit/analysis/stats.rs"]
mod tests;
