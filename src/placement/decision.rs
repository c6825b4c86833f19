use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{
    analysis::region::{Region, Side},
    analysis::stats::RegionStatsMap,
    foundation::core::{Rgb8, Rgba8, alpha_from_opacity},
    foundation::error::{PanelError, PanelResult},
    model::format::OutputFormat,
};

/// Text alignment inside the panel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Align {
    /// Flush left.
    Left,
    /// Flush right.
    Right,
    /// Centered.
    Center,
}

impl Align {
    /// Alignment matching the edge a region hugs.
    pub fn for_region(region: Region) -> Self {
        match region.side() {
            Side::Left => Align::Left,
            Side::Right => Align::Right,
            Side::Center => Align::Center,
        }
    }
}

/// Placement requested by an override: a fixed region, or "whichever side is calmer".
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OverridePlacement {
    /// Use this region unconditionally.
    Fixed(Region),
    /// Compare `left` and `right` variance and take the lower (ties go right).
    LeftOrRight,
}

impl OverridePlacement {
    const LEFT_OR_RIGHT: &'static str = "left-or-right";

    /// Kebab-case key.
    pub fn as_str(self) -> &'static str {
        match self {
            OverridePlacement::Fixed(r) => r.as_str(),
            OverridePlacement::LeftOrRight => Self::LEFT_OR_RIGHT,
        }
    }
}

impl fmt::Display for OverridePlacement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OverridePlacement {
    type Err = PanelError;

    fn from_str(s: &str) -> PanelResult<Self> {
        if s == Self::LEFT_OR_RIGHT {
            return Ok(OverridePlacement::LeftOrRight);
        }
        s.parse::<Region>()
            .map(OverridePlacement::Fixed)
            .map_err(|_| PanelError::configuration(format!("unknown override placement \"{s}\"")))
    }
}

impl Serialize for OverridePlacement {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for OverridePlacement {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Manually authored placement rule for one source asset.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacementOverride {
    /// Forced placement.
    pub placement: OverridePlacement,
    /// Forced alignment; defaults to the placement's side.
    #[serde(default)]
    pub align: Option<Align>,
    /// Forced text stacking; defaults to the format's tall classification.
    #[serde(default, alias = "stackText")]
    pub stack_text: Option<bool>,
}

impl PlacementOverride {
    /// Override forcing only the placement.
    pub fn placement(placement: OverridePlacement) -> Self {
        Self {
            placement,
            align: None,
            stack_text: None,
        }
    }
}

/// Where the panel goes and how it is colored.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct PlacementDecision {
    /// Chosen region.
    pub placement: Region,
    /// Text alignment.
    pub align: Align,
    /// Translucent panel fill.
    pub panel_color: Rgba8,
    /// Text color, chosen for contrast against the panel region.
    pub text_color: Rgb8,
    /// Whether title/subtitle may wrap onto multiple lines.
    pub stack_text: bool,
}

/// Tunables of the decision engine. [`Default`] carries the production values.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlacementPolicy {
    /// Regions with mean luminance at or above this get dark text.
    pub luminance_threshold: f64,
    /// Panel opacity, independent of the sampled color.
    pub panel_opacity: f64,
    /// Text color on light backgrounds.
    pub dark_text: Rgb8,
    /// Text color on dark backgrounds.
    pub light_text: Rgb8,
    /// Panel color used when no statistics are available.
    pub fallback_panel: Rgb8,
}

impl Default for PlacementPolicy {
    fn default() -> Self {
        Self {
            luminance_threshold: 140.0,
            panel_opacity: 0.6,
            dark_text: Rgb8::new(0x0f, 0x17, 0x2a),
            light_text: Rgb8::WHITE,
            fallback_panel: Rgb8::new(0x0f, 0x17, 0x2a),
        }
    }
}

impl PlacementPolicy {
    /// Text color for a background of the given mean luminance.
    pub fn text_color_for(&self, mean_luminance: f64) -> Rgb8 {
        if mean_luminance >= self.luminance_threshold {
            self.dark_text
        } else {
            self.light_text
        }
    }

    /// Resolve a [`PlacementDecision`]. Deterministic in its inputs.
    ///
    /// `stats` is `None` when analysis failed or was skipped; the result then uses the format
    /// defaults with a dark translucent panel and light text.
    pub fn decide(
        &self,
        stats: Option<&RegionStatsMap>,
        placement_override: Option<&PlacementOverride>,
        format: &OutputFormat,
    ) -> PlacementDecision {
        let tall = format.is_tall();

        let (placement, forced_align, forced_stack) = match placement_override {
            Some(o) => {
                let region = match o.placement {
                    OverridePlacement::Fixed(r) => r,
                    OverridePlacement::LeftOrRight => calmer_side(stats),
                };
                (region, o.align, o.stack_text)
            }
            None if tall => (Region::BottomCenter, None, None),
            None => (Region::CenterBottom, None, None),
        };

        let alpha = alpha_from_opacity(self.panel_opacity);
        let (panel_color, text_color) = match stats {
            Some(stats) => {
                let s = stats.get(placement);
                (
                    s.mean_color.with_alpha(alpha),
                    self.text_color_for(s.mean_luminance),
                )
            }
            None => (self.fallback_panel.with_alpha(alpha), self.light_text),
        };

        let decision = PlacementDecision {
            placement,
            align: forced_align.unwrap_or_else(|| Align::for_region(placement)),
            panel_color,
            text_color,
            stack_text: forced_stack.unwrap_or(tall),
        };
        tracing::debug!(
            format = %format.id,
            placement = %decision.placement,
            overridden = placement_override.is_some(),
            analyzed = stats.is_some(),
            "placement decided"
        );
        decision
    }
}

fn calmer_side(stats: Option<&RegionStatsMap>) -> Region {
    match stats {
        Some(s) if s.get(Region::Left).variance < s.get(Region::Right).variance => Region::Left,
        _ => Region::Right,
    }
}

/// [`PlacementPolicy::decide`] with the default policy.
pub fn decide_placement(
    stats: Option<&RegionStatsMap>,
    placement_override: Option<&PlacementOverride>,
    format: &OutputFormat,
) -> PlacementDecision {
    PlacementPolicy::default().decide(stats, placement_override, format)
}

#[cfg(test)]
#[path = "../../tests/unit/placement/decision.rs"]
mod tests;
