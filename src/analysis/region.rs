use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::foundation::error::{PanelError, PanelResult};

/// A named fractional rectangle of a source image, used both for sampling statistics and as a
/// panel placement key.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum Region {
    /// Full-width strip along the bottom edge.
    Bottom,
    /// Wide centered band low in the frame; the tall-format default.
    BottomCenter,
    /// Narrower centered block in the lower half; the default for other formats.
    CenterBottom,
    /// Left column.
    Left,
    /// Right column.
    Right,
    /// Lower-left quadrant.
    LeftBottom,
    /// Lower-right quadrant.
    RightBottom,
}

/// Horizontal side a region hugs, if any.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Side {
    /// Region touches the left edge only.
    Left,
    /// Region touches the right edge only.
    Right,
    /// Region is centered or spans the full width.
    Center,
}

/// Fractional bounds: `x0 < x1` and `y0 < y1`, all within `0.0..=1.0`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FracBounds {
    /// Left edge as a fraction of width.
    pub x0: f64,
    /// Right edge as a fraction of width.
    pub x1: f64,
    /// Top edge as a fraction of height.
    pub y0: f64,
    /// Bottom edge as a fraction of height.
    pub y1: f64,
}

impl FracBounds {
    /// Pixel span `[x0, x1) × [y0, y1)` on a `width × height` grid. Never empty for a non-empty grid.
    pub fn pixel_span(self, width: u32, height: u32) -> (u32, u32, u32, u32) {
        fn span(lo: f64, hi: f64, len: u32) -> (u32, u32) {
            let len_f = f64::from(len);
            let a = ((lo * len_f).floor() as u32).min(len.saturating_sub(1));
            let b = ((hi * len_f).ceil() as u32).clamp(a + 1, len.max(a + 1));
            (a, b)
        }
        let (x0, x1) = span(self.x0, self.x1, width);
        let (y0, y1) = span(self.y0, self.y1, height);
        (x0, x1, y0, y1)
    }
}

impl Region {
    /// Number of regions in the catalog.
    pub const COUNT: usize = 7;

    /// The fixed catalog, in a stable order.
    pub const ALL: [Region; Region::COUNT] = [
        Region::Bottom,
        Region::BottomCenter,
        Region::CenterBottom,
        Region::Left,
        Region::Right,
        Region::LeftBottom,
        Region::RightBottom,
    ];

    /// Fractional sampling bounds.
    pub fn bounds(self) -> FracBounds {
        let (x0, x1, y0, y1) = match self {
            Region::Bottom => (0.0, 1.0, 0.66, 1.0),
            Region::BottomCenter => (0.12, 0.88, 0.62, 0.88),
            Region::CenterBottom => (0.2, 0.8, 0.5, 0.9),
            Region::Left => (0.0, 0.45, 0.2, 0.8),
            Region::Right => (0.55, 1.0, 0.2, 0.8),
            Region::LeftBottom => (0.0, 0.5, 0.55, 1.0),
            Region::RightBottom => (0.5, 1.0, 0.55, 1.0),
        };
        FracBounds { x0, x1, y0, y1 }
    }

    /// Which edge the region hugs.
    pub fn side(self) -> Side {
        match self {
            Region::Left | Region::LeftBottom => Side::Left,
            Region::Right | Region::RightBottom => Side::Right,
            Region::Bottom | Region::BottomCenter | Region::CenterBottom => Side::Center,
        }
    }

    /// Kebab-case key.
    pub fn as_str(self) -> &'static str {
        match self {
            Region::Bottom => "bottom",
            Region::BottomCenter => "bottom-center",
            Region::CenterBottom => "center-bottom",
            Region::Left => "left",
            Region::Right => "right",
            Region::LeftBottom => "left-bottom",
            Region::RightBottom => "right-bottom",
        }
    }

    pub(crate) fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Region {
    type Err = PanelError;

    fn from_str(s: &str) -> PanelResult<Self> {
        Region::ALL
            .into_iter()
            .find(|r| r.as_str() == s)
            .ok_or_else(|| PanelError::configuration(format!("unknown region \"{s}\"")))
    }
}
