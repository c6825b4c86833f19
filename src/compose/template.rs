use serde::Serialize;

use crate::{
    foundation::core::{Rect, Rgb8, Rgba8},
    foundation::error::{PanelError, PanelResult},
    placement::decision::Align,
};

/// Declarative description of a finished promo image.
///
/// Geometry is absolute, in output pixels. Layers are listed in paint order. A template is a pure
/// value: rasterizers only interpret it.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Template {
    /// Canvas width in pixels.
    pub width: u32,
    /// Canvas height in pixels.
    pub height: u32,
    /// Layers, bottom first.
    pub layers: Vec<Layer>,
}

/// One paint layer.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Layer {
    /// Photo or solid fill covering the canvas.
    Background(BackgroundLayer),
    /// Directional translucent gradient.
    Overlay(OverlayLayer),
    /// Brand logo.
    Logo(LogoLayer),
    /// Translucent text panel with copy and CTA.
    Panel(PanelLayer),
    /// Watermark line.
    Footer(FooterLayer),
}

/// Identity and intrinsic size of a background image.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ImageRef {
    /// Asset id (file name).
    pub id: String,
    /// Intrinsic width in pixels.
    pub width: u32,
    /// Intrinsic height in pixels.
    pub height: u32,
}

/// Identity and intrinsic size of a logo.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct LogoRef {
    /// Logo id (file name).
    pub id: String,
    /// Intrinsic width.
    pub width: f64,
    /// Intrinsic height.
    pub height: f64,
}

/// Canvas fill: solid brand color, optionally covered by a cover-fit photo.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct BackgroundLayer {
    /// Solid fill, visible when there is no image.
    pub color: Rgb8,
    /// Cover-fit photo.
    pub image: Option<CoverImage>,
}

/// A photo scaled to cover the canvas, cropped around its center.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CoverImage {
    /// Source image.
    pub image: ImageRef,
    /// Crop rectangle in source pixels with the canvas aspect ratio.
    pub crop: Rect,
}

/// Edge a gradient is strongest at.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Edge {
    /// Bottom edge, fading upward.
    Bottom,
    /// Left edge, fading rightward.
    Left,
    /// Right edge, fading leftward.
    Right,
}

/// Linear gradient from `start_opacity` at `edge` to `end_opacity` at the opposite side of `rect`.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct OverlayLayer {
    /// Covered area.
    pub rect: Rect,
    /// Strong edge.
    pub edge: Edge,
    /// Gradient color.
    pub color: Rgb8,
    /// Opacity at `edge`.
    pub start_opacity: f64,
    /// Opacity at the opposite side.
    pub end_opacity: f64,
}

/// Logo placement.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct LogoLayer {
    /// Logo reference.
    pub logo: LogoRef,
    /// Target rectangle (aspect preserved).
    pub rect: Rect,
}

/// Semantic role of a text line.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TextRole {
    /// Kicker above the headline.
    Tagline,
    /// Headline.
    Title,
    /// Secondary copy.
    Subtitle,
    /// Button label.
    Cta,
    /// Watermark.
    Footer,
}

/// A single, already wrapped line of text.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TextLine {
    /// Role, used for styling hooks.
    pub role: TextRole,
    /// Line content.
    pub text: String,
    /// Anchor x position.
    pub x: f64,
    /// Baseline y position.
    pub baseline: f64,
    /// Font size in pixels.
    pub size: f64,
    /// Font weight (100..=900).
    pub weight: u16,
    /// Fill color.
    pub color: Rgb8,
    /// How `x` anchors the line.
    pub anchor: Align,
}

/// Rounded call-to-action button.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ButtonSpec {
    /// Button bounds.
    pub rect: Rect,
    /// Button fill.
    pub fill: Rgb8,
    /// Corner radius.
    pub corner_radius: f64,
    /// Label, centered in `rect`.
    pub label: TextLine,
}

/// Translucent rounded panel carrying the copy.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PanelLayer {
    /// Panel bounds.
    pub rect: Rect,
    /// Panel fill (straight alpha).
    pub fill: Rgba8,
    /// Corner radius.
    pub corner_radius: f64,
    /// Copy lines in paint order.
    pub lines: Vec<TextLine>,
    /// Optional CTA button.
    pub button: Option<ButtonSpec>,
}

/// Watermark line.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FooterLayer {
    /// The watermark text.
    pub line: TextLine,
    /// Opacity of the text.
    pub opacity: f64,
}

impl Template {
    /// Pretty-printed JSON form, as dumped by `panelcraft template`.
    pub fn to_json_pretty(&self) -> PanelResult<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| PanelError::serde(format!("serialize template: {e}")))
    }

    /// The panel layer, if the template has one.
    pub fn panel(&self) -> Option<&PanelLayer> {
        self.layers.iter().find_map(|l| match l {
            Layer::Panel(p) => Some(p),
            _ => None,
        })
    }

    /// The background layer, if the template has one.
    pub fn background(&self) -> Option<&BackgroundLayer> {
        self.layers.iter().find_map(|l| match l {
            Layer::Background(b) => Some(b),
            _ => None,
        })
    }
}
