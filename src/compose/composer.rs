use crate::{
    analysis::region::{Region, Side},
    compose::template::{
        BackgroundLayer, ButtonSpec, CoverImage, Edge, FooterLayer, ImageRef, Layer, LogoLayer,
        LogoRef, OverlayLayer, PanelLayer, Template, TextLine, TextRole,
    },
    compose::text::{estimate_width, fit_single_line, wrap_to_fit},
    foundation::core::{Rect, Rgb8},
    model::campaign::Campaign,
    model::format::OutputFormat,
    placement::decision::{Align, PlacementDecision, PlacementPolicy},
};

/// Extra typographic scale applied to tall formats.
pub const TALL_SCALE_BOOST: f64 = 1.25;
/// Fraction of a tall canvas kept clear at the top for platform UI.
pub const TALL_SAFE_TOP: f64 = 0.10;
/// Fraction of a tall canvas kept clear at the bottom for platform UI.
pub const TALL_SAFE_BOTTOM: f64 = 0.14;

const MIN_FONT_RATIO: f64 = 0.6;
const LINE_HEIGHT: f64 = 1.18;
const ASCENT: f64 = 0.8;

/// Scale-dependent measurements shared by every layer of one format.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Metrics {
    /// `width / 1000`, boosted for tall formats.
    pub scale: f64,
    /// Outer margin.
    pub margin: f64,
    /// Reserved band at the top.
    pub safe_top: f64,
    /// Reserved band at the bottom.
    pub safe_bottom: f64,
}

impl Metrics {
    /// Derive metrics for `format`.
    pub fn for_format(format: &OutputFormat) -> Self {
        let w = f64::from(format.width);
        let h = f64::from(format.height);
        let tall = format.is_tall();
        let scale = w / 1000.0 * if tall { TALL_SCALE_BOOST } else { 1.0 };
        Self {
            scale,
            margin: 48.0 * scale,
            safe_top: if tall { TALL_SAFE_TOP * h } else { 0.0 },
            safe_bottom: if tall { TALL_SAFE_BOTTOM * h } else { 0.0 },
        }
    }

    fn px(&self, base: f64) -> f64 {
        base * self.scale
    }
}

/// Merge campaign copy, format and placement into a declarative [`Template`].
///
/// Pure: the same inputs always produce an identical template.
pub fn compose_template(
    campaign: &Campaign,
    format: &OutputFormat,
    decision: &PlacementDecision,
    background: Option<&ImageRef>,
    logo: Option<&LogoRef>,
    brand: &str,
) -> Template {
    let m = Metrics::for_format(format);
    let w = f64::from(format.width);
    let h = f64::from(format.height);

    let mut layers = vec![
        Layer::Background(BackgroundLayer {
            color: campaign.primary_color,
            image: background.map(|img| CoverImage {
                image: img.clone(),
                crop: cover_crop(img.width, img.height, format.width, format.height),
            }),
        }),
        Layer::Overlay(overlay_for(decision.placement, w, h)),
    ];

    if let Some(logo) = logo {
        layers.push(Layer::Logo(LogoLayer {
            logo: logo.clone(),
            rect: logo_rect(logo, &m, w, h),
        }));
    }

    layers.push(Layer::Panel(panel_for(campaign, decision, &m, w, h)));

    let footer_text = campaign.footer.as_deref().unwrap_or(brand).trim();
    if !footer_text.is_empty() {
        let size = m.px(16.0);
        layers.push(Layer::Footer(FooterLayer {
            line: TextLine {
                role: TextRole::Footer,
                text: footer_text.to_string(),
                x: w - m.margin,
                baseline: h - m.safe_bottom - m.margin * 0.35,
                size,
                weight: 500,
                color: Rgb8::WHITE,
                anchor: Align::Right,
            },
            opacity: 0.85,
        }));
    }

    Template {
        width: format.width,
        height: format.height,
        layers,
    }
}

/// Centered crop of a `src_w × src_h` image with the aspect ratio of `dst_w × dst_h`.
pub fn cover_crop(src_w: u32, src_h: u32, dst_w: u32, dst_h: u32) -> Rect {
    let (sw, sh) = (f64::from(src_w), f64::from(src_h));
    let (dw, dh) = (f64::from(dst_w), f64::from(dst_h));
    let scale = (dw / sw).max(dh / sh);
    let cw = (dw / scale).min(sw);
    let ch = (dh / scale).min(sh);
    let x0 = (sw - cw) / 2.0;
    let y0 = (sh - ch) / 2.0;
    Rect::new(x0, y0, x0 + cw, y0 + ch)
}

fn overlay_for(placement: Region, w: f64, h: f64) -> OverlayLayer {
    let (rect, edge) = match placement.side() {
        Side::Left => (Rect::new(0.0, 0.0, 0.7 * w, h), Edge::Left),
        Side::Right => (Rect::new(0.3 * w, 0.0, w, h), Edge::Right),
        Side::Center => (Rect::new(0.0, 0.35 * h, w, h), Edge::Bottom),
    };
    OverlayLayer {
        rect,
        edge,
        color: Rgb8::BLACK,
        start_opacity: 0.55,
        end_opacity: 0.0,
    }
}

fn logo_rect(logo: &LogoRef, m: &Metrics, w: f64, h: f64) -> Rect {
    let aspect = if logo.width > 0.0 {
        logo.height / logo.width
    } else {
        1.0
    };
    let mut lw = 0.16 * w;
    let mut lh = lw * aspect;
    let max_h = 0.08 * h;
    if lh > max_h {
        lh = max_h;
        lw = lh / aspect;
    }
    let x0 = m.margin;
    let y0 = m.safe_top + m.margin;
    Rect::new(x0, y0, x0 + lw, y0 + lh)
}

fn panel_width(placement: Region, w: f64, content_w: f64) -> f64 {
    let frac = match placement {
        Region::Bottom => return content_w,
        Region::BottomCenter => 0.9,
        Region::CenterBottom => 0.72,
        Region::Left | Region::Right => 0.48,
        Region::LeftBottom | Region::RightBottom => 0.52,
    };
    (frac * w).min(content_w)
}

struct Block {
    role: TextRole,
    lines: Vec<String>,
    size: f64,
    weight: u16,
}

fn panel_for(
    campaign: &Campaign,
    decision: &PlacementDecision,
    m: &Metrics,
    w: f64,
    h: f64,
) -> PanelLayer {
    let content_w = w - 2.0 * m.margin;
    let content_top = m.safe_top + m.margin;
    let content_bottom = h - m.safe_bottom - m.margin;

    let pw = panel_width(decision.placement, w, content_w);
    let pad = m.px(36.0);
    let gap = m.px(12.0);
    let inner_w = (pw - 2.0 * pad).max(1.0);

    let mut blocks = Vec::new();
    let mut push_block = |role, text: &str, base: f64, weight: u16, max_lines: usize| {
        let text = text.trim();
        if text.is_empty() {
            return;
        }
        let (size, lines) = if decision.stack_text && role != TextRole::Tagline {
            wrap_to_fit(text, base, weight, inner_w, max_lines, MIN_FONT_RATIO)
        } else {
            let size = fit_single_line(text, base, weight, inner_w, MIN_FONT_RATIO);
            (size, vec![text.to_string()])
        };
        blocks.push(Block {
            role,
            lines,
            size,
            weight,
        });
    };
    push_block(TextRole::Tagline, &campaign.tagline, m.px(22.0), 600, 1);
    push_block(TextRole::Title, &campaign.title, m.px(60.0), 800, 3);
    push_block(TextRole::Subtitle, &campaign.subtitle, m.px(28.0), 400, 3);

    let cta = campaign.cta.trim();
    let cta_size = m.px(24.0);
    let button_h = if cta.is_empty() { 0.0 } else { cta_size * 2.2 };

    let text_h: f64 = blocks
        .iter()
        .map(|b| b.lines.len() as f64 * b.size * LINE_HEIGHT)
        .sum::<f64>()
        + gap * blocks.len().saturating_sub(1) as f64;
    let button_gap = if cta.is_empty() || blocks.is_empty() {
        0.0
    } else {
        gap * 1.5
    };
    let ph = 2.0 * pad + text_h + button_gap + button_h;

    let x0 = match decision.placement.side() {
        Side::Left => m.margin,
        Side::Right => w - m.margin - pw,
        Side::Center => (w - pw) / 2.0,
    };
    let y0 = match decision.placement {
        Region::Left | Region::Right => content_top + (content_bottom - content_top - ph) / 2.0,
        _ => content_bottom - ph,
    }
    .max(content_top);
    let rect = Rect::new(x0, y0, x0 + pw, y0 + ph);

    let anchor_x = match decision.align {
        Align::Left => rect.x0 + pad,
        Align::Center => rect.center().x,
        Align::Right => rect.x1 - pad,
    };

    let mut lines = Vec::new();
    let mut cursor = rect.y0 + pad;
    for (i, block) in blocks.iter().enumerate() {
        if i > 0 {
            cursor += gap;
        }
        for text in &block.lines {
            lines.push(TextLine {
                role: block.role,
                text: text.clone(),
                x: anchor_x,
                baseline: cursor + block.size * ASCENT,
                size: block.size,
                weight: block.weight,
                color: decision.text_color,
                anchor: decision.align,
            });
            cursor += block.size * LINE_HEIGHT;
        }
    }

    let button = (!cta.is_empty()).then(|| {
        let label_size = fit_single_line(cta, cta_size, 700, inner_w - 2.8 * cta_size, 0.75);
        let bw = (estimate_width(cta, label_size, 700) + 2.8 * cta_size).min(inner_w);
        let bx0 = match decision.align {
            Align::Left => rect.x0 + pad,
            Align::Center => rect.center().x - bw / 2.0,
            Align::Right => rect.x1 - pad - bw,
        };
        let by0 = cursor + button_gap;
        let brect = Rect::new(bx0, by0, bx0 + bw, by0 + button_h);
        ButtonSpec {
            rect: brect,
            fill: campaign.accent_color,
            corner_radius: button_h / 2.0,
            label: TextLine {
                role: TextRole::Cta,
                text: cta.to_string(),
                x: brect.center().x,
                baseline: brect.center().y + label_size * 0.35,
                size: label_size,
                weight: 700,
                color: PlacementPolicy::default().text_color_for(campaign.accent_color.luminance()),
                anchor: Align::Center,
            },
        }
    });

    PanelLayer {
        rect,
        fill: decision.panel_color,
        corner_radius: m.px(20.0),
        lines,
        button,
    }
}

#[cfg(test)]
#[path = "../../tests/unit/compose/composer.rs"]
mod tests;
