//! SVG markup for the vector layers of a [`Template`].
//!
//! Every vector layer becomes a standalone SVG document in output pixel units. Raster layers
//! (background and raster logos) are drawn directly by the rasterizer.

use std::fmt::Write as _;

use crate::{
    compose::template::{Edge, FooterLayer, Layer, OverlayLayer, PanelLayer, TextLine},
    foundation::core::Rect,
    placement::decision::Align,
};

/// Font stack requested for all copy.
pub const FONT_FAMILY: &str = "Inter, Helvetica, Arial, sans-serif";

/// SVG document for `layer`, or `None` for raster layers.
pub fn layer_svg(layer: &Layer, width: u32, height: u32) -> Option<String> {
    let body = match layer {
        Layer::Background(_) | Layer::Logo(_) => return None,
        Layer::Overlay(o) => overlay_body(o),
        Layer::Panel(p) => panel_body(p),
        Layer::Footer(f) => footer_body(f),
    };
    Some(format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{width}" height="{height}" viewBox="0 0 {width} {height}">{body}</svg>"#
    ))
}

/// Escape text for use in XML character data and attribute values.
pub fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            c if c.is_control() => {}
            c => out.push(c),
        }
    }
    out
}

fn rect_attrs(r: Rect) -> String {
    format!(
        r#"x="{:.2}" y="{:.2}" width="{:.2}" height="{:.2}""#,
        r.x0,
        r.y0,
        r.width().max(0.0),
        r.height().max(0.0)
    )
}

fn overlay_body(o: &OverlayLayer) -> String {
    let (x1, y1, x2, y2) = match o.edge {
        Edge::Bottom => (0, 1, 0, 0),
        Edge::Left => (0, 0, 1, 0),
        Edge::Right => (1, 0, 0, 0),
    };
    let color = o.color.to_hex();
    format!(
        r#"<defs><linearGradient id="g" x1="{x1}" y1="{y1}" x2="{x2}" y2="{y2}"><stop offset="0" stop-color="{color}" stop-opacity="{:.3}"/><stop offset="1" stop-color="{color}" stop-opacity="{:.3}"/></linearGradient></defs><rect {} fill="url(#g)"/>"#,
        o.start_opacity.clamp(0.0, 1.0),
        o.end_opacity.clamp(0.0, 1.0),
        rect_attrs(o.rect),
    )
}

fn text_element(line: &TextLine, opacity: Option<f64>) -> String {
    let anchor = match line.anchor {
        Align::Left => "start",
        Align::Center => "middle",
        Align::Right => "end",
    };
    let mut out = format!(
        r#"<text x="{:.2}" y="{:.2}" font-family="{FONT_FAMILY}" font-size="{:.2}" font-weight="{}" fill="{}" text-anchor="{anchor}""#,
        line.x,
        line.baseline,
        line.size,
        line.weight,
        line.color.to_hex(),
    );
    if let Some(o) = opacity {
        let _ = write!(out, r#" fill-opacity="{:.3}""#, o.clamp(0.0, 1.0));
    }
    let _ = write!(out, ">{}</text>", escape_xml(&line.text));
    out
}

fn panel_body(p: &PanelLayer) -> String {
    let mut out = format!(
        r#"<rect {} rx="{:.2}" fill="{}" fill-opacity="{:.3}"/>"#,
        rect_attrs(p.rect),
        p.corner_radius,
        p.fill.rgb().to_hex(),
        p.fill.opacity(),
    );
    for line in &p.lines {
        out.push_str(&text_element(line, None));
    }
    if let Some(button) = &p.button {
        let _ = write!(
            out,
            r#"<rect {} rx="{:.2}" fill="{}"/>"#,
            rect_attrs(button.rect),
            button.corner_radius,
            button.fill.to_hex()
        );
        out.push_str(&text_element(&button.label, None));
    }
    out
}

fn footer_body(f: &FooterLayer) -> String {
    text_element(&f.line, Some(f.opacity))
}
