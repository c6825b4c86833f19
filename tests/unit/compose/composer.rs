use super::*;
use crate::placement::decision::{OverridePlacement, PlacementOverride, decide_placement};

fn campaign() -> Campaign {
    let mut c = Campaign::new(
        "web",
        "Professional Websites",
        Rgb8::new(0x1e, 0x3a, 0x8a),
        Rgb8::new(0xff, 0xcc, 0x00),
    );
    c.subtitle = "Fast, accessible sites that convert".to_string();
    c.tagline = "New".to_string();
    c.cta = "Get a quote".to_string();
    c
}

fn decision(format: &OutputFormat, region: Option<Region>) -> PlacementDecision {
    let o = region.map(|r| PlacementOverride::placement(OverridePlacement::Fixed(r)));
    decide_placement(None, o.as_ref(), format)
}

fn photo() -> ImageRef {
    ImageRef {
        id: "beach.jpg".to_string(),
        width: 2000,
        height: 1000,
    }
}

fn logo() -> LogoRef {
    LogoRef {
        id: "logo.png".to_string(),
        width: 400.0,
        height: 100.0,
    }
}

fn formats() -> Vec<OutputFormat> {
    vec![
        OutputFormat::new("square", 1080, 1080),
        OutputFormat::new("portrait", 1080, 1350),
        OutputFormat::new("story", 1080, 1920),
        OutputFormat::new("landscape", 1200, 630),
    ]
}

#[test]
fn composition_is_deterministic() {
    let c = campaign();
    for f in formats() {
        let d = decision(&f, None);
        let a = compose_template(&c, &f, &d, Some(&photo()), Some(&logo()), "acme");
        let b = compose_template(&c, &f, &d, Some(&photo()), Some(&logo()), "acme");
        assert_eq!(a, b);
        assert_eq!(
            serde_json::to_string(&a).unwrap(),
            serde_json::to_string(&b).unwrap()
        );
    }
}

#[test]
fn template_json_dump_is_pretty_and_tagged() {
    let f = OutputFormat::new("square", 1080, 1080);
    let t = compose_template(&campaign(), &f, &decision(&f, None), Some(&photo()), None, "acme");
    let text = t.to_json_pretty().unwrap();
    assert!(text.contains('\n'));
    let v: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(v["layers"][0]["kind"], "background");
    assert_eq!(v, serde_json::to_value(&t).unwrap());
}

#[test]
fn layers_are_in_paint_order() {
    let f = OutputFormat::new("square", 1080, 1080);
    let t = compose_template(&campaign(), &f, &decision(&f, None), None, Some(&logo()), "acme");
    let kinds: Vec<&str> = t
        .layers
        .iter()
        .map(|l| match l {
            Layer::Background(_) => "background",
            Layer::Overlay(_) => "overlay",
            Layer::Logo(_) => "logo",
            Layer::Panel(_) => "panel",
            Layer::Footer(_) => "footer",
        })
        .collect();
    assert_eq!(kinds, ["background", "overlay", "logo", "panel", "footer"]);
}

#[test]
fn missing_image_uses_solid_brand_background() {
    let f = OutputFormat::new("square", 1080, 1080);
    let c = campaign();
    let t = compose_template(&c, &f, &decision(&f, None), None, None, "acme");
    let bg = t.background().unwrap();
    assert!(bg.image.is_none());
    assert_eq!(bg.color, c.primary_color);
    assert!(!t.layers.iter().any(|l| matches!(l, Layer::Logo(_))));
}

#[test]
fn tall_formats_respect_safe_zones() {
    let f = OutputFormat::new("story", 1080, 1920);
    let t = compose_template(&campaign(), &f, &decision(&f, None), Some(&photo()), Some(&logo()), "acme");
    let h = 1920.0;
    let panel = t.panel().unwrap();
    assert!(panel.rect.y0 >= TALL_SAFE_TOP * h);
    assert!(panel.rect.y1 <= h - TALL_SAFE_BOTTOM * h);
    for layer in &t.layers {
        if let Layer::Logo(l) = layer {
            assert!(l.rect.y0 >= TALL_SAFE_TOP * h);
        }
        if let Layer::Footer(footer) = layer {
            assert!(footer.line.baseline <= h - TALL_SAFE_BOTTOM * h);
        }
    }
}

#[test]
fn tall_formats_use_larger_type() {
    let c = campaign();
    let square = OutputFormat::new("square", 1080, 1080);
    let story = OutputFormat::new("story", 1080, 1920);
    let title_size = |f: &OutputFormat| {
        let t = compose_template(&c, f, &decision(f, Some(Region::Bottom)), None, None, "acme");
        t.panel()
            .unwrap()
            .lines
            .iter()
            .find(|l| l.role == TextRole::Title)
            .unwrap()
            .size
    };
    assert!(title_size(&story) > title_size(&square));
    assert!((Metrics::for_format(&story).scale - 1.35).abs() < 1e-9);
}

#[test]
fn stacking_wraps_long_titles() {
    let mut c = campaign();
    c.title = "Professional websites for every small business in town".to_string();
    let f = OutputFormat::new("square", 1080, 1080);
    let mut d = decision(&f, Some(Region::Left));

    d.stack_text = true;
    let stacked = compose_template(&c, &f, &d, None, None, "acme");
    let titles = |t: &Template| {
        t.panel()
            .unwrap()
            .lines
            .iter()
            .filter(|l| l.role == TextRole::Title)
            .count()
    };
    assert!(titles(&stacked) > 1);

    d.stack_text = false;
    let single = compose_template(&c, &f, &d, None, None, "acme");
    assert_eq!(titles(&single), 1);
}

#[test]
fn panel_stays_on_canvas_for_every_region() {
    let c = campaign();
    for f in formats() {
        for region in Region::ALL {
            let t = compose_template(&c, &f, &decision(&f, Some(region)), None, None, "acme");
            let r = t.panel().unwrap().rect;
            assert!(r.x0 >= 0.0 && r.y0 >= 0.0, "{} {region}", f.id);
            assert!(r.x1 <= f64::from(f.width) && r.y1 <= f64::from(f.height), "{} {region}", f.id);
        }
    }
}

#[test]
fn panel_hugs_the_chosen_side() {
    let c = campaign();
    let f = OutputFormat::new("landscape", 1200, 630);
    let left = compose_template(&c, &f, &decision(&f, Some(Region::Left)), None, None, "acme");
    let right = compose_template(&c, &f, &decision(&f, Some(Region::Right)), None, None, "acme");
    assert!(left.panel().unwrap().rect.center().x < 600.0);
    assert!(right.panel().unwrap().rect.center().x > 600.0);
    assert!(left.panel().unwrap().lines.iter().all(|l| l.anchor == Align::Left));
}

#[test]
fn cta_label_contrasts_with_accent() {
    let f = OutputFormat::new("square", 1080, 1080);
    let mut c = campaign();
    let t = compose_template(&c, &f, &decision(&f, None), None, None, "acme");
    let button = t.panel().unwrap().button.as_ref().unwrap();
    assert_eq!(button.fill, c.accent_color);
    assert_eq!(button.label.color, PlacementPolicy::default().dark_text);

    c.accent_color = Rgb8::new(0x1e, 0x3a, 0x8a);
    let t = compose_template(&c, &f, &decision(&f, None), None, None, "acme");
    let button = t.panel().unwrap().button.as_ref().unwrap();
    assert_eq!(button.label.color, Rgb8::WHITE);

    c.cta.clear();
    let t = compose_template(&c, &f, &decision(&f, None), None, None, "acme");
    assert!(t.panel().unwrap().button.is_none());
}

#[test]
fn footer_prefers_campaign_text_over_brand() {
    let f = OutputFormat::new("square", 1080, 1080);
    let mut c = campaign();
    let footer = |c: &Campaign| {
        compose_template(c, &f, &decision(&f, None), None, None, "acme")
            .layers
            .iter()
            .find_map(|l| match l {
                Layer::Footer(footer) => Some(footer.line.text.clone()),
                _ => None,
            })
    };
    assert_eq!(footer(&c).as_deref(), Some("acme"));
    c.footer = Some("acme.example".to_string());
    assert_eq!(footer(&c).as_deref(), Some("acme.example"));
}

#[test]
fn cover_crop_centers_and_matches_aspect() {
    let crop = cover_crop(2000, 1000, 1080, 1080);
    let expected = Rect::new(500.0, 0.0, 1500.0, 1000.0);
    for (a, b) in [(crop.x0, expected.x0), (crop.y0, expected.y0), (crop.x1, expected.x1), (crop.y1, expected.y1)] {
        assert!((a - b).abs() < 1e-6, "{crop:?}");
    }

    let crop = cover_crop(1000, 2000, 1200, 630);
    assert!((crop.width() - 1000.0).abs() < 1e-9);
    assert!((crop.width() / crop.height() - 1200.0 / 630.0).abs() < 1e-9);
    assert!((crop.center().y - 1000.0).abs() < 1e-9);
}

#[test]
fn logo_keeps_aspect_ratio() {
    let f = OutputFormat::new("square", 1080, 1080);
    let t = compose_template(&campaign(), &f, &decision(&f, None), None, Some(&logo()), "acme");
    let rect = t
        .layers
        .iter()
        .find_map(|l| match l {
            Layer::Logo(l) => Some(l.rect),
            _ => None,
        })
        .unwrap();
    assert!((rect.width() / rect.height() - 4.0).abs() < 1e-9);
    assert!((rect.width() - 0.16 * 1080.0).abs() < 1e-9);
}
