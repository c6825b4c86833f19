use super::*;
use crate::analysis::stats::RegionStatistics;

fn stats_with(f: impl Fn(Region) -> (f64, f64, Rgb8)) -> RegionStatsMap {
    RegionStatsMap::from_fn(|r| {
        let (mean_luminance, variance, mean_color) = f(r);
        RegionStatistics {
            mean_luminance,
            variance,
            mean_color,
            samples: 100,
        }
    })
}

fn uniform(lum: f64) -> RegionStatsMap {
    let v = lum.round() as u8;
    stats_with(|_| (lum, 0.0, Rgb8::new(v, v, v)))
}

fn story() -> OutputFormat {
    OutputFormat::new("story", 1080, 1920)
}

fn landscape() -> OutputFormat {
    OutputFormat::new("landscape", 1200, 630)
}

#[test]
fn tall_dark_bottom_center_scenario() {
    let stats = stats_with(|r| match r {
        Region::BottomCenter => (60.0, 5.0, Rgb8::new(60, 60, 60)),
        _ => (180.0, 400.0, Rgb8::new(180, 180, 180)),
    });
    let d = decide_placement(Some(&stats), None, &story());
    assert_eq!(d.placement, Region::BottomCenter);
    assert_eq!(d.align, Align::Center);
    assert!(d.stack_text);
    assert_eq!(d.text_color, Rgb8::WHITE);
    assert_eq!(d.panel_color, Rgba8 { r: 60, g: 60, b: 60, a: 153 });
}

#[test]
fn landscape_default_differs_from_tall() {
    let stats = uniform(60.0);
    let tall = decide_placement(Some(&stats), None, &story());
    let wide = decide_placement(Some(&stats), None, &landscape());
    assert!(!landscape().is_tall());
    assert_eq!(wide.placement, Region::CenterBottom);
    assert!(!wide.stack_text);
    assert_ne!(tall.placement, wide.placement);
}

#[test]
fn override_wins_over_statistics() {
    let stats = stats_with(|r| match r {
        Region::Left => (250.0, 9_000.0, Rgb8::new(250, 250, 250)),
        _ => (20.0, 0.0, Rgb8::new(20, 20, 20)),
    });
    let o = PlacementOverride::placement(OverridePlacement::Fixed(Region::Left));
    let d = decide_placement(Some(&stats), Some(&o), &landscape());
    assert_eq!(d.placement, Region::Left);
    assert_eq!(d.align, Align::Left);
    // Panel color still follows the forced region's statistics.
    assert_eq!(d.text_color, PlacementPolicy::default().dark_text);
}

#[test]
fn left_or_right_prefers_lower_variance() {
    let stats = stats_with(|r| match r {
        Region::Left => (100.0, 40.0, Rgb8::new(90, 100, 110)),
        Region::Right => (100.0, 90.0, Rgb8::new(100, 100, 100)),
        _ => (100.0, 0.0, Rgb8::new(100, 100, 100)),
    });
    let o = PlacementOverride::placement(OverridePlacement::LeftOrRight);
    let d = decide_placement(Some(&stats), Some(&o), &OutputFormat::new("square", 1080, 1080));
    assert_eq!(d.placement, Region::Left);
    assert_eq!(d.align, Align::Left);
    assert_eq!(d.panel_color.rgb(), Rgb8::new(90, 100, 110));
}

#[test]
fn left_or_right_ties_resolve_right() {
    let o = PlacementOverride::placement(OverridePlacement::LeftOrRight);
    let d = decide_placement(Some(&uniform(80.0)), Some(&o), &landscape());
    assert_eq!(d.placement, Region::Right);
    assert_eq!(d.align, Align::Right);

    let d = decide_placement(None, Some(&o), &landscape());
    assert_eq!(d.placement, Region::Right);
}

#[test]
fn override_align_and_stack_are_respected() {
    let o = PlacementOverride {
        placement: OverridePlacement::LeftOrRight,
        align: Some(Align::Center),
        stack_text: Some(true),
    };
    let d = decide_placement(Some(&uniform(80.0)), Some(&o), &landscape());
    assert_eq!(d.align, Align::Center);
    assert!(d.stack_text);
}

#[test]
fn contrast_threshold_boundary_is_light() {
    let f = landscape();
    let dark = PlacementPolicy::default().dark_text;
    assert_eq!(decide_placement(Some(&uniform(139.999)), None, &f).text_color, Rgb8::WHITE);
    assert_eq!(decide_placement(Some(&uniform(140.0)), None, &f).text_color, dark);
    assert_eq!(decide_placement(Some(&uniform(250.0)), None, &f).text_color, dark);
    assert_eq!(decide_placement(Some(&uniform(0.0)), None, &f).text_color, Rgb8::WHITE);
}

#[test]
fn panel_alpha_is_fixed_regardless_of_intensity() {
    for lum in [0.0, 60.0, 200.0, 255.0] {
        let d = decide_placement(Some(&uniform(lum)), None, &landscape());
        assert_eq!(d.panel_color.a, 153);
    }
}

#[test]
fn missing_statistics_fall_back_to_defaults() {
    let d = decide_placement(None, None, &story());
    assert_eq!(d.placement, Region::BottomCenter);
    assert_eq!(d.align, Align::Center);
    assert!(d.stack_text);
    assert_eq!(d.text_color, Rgb8::WHITE);
    assert_eq!(d.panel_color, Rgb8::new(0x0f, 0x17, 0x2a).with_alpha(153));

    let d = decide_placement(None, None, &landscape());
    assert_eq!(d.placement, Region::CenterBottom);
    assert!(!d.stack_text);
}

#[test]
fn decisions_are_deterministic() {
    let stats = stats_with(|r| (r.index() as f64 * 30.0, r.index() as f64, Rgb8::new(1, 2, 3)));
    let o = PlacementOverride::placement(OverridePlacement::LeftOrRight);
    for format in [story(), landscape()] {
        let a = decide_placement(Some(&stats), Some(&o), &format);
        let b = decide_placement(Some(&stats), Some(&o), &format);
        assert_eq!(a, b);
    }
}

#[test]
fn override_placement_parses_sentinel_and_regions() {
    assert_eq!(
        "left-or-right".parse::<OverridePlacement>().unwrap(),
        OverridePlacement::LeftOrRight
    );
    assert_eq!(
        "bottom".parse::<OverridePlacement>().unwrap(),
        OverridePlacement::Fixed(Region::Bottom)
    );
    assert!("middle".parse::<OverridePlacement>().is_err());
}
