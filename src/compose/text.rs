//! Width estimates for panel copy.
//!
//! Layout here only has to decide line breaks and font sizes for a rectangular panel, so glyph
//! advances are approximated by an average em fraction instead of shaping real fonts.

/// Average advance of a regular-weight glyph, in em.
const AVG_ADVANCE_EM: f64 = 0.54;
/// Extra advance per 100 weight units above 400, in em.
const WEIGHT_ADVANCE_EM: f64 = 0.012;

/// Estimated rendered width of `text`.
pub(crate) fn estimate_width(text: &str, size: f64, weight: u16) -> f64 {
    let extra = (f64::from(weight.saturating_sub(400)) / 100.0) * WEIGHT_ADVANCE_EM;
    text.chars().count() as f64 * size * (AVG_ADVANCE_EM + extra)
}

/// Greedy word wrap. Words longer than `max_width` get a line of their own.
pub(crate) fn wrap_words(text: &str, size: f64, weight: u16, max_width: f64) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        if current.is_empty() {
            current.push_str(word);
            continue;
        }
        let candidate = format!("{current} {word}");
        if estimate_width(&candidate, size, weight) <= max_width {
            current = candidate;
        } else {
            lines.push(std::mem::take(&mut current));
            current.push_str(word);
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

/// Font size at which `text` fits `max_width` on one line, never below `min_ratio × base_size`.
pub(crate) fn fit_single_line(
    text: &str,
    base_size: f64,
    weight: u16,
    max_width: f64,
    min_ratio: f64,
) -> f64 {
    let width = estimate_width(text, base_size, weight);
    if width <= max_width || width <= 0.0 {
        return base_size;
    }
    (base_size * max_width / width).max(base_size * min_ratio)
}

/// Wrap `text`, shrinking the size in 10 % steps until it fits in `max_lines` or hits the floor.
pub(crate) fn wrap_to_fit(
    text: &str,
    base_size: f64,
    weight: u16,
    max_width: f64,
    max_lines: usize,
    min_ratio: f64,
) -> (f64, Vec<String>) {
    let floor = base_size * min_ratio;
    let mut size = base_size;
    loop {
        let lines = wrap_words(text, size, weight, max_width);
        if lines.len() <= max_lines || size <= floor {
            return (size, lines);
        }
        size = (size * 0.9).max(floor);
    }
}
