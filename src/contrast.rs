//! Foreground color selection for colored backgrounds.
//!
//! The header band and call-to-action buttons are painted with the user's
//! primary color. Text on top of them must stay readable whatever color was
//! picked, so the text color is derived from the background's WCAG 2.0
//! relative luminance: dark text on light backgrounds, light text otherwise.
//!
//! Input comes from a color picker, so there is no error path. Malformed hex
//! digits read as zero and produce *some* color rather than a failure.

/// Text color used on light backgrounds.
pub const DARK_TEXT: &str = "#111111";

/// Text color used on dark backgrounds.
pub const LIGHT_TEXT: &str = "#ffffff";

/// Luminance above which a background counts as light.
const LIGHT_THRESHOLD: f64 = 0.5;

/// Pick a readable text color for the given background hex color.
///
/// ```text
/// contrast_color("#000000") → "#ffffff"
/// contrast_color("#ffffff") → "#111111"
/// contrast_color("#fff")    → "#111111"   (shorthand expanded)
/// ```
pub fn contrast_color(hex: &str) -> &'static str {
    if relative_luminance(hex) > LIGHT_THRESHOLD {
        DARK_TEXT
    } else {
        LIGHT_TEXT
    }
}

/// WCAG relative luminance of a `#rgb` or `#rrggbb` color, in `0.0..=1.0`.
pub fn relative_luminance(hex: &str) -> f64 {
    let [r, g, b] = parse_rgb(hex);
    0.2126 * linearize(r) + 0.7152 * linearize(g) + 0.0722 * linearize(b)
}

/// Expand `#rgb` shorthand to `rrggbb` (without the leading `#`).
fn expand_hex(hex: &str) -> String {
    let digits = hex.trim().trim_start_matches('#');
    if digits.chars().count() == 3 {
        digits.chars().flat_map(|c| [c, c]).collect()
    } else {
        digits.to_string()
    }
}

/// Parse the three channels as `0.0..=1.0` floats.
fn parse_rgb(hex: &str) -> [f64; 3] {
    let digits = expand_hex(hex);
    let channel = |i: usize| {
        digits
            .get(i * 2..i * 2 + 2)
            .and_then(|pair| u8::from_str_radix(pair, 16).ok())
            .unwrap_or(0) as f64
            / 255.0
    };
    [channel(0), channel(1), channel(2)]
}

/// sRGB gamma expansion for a single channel.
fn linearize(c: f64) -> f64 {
    if c <= 0.03928 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn black_gets_light_text() {
        assert_eq!(contrast_color("#000000"), LIGHT_TEXT);
    }

    #[test]
    fn white_gets_dark_text() {
        assert_eq!(contrast_color("#ffffff"), DARK_TEXT);
    }

    #[test]
    fn shorthand_is_expanded() {
        assert_eq!(contrast_color("#fff"), DARK_TEXT);
        assert_eq!(contrast_color("#000"), LIGHT_TEXT);
        assert!((relative_luminance("#fff") - 1.0).abs() < 1e-9);
    }

    #[test]
    fn green_luminance_matches_precomputed_value() {
        // 0x16, 0xa3, 0x4a → linear 0.00802, 0.36646, 0.06852
        let l = relative_luminance("#16a34a");
        assert!((l - 0.2688).abs() < 0.002, "luminance was {l}");
        assert_eq!(contrast_color("#16a34a"), LIGHT_TEXT);
    }

    #[test]
    fn mid_yellow_is_light() {
        assert_eq!(contrast_color("#facc15"), DARK_TEXT);
    }

    #[test]
    fn uppercase_and_missing_hash_accepted() {
        assert_eq!(contrast_color("FFFFFF"), DARK_TEXT);
    }

    #[test]
    fn garbage_does_not_panic() {
        let _ = contrast_color("not a color");
        let _ = contrast_color("");
        let _ = contrast_color("#ééé");
    }
}
