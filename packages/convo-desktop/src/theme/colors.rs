//! Color utilities for theme parsing

use gpui::Hsla;

/// Parse a hex color string to Hsla
/// Supports formats: #RGB, #RRGGBB, #RRGGBBAA
pub fn hex(color: &str) -> Hsla {
    let color = color.trim_start_matches('#');
    let channel = |s: &str| u8::from_str_radix(s, 16).unwrap_or(0);

    let (r, g, b, a) = match color.len() {
        3 => (
            channel(&color[0..1].repeat(2)),
            channel(&color[1..2].repeat(2)),
            channel(&color[2..3].repeat(2)),
            255u8,
        ),
        6 => (
            channel(&color[0..2]),
            channel(&color[2..4]),
            channel(&color[4..6]),
            255u8,
        ),
        8 => (
            channel(&color[0..2]),
            channel(&color[2..4]),
            channel(&color[4..6]),
            u8::from_str_radix(&color[6..8], 16).unwrap_or(255),
        ),
        _ => (0, 0, 0, 255),
    };

    rgb_to_hsla(r, g, b, a)
}

/// Convert RGB to HSLA
fn rgb_to_hsla(r: u8, g: u8, b: u8, a: u8) -> Hsla {
    let r = r as f32 / 255.0;
    let g = g as f32 / 255.0;
    let b = b as f32 / 255.0;
    let a = a as f32 / 255.0;

    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let l = (max + min) / 2.0;

    if max == min {
        // Achromatic
        return Hsla { h: 0.0, s: 0.0, l, a };
    }

    let d = max - min;
    let s = if l > 0.5 {
        d / (2.0 - max - min)
    } else {
        d / (max + min)
    };
    let h = if max == r {
        let h = (g - b) / d;
        if g < b { h + 6.0 } else { h }
    } else if max == g {
        (b - r) / d + 2.0
    } else {
        (r - g) / d + 4.0
    };

    Hsla { h: h / 6.0, s, l, a }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_parsing() {
        let white = hex("#ffffff");
        assert!((white.l - 1.0).abs() < 0.01);

        let red = hex("#ff0000");
        assert!((red.h - 0.0).abs() < 0.01);
        assert!((red.s - 1.0).abs() < 0.01);
    }

    #[test]
    fn test_model_badge_colors() {
        // chatgpt green
        let green = hex("#10a37f");
        assert!(green.h > 0.4 && green.h < 0.5);
        assert!((hex("#19cfcf").l - hex("#19CFCF").l).abs() < f32::EPSILON);
    }

    #[test]
    fn test_invalid_hex_is_black() {
        let color = hex("#12");
        assert_eq!(color.l, 0.0);
        assert_eq!(color.a, 1.0);
    }
}
