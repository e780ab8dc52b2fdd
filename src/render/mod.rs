//! PNG rendering of the statistics.
//!
//! Layout code is written against [`TextMeasure`] so it can be computed
//! without a font file; drawing uses `fontdue` glyphs on an `image` buffer.

pub mod canvas;
pub mod chart;
pub mod wordcloud;

use crate::error::{ChatStatError, Result};
use image::Rgb;

/// Pixel size of a rendered string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextSize {
    pub width: u32,
    pub height: u32,
}

/// Measures text for layout.
pub trait TextMeasure {
    /// Size of `text` set on one line at `px` pixels.
    fn measure(&self, text: &str, px: f32) -> TextSize;
}

impl TextMeasure for fontdue::Font {
    fn measure(&self, text: &str, px: f32) -> TextSize {
        let width: f32 = text
            .chars()
            .map(|c| self.metrics(c, px).advance_width)
            .sum();
        let (ascent, descent) = canvas::line_metrics(self, px);

        TextSize {
            width: width.ceil().max(0.0) as u32,
            height: (ascent - descent).ceil().max(1.0) as u32,
        }
    }
}

/// Colors used for word cloud words, from dark purple to yellow.
pub const PALETTE: [Rgb<u8>; 8] = [
    Rgb([68, 1, 84]),
    Rgb([70, 50, 126]),
    Rgb([54, 92, 141]),
    Rgb([39, 127, 142]),
    Rgb([31, 161, 135]),
    Rgb([74, 193, 109]),
    Rgb([160, 218, 57]),
    Rgb([223, 227, 24]),
];

/// Parse a color name or a `#rgb` / `#rrggbb` hex string.
pub fn parse_color(value: &str) -> Result<Rgb<u8>> {
    let value = value.trim();

    if let Some(hex) = value.strip_prefix('#') {
        return parse_hex(hex).ok_or_else(|| ChatStatError::InvalidColor(value.to_string()));
    }

    let rgb = match value.to_lowercase().as_str() {
        "white" => [255, 255, 255],
        "black" => [0, 0, 0],
        "red" => [255, 0, 0],
        "green" => [0, 128, 0],
        "blue" => [0, 0, 255],
        "navy" => [0, 0, 128],
        "yellow" => [255, 255, 0],
        "orange" => [255, 165, 0],
        "purple" => [128, 0, 128],
        "gray" | "grey" => [128, 128, 128],
        "lightgray" | "lightgrey" => [211, 211, 211],
        "darkgray" | "darkgrey" => [169, 169, 169],
        "whitesmoke" => [245, 245, 245],
        _ => return Err(ChatStatError::InvalidColor(value.to_string())),
    };

    Ok(Rgb(rgb))
}

fn parse_hex(hex: &str) -> Option<Rgb<u8>> {
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }

    match hex.len() {
        3 => {
            let mut rgb = [0u8; 3];
            for (i, c) in hex.chars().enumerate() {
                let v = c.to_digit(16)? as u8;
                rgb[i] = v * 17;
            }
            Some(Rgb(rgb))
        }
        6 => {
            let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
            let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
            let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
            Some(Rgb([r, g, b]))
        }
        _ => None,
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Monospace measure: each char is 0.6em wide, lines are 1.2em tall.
    pub(crate) struct FixedMeasure;

    impl TextMeasure for FixedMeasure {
        fn measure(&self, text: &str, px: f32) -> TextSize {
            TextSize {
                width: (text.chars().count() as f32 * px * 0.6).ceil() as u32,
                height: (px * 1.2).ceil() as u32,
            }
        }
    }

    /// DejaVu Sans, which covers Latin and Arabic script.
    pub(crate) fn test_font() -> fontdue::Font {
        let path = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures/DejaVuSans.ttf");
        crate::loader::load_font(&path).unwrap()
    }

    #[test]
    fn test_font_measure() {
        let font = test_font();
        let short = font.measure("ab", 20.0);
        let long = font.measure("abab", 20.0);

        assert!(short.width > 0);
        assert!(long.width > short.width);
        assert!(short.height >= 20);
        assert_eq!(font.measure("", 20.0).width, 0);
    }

    #[test]
    fn test_parse_named_colors() {
        assert_eq!(parse_color("white").unwrap(), Rgb([255, 255, 255]));
        assert_eq!(parse_color("Black").unwrap(), Rgb([0, 0, 0]));
        assert!(parse_color("chartreuse-ish").is_err());
    }

    #[test]
    fn test_parse_hex_colors() {
        assert_eq!(parse_color("#ff8000").unwrap(), Rgb([255, 128, 0]));
        assert_eq!(parse_color("#fff").unwrap(), Rgb([255, 255, 255]));
        assert!(parse_color("#12345").is_err());
        assert!(parse_color("#gggggg").is_err());
    }
}
