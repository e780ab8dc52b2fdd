//! Drawing primitives on an RGB image.

use crate::error::{ChatStatError, Result};
use fontdue::Font;
use image::{Rgb, RgbImage};
use std::path::Path;

/// Ascent and (negative) descent of a font at `px`.
pub fn line_metrics(font: &Font, px: f32) -> (f32, f32) {
    font.horizontal_line_metrics(px)
        .map(|m| (m.ascent, m.descent))
        .unwrap_or((px * 0.8, -px * 0.2))
}

/// A blank image filled with `background`.
pub fn blank(width: u32, height: u32, background: Rgb<u8>) -> RgbImage {
    RgbImage::from_pixel(width, height, background)
}

/// Fill a rectangle, clipped to the image.
pub fn fill_rect(img: &mut RgbImage, x: u32, y: u32, width: u32, height: u32, color: Rgb<u8>) {
    let x_end = x.saturating_add(width).min(img.width());
    let y_end = y.saturating_add(height).min(img.height());

    for py in y..y_end {
        for px in x..x_end {
            img.put_pixel(px, py, color);
        }
    }
}

/// Draw `text` with its line box's top-left corner at (`x`, `y`).
///
/// Glyphs are blended by coverage and clipped to the image.
pub fn draw_text(img: &mut RgbImage, font: &Font, text: &str, x: i32, y: i32, px: f32, color: Rgb<u8>) {
    let (ascent, _) = line_metrics(font, px);
    let baseline = y as f32 + ascent;
    let mut pen_x = x as f32;

    for c in text.chars() {
        let (metrics, coverage) = font.rasterize(c, px);
        let glyph_x = (pen_x + metrics.xmin as f32).round() as i32;
        let glyph_y = (baseline - metrics.height as f32 - metrics.ymin as f32).round() as i32;

        for row in 0..metrics.height {
            for col in 0..metrics.width {
                let alpha = coverage[row * metrics.width + col];
                if alpha == 0 {
                    continue;
                }

                let tx = glyph_x + col as i32;
                let ty = glyph_y + row as i32;
                if tx < 0 || ty < 0 || tx >= img.width() as i32 || ty >= img.height() as i32 {
                    continue;
                }

                let pixel = img.get_pixel_mut(tx as u32, ty as u32);
                *pixel = blend(*pixel, color, alpha);
            }
        }

        pen_x += metrics.advance_width;
    }
}

/// Mix `fg` over `bg` with `alpha` coverage.
pub fn blend(bg: Rgb<u8>, fg: Rgb<u8>, alpha: u8) -> Rgb<u8> {
    let a = alpha as u32;
    let mix = |b: u8, f: u8| ((f as u32 * a + b as u32 * (255 - a) + 127) / 255) as u8;
    Rgb([mix(bg[0], fg[0]), mix(bg[1], fg[1]), mix(bg[2], fg[2])])
}

/// A color readable on `background`.
pub fn contrast_color(background: Rgb<u8>) -> Rgb<u8> {
    let luma = 0.299 * background[0] as f32 + 0.587 * background[1] as f32 + 0.114 * background[2] as f32;
    if luma > 140.0 {
        Rgb([30, 30, 30])
    } else {
        Rgb([235, 235, 235])
    }
}

/// Save as PNG, creating the parent directory if needed.
pub fn save_png(img: &RgbImage, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| ChatStatError::io(parent, e))?;
    }
    img.save_with_format(path, image::ImageFormat::Png)?;
    Ok(())
}
