//! Bitmap-font text rasterization.
//!
//! Uses the Spleen PSF2 font family, scaled to the requested font size by
//! nearest-neighbor sampling and tinted with the element's fill color.
//! Line wrapping is computed from the monospaced advance width, so a text
//! box's available width maps directly to a character count.

use image::{Rgba, RgbaImage};
use spleen_font::{FONT_6X12, FONT_8X16, FONT_12X24, PSF2Font};
use std::collections::HashMap;

use crate::color::blend_over;

/// Base glyph dimensions for a font family name.
///
/// - "small"  → Spleen 6×12
/// - "medium" → Spleen 8×16
/// - anything else → Spleen 12×24 (the default face)
fn family_metrics(family: &str) -> (usize, usize) {
    match family {
        "small" => (6, 12),
        "medium" => (8, 16),
        _ => (12, 24),
    }
}

/// Fetch a glyph bitmap (row-major, 0/1 per pixel) for a character.
fn generate_glyph(family: &str, ch: char) -> Vec<u8> {
    let (w, h) = family_metrics(family);
    let mut glyph = vec![0u8; w * h];

    let mut font = match family {
        "small" => PSF2Font::new(FONT_6X12),
        "medium" => PSF2Font::new(FONT_8X16),
        _ => PSF2Font::new(FONT_12X24),
    }
    .expect("embedded PSF2 font is well-formed");

    let utf8 = ch.to_string();
    if let Some(rows) = font.glyph_for_utf8(utf8.as_bytes()) {
        for (y, row) in rows.enumerate() {
            for (x, on) in row.enumerate() {
                if y < h && x < w && on {
                    glyph[y * w + x] = 1;
                }
            }
        }
    } else {
        // Unknown char: hollow box fallback.
        for x in 0..w {
            glyph[x] = 1;
            glyph[(h - 1) * w + x] = 1;
        }
        for y in 0..h {
            glyph[y * w] = 1;
            glyph[y * w + w - 1] = 1;
        }
    }

    glyph
}

/// A text rasterizer with a per-call glyph cache.
pub struct TextRasterizer {
    cache: HashMap<(String, char), Vec<u8>>,
}

impl Default for TextRasterizer {
    fn default() -> Self {
        Self::new()
    }
}

impl TextRasterizer {
    pub fn new() -> Self {
        Self {
            cache: HashMap::new(),
        }
    }

    fn glyph(&mut self, family: &str, ch: char) -> &[u8] {
        self.cache
            .entry((family.to_string(), ch))
            .or_insert_with(|| generate_glyph(family, ch))
    }

    /// Draw wrapped text onto `img` with its top-left corner at (x, y).
    ///
    /// `max_width` is the horizontal space available to the text box;
    /// content wraps at word boundaries to fit it, and explicit newlines
    /// are honored.
    #[allow(clippy::too_many_arguments)]
    pub fn draw(
        &mut self,
        img: &mut RgbaImage,
        content: &str,
        family: &str,
        font_size: f32,
        color: Rgba<u8>,
        bold: bool,
        x: f32,
        y: f32,
        max_width: f32,
    ) {
        let (base_w, base_h) = family_metrics(family);
        let scale = (font_size / base_h as f32).max(0.05);
        let char_w = base_w as f32 * scale;
        let line_h = base_h as f32 * scale;
        let max_chars = if char_w > 0.0 {
            ((max_width / char_w).floor() as usize).max(1)
        } else {
            1
        };

        // Double-strike offset for bold, at least one device pixel.
        let strike = (scale).round().max(1.0);

        for (line_idx, line) in wrap_lines(content, max_chars).iter().enumerate() {
            let line_y = y + line_idx as f32 * line_h;
            for (col, ch) in line.chars().enumerate() {
                let glyph_x = x + col as f32 * char_w;
                let glyph = self.glyph(family, ch).to_vec();
                blit_glyph(img, &glyph, base_w, base_h, glyph_x, line_y, scale, color);
                if bold {
                    blit_glyph(
                        img,
                        &glyph,
                        base_w,
                        base_h,
                        glyph_x + strike,
                        line_y,
                        scale,
                        color,
                    );
                }
            }
        }
    }
}

/// Blit one glyph bitmap scaled by `scale`, nearest-neighbor.
#[allow(clippy::too_many_arguments)]
fn blit_glyph(
    img: &mut RgbaImage,
    glyph: &[u8],
    base_w: usize,
    base_h: usize,
    x: f32,
    y: f32,
    scale: f32,
    color: Rgba<u8>,
) {
    let out_w = (base_w as f32 * scale).ceil() as i64;
    let out_h = (base_h as f32 * scale).ceil() as i64;
    let (img_w, img_h) = (img.width() as i64, img.height() as i64);

    for dy in 0..out_h {
        let py = y as i64 + dy;
        if py < 0 || py >= img_h {
            continue;
        }
        let sy = ((dy as f32 / scale) as usize).min(base_h - 1);
        for dx in 0..out_w {
            let px = x as i64 + dx;
            if px < 0 || px >= img_w {
                continue;
            }
            let sx = ((dx as f32 / scale) as usize).min(base_w - 1);
            if glyph[sy * base_w + sx] == 1 {
                blend_over(img.get_pixel_mut(px as u32, py as u32), color);
            }
        }
    }
}

/// Split content into display lines: explicit newlines first, then word
/// wrapping to `max_chars` columns, hard-breaking words that are too long
/// for a whole line.
pub fn wrap_lines(content: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    let mut lines = Vec::new();

    for raw in content.split('\n') {
        if raw.chars().count() <= max_chars {
            lines.push(raw.to_string());
            continue;
        }

        let mut current = String::new();
        for word in raw.split(' ') {
            let word_len = word.chars().count();
            let current_len = current.chars().count();

            if current.is_empty() && word_len <= max_chars {
                current.push_str(word);
            } else if current_len + 1 + word_len <= max_chars {
                current.push(' ');
                current.push_str(word);
            } else {
                if !current.is_empty() {
                    lines.push(std::mem::take(&mut current));
                }
                // Hard-break oversized words.
                let mut rest: Vec<char> = word.chars().collect();
                while rest.len() > max_chars {
                    lines.push(rest.drain(..max_chars).collect());
                }
                current = rest.into_iter().collect();
            }
        }
        lines.push(current);
    }

    lines
}
