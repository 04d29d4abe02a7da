//! Text measurement and rasterization into sprites.

use alloc::vec::Vec;

use super::{
    color::Rgb565,
    font::{GLYPH_SIZE, glyph_bit},
    sprite::Sprite,
};

/// On-screen `(width, height)` of `text` at `scale` (clamped to at least 1).
pub fn text_size(text: &str, scale: u8) -> (i32, i32) {
    let scale = scale.max(1) as i32;
    let glyphs = text.chars().count() as i32;
    let cell = GLYPH_SIZE as i32;
    (cell * glyphs * scale, cell * scale)
}

/// Rasterizes `text` into a sprite.
///
/// Glyphs are drawn at 1x over `background` (black when `None`), then
/// upscaled by nearest-neighbor replication when `scale > 1`. Returns `None`
/// when the result would not fit the 16-bit sprite dimensions.
pub fn render_text_sprite(
    text: &str,
    color: Rgb565,
    background: Option<Rgb565>,
    scale: u8,
) -> Option<Sprite> {
    let scale = scale.max(1) as usize;
    let glyphs = text.chars().count();
    let base_w = GLYPH_SIZE * glyphs;
    let base_h = GLYPH_SIZE;

    let out_w = u16::try_from(base_w * scale).ok()?;
    let out_h = u16::try_from(base_h * scale).ok()?;

    let base = rasterize(text, color, background.unwrap_or(Rgb565::BLACK), base_w);
    let data = if scale == 1 {
        base
    } else {
        scale_nearest(&base, base_w, base_h, scale)
    };

    Sprite::from_rgb565(out_w, out_h, data).ok()
}

fn rasterize(text: &str, color: Rgb565, background: Rgb565, width: usize) -> Vec<u8> {
    let mut buf = Vec::with_capacity(width * GLYPH_SIZE * 2);
    let bg = background.to_be_bytes();
    for _ in 0..width * GLYPH_SIZE {
        buf.extend_from_slice(&bg);
    }

    let fg = color.to_be_bytes();
    for (index, c) in text.chars().enumerate() {
        for row in 0..GLYPH_SIZE {
            for col in 0..GLYPH_SIZE {
                if !glyph_bit(c, col, row) {
                    continue;
                }
                let offset = 2 * (row * width + index * GLYPH_SIZE + col);
                buf[offset..offset + 2].copy_from_slice(&fg);
            }
        }
    }

    buf
}

/// Nearest-neighbor upscale: destination `(dx, dy)` copies source
/// `(dx / scale, dy / scale)`.
pub fn scale_nearest(src: &[u8], src_w: usize, src_h: usize, scale: usize) -> Vec<u8> {
    let out_w = src_w * scale;
    let out_h = src_h * scale;
    let mut out = Vec::with_capacity(out_w * out_h * 2);

    for dy in 0..out_h {
        let row = &src[2 * (dy / scale) * src_w..2 * (dy / scale + 1) * src_w];
        for dx in 0..out_w {
            let sx = 2 * (dx / scale);
            out.extend_from_slice(&row[sx..sx + 2]);
        }
    }

    out
}
