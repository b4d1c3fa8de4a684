//! Text layer rasterization: system-font lookup plus glyph drawing.
//!
//! Fonts come from the host via `font-kit` (with a sans-serif fallback when
//! the requested family is absent) and are rasterized with `ab_glyph`. Weight
//! and slant are resolved at font-selection time rather than synthesized.
//! When no usable font can be loaded at all, the caller skips the text layer.

#![allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]

use ab_glyph::{point, Font, FontArc, ScaleFont};
use font_kit::family_name::FamilyName;
use font_kit::properties::{Properties, Style, Weight};
use font_kit::source::SystemSource;
use image::{Rgba, RgbaImage};

use super::color;
use crate::canvas::element::{FontStyle, FontWeight, TextAlign, TextDecoration, TextProps};

/// Load a system font by family, weight, and slant.
///
/// Falls back to the platform sans-serif family when the requested one is
/// missing; returns `None` only when no usable font exists at all.
#[must_use]
pub fn load_font(family: &str, weight: FontWeight, style: FontStyle) -> Option<FontArc> {
    let mut properties = Properties::new();
    properties.weight = match weight {
        FontWeight::Normal => Weight::NORMAL,
        FontWeight::Bold => Weight::BOLD,
    };
    properties.style = match style {
        FontStyle::Normal => Style::Normal,
        FontStyle::Italic => Style::Italic,
    };

    let families = [FamilyName::Title(family.to_string()), FamilyName::SansSerif];
    let handle = SystemSource::new().select_best_match(&families, &properties).ok()?;
    let font = handle.load().ok()?;
    let bytes: Vec<u8> = (*font.copy_font_data()?).clone();
    FontArc::try_from_vec(bytes).ok()
}

/// Rasterize a text layer into an RGBA tile of the element's pixel size.
///
/// Lines are stacked top-down with the configured line-height multiplier and
/// aligned per `text_align`; glyphs overflowing the tile are clipped. Returns
/// `None` when no font could be loaded (the layer is skipped), `Some` with a
/// fully transparent tile for empty content.
#[must_use]
pub fn render_text_tile(props: &TextProps, tile_w: u32, tile_h: u32, scale: f32) -> Option<RgbaImage> {
    if tile_w == 0 || tile_h == 0 {
        return None;
    }
    let mut tile = RgbaImage::new(tile_w, tile_h);
    if props.content.is_empty() {
        return Some(tile);
    }

    let font = load_font(&props.font_family, props.font_weight, props.font_style)?;
    let font_px = (props.font_size as f32) * scale;
    let scaled = font.as_scaled(font_px);
    let ascent = scaled.ascent();
    let line_advance = font_px * props.line_height as f32;
    let letter_px = (props.letter_spacing as f32) * scale;
    let color = color::parse_hex(&props.color).unwrap_or(Rgba([0, 0, 0, 255]));

    for (line_index, line) in props.content.split('\n').enumerate() {
        let line_top = line_index as f32 * line_advance;
        let baseline = line_top + ascent;
        if line_top >= tile_h as f32 {
            break;
        }

        // First pass: advance widths, so alignment can offset the whole line.
        let mut line_width = 0.0f32;
        let mut previous = None;
        for ch in line.chars() {
            let glyph_id = font.glyph_id(ch);
            if let Some(prev) = previous {
                line_width += scaled.kern(prev, glyph_id);
            }
            line_width += scaled.h_advance(glyph_id) + letter_px;
            previous = Some(glyph_id);
        }
        let offset_x = line_offset(props.text_align, tile_w as f32, line_width);

        // Second pass: outline and draw each glyph.
        let mut pen_x = offset_x;
        let mut previous = None;
        for ch in line.chars() {
            let glyph_id = font.glyph_id(ch);
            if let Some(prev) = previous {
                pen_x += scaled.kern(prev, glyph_id);
            }
            let glyph = glyph_id.with_scale_and_position(font_px, point(pen_x, baseline));
            if let Some(outlined) = font.outline_glyph(glyph) {
                let bounds = outlined.px_bounds();
                outlined.draw(|gx, gy, coverage| {
                    let x = bounds.min.x + gx as f32;
                    let y = bounds.min.y + gy as f32;
                    if x >= 0.0 && y >= 0.0 && x < tile_w as f32 && y < tile_h as f32 {
                        paint_coverage(&mut tile, x as u32, y as u32, color, coverage);
                    }
                });
            }
            pen_x += scaled.h_advance(glyph_id) + letter_px;
            previous = Some(glyph_id);
        }

        // Decorations span the laid-out line width.
        if line_width > 0.0 {
            let thickness = (font_px * 0.06).max(1.0);
            match props.text_decoration {
                TextDecoration::Underline => {
                    let y = baseline + font_px * 0.1;
                    draw_decoration(&mut tile, offset_x, y, line_width, thickness, color);
                }
                TextDecoration::LineThrough => {
                    let y = line_top + ascent * 0.6;
                    draw_decoration(&mut tile, offset_x, y, line_width, thickness, color);
                }
                TextDecoration::None => {}
            }
        }
    }

    Some(tile)
}

/// Horizontal offset of a line within its box for the given alignment.
fn line_offset(align: TextAlign, box_w: f32, line_w: f32) -> f32 {
    match align {
        TextAlign::Left => 0.0,
        TextAlign::Center => (box_w - line_w) * 0.5,
        TextAlign::Right => box_w - line_w,
    }
}

/// Merge a coverage sample into the tile, keeping the strongest alpha.
///
/// All glyphs of a layer share one color, so max-alpha is exact where glyph
/// edges overlap and avoids double-compositing seams.
fn paint_coverage(tile: &mut RgbaImage, x: u32, y: u32, color: Rgba<u8>, coverage: f32) {
    let shaded = color::with_coverage(color, coverage);
    let pixel = tile.get_pixel_mut(x, y);
    if shaded.0[3] > pixel.0[3] {
        *pixel = shaded;
    }
}

fn draw_decoration(
    tile: &mut RgbaImage,
    start_x: f32,
    center_y: f32,
    width: f32,
    thickness: f32,
    color: Rgba<u8>,
) {
    let y0 = ((center_y - thickness * 0.5).floor().max(0.0)) as u32;
    let y1 = ((center_y + thickness * 0.5).ceil().min(f32::from(u16::MAX))) as u32;
    let x0 = (start_x.floor().max(0.0)) as u32;
    let x1 = ((start_x + width).ceil().min(f32::from(u16::MAX))) as u32;
    for y in y0..y1.min(tile.height()) {
        for x in x0..x1.min(tile.width()) {
            tile.put_pixel(x, y, color);
        }
    }
}

#[cfg(test)]
#[path = "text_test.rs"]
mod tests;
