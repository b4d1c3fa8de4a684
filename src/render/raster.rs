//! The production rasterizer: composites a document onto a pixel canvas.
//!
//! Elements are painted in list order (index 0 first, so later elements land
//! on top), each resolved to device pixels at 2x density. Shapes are drawn
//! with signed-distance fields directly in rotated space; images and text are
//! rendered into an axis-aligned tile and composited with inverse-mapped
//! bilinear sampling when rotated.

#![allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]

use std::io::Cursor;

use base64::Engine;
use image::{DynamicImage, ImageFormat, Pixel, Rgba, RgbaImage};
use tracing::{debug, warn};

use super::{color, text, ExportFormat, Rasterizer, RenderError};
use crate::canvas::consts::{CANVAS_HEIGHT_PX, CANVAS_WIDTH_PX, EXPORT_SCALE};
use crate::canvas::doc::Document;
use crate::canvas::element::{CanvasElement, ElementProps, ImageProps, ObjectFit, ShapeProps, TextProps};
use crate::canvas::geometry::Viewport;
use crate::canvas::placement::{self, PixelRect};

/// CPU rasterizer backed by the `image` crate.
pub struct PixelRasterizer;

impl Rasterizer for PixelRasterizer {
    fn rasterize(&self, doc: &Document, format: ExportFormat) -> Result<Vec<u8>, RenderError> {
        let canvas = compose(doc);
        encode(canvas, format)
    }
}

/// The viewport every export renders against: full canvas at 2x density.
fn export_viewport() -> Viewport {
    let scale = f64::from(EXPORT_SCALE);
    Viewport { width_px: CANVAS_WIDTH_PX * scale, height_px: CANVAS_HEIGHT_PX * scale }
}

fn compose(doc: &Document) -> RgbaImage {
    let viewport = export_viewport();
    let width = viewport.width_px as u32;
    let height = viewport.height_px as u32;

    let fill = color::parse_hex(doc.background_color()).unwrap_or(Rgba([255, 255, 255, 255]));
    let mut canvas = RgbaImage::from_pixel(width, height, fill);

    // A background image wins over the color when it decodes.
    if let Some(src) = doc.background_image() {
        match decode_image_source(src) {
            Some(bitmap) => {
                let fitted = fit_image(
                    ObjectFit::Cover,
                    bitmap.width(),
                    bitmap.height(),
                    width as f32,
                    height as f32,
                );
                draw_fitted(&mut canvas, &bitmap, &fitted);
            }
            None => warn!("background image undecodable; falling back to background color"),
        }
    }

    for element in doc.elements().iter() {
        draw_element(&mut canvas, element);
    }
    canvas
}

fn draw_element(canvas: &mut RgbaImage, element: &CanvasElement) {
    let rect = placement::to_pixels(element, export_viewport());
    if rect.width < 1.0 || rect.height < 1.0 {
        return;
    }
    match &element.props {
        ElementProps::Shape(shape) => draw_shape(canvas, &rect, element.rotation, shape),
        ElementProps::Image(image) => draw_image(canvas, &rect, element.rotation, image),
        ElementProps::Text(text_props) => draw_text(canvas, &rect, element.rotation, text_props),
    }
}

fn encode(canvas: RgbaImage, format: ExportFormat) -> Result<Vec<u8>, RenderError> {
    let mut cursor = Cursor::new(Vec::new());
    match format {
        ExportFormat::Png => DynamicImage::ImageRgba8(canvas)
            .write_to(&mut cursor, ImageFormat::Png)
            .map_err(|e| RenderError::Encode(e.to_string()))?,
        ExportFormat::Jpeg => {
            // JPEG carries no alpha; the canvas is opaque by construction.
            let rgb = DynamicImage::ImageRgba8(canvas).to_rgb8();
            DynamicImage::ImageRgb8(rgb)
                .write_to(&mut cursor, ImageFormat::Jpeg)
                .map_err(|e| RenderError::Encode(e.to_string()))?;
        }
    }
    Ok(cursor.into_inner())
}

// =============================================================================
// SHAPES
// =============================================================================

fn draw_shape(canvas: &mut RgbaImage, rect: &PixelRect, rotation_deg: f64, props: &ShapeProps) {
    let fill = color::parse_hex(&props.fill_color);
    let stroke_width = (props.stroke_width * f64::from(EXPORT_SCALE)) as f32;
    let stroke = if stroke_width > 0.0 { color::parse_hex(&props.stroke_color) } else { None };
    if fill.is_none() && stroke.is_none() {
        return;
    }

    let half_w = (rect.width / 2.0) as f32;
    let half_h = (rect.height / 2.0) as f32;
    let center_x = (rect.x + rect.width / 2.0) as f32;
    let center_y = (rect.y + rect.height / 2.0) as f32;
    let radius = (props.corner_radius.unwrap_or(0.0).max(0.0) * f64::from(EXPORT_SCALE)) as f32;
    let (sin_r, cos_r) = (rotation_deg.to_radians() as f32).sin_cos();

    let pad = stroke_width / 2.0 + 2.0;
    let Some((x0, y0, x1, y1)) =
        rotated_bounds(canvas, center_x, center_y, half_w, half_h, sin_r, cos_r, pad)
    else {
        return;
    };

    let stroke_half = stroke_width / 2.0;
    for py in y0..y1 {
        for px in x0..x1 {
            let dx = px as f32 + 0.5 - center_x;
            let dy = py as f32 + 0.5 - center_y;
            let local_x = dx * cos_r + dy * sin_r;
            let local_y = -dx * sin_r + dy * cos_r;
            let d = sdf_rounded_box(local_x, local_y, half_w, half_h, radius);

            if let Some(fill) = fill {
                let coverage = smoothstep(0.5, -0.5, d);
                blend_pixel(canvas, px, py, color::with_coverage(fill, coverage));
            }
            if let Some(stroke) = stroke {
                let band = d.abs() - stroke_half;
                let coverage = smoothstep(0.5, -0.5, band);
                blend_pixel(canvas, px, py, color::with_coverage(stroke, coverage));
            }
        }
    }
}

/// SDF for a box centred at the origin with half-extents `(hx, hy)`.
fn sdf_box(px: f32, py: f32, hx: f32, hy: f32) -> f32 {
    let dx = px.abs() - hx;
    let dy = py.abs() - hy;
    let outside = (dx.max(0.0) * dx.max(0.0) + dy.max(0.0) * dy.max(0.0)).sqrt();
    let inside = dx.max(dy).min(0.0);
    outside + inside
}

/// SDF for a rounded box; the radius never exceeds the half-extents.
fn sdf_rounded_box(px: f32, py: f32, hx: f32, hy: f32, r: f32) -> f32 {
    let r = r.min(hx).min(hy);
    sdf_box(px, py, hx - r, hy - r) - r
}

fn smoothstep(edge0: f32, edge1: f32, x: f32) -> f32 {
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// Canvas-clamped bounding box of a rotated rect, or `None` when fully
/// off-canvas.
#[allow(clippy::too_many_arguments)]
fn rotated_bounds(
    canvas: &RgbaImage,
    center_x: f32,
    center_y: f32,
    half_w: f32,
    half_h: f32,
    sin_r: f32,
    cos_r: f32,
    pad: f32,
) -> Option<(u32, u32, u32, u32)> {
    let corners = [(-half_w, -half_h), (half_w, -half_h), (half_w, half_h), (-half_w, half_h)];
    let mut min_x = f32::MAX;
    let mut min_y = f32::MAX;
    let mut max_x = f32::MIN;
    let mut max_y = f32::MIN;
    for (cx, cy) in corners {
        let rx = cx * cos_r - cy * sin_r + center_x;
        let ry = cx * sin_r + cy * cos_r + center_y;
        min_x = min_x.min(rx);
        min_y = min_y.min(ry);
        max_x = max_x.max(rx);
        max_y = max_y.max(ry);
    }

    let x0 = (min_x - pad).floor().max(0.0) as u32;
    let y0 = (min_y - pad).floor().max(0.0) as u32;
    let x1 = ((max_x + pad).ceil().max(0.0) as u32).min(canvas.width());
    let y1 = ((max_y + pad).ceil().max(0.0) as u32).min(canvas.height());
    if x0 >= x1 || y0 >= y1 {
        return None;
    }
    Some((x0, y0, x1, y1))
}

fn blend_pixel(canvas: &mut RgbaImage, x: u32, y: u32, color: Rgba<u8>) {
    if color.0[3] == 0 {
        return;
    }
    canvas.get_pixel_mut(x, y).blend(&color);
}

// =============================================================================
// IMAGES
// =============================================================================

fn draw_image(canvas: &mut RgbaImage, rect: &PixelRect, rotation_deg: f64, props: &ImageProps) {
    let Some(bitmap) = decode_image_source(&props.src) else {
        return;
    };
    let tile_w = rect.width.round() as u32;
    let tile_h = rect.height.round() as u32;
    if tile_w == 0 || tile_h == 0 {
        return;
    }

    let mut tile = RgbaImage::new(tile_w, tile_h);
    let fitted =
        fit_image(props.object_fit, bitmap.width(), bitmap.height(), tile_w as f32, tile_h as f32);
    draw_fitted(&mut tile, &bitmap, &fitted);

    let corner_radius = (props.border_radius.unwrap_or(0.0).max(0.0) * f64::from(EXPORT_SCALE)) as f32;
    if corner_radius > 0.0 {
        apply_corner_mask(&mut tile, corner_radius);
    }

    let border_width = (props.border_width.unwrap_or(0.0).max(0.0) * f64::from(EXPORT_SCALE)) as f32;
    if border_width > 0.0 {
        if let Some(border) = props.border_color.as_deref().and_then(color::parse_hex) {
            draw_tile_border(&mut tile, corner_radius, border_width, border);
        }
    }

    composite_tile(canvas, &tile, rect.x as f32, rect.y as f32, rotation_deg as f32);
}

/// Placement of a source bitmap within a destination box, in device pixels
/// relative to the box origin. The drawn rect may exceed the box (`cover`,
/// `none`); the box crops it.
#[derive(Debug, Clone, Copy, PartialEq)]
struct FittedImage {
    dx: f32,
    dy: f32,
    draw_w: f32,
    draw_h: f32,
}

/// CSS object-fit placement math. `none` and `scale-down` treat one source
/// pixel as one logical canvas pixel, which is `EXPORT_SCALE` device pixels.
fn fit_image(fit: ObjectFit, src_w: u32, src_h: u32, box_w: f32, box_h: f32) -> FittedImage {
    let src_w = src_w as f32;
    let src_h = src_h as f32;
    if src_w <= 0.0 || src_h <= 0.0 || box_w <= 0.0 || box_h <= 0.0 {
        return FittedImage { dx: 0.0, dy: 0.0, draw_w: box_w.max(0.0), draw_h: box_h.max(0.0) };
    }

    let natural = EXPORT_SCALE as f32;
    let contain = (box_w / src_w).min(box_h / src_h);
    let scale = match fit {
        ObjectFit::Fill => {
            return FittedImage { dx: 0.0, dy: 0.0, draw_w: box_w, draw_h: box_h };
        }
        ObjectFit::Cover => (box_w / src_w).max(box_h / src_h),
        ObjectFit::Contain => contain,
        ObjectFit::None => natural,
        ObjectFit::ScaleDown => natural.min(contain),
    };

    let draw_w = src_w * scale;
    let draw_h = src_h * scale;
    FittedImage {
        dx: (box_w - draw_w) / 2.0,
        dy: (box_h - draw_h) / 2.0,
        draw_w,
        draw_h,
    }
}

/// Paint the fitted bitmap into `dst`, bilinear-sampled, blended over what is
/// already there.
fn draw_fitted(dst: &mut RgbaImage, bitmap: &RgbaImage, fitted: &FittedImage) {
    if fitted.draw_w <= 0.0 || fitted.draw_h <= 0.0 {
        return;
    }
    let src_w = bitmap.width() as f32;
    let src_h = bitmap.height() as f32;
    for py in 0..dst.height() {
        let v = (py as f32 + 0.5 - fitted.dy) / fitted.draw_h;
        if !(0.0..1.0).contains(&v) {
            continue;
        }
        let sy = v * src_h - 0.5;
        for px in 0..dst.width() {
            let u = (px as f32 + 0.5 - fitted.dx) / fitted.draw_w;
            if !(0.0..1.0).contains(&u) {
                continue;
            }
            let sx = u * src_w - 0.5;
            blend_pixel(dst, px, py, sample_bilinear(bitmap, sx, sy));
        }
    }
}

/// Bilinear sample with edge clamping. Callers keep `(x, y)` within roughly
/// the bitmap extent.
fn sample_bilinear(bitmap: &RgbaImage, x: f32, y: f32) -> Rgba<u8> {
    let max_x = bitmap.width() as i64 - 1;
    let max_y = bitmap.height() as i64 - 1;
    let x0f = x.floor();
    let y0f = y.floor();
    let fx = x - x0f;
    let fy = y - y0f;
    let x0 = (x0f as i64).clamp(0, max_x) as u32;
    let x1 = (x0f as i64 + 1).clamp(0, max_x) as u32;
    let y0 = (y0f as i64).clamp(0, max_y) as u32;
    let y1 = (y0f as i64 + 1).clamp(0, max_y) as u32;

    let p00 = bitmap.get_pixel(x0, y0).0;
    let p10 = bitmap.get_pixel(x1, y0).0;
    let p01 = bitmap.get_pixel(x0, y1).0;
    let p11 = bitmap.get_pixel(x1, y1).0;

    let mut out = [0u8; 4];
    for channel in 0..4 {
        let top = f32::from(p00[channel]) * (1.0 - fx) + f32::from(p10[channel]) * fx;
        let bottom = f32::from(p01[channel]) * (1.0 - fx) + f32::from(p11[channel]) * fx;
        out[channel] = (top * (1.0 - fy) + bottom * fy).round().clamp(0.0, 255.0) as u8;
    }
    Rgba(out)
}

/// Decode an element image source. Only `data:` URIs are rasterized; remote
/// URLs are skipped (the export runs without network access).
fn decode_image_source(src: &str) -> Option<RgbaImage> {
    if !src.starts_with("data:") {
        debug!("skipping non-data image source in export");
        return None;
    }
    let Some(position) = src.find(";base64,") else {
        warn!("image data URI without base64 payload; skipping layer");
        return None;
    };
    let encoded = &src[position + 8..];
    let bytes = match base64::engine::general_purpose::STANDARD.decode(encoded) {
        Ok(bytes) => bytes,
        Err(e) => {
            warn!("image data URI base64 decode failed: {e}; skipping layer");
            return None;
        }
    };
    match image::load_from_memory(&bytes) {
        Ok(decoded) => Some(decoded.to_rgba8()),
        Err(e) => {
            warn!("image bytes undecodable: {e}; skipping layer");
            None
        }
    }
}

/// Multiply tile alpha by rounded-corner coverage.
fn apply_corner_mask(tile: &mut RgbaImage, radius: f32) {
    let half_w = tile.width() as f32 / 2.0;
    let half_h = tile.height() as f32 / 2.0;
    for py in 0..tile.height() {
        for px in 0..tile.width() {
            let local_x = px as f32 + 0.5 - half_w;
            let local_y = py as f32 + 0.5 - half_h;
            let d = sdf_rounded_box(local_x, local_y, half_w, half_h, radius);
            let coverage = smoothstep(0.5, -0.5, d);
            if coverage < 1.0 {
                let pixel = tile.get_pixel_mut(px, py);
                *pixel = color::with_coverage(*pixel, coverage);
            }
        }
    }
}

/// Stroke a border band along the tile's (possibly rounded) edge.
fn draw_tile_border(tile: &mut RgbaImage, radius: f32, border_width: f32, border: Rgba<u8>) {
    let half_w = tile.width() as f32 / 2.0;
    let half_h = tile.height() as f32 / 2.0;
    let band_half = border_width / 2.0;
    for py in 0..tile.height() {
        for px in 0..tile.width() {
            let local_x = px as f32 + 0.5 - half_w;
            let local_y = py as f32 + 0.5 - half_h;
            let d = sdf_rounded_box(local_x, local_y, half_w, half_h, radius);
            let coverage = smoothstep(0.5, -0.5, d.abs() - band_half);
            blend_pixel(tile, px, py, color::with_coverage(border, coverage));
        }
    }
}

// =============================================================================
// TEXT
// =============================================================================

fn draw_text(canvas: &mut RgbaImage, rect: &PixelRect, rotation_deg: f64, props: &TextProps) {
    let tile_w = rect.width.round() as u32;
    let tile_h = rect.height.round() as u32;
    if tile_w == 0 || tile_h == 0 {
        return;
    }
    let Some(tile) = text::render_text_tile(props, tile_w, tile_h, EXPORT_SCALE as f32) else {
        warn!(family = %props.font_family, "no usable font; skipping text layer");
        return;
    };
    composite_tile(canvas, &tile, rect.x as f32, rect.y as f32, rotation_deg as f32);
}

// =============================================================================
// COMPOSITING
// =============================================================================

/// Blend a tile onto the canvas at `(left, top)`, rotated about its center.
fn composite_tile(canvas: &mut RgbaImage, tile: &RgbaImage, left: f32, top: f32, rotation_deg: f32) {
    if tile.width() == 0 || tile.height() == 0 {
        return;
    }
    if rotation_deg.rem_euclid(360.0) < 0.01 || rotation_deg.rem_euclid(360.0) > 359.99 {
        composite_axis_aligned(canvas, tile, left, top);
        return;
    }

    let tile_w = tile.width() as f32;
    let tile_h = tile.height() as f32;
    let center_x = left + tile_w / 2.0;
    let center_y = top + tile_h / 2.0;
    let (sin_r, cos_r) = rotation_deg.to_radians().sin_cos();

    let Some((x0, y0, x1, y1)) =
        rotated_bounds(canvas, center_x, center_y, tile_w / 2.0, tile_h / 2.0, sin_r, cos_r, 2.0)
    else {
        return;
    };

    for py in y0..y1 {
        for px in x0..x1 {
            let dx = px as f32 + 0.5 - center_x;
            let dy = py as f32 + 0.5 - center_y;
            // Inverse-rotate the canvas point back into tile space.
            let local_x = dx * cos_r + dy * sin_r + tile_w / 2.0 - 0.5;
            let local_y = -dx * sin_r + dy * cos_r + tile_h / 2.0 - 0.5;
            if local_x < -0.5 || local_y < -0.5 || local_x > tile_w - 0.5 || local_y > tile_h - 0.5 {
                continue;
            }
            blend_pixel(canvas, px, py, sample_bilinear(tile, local_x, local_y));
        }
    }
}

fn composite_axis_aligned(canvas: &mut RgbaImage, tile: &RgbaImage, left: f32, top: f32) {
    let left = left.round() as i64;
    let top = top.round() as i64;
    for ty in 0..tile.height() {
        let cy = top + i64::from(ty);
        if cy < 0 || cy >= i64::from(canvas.height()) {
            continue;
        }
        for tx in 0..tile.width() {
            let cx = left + i64::from(tx);
            if cx < 0 || cx >= i64::from(canvas.width()) {
                continue;
            }
            blend_pixel(canvas, cx as u32, cy as u32, *tile.get_pixel(tx, ty));
        }
    }
}

#[cfg(test)]
#[path = "raster_test.rs"]
mod tests;
