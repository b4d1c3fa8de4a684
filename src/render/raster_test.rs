use image::{Rgba, RgbaImage};

use super::*;
use crate::canvas::doc::AddOptions;
use crate::canvas::element::{ElementKind, ElementPatch};

/// 1x1 opaque red PNG.
const RED_PIXEL_URI: &str = "data:image/png;base64,iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mP8z8DwHwAFBQIAX8jx0gAAAABJRU5ErkJggg==";

fn full_canvas_shape(fill: &str) -> Document {
    let mut doc = Document::new();
    doc.add_element(
        ElementKind::Shape,
        None,
        AddOptions {
            x: Some(0.0),
            y: Some(0.0),
            width: Some(100.0),
            height: Some(100.0),
            fields: Some(ElementPatch { fill_color: Some(fill.to_string()), ..Default::default() }),
        },
    );
    doc
}

fn decode_png(bytes: &[u8]) -> RgbaImage {
    assert_eq!(image::guess_format(bytes).unwrap(), ImageFormat::Png);
    image::load_from_memory(bytes).unwrap().to_rgba8()
}

// =============================================================================
// OBJECT-FIT MATH
// =============================================================================

#[test]
fn fit_fill_stretches_to_box() {
    let fitted = fit_image(ObjectFit::Fill, 100, 50, 200.0, 200.0);
    assert_eq!(fitted, FittedImage { dx: 0.0, dy: 0.0, draw_w: 200.0, draw_h: 200.0 });
}

#[test]
fn fit_cover_fills_and_crops() {
    let fitted = fit_image(ObjectFit::Cover, 100, 50, 200.0, 200.0);
    assert_eq!(fitted, FittedImage { dx: -100.0, dy: 0.0, draw_w: 400.0, draw_h: 200.0 });
}

#[test]
fn fit_contain_letterboxes() {
    let fitted = fit_image(ObjectFit::Contain, 100, 50, 200.0, 200.0);
    assert_eq!(fitted, FittedImage { dx: 0.0, dy: 50.0, draw_w: 200.0, draw_h: 100.0 });
}

#[test]
fn fit_none_keeps_natural_density() {
    // One source pixel is one logical pixel: two device pixels.
    let fitted = fit_image(ObjectFit::None, 50, 50, 200.0, 200.0);
    assert_eq!(fitted, FittedImage { dx: 50.0, dy: 50.0, draw_w: 100.0, draw_h: 100.0 });
}

#[test]
fn fit_scale_down_shrinks_oversized_sources() {
    let fitted = fit_image(ObjectFit::ScaleDown, 500, 500, 200.0, 200.0);
    assert_eq!(fitted, FittedImage { dx: 0.0, dy: 0.0, draw_w: 200.0, draw_h: 200.0 });
}

#[test]
fn fit_scale_down_keeps_small_sources_natural() {
    let fitted = fit_image(ObjectFit::ScaleDown, 40, 40, 200.0, 200.0);
    assert_eq!(fitted, FittedImage { dx: 60.0, dy: 60.0, draw_w: 80.0, draw_h: 80.0 });
}

// =============================================================================
// SDF PRIMITIVES
// =============================================================================

#[test]
fn sdf_box_signs() {
    assert!(sdf_box(0.0, 0.0, 10.0, 5.0) < 0.0);
    assert!((sdf_box(0.0, 0.0, 10.0, 5.0) - (-5.0)).abs() < 1e-6);
    assert!(sdf_box(10.0, 0.0, 10.0, 5.0).abs() < 1e-6);
    assert!((sdf_box(15.0, 0.0, 10.0, 5.0) - 5.0).abs() < 1e-6);
}

#[test]
fn sdf_rounded_box_rounds_corners() {
    // The exact corner point sits outside once the corner is rounded off.
    assert!(sdf_rounded_box(10.0, 10.0, 10.0, 10.0, 4.0) > 0.0);
    // Edge midpoints are unaffected by the radius.
    assert!(sdf_rounded_box(10.0, 0.0, 10.0, 10.0, 4.0).abs() < 1e-6);
    assert!(sdf_rounded_box(0.0, 0.0, 10.0, 10.0, 4.0) < 0.0);
}

#[test]
fn smoothstep_endpoints() {
    assert!((smoothstep(0.5, -0.5, 0.5) - 0.0).abs() < 1e-6);
    assert!((smoothstep(0.5, -0.5, -0.5) - 1.0).abs() < 1e-6);
    assert!((smoothstep(0.5, -0.5, 0.0) - 0.5).abs() < 1e-6);
}

// =============================================================================
// IMAGE SOURCE DECODING
// =============================================================================

#[test]
fn decodes_png_data_uri() {
    let bitmap = decode_image_source(RED_PIXEL_URI).unwrap();
    assert_eq!(bitmap.dimensions(), (1, 1));
    assert_eq!(*bitmap.get_pixel(0, 0), Rgba([255, 0, 0, 255]));
}

#[test]
fn skips_remote_urls() {
    assert!(decode_image_source("https://example.com/pic.png").is_none());
    assert!(decode_image_source("http://example.com/pic.png").is_none());
}

#[test]
fn rejects_malformed_data_uris() {
    assert!(decode_image_source("data:image/png,rawdata").is_none());
    assert!(decode_image_source("data:image/png;base64,!!!not-base64!!!").is_none());
    // Valid base64 that is not an image.
    assert!(decode_image_source("data:image/png;base64,aGVsbG8=").is_none());
}

// =============================================================================
// COMPOSITING
// =============================================================================

#[test]
fn axis_aligned_composite_clips_at_canvas_edges() {
    let mut canvas = RgbaImage::from_pixel(10, 10, Rgba([255, 255, 255, 255]));
    let tile = RgbaImage::from_pixel(4, 4, Rgba([255, 0, 0, 255]));
    composite_tile(&mut canvas, &tile, -2.0, -2.0, 0.0);

    assert_eq!(*canvas.get_pixel(0, 0), Rgba([255, 0, 0, 255]));
    assert_eq!(*canvas.get_pixel(1, 1), Rgba([255, 0, 0, 255]));
    assert_eq!(*canvas.get_pixel(2, 2), Rgba([255, 255, 255, 255]));
}

#[test]
fn rotated_composite_maps_tile_through_center() {
    let mut canvas = RgbaImage::from_pixel(20, 20, Rgba([255, 255, 255, 255]));
    // 6x2 tile centered at (10, 10); after 90° it occupies a 2x6 region.
    let tile = RgbaImage::from_pixel(6, 2, Rgba([255, 0, 0, 255]));
    composite_tile(&mut canvas, &tile, 7.0, 9.0, 90.0);

    assert_eq!(*canvas.get_pixel(9, 10), Rgba([255, 0, 0, 255]));
    assert_eq!(*canvas.get_pixel(10, 12), Rgba([255, 0, 0, 255]));
    assert_eq!(*canvas.get_pixel(12, 10), Rgba([255, 255, 255, 255]));
    assert_eq!(*canvas.get_pixel(7, 10), Rgba([255, 255, 255, 255]));
}

#[test]
fn full_turn_rotation_uses_the_fast_path() {
    let mut canvas = RgbaImage::from_pixel(8, 8, Rgba([255, 255, 255, 255]));
    let tile = RgbaImage::from_pixel(2, 2, Rgba([0, 0, 255, 255]));
    composite_tile(&mut canvas, &tile, 3.0, 3.0, 360.0);
    assert_eq!(*canvas.get_pixel(3, 3), Rgba([0, 0, 255, 255]));
    assert_eq!(*canvas.get_pixel(4, 4), Rgba([0, 0, 255, 255]));
    assert_eq!(*canvas.get_pixel(5, 5), Rgba([255, 255, 255, 255]));
}

// =============================================================================
// END TO END
// =============================================================================

#[test]
fn exports_png_at_double_density() {
    let doc = Document::new();
    let bytes = PixelRasterizer.rasterize(&doc, ExportFormat::Png).unwrap();
    let decoded = decode_png(&bytes);
    assert_eq!(decoded.dimensions(), (2560, 1440));
    // Default background is white.
    assert_eq!(*decoded.get_pixel(0, 0), Rgba([255, 255, 255, 255]));
}

#[test]
fn exports_jpeg_bytes() {
    let doc = full_canvas_shape("#FF0000");
    let bytes = PixelRasterizer.rasterize(&doc, ExportFormat::Jpeg).unwrap();
    assert!(!bytes.is_empty());
    assert_eq!(image::guess_format(&bytes).unwrap(), ImageFormat::Jpeg);
}

#[test]
fn shape_fill_covers_its_box() {
    let doc = full_canvas_shape("#FF0000");
    let bytes = PixelRasterizer.rasterize(&doc, ExportFormat::Png).unwrap();
    let decoded = decode_png(&bytes);
    assert_eq!(*decoded.get_pixel(1280, 720), Rgba([255, 0, 0, 255]));
    assert_eq!(*decoded.get_pixel(10, 10), Rgba([255, 0, 0, 255]));
}

#[test]
fn rotated_shape_keeps_its_center_and_frees_the_canvas_corner() {
    let mut doc = Document::new();
    let id = doc.add_element(
        ElementKind::Shape,
        None,
        AddOptions {
            x: Some(25.0),
            y: Some(25.0),
            width: Some(50.0),
            height: Some(50.0),
            fields: Some(ElementPatch {
                fill_color: Some("#FF0000".to_string()),
                ..Default::default()
            }),
        },
    );
    doc.update_element(id, &ElementPatch { rotation: Some(45.0), ..Default::default() });

    let bytes = PixelRasterizer.rasterize(&doc, ExportFormat::Png).unwrap();
    let decoded = decode_png(&bytes);
    assert_eq!(*decoded.get_pixel(1280, 720), Rgba([255, 0, 0, 255]));
    assert_eq!(*decoded.get_pixel(10, 10), Rgba([255, 255, 255, 255]));
}

#[test]
fn background_color_fills_when_no_image() {
    let mut doc = Document::new();
    doc.set_background_color("#00FF00".to_string());
    let bytes = PixelRasterizer.rasterize(&doc, ExportFormat::Png).unwrap();
    let decoded = decode_png(&bytes);
    assert_eq!(*decoded.get_pixel(100, 100), Rgba([0, 255, 0, 255]));
}

#[test]
fn background_image_wins_over_color() {
    let mut doc = Document::new();
    doc.set_background_color("#00FF00".to_string());
    doc.set_background_image(Some(RED_PIXEL_URI.to_string()));
    let bytes = PixelRasterizer.rasterize(&doc, ExportFormat::Png).unwrap();
    let decoded = decode_png(&bytes);
    assert_eq!(*decoded.get_pixel(1280, 720), Rgba([255, 0, 0, 255]));
    assert_eq!(*decoded.get_pixel(5, 5), Rgba([255, 0, 0, 255]));
}

#[test]
fn undecodable_background_image_falls_back_to_color() {
    let mut doc = Document::new();
    doc.set_background_color("#00FF00".to_string());
    doc.set_background_image(Some("https://example.com/bg.png".to_string()));
    let bytes = PixelRasterizer.rasterize(&doc, ExportFormat::Png).unwrap();
    let decoded = decode_png(&bytes);
    assert_eq!(*decoded.get_pixel(5, 5), Rgba([0, 255, 0, 255]));
}

#[test]
fn image_element_draws_from_data_uri() {
    let mut doc = Document::new();
    doc.add_element(
        ElementKind::Image,
        None,
        AddOptions {
            x: Some(0.0),
            y: Some(0.0),
            width: Some(100.0),
            height: Some(100.0),
            fields: Some(ElementPatch {
                src: Some(RED_PIXEL_URI.to_string()),
                object_fit: Some(ObjectFit::Fill),
                ..Default::default()
            }),
        },
    );
    let bytes = PixelRasterizer.rasterize(&doc, ExportFormat::Png).unwrap();
    let decoded = decode_png(&bytes);
    assert_eq!(*decoded.get_pixel(1280, 720), Rgba([255, 0, 0, 255]));
}

#[test]
fn remote_image_element_is_skipped() {
    let mut doc = Document::new();
    doc.add_element(
        ElementKind::Image,
        None,
        AddOptions {
            x: Some(0.0),
            y: Some(0.0),
            width: Some(100.0),
            height: Some(100.0),
            fields: Some(ElementPatch {
                src: Some("https://example.com/pic.png".to_string()),
                ..Default::default()
            }),
        },
    );
    let bytes = PixelRasterizer.rasterize(&doc, ExportFormat::Png).unwrap();
    let decoded = decode_png(&bytes);
    assert_eq!(*decoded.get_pixel(1280, 720), Rgba([255, 255, 255, 255]));
}
