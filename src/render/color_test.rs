use image::Rgba;

use super::*;

#[test]
fn parses_six_digit_hex() {
    assert_eq!(parse_hex("#3F51B5"), Some(Rgba([0x3F, 0x51, 0xB5, 255])));
    assert_eq!(parse_hex("#ffffff"), Some(Rgba([255, 255, 255, 255])));
    assert_eq!(parse_hex("#000000"), Some(Rgba([0, 0, 0, 255])));
}

#[test]
fn parses_three_digit_shorthand() {
    assert_eq!(parse_hex("#fff"), Some(Rgba([255, 255, 255, 255])));
    assert_eq!(parse_hex("#f00"), Some(Rgba([255, 0, 0, 255])));
    assert_eq!(parse_hex("#1a2"), Some(Rgba([0x11, 0xAA, 0x22, 255])));
}

#[test]
fn parses_eight_digit_with_alpha() {
    assert_eq!(parse_hex("#ff000080"), Some(Rgba([255, 0, 0, 0x80])));
}

#[test]
fn tolerates_surrounding_whitespace() {
    assert_eq!(parse_hex("  #333333 "), Some(Rgba([0x33, 0x33, 0x33, 255])));
}

#[test]
fn rejects_malformed_input() {
    assert_eq!(parse_hex("333333"), None);
    assert_eq!(parse_hex("#33"), None);
    assert_eq!(parse_hex("#33333"), None);
    assert_eq!(parse_hex("#gggggg"), None);
    assert_eq!(parse_hex("red"), None);
    assert_eq!(parse_hex(""), None);
}

#[test]
fn coverage_scales_alpha() {
    let opaque = Rgba([10, 20, 30, 255]);
    assert_eq!(with_coverage(opaque, 1.0), opaque);
    assert_eq!(with_coverage(opaque, 0.0), Rgba([10, 20, 30, 0]));
    assert_eq!(with_coverage(opaque, 0.5), Rgba([10, 20, 30, 128]));
    // Out-of-range coverages clamp instead of wrapping.
    assert_eq!(with_coverage(opaque, 2.0), opaque);
    assert_eq!(with_coverage(opaque, -1.0), Rgba([10, 20, 30, 0]));
}

#[test]
fn coverage_composes_with_translucent_color() {
    let half = Rgba([0, 0, 0, 128]);
    assert_eq!(with_coverage(half, 0.5), Rgba([0, 0, 0, 64]));
}
