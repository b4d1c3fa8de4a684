//! Hex color parsing for the rasterizer.

use image::Rgba;

/// Parse a CSS-style hex color (`#RGB`, `#RRGGBB`, or `#RRGGBBAA`).
///
/// Returns `None` for anything else; callers decide their own fallback.
#[must_use]
pub fn parse_hex(raw: &str) -> Option<Rgba<u8>> {
    let hex = raw.trim().strip_prefix('#')?;
    match hex.len() {
        3 => {
            let r = nibble(hex, 0)?;
            let g = nibble(hex, 1)?;
            let b = nibble(hex, 2)?;
            Some(Rgba([r * 17, g * 17, b * 17, 255]))
        }
        6 => {
            let r = byte(hex, 0)?;
            let g = byte(hex, 2)?;
            let b = byte(hex, 4)?;
            Some(Rgba([r, g, b, 255]))
        }
        8 => {
            let r = byte(hex, 0)?;
            let g = byte(hex, 2)?;
            let b = byte(hex, 4)?;
            let a = byte(hex, 6)?;
            Some(Rgba([r, g, b, a]))
        }
        _ => None,
    }
}

/// Scale a color's alpha by a coverage value in `[0, 1]`.
#[must_use]
pub fn with_coverage(color: Rgba<u8>, coverage: f32) -> Rgba<u8> {
    let alpha = (f32::from(color.0[3]) * coverage.clamp(0.0, 1.0)).round();
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    Rgba([color.0[0], color.0[1], color.0[2], alpha.min(255.0) as u8])
}

fn nibble(hex: &str, index: usize) -> Option<u8> {
    let digit = hex.as_bytes().get(index).copied()?;
    let value = (digit as char).to_digit(16)?;
    #[allow(clippy::cast_possible_truncation)]
    Some(value as u8)
}

fn byte(hex: &str, index: usize) -> Option<u8> {
    let pair = hex.get(index..index + 2)?;
    u8::from_str_radix(pair, 16).ok()
}

#[cfg(test)]
#[path = "color_test.rs"]
mod tests;
