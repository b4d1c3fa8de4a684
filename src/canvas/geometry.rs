//! Pure geometry for interactive move and resize.
//!
//! Everything here is stateless: the pointer session feeds in the element's
//! start-of-session geometry plus a pointer delta, and gets back clamped
//! coordinates. Clamping enforces the canvas-bounds invariant (`0 ≤ x` and
//! `x + width ≤ 100`, same for the y axis) on every sample; violations are
//! clamped, never rejected.

use serde::{Deserialize, Serialize};

use crate::canvas::consts::{CANVAS_EXTENT_PCT, MIN_SIZE_PCT};

/// The canvas's current rendered size in screen pixels.
///
/// Pointer deltas arrive in screen pixels and are converted to canvas
/// percentages against these dimensions. The conversion here and the
/// percent-to-pixel conversion in [`crate::canvas::placement`] must stay
/// exact inverses or drag feedback diverges from stored state.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    /// Rendered canvas width in screen pixels.
    pub width_px: f64,
    /// Rendered canvas height in screen pixels.
    pub height_px: f64,
}

impl Viewport {
    /// Whether the canvas has a measurable on-screen size. An unmeasurable
    /// viewport (either dimension zero or negative) means pointer samples
    /// must be ignored rather than divided into.
    #[must_use]
    pub fn is_measurable(&self) -> bool {
        self.width_px > 0.0 && self.height_px > 0.0
    }

    /// Convert a screen-pixel pointer delta to a canvas-percentage delta.
    /// Returns `None` when the viewport is not measurable.
    #[must_use]
    pub fn delta_to_pct(&self, dx_px: f64, dy_px: f64) -> Option<(f64, f64)> {
        if !self.is_measurable() {
            return None;
        }
        Some((
            dx_px / self.width_px * CANVAS_EXTENT_PCT,
            dy_px / self.height_px * CANVAS_EXTENT_PCT,
        ))
    }
}

/// Clamp a coordinate to `[0, 100 − extent]`.
///
/// When `extent` exceeds the canvas the lower bound wins and the coordinate
/// pins to zero.
fn clamp_axis(value: f64, extent: f64) -> f64 {
    value.min(CANVAS_EXTENT_PCT - extent).max(0.0)
}

/// New position for a move sample.
///
/// `start_x`/`start_y` are the element's position at session start; `width`
/// and `height` are its current size. A non-finite candidate (canvas not yet
/// measurable upstream) falls back to the start value before clamping.
#[must_use]
pub fn move_position(
    start_x: f64,
    start_y: f64,
    width: f64,
    height: f64,
    dx_pct: f64,
    dy_pct: f64,
) -> (f64, f64) {
    let candidate_x = start_x + dx_pct;
    let candidate_y = start_y + dy_pct;
    let x = if candidate_x.is_nan() { start_x } else { candidate_x };
    let y = if candidate_y.is_nan() { start_y } else { candidate_y };
    (clamp_axis(x, width), clamp_axis(y, height))
}

/// New size for a resize sample.
///
/// `start_w`/`start_h` are the element's size at session start; `x`/`y` its
/// current position. Size is floored at [`MIN_SIZE_PCT`] and then clamped so
/// the element stays inside the canvas.
#[must_use]
pub fn resize_size(
    start_w: f64,
    start_h: f64,
    x: f64,
    y: f64,
    dx_pct: f64,
    dy_pct: f64,
) -> (f64, f64) {
    let candidate_w = start_w + dx_pct;
    let candidate_h = start_h + dy_pct;
    let w = if candidate_w.is_nan() { start_w } else { candidate_w };
    let h = if candidate_h.is_nan() { start_h } else { candidate_h };
    (
        w.max(MIN_SIZE_PCT).min(CANVAS_EXTENT_PCT - x),
        h.max(MIN_SIZE_PCT).min(CANVAS_EXTENT_PCT - y),
    )
}

/// Clamp an element's placement into canvas bounds using its final size.
/// Used when an element is added with caller-supplied coordinates.
#[must_use]
pub fn clamp_placement(x: f64, y: f64, width: f64, height: f64) -> (f64, f64) {
    (clamp_axis(x, width), clamp_axis(y, height))
}

#[cfg(test)]
#[path = "geometry_test.rs"]
mod tests;
