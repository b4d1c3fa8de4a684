//! Render projection: absolute placement styling for each element.
//!
//! Maps an element's normalized geometry to the percentage-based style a
//! display layer applies (`left`/`top`/`width`/`height` plus a rotate
//! transform), and to concrete pixel rectangles for the rasterizer. The
//! percent-to-pixel conversion here is the exact inverse of the
//! pixel-to-percent conversion in [`crate::canvas::geometry::Viewport`];
//! keeping the two in lockstep is what makes drag feedback match stored
//! state.

use serde::Serialize;

use crate::canvas::consts::CANVAS_EXTENT_PCT;
use crate::canvas::element::CanvasElement;
use crate::canvas::geometry::Viewport;

/// Absolute styling for one element, in canvas percentages.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Placement {
    /// Offset of the left edge, percent of canvas width.
    pub left_pct: f64,
    /// Offset of the top edge, percent of canvas height.
    pub top_pct: f64,
    /// Width, percent of canvas width.
    pub width_pct: f64,
    /// Height, percent of canvas height.
    pub height_pct: f64,
    /// CSS-style rotate transform, e.g. `rotate(12deg)`.
    pub transform: String,
}

/// An element's placement resolved to pixels against a viewport.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PixelRect {
    /// Left edge in pixels.
    pub x: f64,
    /// Top edge in pixels.
    pub y: f64,
    /// Width in pixels.
    pub width: f64,
    /// Height in pixels.
    pub height: f64,
}

/// The display styling for one element.
#[must_use]
pub fn project(element: &CanvasElement) -> Placement {
    Placement {
        left_pct: element.x,
        top_pct: element.y,
        width_pct: element.width,
        height_pct: element.height,
        transform: format!("rotate({}deg)", element.rotation),
    }
}

/// Resolve an element's geometry to pixels against `viewport`.
#[must_use]
pub fn to_pixels(element: &CanvasElement, viewport: Viewport) -> PixelRect {
    PixelRect {
        x: element.x / CANVAS_EXTENT_PCT * viewport.width_px,
        y: element.y / CANVAS_EXTENT_PCT * viewport.height_px,
        width: element.width / CANVAS_EXTENT_PCT * viewport.width_px,
        height: element.height / CANVAS_EXTENT_PCT * viewport.height_px,
    }
}

#[cfg(test)]
#[path = "placement_test.rs"]
mod tests;
