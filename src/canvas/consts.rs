//! Shared numeric constants for the canvas model.

// ── Canvas geometry ─────────────────────────────────────────────

/// Logical canvas width in pixels (16:9 design surface).
pub const CANVAS_WIDTH_PX: f64 = 1280.0;

/// Logical canvas height in pixels.
pub const CANVAS_HEIGHT_PX: f64 = 720.0;

/// Upper bound of the percentage coordinate space on both axes.
pub const CANVAS_EXTENT_PCT: f64 = 100.0;

// ── Interaction ─────────────────────────────────────────────────

/// Smallest width/height (percent) an element may reach during an
/// interactive resize. Direct numeric edits are not subject to this floor.
pub const MIN_SIZE_PCT: f64 = 5.0;

// ── Export ──────────────────────────────────────────────────────

/// Pixel-density multiplier applied when rasterizing the canvas.
pub const EXPORT_SCALE: u32 = 2;

/// Fallback filename stem for exports when the caller supplies none.
pub const DEFAULT_EXPORT_STEM: &str = "thumbnail";

// ── Document defaults ───────────────────────────────────────────

/// Background color used by freshly created documents.
pub const DEFAULT_BACKGROUND_COLOR: &str = "#FFFFFF";
