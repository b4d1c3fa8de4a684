//! Pointer session: the gesture state machine between pointer-down and
//! pointer-up.
//!
//! `Session` is an explicit state machine with states `Idle`, `Dragging`,
//! and `Resizing`. A session is acquired on pointer-down and released on
//! every exit path: pointer-up, the dragged element disappearing
//! mid-session, or the owner (an editor connection) dropping the session.
//! Each active variant carries the gesture context needed to compute deltas
//! against the session-start geometry.
//!
//! Keyboard handling lives here too: Delete/Backspace remove the selected
//! element unless focus sits in a text input, and Backspace asks the client
//! to suppress its default navigation.

use serde::{Deserialize, Serialize};

use crate::canvas::doc::Document;
use crate::canvas::element::ElementId;
use crate::canvas::element::ElementPatch;
use crate::canvas::geometry::{Viewport, move_position, resize_size};

/// Which interactive operation a session performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionOp {
    /// Translate the element.
    Move,
    /// Grow or shrink the element from its bottom-right edge.
    Resize,
}

/// Internal state for the pointer state machine.
#[derive(Debug, Clone, PartialEq)]
enum SessionState {
    /// No gesture in progress; waiting for the next pointer-down.
    Idle,
    /// The user is moving an element across the canvas.
    Dragging {
        /// Id of the element being moved.
        id: ElementId,
        /// Screen-space pointer position at pointer-down.
        origin_x: f64,
        /// Screen-space pointer position at pointer-down.
        origin_y: f64,
        /// Rendered canvas size captured at pointer-down.
        viewport: Viewport,
        /// Element x at the start of the drag.
        start_x: f64,
        /// Element y at the start of the drag.
        start_y: f64,
    },
    /// The user is resizing an element from its bottom-right handle.
    Resizing {
        /// Id of the element being resized.
        id: ElementId,
        /// Screen-space pointer position at pointer-down.
        origin_x: f64,
        /// Screen-space pointer position at pointer-down.
        origin_y: f64,
        /// Rendered canvas size captured at pointer-down.
        viewport: Viewport,
        /// Element width at the start of the resize.
        start_w: f64,
        /// Element height at the start of the resize.
        start_h: f64,
    },
}

/// What a pointer-move sample produced.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionUpdate {
    /// Nothing changed (idle, unmeasurable viewport, or session just ended).
    None,
    /// The element's geometry was updated.
    Geometry {
        /// The element that moved or resized.
        id: ElementId,
        /// New x in canvas percent.
        x: f64,
        /// New y in canvas percent.
        y: f64,
        /// New width in canvas percent.
        width: f64,
        /// New height in canvas percent.
        height: f64,
    },
}

/// A keyboard event as reported by the client.
#[derive(Debug, Clone, Deserialize)]
pub struct KeyEvent {
    /// Key name as reported by the browser (e.g. `"Delete"`, `"Backspace"`).
    pub key: String,
    /// Whether focus currently sits inside a text input or editable field.
    #[serde(default)]
    pub in_text_input: bool,
}

/// The effect of a keyboard event.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyOutcome {
    /// The element deleted by this event, if any.
    pub deleted: Option<ElementId>,
    /// Whether the client should call `preventDefault()` (Backspace only,
    /// to block history navigation).
    pub suppress_default: bool,
}

/// The pointer gesture state machine. One per editor connection.
#[derive(Debug, Clone)]
pub struct Session {
    state: SessionState,
}

impl Session {
    /// Create a session in the idle state.
    #[must_use]
    pub fn new() -> Self {
        Self { state: SessionState::Idle }
    }

    /// Whether a gesture is currently in progress.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.state != SessionState::Idle
    }

    /// Begin a gesture on `id`. Captures the element's start-of-session
    /// geometry, the pointer origin, and the viewport.
    ///
    /// Returns false without starting when a gesture is already in progress
    /// or the element does not exist.
    pub fn pointer_down(
        &mut self,
        doc: &Document,
        id: ElementId,
        op: SessionOp,
        origin_x: f64,
        origin_y: f64,
        viewport: Viewport,
    ) -> bool {
        if self.is_active() {
            return false;
        }
        let Some(element) = doc.get(id) else {
            return false;
        };
        self.state = match op {
            SessionOp::Move => SessionState::Dragging {
                id,
                origin_x,
                origin_y,
                viewport,
                start_x: element.x,
                start_y: element.y,
            },
            SessionOp::Resize => SessionState::Resizing {
                id,
                origin_x,
                origin_y,
                viewport,
                start_w: element.width,
                start_h: element.height,
            },
        };
        true
    }

    /// Feed one pointer-move sample at screen position (`x_px`, `y_px`).
    ///
    /// Converts the delta from the pointer origin into canvas percentages
    /// and applies the clamped geometry to the document. An unmeasurable
    /// viewport ignores the sample; a vanished element ends the session.
    pub fn pointer_move(&mut self, doc: &mut Document, x_px: f64, y_px: f64) -> SessionUpdate {
        match self.state {
            SessionState::Idle => SessionUpdate::None,
            SessionState::Dragging { id, origin_x, origin_y, viewport, start_x, start_y } => {
                let Some(element) = doc.get(id) else {
                    self.state = SessionState::Idle;
                    return SessionUpdate::None;
                };
                let (width, height) = (element.width, element.height);
                let Some((dx, dy)) = viewport.delta_to_pct(x_px - origin_x, y_px - origin_y)
                else {
                    return SessionUpdate::None;
                };
                let (x, y) = move_position(start_x, start_y, width, height, dx, dy);
                doc.update_element(
                    id,
                    &ElementPatch { x: Some(x), y: Some(y), ..ElementPatch::default() },
                );
                SessionUpdate::Geometry { id, x, y, width, height }
            }
            SessionState::Resizing { id, origin_x, origin_y, viewport, start_w, start_h } => {
                let Some(element) = doc.get(id) else {
                    self.state = SessionState::Idle;
                    return SessionUpdate::None;
                };
                let (x, y) = (element.x, element.y);
                let Some((dx, dy)) = viewport.delta_to_pct(x_px - origin_x, y_px - origin_y)
                else {
                    return SessionUpdate::None;
                };
                let (width, height) = resize_size(start_w, start_h, x, y, dx, dy);
                doc.update_element(
                    id,
                    &ElementPatch {
                        width: Some(width),
                        height: Some(height),
                        ..ElementPatch::default()
                    },
                );
                SessionUpdate::Geometry { id, x, y, width, height }
            }
        }
    }

    /// End the gesture. Safe to call in any state; after this no further
    /// mutation is attributed to the session.
    pub fn pointer_up(&mut self) {
        self.state = SessionState::Idle;
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

/// Apply a keyboard event to the document.
///
/// Delete and Backspace remove the selected element when focus is outside
/// text inputs; Backspace additionally requests default-suppression so the
/// browser does not navigate back.
pub fn handle_key(doc: &mut Document, event: &KeyEvent) -> KeyOutcome {
    let is_delete = event.key == "Delete" || event.key == "Backspace";
    if !is_delete || event.in_text_input {
        return KeyOutcome { deleted: None, suppress_default: false };
    }
    let Some(selected) = doc.selected() else {
        return KeyOutcome { deleted: None, suppress_default: false };
    };
    doc.delete_element(selected);
    KeyOutcome {
        deleted: Some(selected),
        suppress_default: event.key == "Backspace",
    }
}

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;
