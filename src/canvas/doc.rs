//! Document model: the ordered element list, selection, and background.
//!
//! A `Document` owns everything one thumbnail project displays. The element
//! list is the z-order — index 0 draws bottom-most, the last element
//! top-most — and is held behind an `Arc` that is replaced wholesale on each
//! mutation, so a snapshot taken for rendering or export never observes a
//! half-applied change. Selection stores an element id; a stale id (element
//! since deleted) reads back as no selection.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::canvas::consts::DEFAULT_BACKGROUND_COLOR;
use crate::canvas::element::{CanvasElement, ElementId, ElementKind, ElementPatch, ShapeType};
use crate::canvas::geometry::clamp_placement;

/// A z-order command. `Forward`/`Backward` swap with the immediate neighbor
/// and are no-ops at the respective boundary; `ToFront`/`ToBack` move to the
/// extreme and are idempotent there.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReorderOp {
    Forward,
    Backward,
    ToFront,
    ToBack,
}

/// Caller-supplied placement and initial fields for a new element.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AddOptions {
    /// Initial x, overriding the variant default.
    pub x: Option<f64>,
    /// Initial y, overriding the variant default.
    pub y: Option<f64>,
    /// Initial width, overriding the variant default.
    pub width: Option<f64>,
    /// Initial height, overriding the variant default.
    pub height: Option<f64>,
    /// Further initial fields applied as a sparse patch.
    pub fields: Option<ElementPatch>,
}

/// One thumbnail document: ordered elements, selection, background.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    /// Elements in z-order; replaced wholesale on every mutation.
    elements: Arc<Vec<CanvasElement>>,
    /// Id of the currently selected element, if any.
    selected: Option<ElementId>,
    /// Solid background color, used when no background image is set.
    background_color: String,
    /// Background image (URL or data URI). Wins over the color when present.
    #[serde(skip_serializing_if = "Option::is_none")]
    background_image: Option<String>,
}

impl Document {
    /// Create an empty document with the default background.
    #[must_use]
    pub fn new() -> Self {
        Self {
            elements: Arc::new(Vec::new()),
            selected: None,
            background_color: DEFAULT_BACKGROUND_COLOR.to_string(),
            background_image: None,
        }
    }

    /// Construct a fully-populated element of the requested variant, clamp
    /// its placement into canvas bounds using its final size, append it
    /// top-most, and select it. Returns the new element's id.
    pub fn add_element(
        &mut self,
        kind: ElementKind,
        shape_type: Option<ShapeType>,
        options: AddOptions,
    ) -> ElementId {
        let mut element = CanvasElement::with_defaults(kind, shape_type);
        if let Some(ref fields) = options.fields {
            fields.apply(&mut element);
        }
        if let Some(x) = options.x {
            element.x = x;
        }
        if let Some(y) = options.y {
            element.y = y;
        }
        if let Some(w) = options.width {
            element.width = w;
        }
        if let Some(h) = options.height {
            element.height = h;
        }
        let (x, y) = clamp_placement(element.x, element.y, element.width, element.height);
        element.x = x;
        element.y = y;

        let id = element.id;
        Arc::make_mut(&mut self.elements).push(element);
        self.selected = Some(id);
        id
    }

    /// Shallow-merge `patch` into the element matching `id`. No-op (returns
    /// false) when the id is absent. Geometry is written verbatim — this
    /// path never re-clamps after a single-field edit.
    pub fn update_element(&mut self, id: ElementId, patch: &ElementPatch) -> bool {
        let elements = Arc::make_mut(&mut self.elements);
        let Some(element) = elements.iter_mut().find(|e| e.id == id) else {
            return false;
        };
        patch.apply(element);
        true
    }

    /// Remove the element matching `id`, returning it if present. Clears the
    /// selection when the removed element was selected.
    pub fn delete_element(&mut self, id: ElementId) -> Option<CanvasElement> {
        let elements = Arc::make_mut(&mut self.elements);
        let index = elements.iter().position(|e| e.id == id)?;
        let removed = elements.remove(index);
        if self.selected == Some(id) {
            self.selected = None;
        }
        Some(removed)
    }

    /// Set or clear the selection. Selecting an id that is not in the
    /// document is allowed and reads back as no selection.
    pub fn select(&mut self, id: Option<ElementId>) {
        self.selected = id;
    }

    /// The selected element's id, or `None` when nothing is selected or the
    /// stored id no longer matches a live element.
    #[must_use]
    pub fn selected(&self) -> Option<ElementId> {
        let id = self.selected?;
        self.elements.iter().any(|e| e.id == id).then_some(id)
    }

    /// Apply a z-order command to the element matching `id`. Returns false
    /// when the id is absent.
    pub fn reorder(&mut self, id: ElementId, op: ReorderOp) -> bool {
        let elements = Arc::make_mut(&mut self.elements);
        let Some(index) = elements.iter().position(|e| e.id == id) else {
            return false;
        };
        let last = elements.len() - 1;
        match op {
            ReorderOp::Forward => {
                if index < last {
                    elements.swap(index, index + 1);
                }
            }
            ReorderOp::Backward => {
                if index > 0 {
                    elements.swap(index, index - 1);
                }
            }
            ReorderOp::ToFront => {
                let element = elements.remove(index);
                elements.push(element);
            }
            ReorderOp::ToBack => {
                let element = elements.remove(index);
                elements.insert(0, element);
            }
        }
        true
    }

    /// Set the solid background color.
    pub fn set_background_color(&mut self, color: String) {
        self.background_color = color;
    }

    /// Set or clear the background image.
    pub fn set_background_image(&mut self, image: Option<String>) {
        self.background_image = image;
    }

    /// The solid background color.
    #[must_use]
    pub fn background_color(&self) -> &str {
        &self.background_color
    }

    /// The background image, if one is set.
    #[must_use]
    pub fn background_image(&self) -> Option<&str> {
        self.background_image.as_deref()
    }

    /// A reference to an element by id.
    #[must_use]
    pub fn get(&self, id: ElementId) -> Option<&CanvasElement> {
        self.elements.iter().find(|e| e.id == id)
    }

    /// The element's position in the z-order, if present.
    #[must_use]
    pub fn index_of(&self, id: ElementId) -> Option<usize> {
        self.elements.iter().position(|e| e.id == id)
    }

    /// A cheap snapshot of the element list in z-order. The snapshot shares
    /// the current backing vector and is unaffected by later mutations.
    #[must_use]
    pub fn elements(&self) -> Arc<Vec<CanvasElement>> {
        Arc::clone(&self.elements)
    }

    /// Number of elements in the document.
    #[must_use]
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Returns `true` if the document contains no elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "doc_test.rs"]
mod tests;
