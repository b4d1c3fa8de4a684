//! Element model: the tagged union of canvas layers and its sparse update.
//!
//! This module defines the core data types that describe what is on the canvas
//! (`CanvasElement` with per-variant `ElementProps`), the sparse-update type
//! for incremental edits (`ElementPatch`), and the variant default
//! constructors used when a new element is added.
//!
//! Geometry fields are percentages of the canvas dimensions in `[0, 100]`;
//! the collection index of an element in its document is its z-order.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a canvas element.
pub type ElementId = Uuid;

/// The variant of a canvas element, as named on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementKind {
    /// A styled text layer.
    Text,
    /// A bitmap layer referenced by URL or data URI.
    Image,
    /// A filled/stroked geometric shape.
    Shape,
}

/// Horizontal alignment of text within its bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    Left,
    Center,
    Right,
}

/// Font weight (only the two weights the editor exposes).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontWeight {
    Normal,
    Bold,
}

/// Font slant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontStyle {
    Normal,
    Italic,
}

/// Text decoration line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TextDecoration {
    #[serde(rename = "none")]
    None,
    #[serde(rename = "underline")]
    Underline,
    #[serde(rename = "line-through")]
    LineThrough,
}

/// How an image is fitted into its bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObjectFit {
    #[serde(rename = "cover")]
    Cover,
    #[serde(rename = "contain")]
    Contain,
    #[serde(rename = "fill")]
    Fill,
    #[serde(rename = "none")]
    None,
    #[serde(rename = "scale-down")]
    ScaleDown,
}

/// Geometric shape family. Only rectangles exist today.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeType {
    Rectangle,
}

/// A canvas element as stored in the document and on the wire.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CanvasElement {
    /// Unique identifier for this element.
    pub id: ElementId,
    /// Left edge as a percentage of canvas width.
    pub x: f64,
    /// Top edge as a percentage of canvas height.
    pub y: f64,
    /// Width as a percentage of canvas width.
    pub width: f64,
    /// Height as a percentage of canvas height.
    pub height: f64,
    /// Clockwise rotation in degrees around the element center.
    pub rotation: f64,
    /// Variant-specific properties; contributes the `type` discriminant.
    #[serde(flatten)]
    pub props: ElementProps,
}

/// Variant-specific properties, discriminated by `type` on the wire.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ElementProps {
    Text(TextProps),
    Image(ImageProps),
    Shape(ShapeProps),
}

/// Properties of a text element.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextProps {
    /// The text content, possibly multi-line.
    pub content: String,
    /// Font size in logical canvas pixels.
    pub font_size: f64,
    /// Font family name.
    pub font_family: String,
    /// Text color as a hex color string.
    pub color: String,
    /// Horizontal alignment within the bounding box.
    pub text_align: TextAlign,
    /// Weight, `normal` or `bold`.
    pub font_weight: FontWeight,
    /// Slant, `normal` or `italic`.
    pub font_style: FontStyle,
    /// Decoration line, if any.
    pub text_decoration: TextDecoration,
    /// Extra spacing between characters in logical pixels.
    pub letter_spacing: f64,
    /// Line height as a multiplier of the font size.
    pub line_height: f64,
    /// Drop-shadow horizontal offset in logical pixels.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shadow_offset_x: Option<f64>,
    /// Drop-shadow vertical offset in logical pixels.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shadow_offset_y: Option<f64>,
    /// Drop-shadow blur radius in logical pixels.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shadow_blur: Option<f64>,
    /// Drop-shadow color.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shadow_color: Option<String>,
}

/// Properties of an image element.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageProps {
    /// Image source: a URL or a `data:` URI.
    pub src: String,
    /// Alternative text.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alt: Option<String>,
    /// Fit mode for the bitmap within the bounding box.
    pub object_fit: ObjectFit,
    /// Corner radius in logical pixels.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub border_radius: Option<f64>,
    /// Border stroke width in logical pixels.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub border_width: Option<f64>,
    /// Border stroke color.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub border_color: Option<String>,
    /// Drop-shadow horizontal offset in logical pixels.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shadow_offset_x: Option<f64>,
    /// Drop-shadow vertical offset in logical pixels.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shadow_offset_y: Option<f64>,
    /// Drop-shadow blur radius in logical pixels.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shadow_blur: Option<f64>,
    /// Drop-shadow spread radius in logical pixels.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shadow_spread_radius: Option<f64>,
    /// Drop-shadow color.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shadow_color: Option<String>,
    /// Gaussian blur filter radius in logical pixels.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blur: Option<f64>,
}

/// Properties of a shape element.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShapeProps {
    /// Shape family; currently always `rectangle`.
    pub shape_type: ShapeType,
    /// Fill color as a hex color string.
    pub fill_color: String,
    /// Stroke color as a hex color string.
    pub stroke_color: String,
    /// Stroke width in logical pixels; `0` draws no stroke.
    pub stroke_width: f64,
    /// Corner radius in logical pixels.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub corner_radius: Option<f64>,
    /// Drop-shadow horizontal offset in logical pixels.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shadow_offset_x: Option<f64>,
    /// Drop-shadow vertical offset in logical pixels.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shadow_offset_y: Option<f64>,
    /// Drop-shadow blur radius in logical pixels.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shadow_blur: Option<f64>,
    /// Drop-shadow color.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shadow_color: Option<String>,
    /// Gaussian blur filter radius in logical pixels.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blur: Option<f64>,
}

impl CanvasElement {
    /// Build a fully-populated element of the requested variant with a fresh
    /// id and the variant's default placement and styling.
    #[must_use]
    pub fn with_defaults(kind: ElementKind, shape_type: Option<ShapeType>) -> Self {
        let id = Uuid::new_v4();
        match kind {
            ElementKind::Text => Self {
                id,
                x: 10.0,
                y: 10.0,
                width: 30.0,
                height: 10.0,
                rotation: 0.0,
                props: ElementProps::Text(TextProps {
                    content: "New Text".to_string(),
                    font_size: 48.0,
                    font_family: "Arial".to_string(),
                    color: "#333333".to_string(),
                    text_align: TextAlign::Center,
                    font_weight: FontWeight::Bold,
                    font_style: FontStyle::Normal,
                    text_decoration: TextDecoration::None,
                    letter_spacing: 0.0,
                    line_height: 1.2,
                    shadow_offset_x: None,
                    shadow_offset_y: None,
                    shadow_blur: None,
                    shadow_color: None,
                }),
            },
            ElementKind::Image => Self {
                id,
                x: 10.0,
                y: 10.0,
                width: 40.0,
                height: 40.0,
                rotation: 0.0,
                props: ElementProps::Image(ImageProps {
                    src: "https://placehold.co/600x400.png".to_string(),
                    alt: None,
                    object_fit: ObjectFit::Cover,
                    border_radius: None,
                    border_width: None,
                    border_color: None,
                    shadow_offset_x: None,
                    shadow_offset_y: None,
                    shadow_blur: None,
                    shadow_spread_radius: None,
                    shadow_color: None,
                    blur: None,
                }),
            },
            ElementKind::Shape => Self {
                id,
                x: 10.0,
                y: 10.0,
                width: 25.0,
                height: 25.0,
                rotation: 0.0,
                props: ElementProps::Shape(ShapeProps {
                    shape_type: shape_type.unwrap_or(ShapeType::Rectangle),
                    fill_color: "#3F51B5".to_string(),
                    stroke_color: "#000000".to_string(),
                    stroke_width: 0.0,
                    corner_radius: None,
                    shadow_offset_x: None,
                    shadow_offset_y: None,
                    shadow_blur: None,
                    shadow_color: None,
                    blur: None,
                }),
            },
        }
    }

    /// The element's variant.
    #[must_use]
    pub fn kind(&self) -> ElementKind {
        match self.props {
            ElementProps::Text(_) => ElementKind::Text,
            ElementProps::Image(_) => ElementKind::Image,
            ElementProps::Shape(_) => ElementKind::Shape,
        }
    }
}

/// Sparse update for a canvas element. Only present fields are applied, and
/// variant-specific fields are ignored when the target element is a
/// different variant.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ElementPatch {
    /// New x position, if being updated.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    /// New y position, if being updated.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
    /// New width, if being updated.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    /// New height, if being updated.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    /// New rotation in degrees, if being updated.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rotation: Option<f64>,
    /// New text content (text elements).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    /// New font size (text elements).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_size: Option<f64>,
    /// New font family (text elements).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_family: Option<String>,
    /// New text color (text elements).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    /// New alignment (text elements).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_align: Option<TextAlign>,
    /// New weight (text elements).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_weight: Option<FontWeight>,
    /// New slant (text elements).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_style: Option<FontStyle>,
    /// New decoration (text elements).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_decoration: Option<TextDecoration>,
    /// New letter spacing (text elements).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub letter_spacing: Option<f64>,
    /// New line height (text elements).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line_height: Option<f64>,
    /// New image source (image elements).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub src: Option<String>,
    /// New alt text (image elements).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alt: Option<String>,
    /// New fit mode (image elements).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub object_fit: Option<ObjectFit>,
    /// New corner radius (image elements).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub border_radius: Option<f64>,
    /// New border width (image elements).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub border_width: Option<f64>,
    /// New border color (image elements).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub border_color: Option<String>,
    /// New fill color (shape elements).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fill_color: Option<String>,
    /// New stroke color (shape elements).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stroke_color: Option<String>,
    /// New stroke width (shape elements).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stroke_width: Option<f64>,
    /// New corner radius (shape elements).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub corner_radius: Option<f64>,
    /// New shadow horizontal offset (any variant).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shadow_offset_x: Option<f64>,
    /// New shadow vertical offset (any variant).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shadow_offset_y: Option<f64>,
    /// New shadow blur radius (any variant).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shadow_blur: Option<f64>,
    /// New shadow spread radius (image elements).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shadow_spread_radius: Option<f64>,
    /// New shadow color (any variant).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shadow_color: Option<String>,
    /// New blur filter radius (image and shape elements).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blur: Option<f64>,
}

impl ElementPatch {
    /// Shallow-merge this patch into `element`.
    ///
    /// Geometry fields apply to every variant. Styling fields apply only when
    /// the element's variant carries them; mismatched fields are ignored.
    /// Geometry is written verbatim — no clamping or cross-field validation
    /// happens here.
    pub fn apply(&self, element: &mut CanvasElement) {
        if let Some(x) = self.x {
            element.x = x;
        }
        if let Some(y) = self.y {
            element.y = y;
        }
        if let Some(w) = self.width {
            element.width = w;
        }
        if let Some(h) = self.height {
            element.height = h;
        }
        if let Some(r) = self.rotation {
            element.rotation = r;
        }
        match element.props {
            ElementProps::Text(ref mut text) => self.apply_text(text),
            ElementProps::Image(ref mut image) => self.apply_image(image),
            ElementProps::Shape(ref mut shape) => self.apply_shape(shape),
        }
    }

    fn apply_text(&self, text: &mut TextProps) {
        if let Some(ref content) = self.content {
            text.content = content.clone();
        }
        if let Some(size) = self.font_size {
            text.font_size = size;
        }
        if let Some(ref family) = self.font_family {
            text.font_family = family.clone();
        }
        if let Some(ref color) = self.color {
            text.color = color.clone();
        }
        if let Some(align) = self.text_align {
            text.text_align = align;
        }
        if let Some(weight) = self.font_weight {
            text.font_weight = weight;
        }
        if let Some(style) = self.font_style {
            text.font_style = style;
        }
        if let Some(decoration) = self.text_decoration {
            text.text_decoration = decoration;
        }
        if let Some(spacing) = self.letter_spacing {
            text.letter_spacing = spacing;
        }
        if let Some(height) = self.line_height {
            text.line_height = height;
        }
        if let Some(dx) = self.shadow_offset_x {
            text.shadow_offset_x = Some(dx);
        }
        if let Some(dy) = self.shadow_offset_y {
            text.shadow_offset_y = Some(dy);
        }
        if let Some(blur) = self.shadow_blur {
            text.shadow_blur = Some(blur);
        }
        if let Some(ref color) = self.shadow_color {
            text.shadow_color = Some(color.clone());
        }
    }

    fn apply_image(&self, image: &mut ImageProps) {
        if let Some(ref src) = self.src {
            image.src = src.clone();
        }
        if let Some(ref alt) = self.alt {
            image.alt = Some(alt.clone());
        }
        if let Some(fit) = self.object_fit {
            image.object_fit = fit;
        }
        if let Some(radius) = self.border_radius {
            image.border_radius = Some(radius);
        }
        if let Some(width) = self.border_width {
            image.border_width = Some(width);
        }
        if let Some(ref color) = self.border_color {
            image.border_color = Some(color.clone());
        }
        if let Some(dx) = self.shadow_offset_x {
            image.shadow_offset_x = Some(dx);
        }
        if let Some(dy) = self.shadow_offset_y {
            image.shadow_offset_y = Some(dy);
        }
        if let Some(blur) = self.shadow_blur {
            image.shadow_blur = Some(blur);
        }
        if let Some(spread) = self.shadow_spread_radius {
            image.shadow_spread_radius = Some(spread);
        }
        if let Some(ref color) = self.shadow_color {
            image.shadow_color = Some(color.clone());
        }
        if let Some(blur) = self.blur {
            image.blur = Some(blur);
        }
    }

    fn apply_shape(&self, shape: &mut ShapeProps) {
        if let Some(ref color) = self.fill_color {
            shape.fill_color = color.clone();
        }
        if let Some(ref color) = self.stroke_color {
            shape.stroke_color = color.clone();
        }
        if let Some(width) = self.stroke_width {
            shape.stroke_width = width;
        }
        if let Some(radius) = self.corner_radius {
            shape.corner_radius = Some(radius);
        }
        if let Some(dx) = self.shadow_offset_x {
            shape.shadow_offset_x = Some(dx);
        }
        if let Some(dy) = self.shadow_offset_y {
            shape.shadow_offset_y = Some(dy);
        }
        if let Some(blur) = self.shadow_blur {
            shape.shadow_blur = Some(blur);
        }
        if let Some(ref color) = self.shadow_color {
            shape.shadow_color = Some(color.clone());
        }
        if let Some(blur) = self.blur {
            shape.blur = Some(blur);
        }
    }
}

#[cfg(test)]
#[path = "element_test.rs"]
mod tests;
