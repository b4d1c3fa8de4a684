//! Render — CPU rasterization of a document snapshot to PNG/JPEG.
//!
//! DESIGN
//! ======
//! Export never touches a GPU or a browser: a [`Rasterizer`] turns a
//! [`Document`] into encoded image bytes on the CPU, compositing elements
//! bottom-to-top at 2x density. The trait seam exists so the export service
//! can be tested with a canned rasterizer, and so rendering failures stay
//! separate from HTTP concerns.
//!
//! Per-element failures (undecodable image source, missing font) degrade to
//! skipping that layer with a log line; only output encoding can fail the
//! whole render.

pub mod color;
pub mod raster;
pub mod text;

use serde::Deserialize;

use crate::canvas::doc::Document;
use crate::errors::ErrorCode;

/// Output encoding for an export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Png,
    Jpeg,
}

impl ExportFormat {
    /// MIME type served with the exported bytes.
    #[must_use]
    pub fn mime(self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
        }
    }

    /// File extension for download filenames.
    #[must_use]
    pub fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpg",
        }
    }
}

/// Errors produced while rendering a document to image bytes.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    /// The composited canvas could not be encoded to the output format.
    #[error("image encode failed: {0}")]
    Encode(String),
}

impl ErrorCode for RenderError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Encode(_) => "E_RENDER_ENCODE",
        }
    }
}

/// Renders a document snapshot to encoded image bytes.
pub trait Rasterizer: Send + Sync {
    /// Rasterize the full canvas and encode it as `format`.
    ///
    /// # Errors
    ///
    /// Returns a [`RenderError`] when the composited image cannot be encoded.
    fn rasterize(&self, doc: &Document, format: ExportFormat) -> Result<Vec<u8>, RenderError>;
}
