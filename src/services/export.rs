//! Export service — rasterize a project document to PNG or JPEG bytes.
//!
//! DESIGN
//! ======
//! The document is snapshotted with its selection cleared, handed to the
//! rasterizer on the blocking pool, and the selection is put back before
//! the outcome is even inspected. That restore-first ordering guarantees a
//! failed render can never leave the project deselected, and the cleared
//! snapshot guarantees no selection decoration can leak into the output.

use std::sync::Arc;

use tracing::{info, warn};
use uuid::Uuid;

use crate::canvas::consts::DEFAULT_EXPORT_STEM;
use crate::render::{ExportFormat, Rasterizer, RenderError};
use crate::state::AppState;

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("project not found: {0}")]
    ProjectNotFound(Uuid),
    #[error("render failed: {0}")]
    Render(#[from] RenderError),
    #[error("render task failed: {0}")]
    Task(String),
}

impl crate::errors::ErrorCode for ExportError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::ProjectNotFound(_) => "E_PROJECT_NOT_FOUND",
            Self::Render(e) => e.error_code(),
            Self::Task(_) => "E_RENDER_TASK",
        }
    }
}

/// A finished export: encoded bytes plus download metadata.
#[derive(Debug)]
pub struct ExportOutput {
    pub bytes: Vec<u8>,
    pub filename: String,
    pub mime: &'static str,
}

// =============================================================================
// EXPORT
// =============================================================================

/// Rasterize a project and package the result for download.
///
/// `filename` is the stem only; the extension follows the format. A blank
/// or unusable stem falls back to the default.
///
/// # Errors
///
/// Returns `ProjectNotFound` for an unknown project and `Render`/`Task`
/// when rasterization fails. The selection is restored in every case.
pub async fn export_project(
    state: &AppState,
    project_id: Uuid,
    format: ExportFormat,
    filename: Option<&str>,
) -> Result<ExportOutput, ExportError> {
    info!(%project_id, format = ?format, "export: start");

    // Clear the selection on the live document, snapshot, and release the
    // lock before rendering.
    let (snapshot, previous_selection) = {
        let mut projects = state.projects.write().await;
        let project = projects
            .get_mut(&project_id)
            .ok_or(ExportError::ProjectNotFound(project_id))?;
        let previous = project.doc.selected();
        project.doc.select(None);
        (project.doc.clone(), previous)
    };

    let rasterizer = Arc::clone(&state.rasterizer);
    let result = tokio::task::spawn_blocking(move || rasterizer.rasterize(&snapshot, format)).await;

    // Restore before looking at the result so failure paths cannot skip it.
    {
        let mut projects = state.projects.write().await;
        if let Some(project) = projects.get_mut(&project_id) {
            project.doc.select(previous_selection);
        }
    }

    let bytes = match result {
        Ok(Ok(bytes)) => bytes,
        Ok(Err(e)) => {
            warn!(error = %e, %project_id, "export: render failed");
            return Err(e.into());
        }
        Err(e) => {
            warn!(error = %e, %project_id, "export: render task failed");
            return Err(ExportError::Task(e.to_string()));
        }
    };

    let stem = filename
        .and_then(sanitize_stem)
        .unwrap_or_else(|| DEFAULT_EXPORT_STEM.to_string());
    let filename = format!("{stem}.{}", format.extension());

    info!(%project_id, filename = %filename, bytes = bytes.len(), "export: complete");
    Ok(ExportOutput { bytes, filename, mime: format.mime() })
}

/// Reduce a requested filename stem to something safe inside a
/// `Content-Disposition` header. Returns `None` when nothing usable is left.
fn sanitize_stem(raw: &str) -> Option<String> {
    let cleaned: String = raw
        .trim()
        .chars()
        .map(|c| match c {
            '"' | '\\' | '/' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();
    if cleaned.is_empty() { None } else { Some(cleaned) }
}

#[cfg(test)]
#[path = "export_test.rs"]
mod tests;
