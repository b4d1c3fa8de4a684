//! Generate service — batch thumbnails from a folder of PNG uploads.
//!
//! DESIGN
//! ======
//! One designated image element receives each upload as a data URI and one
//! designated text element receives the name derived from the filename;
//! the document is then exported once per upload. Non-PNG uploads are
//! skipped silently (batch keeps going), and a per-file export failure is
//! logged and skipped the same way. The designated element ids are
//! validated before the first file is touched.

use base64::Engine;
use image::ImageFormat;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::canvas::element::{ElementId, ElementKind, ElementPatch};
use crate::render::ExportFormat;
use crate::state::AppState;

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum GenerateError {
    #[error("project not found: {0}")]
    ProjectNotFound(Uuid),
    #[error("icon element missing or not an image: {0}")]
    BadIconElement(ElementId),
    #[error("title element missing or not a text: {0}")]
    BadTitleElement(ElementId),
}

impl crate::errors::ErrorCode for GenerateError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::ProjectNotFound(_) => "E_PROJECT_NOT_FOUND",
            Self::BadIconElement(_) => "E_BAD_ICON_ELEMENT",
            Self::BadTitleElement(_) => "E_BAD_TITLE_ELEMENT",
        }
    }
}

/// One uploaded file: original name plus base64 content (bare or data URI).
#[derive(Debug, Clone, serde::Deserialize)]
pub struct GenerateFile {
    pub name: String,
    pub data: String,
}

/// One finished thumbnail from a batch.
#[derive(Debug, serde::Serialize)]
pub struct GeneratedThumbnail {
    /// Original upload name the thumbnail was derived from.
    pub source: String,
    /// Name placed into the title element.
    pub display_name: String,
    /// Download filename of the export.
    pub filename: String,
    /// Base64-encoded PNG export.
    pub data_base64: String,
}

// =============================================================================
// BATCH GENERATION
// =============================================================================

/// Generate one thumbnail export per PNG upload.
///
/// # Errors
///
/// Returns `BadIconElement`/`BadTitleElement` when a designated element is
/// missing or the wrong variant, before any file is processed. Per-file
/// problems never abort the batch.
pub async fn generate_thumbnails(
    state: &AppState,
    project_id: Uuid,
    icon_element: ElementId,
    title_element: ElementId,
    files: Vec<GenerateFile>,
) -> Result<Vec<GeneratedThumbnail>, GenerateError> {
    validate_designated_elements(state, project_id, icon_element, title_element).await?;
    info!(%project_id, files = files.len(), "generate: batch start");

    let mut generated = Vec::new();
    for file in &files {
        let Some(bytes) = decode_upload(&file.data) else {
            debug!(name = %file.name, "generate: undecodable upload; skipping");
            continue;
        };
        if !matches!(image::guess_format(&bytes), Ok(ImageFormat::Png)) {
            debug!(name = %file.name, "generate: not a PNG; skipping");
            continue;
        }

        let display_name = derive_display_name(&file.name);
        let data_uri = format!(
            "data:image/png;base64,{}",
            base64::engine::general_purpose::STANDARD.encode(&bytes)
        );
        apply_designated_fields(state, project_id, icon_element, title_element, data_uri, &display_name)
            .await?;

        match super::export::export_project(state, project_id, ExportFormat::Png, Some(&display_name))
            .await
        {
            Ok(output) => {
                generated.push(GeneratedThumbnail {
                    source: file.name.clone(),
                    display_name,
                    filename: output.filename,
                    data_base64: base64::engine::general_purpose::STANDARD.encode(&output.bytes),
                });
            }
            Err(e) => {
                warn!(error = %e, name = %file.name, "generate: export failed; skipping file");
            }
        }
    }

    info!(%project_id, generated = generated.len(), total = files.len(), "generate: batch complete");
    Ok(generated)
}

async fn validate_designated_elements(
    state: &AppState,
    project_id: Uuid,
    icon_element: ElementId,
    title_element: ElementId,
) -> Result<(), GenerateError> {
    let projects = state.projects.read().await;
    let project = projects
        .get(&project_id)
        .ok_or(GenerateError::ProjectNotFound(project_id))?;

    match project.doc.get(icon_element) {
        Some(element) if element.kind() == ElementKind::Image => {}
        _ => return Err(GenerateError::BadIconElement(icon_element)),
    }
    match project.doc.get(title_element) {
        Some(element) if element.kind() == ElementKind::Text => {}
        _ => return Err(GenerateError::BadTitleElement(title_element)),
    }
    Ok(())
}

/// Point the icon element at the upload and retitle the title element.
/// Fails if either designated element vanished mid-batch.
async fn apply_designated_fields(
    state: &AppState,
    project_id: Uuid,
    icon_element: ElementId,
    title_element: ElementId,
    data_uri: String,
    display_name: &str,
) -> Result<(), GenerateError> {
    let mut projects = state.projects.write().await;
    let project = projects
        .get_mut(&project_id)
        .ok_or(GenerateError::ProjectNotFound(project_id))?;

    let icon_patch = ElementPatch { src: Some(data_uri), ..ElementPatch::default() };
    if !project.doc.update_element(icon_element, &icon_patch) {
        return Err(GenerateError::BadIconElement(icon_element));
    }
    let title_patch =
        ElementPatch { content: Some(display_name.to_string()), ..ElementPatch::default() };
    if !project.doc.update_element(title_element, &title_patch) {
        return Err(GenerateError::BadTitleElement(title_element));
    }
    Ok(())
}

// =============================================================================
// HELPERS
// =============================================================================

/// Decode an upload that arrives either as a full data URI or as bare
/// base64. Returns `None` when the payload doesn't decode.
pub(crate) fn decode_upload(data: &str) -> Option<Vec<u8>> {
    let encoded = if data.starts_with("data:") {
        let position = data.find(";base64,")?;
        &data[position + 8..]
    } else {
        data.trim()
    };
    base64::engine::general_purpose::STANDARD.decode(encoded).ok()
}

/// Turn an upload filename into the on-thumbnail title: strip the last
/// extension, capitalize the first letter.
pub(crate) fn derive_display_name(filename: &str) -> String {
    let stem = match filename.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem,
        _ => filename,
    };
    let mut chars = stem.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
#[path = "generate_test.rs"]
mod tests;
