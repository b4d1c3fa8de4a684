//! Project routes — project CRUD, element operations, export, generation,
//! snapshots.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::http::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use axum::response::{IntoResponse, Json, Response};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use crate::canvas::doc::{AddOptions, Document, ReorderOp};
use crate::canvas::element::{ElementId, ElementKind, ElementPatch, ShapeType};
use crate::errors::{ErrorBody, ErrorCode};
use crate::render::ExportFormat;
use crate::services::export::{self, ExportError};
use crate::services::generate::{self, GenerateError, GenerateFile, GeneratedThumbnail};
use crate::services::project::{self, ProjectError, ProjectSummary};
use crate::services::storage::{self, StorageError};
use crate::state::AppState;

/// The error shape every handler returns: a status plus the `{code, message}`
/// JSON body.
pub(crate) type Failure = (StatusCode, Json<ErrorBody>);

pub(crate) fn failure<E: ErrorCode>(status: StatusCode, error: &E) -> Failure {
    (status, Json(ErrorBody::from_error(error)))
}

pub(crate) fn project_error_to_status(err: &ProjectError) -> StatusCode {
    match err {
        ProjectError::NotFound(_) | ProjectError::ElementNotFound(_) => StatusCode::NOT_FOUND,
    }
}

fn export_error_to_status(err: &ExportError) -> StatusCode {
    match err {
        ExportError::ProjectNotFound(_) => StatusCode::NOT_FOUND,
        ExportError::Render(_) | ExportError::Task(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn generate_error_to_status(err: &GenerateError) -> StatusCode {
    match err {
        GenerateError::ProjectNotFound(_) => StatusCode::NOT_FOUND,
        GenerateError::BadIconElement(_) | GenerateError::BadTitleElement(_) => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
    }
}

fn storage_error_to_status(err: &StorageError) -> StatusCode {
    match err {
        StorageError::NotConfigured => StatusCode::SERVICE_UNAVAILABLE,
        StorageError::ProjectNotFound(_) | StorageError::SnapshotNotFound(_) => {
            StatusCode::NOT_FOUND
        }
        StorageError::Io(_) | StorageError::Format(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

// =============================================================================
// PROJECT CRUD
// =============================================================================

#[derive(Deserialize)]
pub struct CreateProjectBody {
    pub name: Option<String>,
}

#[derive(Serialize)]
pub struct ProjectCreatedResponse {
    pub id: Uuid,
    pub name: String,
}

/// `POST /api/projects` — create a project with an empty document.
pub async fn create_project(
    State(state): State<AppState>,
    Json(body): Json<CreateProjectBody>,
) -> (StatusCode, Json<ProjectCreatedResponse>) {
    let name = body.name.as_deref().unwrap_or("Untitled Thumbnail");
    let id = project::create_project(&state, name).await;
    (StatusCode::CREATED, Json(ProjectCreatedResponse { id, name: name.to_string() }))
}

/// `GET /api/projects` — list projects.
pub async fn list_projects(State(state): State<AppState>) -> Json<Vec<ProjectSummary>> {
    Json(project::list_projects(&state).await)
}

/// `GET /api/projects/:id` — document snapshot.
pub async fn get_project(
    State(state): State<AppState>,
    Path(project_id): Path<Uuid>,
) -> Result<Json<Document>, Failure> {
    let doc = project::get_document(&state, project_id)
        .await
        .map_err(|e| failure(project_error_to_status(&e), &e))?;
    Ok(Json(doc))
}

/// `DELETE /api/projects/:id`.
pub async fn delete_project(
    State(state): State<AppState>,
    Path(project_id): Path<Uuid>,
) -> Result<StatusCode, Failure> {
    project::delete_project(&state, project_id)
        .await
        .map_err(|e| failure(project_error_to_status(&e), &e))?;
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
// ELEMENT OPERATIONS
// =============================================================================

#[derive(Deserialize)]
pub struct AddElementBody {
    pub kind: ElementKind,
    pub shape_type: Option<ShapeType>,
    #[serde(flatten)]
    pub options: AddOptions,
}

#[derive(Serialize)]
pub struct ElementCreatedResponse {
    pub id: ElementId,
}

/// `POST /api/projects/:id/elements` — add an element.
pub async fn add_element(
    State(state): State<AppState>,
    Path(project_id): Path<Uuid>,
    Json(body): Json<AddElementBody>,
) -> Result<(StatusCode, Json<ElementCreatedResponse>), Failure> {
    let id = project::add_element(&state, project_id, body.kind, body.shape_type, body.options)
        .await
        .map_err(|e| failure(project_error_to_status(&e), &e))?;
    Ok((StatusCode::CREATED, Json(ElementCreatedResponse { id })))
}

/// `PATCH /api/projects/:id/elements/:element_id` — shallow-merge a patch.
pub async fn update_element(
    State(state): State<AppState>,
    Path((project_id, element_id)): Path<(Uuid, ElementId)>,
    Json(patch): Json<ElementPatch>,
) -> Result<Json<serde_json::Value>, Failure> {
    project::update_element(&state, project_id, element_id, &patch)
        .await
        .map_err(|e| failure(project_error_to_status(&e), &e))?;
    Ok(Json(serde_json::json!({ "ok": true })))
}

/// `DELETE /api/projects/:id/elements/:element_id`.
pub async fn delete_element(
    State(state): State<AppState>,
    Path((project_id, element_id)): Path<(Uuid, ElementId)>,
) -> Result<StatusCode, Failure> {
    project::delete_element(&state, project_id, element_id)
        .await
        .map_err(|e| failure(project_error_to_status(&e), &e))?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Deserialize)]
pub struct ReorderBody {
    pub op: ReorderOp,
}

/// `POST /api/projects/:id/elements/:element_id/reorder` — z-order command.
pub async fn reorder_element(
    State(state): State<AppState>,
    Path((project_id, element_id)): Path<(Uuid, ElementId)>,
    Json(body): Json<ReorderBody>,
) -> Result<Json<serde_json::Value>, Failure> {
    project::reorder_element(&state, project_id, element_id, body.op)
        .await
        .map_err(|e| failure(project_error_to_status(&e), &e))?;
    Ok(Json(serde_json::json!({ "ok": true })))
}

// =============================================================================
// SELECTION / BACKGROUND
// =============================================================================

#[derive(Deserialize)]
pub struct SelectionBody {
    pub id: Option<ElementId>,
}

/// `PUT /api/projects/:id/selection` — set or clear the selection.
pub async fn set_selection(
    State(state): State<AppState>,
    Path(project_id): Path<Uuid>,
    Json(body): Json<SelectionBody>,
) -> Result<Json<serde_json::Value>, Failure> {
    project::set_selection(&state, project_id, body.id)
        .await
        .map_err(|e| failure(project_error_to_status(&e), &e))?;
    Ok(Json(serde_json::json!({ "ok": true })))
}

/// Distinguishes an absent `image` field from an explicit `"image": null`:
/// absent leaves the background image untouched, null clears it.
fn double_option<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Some)
}

#[derive(Deserialize)]
pub struct BackgroundBody {
    pub color: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub image: Option<Option<String>>,
}

/// `PUT /api/projects/:id/background` — set the color and/or the image.
/// When an image is set it wins over the color until cleared.
pub async fn set_background(
    State(state): State<AppState>,
    Path(project_id): Path<Uuid>,
    Json(body): Json<BackgroundBody>,
) -> Result<Json<serde_json::Value>, Failure> {
    if let Some(color) = body.color {
        project::set_background_color(&state, project_id, color)
            .await
            .map_err(|e| failure(project_error_to_status(&e), &e))?;
    }
    if let Some(image) = body.image {
        project::set_background_image(&state, project_id, image)
            .await
            .map_err(|e| failure(project_error_to_status(&e), &e))?;
    }
    Ok(Json(serde_json::json!({ "ok": true })))
}

// =============================================================================
// EXPORT / GENERATE
// =============================================================================

#[derive(Deserialize)]
pub struct ExportQuery {
    pub format: ExportFormat,
    pub filename: Option<String>,
}

/// `GET /api/projects/:id/export?format=png|jpeg&filename=…` — rasterize and
/// download.
pub async fn export_project(
    State(state): State<AppState>,
    Path(project_id): Path<Uuid>,
    Query(query): Query<ExportQuery>,
) -> Result<Response, Failure> {
    let output = export::export_project(&state, project_id, query.format, query.filename.as_deref())
        .await
        .map_err(|e| failure(export_error_to_status(&e), &e))?;

    let disposition = format!("attachment; filename=\"{}\"", output.filename);
    Ok((
        [
            (CONTENT_TYPE, output.mime.to_string()),
            (CONTENT_DISPOSITION, disposition),
        ],
        output.bytes,
    )
        .into_response())
}

#[derive(Deserialize)]
pub struct GenerateBody {
    pub icon_element: ElementId,
    pub title_element: ElementId,
    pub files: Vec<GenerateFile>,
}

/// `POST /api/projects/:id/generate` — batch thumbnails from PNG uploads.
pub async fn generate_thumbnails(
    State(state): State<AppState>,
    Path(project_id): Path<Uuid>,
    Json(body): Json<GenerateBody>,
) -> Result<Json<Vec<GeneratedThumbnail>>, Failure> {
    let generated = generate::generate_thumbnails(
        &state,
        project_id,
        body.icon_element,
        body.title_element,
        body.files,
    )
    .await
    .map_err(|e| failure(generate_error_to_status(&e), &e))?;
    Ok(Json(generated))
}

// =============================================================================
// SNAPSHOTS
// =============================================================================

/// `POST /api/projects/:id/save` — write the JSON snapshot (503 when storage
/// is unconfigured).
pub async fn save_project(
    State(state): State<AppState>,
    Path(project_id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, Failure> {
    storage::save_project(&state, project_id)
        .await
        .map_err(|e| failure(storage_error_to_status(&e), &e))?;
    Ok(Json(serde_json::json!({ "ok": true })))
}

/// `POST /api/projects/:id/load` — restore from the JSON snapshot.
pub async fn load_project(
    State(state): State<AppState>,
    Path(project_id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, Failure> {
    storage::load_project(&state, project_id)
        .await
        .map_err(|e| failure(storage_error_to_status(&e), &e))?;
    Ok(Json(serde_json::json!({ "ok": true })))
}

#[cfg(test)]
#[path = "projects_test.rs"]
mod tests;
