//! Project service — project registry plus per-document element operations.
//!
//! DESIGN
//! ======
//! Projects live in the in-memory registry on `AppState`; each one owns a
//! canvas document. Element mutations take the registry write lock only for
//! the synchronous document edit and return before any I/O, so editor
//! latency stays flat regardless of export or extraction traffic.

use uuid::Uuid;

use crate::canvas::doc::{AddOptions, Document, ReorderOp};
use crate::canvas::element::{ElementId, ElementKind, ElementPatch, ShapeType};
use crate::state::AppState;

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum ProjectError {
    #[error("project not found: {0}")]
    NotFound(Uuid),
    #[error("element not found: {0}")]
    ElementNotFound(ElementId),
}

impl crate::errors::ErrorCode for ProjectError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "E_PROJECT_NOT_FOUND",
            Self::ElementNotFound(_) => "E_ELEMENT_NOT_FOUND",
        }
    }
}

/// Row returned from project listings.
#[derive(Debug, Clone, serde::Serialize)]
pub struct ProjectSummary {
    pub id: Uuid,
    pub name: String,
    pub elements: usize,
}

// =============================================================================
// PROJECT CRUD
// =============================================================================

/// Create a new project with an empty document. Returns its id.
pub async fn create_project(state: &AppState, name: &str) -> Uuid {
    let id = Uuid::new_v4();
    let mut projects = state.projects.write().await;
    projects.insert(id, crate::state::ProjectState::new(name.to_string()));
    id
}

/// List all projects.
pub async fn list_projects(state: &AppState) -> Vec<ProjectSummary> {
    let projects = state.projects.read().await;
    projects
        .iter()
        .map(|(id, project)| ProjectSummary {
            id: *id,
            name: project.name.clone(),
            elements: project.doc.len(),
        })
        .collect()
}

/// Snapshot a project's document.
///
/// # Errors
///
/// Returns `NotFound` if the project doesn't exist.
pub async fn get_document(state: &AppState, project_id: Uuid) -> Result<Document, ProjectError> {
    let projects = state.projects.read().await;
    let project = projects
        .get(&project_id)
        .ok_or(ProjectError::NotFound(project_id))?;
    Ok(project.doc.clone())
}

/// Delete a project.
///
/// # Errors
///
/// Returns `NotFound` if the project doesn't exist.
pub async fn delete_project(state: &AppState, project_id: Uuid) -> Result<(), ProjectError> {
    let mut projects = state.projects.write().await;
    if projects.remove(&project_id).is_none() {
        return Err(ProjectError::NotFound(project_id));
    }
    Ok(())
}

// =============================================================================
// ELEMENT OPERATIONS
// =============================================================================

/// Add an element to a project's document. The new element lands top-most
/// and selected; its placement is clamped into canvas bounds.
///
/// # Errors
///
/// Returns `NotFound` if the project doesn't exist.
pub async fn add_element(
    state: &AppState,
    project_id: Uuid,
    kind: ElementKind,
    shape_type: Option<ShapeType>,
    options: AddOptions,
) -> Result<ElementId, ProjectError> {
    let mut projects = state.projects.write().await;
    let project = projects
        .get_mut(&project_id)
        .ok_or(ProjectError::NotFound(project_id))?;
    Ok(project.doc.add_element(kind, shape_type, options))
}

/// Shallow-merge a patch into an element.
///
/// # Errors
///
/// Returns `ElementNotFound` if the element doesn't exist.
pub async fn update_element(
    state: &AppState,
    project_id: Uuid,
    element_id: ElementId,
    patch: &ElementPatch,
) -> Result<(), ProjectError> {
    let mut projects = state.projects.write().await;
    let project = projects
        .get_mut(&project_id)
        .ok_or(ProjectError::NotFound(project_id))?;
    if !project.doc.update_element(element_id, patch) {
        return Err(ProjectError::ElementNotFound(element_id));
    }
    Ok(())
}

/// Delete an element. Clears the selection if it pointed at the element.
///
/// # Errors
///
/// Returns `ElementNotFound` if the element doesn't exist.
pub async fn delete_element(
    state: &AppState,
    project_id: Uuid,
    element_id: ElementId,
) -> Result<(), ProjectError> {
    let mut projects = state.projects.write().await;
    let project = projects
        .get_mut(&project_id)
        .ok_or(ProjectError::NotFound(project_id))?;
    if project.doc.delete_element(element_id).is_none() {
        return Err(ProjectError::ElementNotFound(element_id));
    }
    Ok(())
}

/// Apply a z-order command to an element. Boundary moves are no-ops, not
/// errors.
///
/// # Errors
///
/// Returns `ElementNotFound` if the element doesn't exist.
pub async fn reorder_element(
    state: &AppState,
    project_id: Uuid,
    element_id: ElementId,
    op: ReorderOp,
) -> Result<(), ProjectError> {
    let mut projects = state.projects.write().await;
    let project = projects
        .get_mut(&project_id)
        .ok_or(ProjectError::NotFound(project_id))?;
    if !project.doc.reorder(element_id, op) {
        return Err(ProjectError::ElementNotFound(element_id));
    }
    Ok(())
}

// =============================================================================
// SELECTION / BACKGROUND
// =============================================================================

/// Set or clear the document selection. A stale id reads back as no
/// selection, so the id is stored without validation.
///
/// # Errors
///
/// Returns `NotFound` if the project doesn't exist.
pub async fn set_selection(
    state: &AppState,
    project_id: Uuid,
    element_id: Option<ElementId>,
) -> Result<(), ProjectError> {
    let mut projects = state.projects.write().await;
    let project = projects
        .get_mut(&project_id)
        .ok_or(ProjectError::NotFound(project_id))?;
    project.doc.select(element_id);
    Ok(())
}

/// Set the document's solid background color.
///
/// # Errors
///
/// Returns `NotFound` if the project doesn't exist.
pub async fn set_background_color(
    state: &AppState,
    project_id: Uuid,
    color: String,
) -> Result<(), ProjectError> {
    let mut projects = state.projects.write().await;
    let project = projects
        .get_mut(&project_id)
        .ok_or(ProjectError::NotFound(project_id))?;
    project.doc.set_background_color(color);
    Ok(())
}

/// Set or clear the document's background image. When set it wins over the
/// solid color.
///
/// # Errors
///
/// Returns `NotFound` if the project doesn't exist.
pub async fn set_background_image(
    state: &AppState,
    project_id: Uuid,
    image: Option<String>,
) -> Result<(), ProjectError> {
    let mut projects = state.projects.write().await;
    let project = projects
        .get_mut(&project_id)
        .ok_or(ProjectError::NotFound(project_id))?;
    project.doc.set_background_image(image);
    Ok(())
}

#[cfg(test)]
#[path = "project_test.rs"]
mod tests;
