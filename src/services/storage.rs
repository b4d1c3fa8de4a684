//! Storage service — JSON snapshot save/load for project documents.
//!
//! DESIGN
//! ======
//! One file per project under `STORAGE_DIR`, written whole on save and read
//! whole on load. When the directory is not configured the process still
//! starts (with a loud startup warning) and both operations fail with a
//! not-configured error the routes map to 503. No sync, no migration, no
//! history.

use std::path::{Path, PathBuf};

use tracing::{info, warn};
use uuid::Uuid;

use crate::canvas::doc::Document;
use crate::state::{AppState, ProjectState};

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("storage not configured: set STORAGE_DIR")]
    NotConfigured,
    #[error("project not found: {0}")]
    ProjectNotFound(Uuid),
    #[error("snapshot not found: {0}")]
    SnapshotNotFound(Uuid),
    #[error("storage io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("snapshot format error: {0}")]
    Format(#[from] serde_json::Error),
}

impl crate::errors::ErrorCode for StorageError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::NotConfigured => "E_STORAGE_NOT_CONFIGURED",
            Self::ProjectNotFound(_) => "E_PROJECT_NOT_FOUND",
            Self::SnapshotNotFound(_) => "E_SNAPSHOT_NOT_FOUND",
            Self::Io(_) => "E_STORAGE_IO",
            Self::Format(_) => "E_SNAPSHOT_FORMAT",
        }
    }
}

/// On-disk shape of one saved project.
#[derive(Debug, serde::Serialize, serde::Deserialize)]
struct ProjectSnapshot {
    name: String,
    doc: Document,
}

// =============================================================================
// STARTUP
// =============================================================================

/// Resolve and prepare the snapshot directory from the raw `STORAGE_DIR`
/// value. Returns `None` (after a loud warning) when unset or unusable;
/// the server runs without persistence in that case.
pub async fn prepare_dir(raw: Option<String>) -> Option<PathBuf> {
    let Some(raw) = raw else {
        warn!("STORAGE_DIR not set; snapshot save/load disabled");
        return None;
    };
    let path = PathBuf::from(raw);
    match tokio::fs::create_dir_all(&path).await {
        Ok(()) => {
            info!(path = %path.display(), "snapshot storage ready");
            Some(path)
        }
        Err(e) => {
            warn!(error = %e, path = %path.display(), "STORAGE_DIR unusable; snapshot save/load disabled");
            None
        }
    }
}

// =============================================================================
// SAVE / LOAD
// =============================================================================

fn snapshot_path(dir: &Path, project_id: Uuid) -> PathBuf {
    dir.join(format!("{project_id}.json"))
}

/// Write a project's document snapshot to disk.
///
/// # Errors
///
/// Returns `NotConfigured` without a storage directory, `ProjectNotFound`
/// for an unknown project, and `Io`/`Format` on write problems.
pub async fn save_project(state: &AppState, project_id: Uuid) -> Result<(), StorageError> {
    let dir = state.storage_dir.as_ref().ok_or(StorageError::NotConfigured)?;

    let snapshot = {
        let projects = state.projects.read().await;
        let project = projects
            .get(&project_id)
            .ok_or(StorageError::ProjectNotFound(project_id))?;
        ProjectSnapshot { name: project.name.clone(), doc: project.doc.clone() }
    };

    let json = serde_json::to_vec_pretty(&snapshot)?;
    tokio::fs::create_dir_all(dir).await?;
    let path = snapshot_path(dir, project_id);
    tokio::fs::write(&path, json).await?;

    info!(%project_id, path = %path.display(), "storage: snapshot saved");
    Ok(())
}

/// Restore a project's document from its snapshot, creating the project
/// entry when it isn't live.
///
/// # Errors
///
/// Returns `NotConfigured` without a storage directory, `SnapshotNotFound`
/// when no snapshot exists, and `Io`/`Format` on read problems.
pub async fn load_project(state: &AppState, project_id: Uuid) -> Result<(), StorageError> {
    let dir = state.storage_dir.as_ref().ok_or(StorageError::NotConfigured)?;
    let path = snapshot_path(dir, project_id);

    let bytes = match tokio::fs::read(&path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(StorageError::SnapshotNotFound(project_id));
        }
        Err(e) => return Err(e.into()),
    };
    let snapshot: ProjectSnapshot = serde_json::from_slice(&bytes)?;

    let mut projects = state.projects.write().await;
    projects.insert(project_id, ProjectState { name: snapshot.name, doc: snapshot.doc });

    info!(%project_id, path = %path.display(), "storage: snapshot loaded");
    Ok(())
}

#[cfg(test)]
#[path = "storage_test.rs"]
mod tests;
