//! Shared application state.
//!
//! DESIGN
//! ======
//! `AppState` is injected into Axum handlers via the `State` extractor. It
//! holds the in-memory project registry (each project owning one canvas
//! document), the optional LLM client for contact extraction, the extraction
//! results/selection, the rasterizer used by export, and the optional
//! snapshot storage directory.

use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::RwLock;
use uuid::Uuid;

use crate::canvas::doc::Document;
use crate::llm::LlmChat;
use crate::render::Rasterizer;

// =============================================================================
// PROJECT STATE
// =============================================================================

/// One live project: a named canvas document.
#[derive(Debug, Clone)]
pub struct ProjectState {
    pub name: String,
    pub doc: Document,
}

impl ProjectState {
    #[must_use]
    pub fn new(name: String) -> Self {
        Self { name, doc: Document::new() }
    }
}

// =============================================================================
// EXTRACTION STATE
// =============================================================================

/// Results of the most recent completed extraction plus the user's selection.
///
/// `results` keeps first-occurrence order from the model reply; `selected`
/// is the subset chosen for CSV export. A new successful extraction replaces
/// `results` and empties `selected`.
#[derive(Debug, Default)]
pub struct ExtractionState {
    pub results: Vec<String>,
    pub selected: HashSet<String>,
}

/// Hands out generation numbers so overlapping extraction requests cannot
/// commit stale results: each new request invalidates every older in-flight
/// one, and a completion only lands if its generation is still the latest.
#[derive(Debug, Default)]
pub struct ExtractionLedger {
    latest: AtomicU64,
}

impl ExtractionLedger {
    /// Start a new request generation, invalidating all earlier ones.
    pub fn begin(&self) -> u64 {
        self.latest.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Whether `generation` is still the newest request.
    pub fn is_current(&self, generation: u64) -> bool {
        self.latest.load(Ordering::SeqCst) == generation
    }
}

// =============================================================================
// APP STATE
// =============================================================================

/// Shared application state, injected into Axum handlers via State extractor.
/// Clone is required by Axum — all inner fields are Arc-wrapped or Clone.
#[derive(Clone)]
pub struct AppState {
    pub projects: Arc<RwLock<HashMap<Uuid, ProjectState>>>,
    /// Optional LLM client. `None` if LLM env vars are not configured.
    pub llm: Option<Arc<dyn LlmChat>>,
    pub extraction: Arc<RwLock<ExtractionState>>,
    pub extraction_ledger: Arc<ExtractionLedger>,
    /// Rasterizer behind the export path; tests substitute a canned one.
    pub rasterizer: Arc<dyn Rasterizer>,
    /// Snapshot directory; `None` leaves save/load unavailable.
    pub storage_dir: Option<PathBuf>,
}

impl AppState {
    #[must_use]
    pub fn new(
        llm: Option<Arc<dyn LlmChat>>,
        rasterizer: Arc<dyn Rasterizer>,
        storage_dir: Option<PathBuf>,
    ) -> Self {
        Self {
            projects: Arc::new(RwLock::new(HashMap::new())),
            llm,
            extraction: Arc::new(RwLock::new(ExtractionState::default())),
            extraction_ledger: Arc::new(ExtractionLedger::default()),
            rasterizer,
            storage_dir,
        }
    }
}

// =============================================================================
// TEST HELPERS
// =============================================================================

#[cfg(test)]
pub mod test_helpers {
    use super::*;
    use crate::render::{ExportFormat, RenderError};

    /// Rasterizer double returning fixed bytes without compositing anything.
    pub struct FixedRasterizer(pub Vec<u8>);

    impl Rasterizer for FixedRasterizer {
        fn rasterize(&self, _doc: &Document, _format: ExportFormat) -> Result<Vec<u8>, RenderError> {
            Ok(self.0.clone())
        }
    }

    /// Rasterizer double that always fails.
    pub struct FailingRasterizer;

    impl Rasterizer for FailingRasterizer {
        fn rasterize(&self, _doc: &Document, _format: ExportFormat) -> Result<Vec<u8>, RenderError> {
            Err(RenderError::Encode("canned rasterizer failure".to_string()))
        }
    }

    /// Create a test `AppState` with no LLM and a fixed-output rasterizer.
    #[must_use]
    pub fn test_app_state() -> AppState {
        AppState::new(None, Arc::new(FixedRasterizer(b"raster-bytes".to_vec())), None)
    }

    /// Create a test `AppState` with a mock LLM.
    #[must_use]
    pub fn test_app_state_with_llm(llm: Arc<dyn LlmChat>) -> AppState {
        AppState::new(Some(llm), Arc::new(FixedRasterizer(b"raster-bytes".to_vec())), None)
    }

    /// Seed an empty project into the app state and return its ID.
    pub async fn seed_project(state: &AppState) -> Uuid {
        let project_id = Uuid::new_v4();
        let mut projects = state.projects.write().await;
        projects.insert(project_id, ProjectState::new("Test Project".to_string()));
        project_id
    }

    /// Seed a project around an existing document and return the project ID.
    pub async fn seed_project_with_doc(state: &AppState, doc: Document) -> Uuid {
        let project_id = Uuid::new_v4();
        let mut projects = state.projects.write().await;
        projects.insert(project_id, ProjectState { name: "Test Project".to_string(), doc });
        project_id
    }
}
