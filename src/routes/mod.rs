//! Router assembly.
//!
//! SYSTEM CONTEXT
//! ==============
//! Binds the REST surface (projects, elements, export, generation, contact
//! extraction) and the per-project editor websocket under a single Axum
//! router with permissive CORS. Handlers translate between HTTP and the
//! service layer; no business logic lives here.

pub mod contacts;
pub mod projects;
pub mod ws;

use axum::Router;
use axum::http::StatusCode;
use axum::routing::{get, post, put};
use tower_http::cors::{Any, CorsLayer};

use crate::state::AppState;

/// Build the full application router.
pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/projects", get(projects::list_projects).post(projects::create_project))
        .route(
            "/api/projects/{id}",
            get(projects::get_project).delete(projects::delete_project),
        )
        .route("/api/projects/{id}/elements", post(projects::add_element))
        .route(
            "/api/projects/{id}/elements/{element_id}",
            axum::routing::patch(projects::update_element).delete(projects::delete_element),
        )
        .route(
            "/api/projects/{id}/elements/{element_id}/reorder",
            post(projects::reorder_element),
        )
        .route("/api/projects/{id}/selection", put(projects::set_selection))
        .route("/api/projects/{id}/background", put(projects::set_background))
        .route("/api/projects/{id}/export", get(projects::export_project))
        .route("/api/projects/{id}/generate", post(projects::generate_thumbnails))
        .route("/api/projects/{id}/save", post(projects::save_project))
        .route("/api/projects/{id}/load", post(projects::load_project))
        .route("/api/projects/{id}/ws", get(ws::handle_ws))
        .route("/api/extract", post(contacts::extract))
        .route("/api/extract/results", get(contacts::results))
        .route("/api/extract/selection", put(contacts::set_selection))
        .route("/api/extract/export.csv", get(contacts::export_csv))
        .route("/healthz", get(healthz))
        .layer(cors)
        .with_state(state)
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}
