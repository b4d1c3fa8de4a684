mod canvas;
mod errors;
mod llm;
mod render;
mod routes;
mod services;
mod state;

use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let port: u16 = match std::env::var("PORT") {
        Ok(raw) => raw.parse().map_err(|e| format!("invalid PORT: {e}"))?,
        Err(_) => 3000,
    };

    // Initialize LLM client (non-fatal: extraction disabled if config missing).
    let llm: Option<Arc<dyn llm::LlmChat>> = match llm::LlmClient::from_env() {
        Ok(client) => {
            tracing::info!(model = client.model(), "LLM client initialized");
            Some(Arc::new(client))
        }
        Err(e) => {
            tracing::warn!(error = %e, "LLM client not configured — contact extraction disabled");
            None
        }
    };

    // Snapshot storage is optional the same way: warn loudly, keep running.
    let storage_dir = services::storage::prepare_dir(std::env::var("STORAGE_DIR").ok()).await;

    let rasterizer = Arc::new(render::raster::PixelRasterizer);
    let state = state::AppState::new(llm, rasterizer, storage_dir);

    let app = routes::app(state);
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{port}")).await?;

    tracing::info!(%port, "thumbcast listening");
    axum::serve(listener, app).await?;
    Ok(())
}
