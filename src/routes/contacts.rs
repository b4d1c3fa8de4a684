//! Contact extraction routes — run an extraction, manage the selection,
//! download the CSV.

use axum::extract::State;
use axum::http::StatusCode;
use axum::http::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use axum::response::{IntoResponse, Json, Response};
use serde::{Deserialize, Serialize};

use crate::routes::projects::{Failure, failure};
use crate::services::extract::{self, CSV_FILENAME, ExtractError, ExtractionResults};
use crate::state::AppState;

pub(crate) fn extract_error_to_status(err: &ExtractError) -> StatusCode {
    match err {
        ExtractError::LlmNotConfigured => StatusCode::SERVICE_UNAVAILABLE,
        ExtractError::EmptyInput | ExtractError::NoSelection => StatusCode::BAD_REQUEST,
        ExtractError::UnknownNumber(_) => StatusCode::NOT_FOUND,
        ExtractError::Stale => StatusCode::CONFLICT,
        ExtractError::UnusableReply(_) | ExtractError::Llm(_) => StatusCode::BAD_GATEWAY,
    }
}

// =============================================================================
// EXTRACTION
// =============================================================================

#[derive(Deserialize)]
pub struct ExtractBody {
    pub chat_text: String,
}

#[derive(Debug, Serialize)]
pub struct ExtractResponse {
    pub numbers: Vec<String>,
}

/// `POST /api/extract` — run one extraction over pasted chat text.
pub async fn extract(
    State(state): State<AppState>,
    Json(body): Json<ExtractBody>,
) -> Result<Json<ExtractResponse>, Failure> {
    let numbers = extract::extract_contacts(&state, &body.chat_text)
        .await
        .map_err(|e| failure(extract_error_to_status(&e), &e))?;
    Ok(Json(ExtractResponse { numbers }))
}

/// `GET /api/extract/results` — current results plus selection.
pub async fn results(State(state): State<AppState>) -> Json<ExtractionResults> {
    Json(extract::extraction_results(&state).await)
}

// =============================================================================
// SELECTION
// =============================================================================

/// Either a single-number toggle or a select/deselect-all.
#[derive(Deserialize)]
#[serde(untagged)]
pub enum SelectionBody {
    All { all: bool },
    One { number: String, selected: bool },
}

/// `PUT /api/extract/selection` — toggle one number or all of them.
pub async fn set_selection(
    State(state): State<AppState>,
    Json(body): Json<SelectionBody>,
) -> Result<Json<serde_json::Value>, Failure> {
    match body {
        SelectionBody::All { all } => extract::set_all_selected(&state, all).await,
        SelectionBody::One { number, selected } => {
            extract::set_number_selected(&state, &number, selected)
                .await
                .map_err(|e| failure(extract_error_to_status(&e), &e))?;
        }
    }
    Ok(Json(serde_json::json!({ "ok": true })))
}

// =============================================================================
// CSV DOWNLOAD
// =============================================================================

/// `GET /api/extract/export.csv` — download the selected numbers.
pub async fn export_csv(State(state): State<AppState>) -> Result<Response, Failure> {
    let csv = extract::export_csv(&state)
        .await
        .map_err(|e| failure(extract_error_to_status(&e), &e))?;

    let disposition = format!("attachment; filename=\"{CSV_FILENAME}\"");
    Ok((
        [
            (CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (CONTENT_DISPOSITION, disposition),
        ],
        csv,
    )
        .into_response())
}

#[cfg(test)]
#[path = "contacts_test.rs"]
mod tests;
