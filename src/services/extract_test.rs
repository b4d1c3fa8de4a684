use super::*;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::llm::types::{ChatResponse, ContentBlock, LlmChat};
use crate::state::{ExtractionLedger, test_helpers};

// =========================================================================
// MockLlm
// =========================================================================

fn text_response(text: &str) -> ChatResponse {
    ChatResponse {
        content: vec![ContentBlock::Text { text: text.into() }],
        model: "mock".into(),
        stop_reason: "end_turn".into(),
        input_tokens: 0,
        output_tokens: 0,
    }
}

struct MockLlm {
    responses: Mutex<Vec<Result<ChatResponse, LlmError>>>,
    calls: AtomicUsize,
}

impl MockLlm {
    fn new(responses: Vec<Result<ChatResponse, LlmError>>) -> Self {
        Self { responses: Mutex::new(responses), calls: AtomicUsize::new(0) }
    }

    fn replying(text: &str) -> Self {
        Self::new(vec![Ok(text_response(text))])
    }

    fn failing() -> Self {
        Self::new(vec![Err(LlmError::ApiResponse { status: 500, body: "upstream down".into() })])
    }
}

#[async_trait::async_trait]
impl LlmChat for MockLlm {
    async fn chat(
        &self,
        _max_tokens: u32,
        _system: &str,
        _messages: &[Message],
    ) -> Result<ChatResponse, LlmError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mut responses = self.responses.lock().unwrap();
        if responses.is_empty() {
            Ok(text_response("[]"))
        } else {
            responses.remove(0)
        }
    }
}

/// Simulates a newer extraction starting while this one is still in flight.
struct SupersedingLlm {
    ledger: Arc<ExtractionLedger>,
}

#[async_trait::async_trait]
impl LlmChat for SupersedingLlm {
    async fn chat(
        &self,
        _max_tokens: u32,
        _system: &str,
        _messages: &[Message],
    ) -> Result<ChatResponse, LlmError> {
        self.ledger.begin();
        Ok(text_response("[\"999-0000\"]"))
    }
}

async fn seed_results(state: &crate::state::AppState, numbers: &[&str]) {
    let mut extraction = state.extraction.write().await;
    extraction.results = numbers.iter().map(|n| (*n).to_string()).collect();
}

// =========================================================================
// parse_number_array
// =========================================================================

#[test]
fn parse_bare_array() {
    let numbers = parse_number_array("[\"+1-555-0100\", \"555-0199\"]").unwrap();
    assert_eq!(numbers, vec!["+1-555-0100", "555-0199"]);
}

#[test]
fn parse_fenced_array() {
    let numbers = parse_number_array("```json\n[\"555-0100\"]\n```").unwrap();
    assert_eq!(numbers, vec!["555-0100"]);
}

#[test]
fn parse_array_with_surrounding_prose() {
    let reply = "Here are the unsaved numbers I found:\n[\"555-0100\", \"555-0101\"]\nLet me know if you need more.";
    let numbers = parse_number_array(reply).unwrap();
    assert_eq!(numbers, vec!["555-0100", "555-0101"]);
}

#[test]
fn parse_empty_array() {
    let numbers = parse_number_array("[]").unwrap();
    assert!(numbers.is_empty());
}

#[test]
fn parse_rejects_prose_without_array() {
    let result = parse_number_array("I could not find any phone numbers.");
    assert!(matches!(result.unwrap_err(), ExtractError::UnusableReply(_)));
}

#[test]
fn parse_rejects_non_string_entries() {
    let result = parse_number_array("[\"555-0100\", 5]");
    assert!(matches!(result.unwrap_err(), ExtractError::UnusableReply(_)));
}

#[test]
fn parse_rejects_object_reply() {
    let result = parse_number_array("{\"numbers\": []}");
    assert!(matches!(result.unwrap_err(), ExtractError::UnusableReply(_)));
}

// =========================================================================
// dedupe_first_occurrence
// =========================================================================

#[test]
fn dedupe_keeps_first_occurrence_order() {
    let numbers = vec![
        "+1-555-0100".to_string(),
        "+1-555-0100".to_string(),
        "555-0199".to_string(),
    ];
    assert_eq!(dedupe_first_occurrence(numbers), vec!["+1-555-0100", "555-0199"]);
}

// =========================================================================
// extract_contacts
// =========================================================================

#[tokio::test]
async fn extract_requires_configured_llm() {
    let state = test_helpers::test_app_state();
    let result = extract_contacts(&state, "some chat text").await;
    assert!(matches!(result.unwrap_err(), ExtractError::LlmNotConfigured));
}

#[tokio::test]
async fn extract_rejects_blank_input_before_any_call() {
    let mock = Arc::new(MockLlm::replying("[\"555-0100\"]"));
    let state = test_helpers::test_app_state_with_llm(mock.clone());
    let result = extract_contacts(&state, "   \n\t").await;
    assert!(matches!(result.unwrap_err(), ExtractError::EmptyInput));
    assert_eq!(mock.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn extract_commits_results_and_resets_selection() {
    let mock = Arc::new(MockLlm::replying("[\"555-0100\", \"555-0100\", \"555-0199\"]"));
    let state = test_helpers::test_app_state_with_llm(mock);
    {
        let mut extraction = state.extraction.write().await;
        extraction.results = vec!["old".to_string()];
        extraction.selected.insert("old".to_string());
    }

    let numbers = extract_contacts(&state, "chat log").await.unwrap();
    assert_eq!(numbers, vec!["555-0100", "555-0199"]);

    let extraction = state.extraction.read().await;
    assert_eq!(extraction.results, vec!["555-0100", "555-0199"]);
    assert!(extraction.selected.is_empty());
}

#[tokio::test]
async fn extract_failure_clears_results_and_selection() {
    let mock = Arc::new(MockLlm::failing());
    let state = test_helpers::test_app_state_with_llm(mock);
    {
        let mut extraction = state.extraction.write().await;
        extraction.results = vec!["555-0100".to_string()];
        extraction.selected.insert("555-0100".to_string());
    }

    let result = extract_contacts(&state, "chat log").await;
    assert!(matches!(result.unwrap_err(), ExtractError::Llm(_)));

    let extraction = state.extraction.read().await;
    assert!(extraction.results.is_empty());
    assert!(extraction.selected.is_empty());
}

#[tokio::test]
async fn extract_unusable_reply_clears_results() {
    let mock = Arc::new(MockLlm::replying("Sorry, no luck today."));
    let state = test_helpers::test_app_state_with_llm(mock);
    seed_results(&state, &["555-0100"]).await;

    let result = extract_contacts(&state, "chat log").await;
    assert!(matches!(result.unwrap_err(), ExtractError::UnusableReply(_)));

    let extraction = state.extraction.read().await;
    assert!(extraction.results.is_empty());
}

#[tokio::test]
async fn extract_stale_completion_does_not_overwrite() {
    let mut state = test_helpers::test_app_state();
    state.llm = Some(Arc::new(SupersedingLlm { ledger: Arc::clone(&state.extraction_ledger) }));
    seed_results(&state, &["555-0100"]).await;

    let result = extract_contacts(&state, "chat log").await;
    assert!(matches!(result.unwrap_err(), ExtractError::Stale));

    // The superseded request committed nothing.
    let extraction = state.extraction.read().await;
    assert_eq!(extraction.results, vec!["555-0100"]);
}

// =========================================================================
// results / selection
// =========================================================================

#[tokio::test]
async fn selection_reported_in_result_order() {
    let state = test_helpers::test_app_state();
    seed_results(&state, &["111", "222", "333"]).await;

    set_number_selected(&state, "333", true).await.unwrap();
    set_number_selected(&state, "111", true).await.unwrap();

    let results = extraction_results(&state).await;
    assert_eq!(results.numbers, vec!["111", "222", "333"]);
    assert_eq!(results.selected, vec!["111", "333"]);
}

#[tokio::test]
async fn toggle_deselects_a_selected_number() {
    let state = test_helpers::test_app_state();
    seed_results(&state, &["111"]).await;

    set_number_selected(&state, "111", true).await.unwrap();
    set_number_selected(&state, "111", false).await.unwrap();

    let results = extraction_results(&state).await;
    assert!(results.selected.is_empty());
}

#[tokio::test]
async fn toggle_unknown_number_errors() {
    let state = test_helpers::test_app_state();
    seed_results(&state, &["111"]).await;
    let result = set_number_selected(&state, "999", true).await;
    assert!(matches!(result.unwrap_err(), ExtractError::UnknownNumber(_)));
}

#[tokio::test]
async fn select_all_and_clear_all() {
    let state = test_helpers::test_app_state();
    seed_results(&state, &["111", "222"]).await;

    set_all_selected(&state, true).await;
    let results = extraction_results(&state).await;
    assert_eq!(results.selected, vec!["111", "222"]);

    set_all_selected(&state, false).await;
    let results = extraction_results(&state).await;
    assert!(results.selected.is_empty());
}

// =========================================================================
// export_csv
// =========================================================================

#[tokio::test]
async fn csv_exact_bytes_for_single_number() {
    let state = test_helpers::test_app_state();
    seed_results(&state, &["555-0199"]).await;
    set_all_selected(&state, true).await;

    let csv = export_csv(&state).await.unwrap();
    assert_eq!(csv, "PhoneNumber\n555-0199");
}

#[tokio::test]
async fn csv_rows_follow_first_extraction_order() {
    let state = test_helpers::test_app_state();
    seed_results(&state, &["111", "222", "333"]).await;
    set_number_selected(&state, "333", true).await.unwrap();
    set_number_selected(&state, "111", true).await.unwrap();

    let csv = export_csv(&state).await.unwrap();
    assert_eq!(csv, "PhoneNumber\n111\n333");
    assert!(!csv.ends_with('\n'));
}

#[tokio::test]
async fn csv_requires_a_selection() {
    let state = test_helpers::test_app_state();
    seed_results(&state, &["111"]).await;
    let result = export_csv(&state).await;
    assert!(matches!(result.unwrap_err(), ExtractError::NoSelection));
}

// =========================================================================
// build_system_prompt
// =========================================================================

#[test]
fn system_prompt_demands_json_array() {
    let prompt = build_system_prompt();
    assert!(prompt.contains("ONLY a JSON array of strings"));
    assert!(prompt.contains("<chat_messages>"));
}
