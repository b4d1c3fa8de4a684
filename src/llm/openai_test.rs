use super::*;
use crate::llm::types::Message;

// =============================================================================
// CHAT COMPLETIONS
// =============================================================================

#[test]
fn chat_completions_parses_text() {
    let json = serde_json::json!({
        "model": "gpt-4o",
        "choices": [
            { "message": { "role": "assistant", "content": "hello" }, "finish_reason": "stop" }
        ],
        "usage": { "prompt_tokens": 9, "completion_tokens": 3 }
    })
    .to_string();

    let response = parse_chat_completions_response(&json).unwrap();
    assert_eq!(response.text(), "hello");
    assert_eq!(response.model, "gpt-4o");
    assert_eq!(response.stop_reason, "end_turn");
    assert_eq!(response.input_tokens, 9);
    assert_eq!(response.output_tokens, 3);
}

#[test]
fn chat_completions_maps_length_to_max_tokens() {
    let json = serde_json::json!({
        "model": "gpt-4o",
        "choices": [
            { "message": { "role": "assistant", "content": "trunc" }, "finish_reason": "length" }
        ]
    })
    .to_string();

    let response = parse_chat_completions_response(&json).unwrap();
    assert_eq!(response.stop_reason, "max_tokens");
}

#[test]
fn chat_completions_missing_choices_errors() {
    let json = serde_json::json!({ "model": "gpt-4o", "choices": [] }).to_string();
    let err = parse_chat_completions_response(&json).unwrap_err();
    assert!(matches!(err, LlmError::ApiParse(_)));
}

#[test]
fn chat_completions_rejects_invalid_json() {
    let err = parse_chat_completions_response("{nope").unwrap_err();
    assert!(matches!(err, LlmError::ApiParse(_)));
}

#[test]
fn chat_completions_request_includes_system_message() {
    let msgs = build_chat_completions_messages("be terse", &[Message::user("hi")]);
    assert_eq!(msgs.len(), 2);
    assert_eq!(msgs[0].role, "system");
    assert_eq!(msgs[0].content, "be terse");
    assert_eq!(msgs[1].role, "user");
    assert_eq!(msgs[1].content, "hi");
}

#[test]
fn chat_completions_request_skips_blank_system() {
    let msgs = build_chat_completions_messages("  ", &[Message::user("hi")]);
    assert_eq!(msgs.len(), 1);
    assert_eq!(msgs[0].role, "user");
}

// =============================================================================
// RESPONSES
// =============================================================================

#[test]
fn responses_parses_output_message() {
    let json = serde_json::json!({
        "model": "gpt-4o",
        "output": [
            { "type": "reasoning", "summary": [] },
            {
                "type": "message",
                "content": [
                    { "type": "output_text", "text": "answer" }
                ]
            }
        ],
        "usage": { "input_tokens": 20, "output_tokens": 5 }
    })
    .to_string();

    let response = parse_responses_response(&json).unwrap();
    assert_eq!(response.text(), "answer");
    assert_eq!(response.input_tokens, 20);
    assert_eq!(response.output_tokens, 5);
    assert_eq!(response.stop_reason, "end_turn");
}

#[test]
fn responses_falls_back_to_output_text_field() {
    let json = serde_json::json!({
        "model": "gpt-4o",
        "output_text": "flat answer"
    })
    .to_string();

    let response = parse_responses_response(&json).unwrap();
    assert_eq!(response.text(), "flat answer");
}

#[test]
fn responses_maps_incomplete_to_max_tokens() {
    let json = serde_json::json!({
        "model": "gpt-4o",
        "output": [],
        "incomplete_details": { "reason": "max_output_tokens" }
    })
    .to_string();

    let response = parse_responses_response(&json).unwrap();
    assert_eq!(response.stop_reason, "max_tokens");
}

#[test]
fn responses_input_wraps_text_content() {
    let input = build_responses_input(&[Message::user("extract these")]);
    assert_eq!(input.len(), 1);
    let RespInputItem::Message { ref role, ref content } = input[0];
    assert_eq!(role, "user");
    assert_eq!(content.len(), 1);
    assert_eq!(content[0].content_type, "input_text");
    assert_eq!(content[0].text, "extract these");
}
