use chat_api::payload::{DEFAULT_LANGUAGE, DEFAULT_TIMEZONE};
use chat_api::{HistoryResponse, SendMessageForm};

#[test]
fn send_form_defaults_match_service_defaults() {
    let form = SendMessageForm::new("hello", "session-123");
    assert_eq!(form.timezone, DEFAULT_TIMEZONE);
    assert_eq!(form.language, DEFAULT_LANGUAGE);
    assert!(form.stream);
}

#[test]
fn send_form_builders_override_locale() {
    let form = SendMessageForm::new("hello", "session-123")
        .with_timezone("Europe/Berlin")
        .with_language("de");
    assert_eq!(form.timezone, "Europe/Berlin");
    assert_eq!(form.language, "de");
}

#[test]
fn history_response_tolerates_missing_optional_fields() {
    let body = r#"{
        "messages": [
            {"role": "user", "content": "hello"},
            {"id": "m-2", "role": "assistant", "content": "hi", "timestamp": "2026-01-01T10:00:00.123456"}
        ]
    }"#;

    let history: HistoryResponse = serde_json::from_str(body).expect("history parses");
    assert!(history.success);
    assert!(!history.has_more);
    assert_eq!(history.total_count, None);
    assert_eq!(history.messages.len(), 2);
    assert_eq!(history.messages[0].id, None);
    assert_eq!(history.messages[1].id.as_deref(), Some("m-2"));
    assert_eq!(
        history.messages[1].timestamp.as_deref(),
        Some("2026-01-01T10:00:00.123456")
    );
}
