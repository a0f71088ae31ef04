use chat_api::headers::{
    build_headers, default_user_agent, RequestKind, ACCEPT_EVENT_STREAM, ACCEPT_JSON,
    HEADER_ACCEPT, HEADER_CACHE_CONTROL, HEADER_COOKIE, HEADER_USER_AGENT,
};
use chat_api::{ChatApiConfig, ChatApiError};

#[test]
fn stream_headers_accept_event_stream_and_carry_cookie() {
    let config = ChatApiConfig::new("https://chat.example.com")
        .with_auth_cookie("session_token=abc")
        .insert_header("X-Extra", "value");

    let headers = build_headers(&config, RequestKind::Stream).expect("header construction");

    assert_eq!(headers.get(HEADER_ACCEPT).map(String::as_str), Some(ACCEPT_EVENT_STREAM));
    assert_eq!(headers.get(HEADER_CACHE_CONTROL).map(String::as_str), Some("no-cache"));
    assert_eq!(headers.get(HEADER_COOKIE).map(String::as_str), Some("session_token=abc"));
    assert_eq!(headers.get("x-extra").map(String::as_str), Some("value"));
}

#[test]
fn json_headers_accept_json_without_cache_control() {
    let config = ChatApiConfig::new("https://chat.example.com");
    let headers = build_headers(&config, RequestKind::Json).expect("header construction");

    assert_eq!(headers.get(HEADER_ACCEPT).map(String::as_str), Some(ACCEPT_JSON));
    assert!(!headers.contains_key(HEADER_CACHE_CONTROL));
    assert!(!headers.contains_key(HEADER_COOKIE));
}

#[test]
fn user_agent_defaults_and_overrides() {
    let default = build_headers(&ChatApiConfig::default(), RequestKind::Json).expect("headers");
    assert_eq!(
        default.get(HEADER_USER_AGENT).cloned(),
        Some(default_user_agent())
    );
    assert!(default_user_agent().starts_with("healthmate-chat/"));

    let custom = ChatApiConfig::default().with_user_agent(" tester/1.0 ");
    let headers = build_headers(&custom, RequestKind::Json).expect("headers");
    assert_eq!(headers.get(HEADER_USER_AGENT).map(String::as_str), Some("tester/1.0"));
}

#[test]
fn auth_cookie_overrides_extra_cookie_header() {
    let config = ChatApiConfig::default()
        .insert_header("Cookie", "stale=1")
        .with_auth_cookie("fresh=2");
    let headers = build_headers(&config, RequestKind::Json).expect("headers");
    assert_eq!(headers.get(HEADER_COOKIE).map(String::as_str), Some("fresh=2"));
}

#[test]
fn blank_extra_header_name_is_rejected() {
    let config = ChatApiConfig::default().insert_header("  ", "value");
    assert!(matches!(
        build_headers(&config, RequestKind::Json),
        Err(ChatApiError::InvalidHeader(_))
    ));
}
