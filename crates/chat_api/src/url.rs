/// Default origin for chat transport requests.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

pub const SEND_PATH: &str = "/api/chat/send";
pub const HISTORY_PATH: &str = "/api/chat/history";
pub const CLEAR_SESSION_PATH: &str = "/api/chat/clear-session";

/// Normalize a configured base URL to a bare origin without trailing slash.
///
/// Normalization rules:
/// 1) blank input falls back to [`DEFAULT_BASE_URL`]
/// 2) a trailing `/api/chat` or `/api` suffix is stripped so endpoint paths
///    are never doubled
pub fn normalize_base_url(input: &str) -> String {
    let base = if input.trim().is_empty() {
        DEFAULT_BASE_URL
    } else {
        input.trim()
    };

    let trimmed = base.trim_end_matches('/');
    let trimmed = trimmed
        .strip_suffix("/api/chat")
        .or_else(|| trimmed.strip_suffix("/api"))
        .unwrap_or(trimmed);
    trimmed.trim_end_matches('/').to_string()
}

pub fn endpoint_url(base_url: &str, path: &str) -> String {
    format!("{}{path}", normalize_base_url(base_url))
}

pub fn send_url(base_url: &str) -> String {
    endpoint_url(base_url, SEND_PATH)
}

pub fn history_url(base_url: &str) -> String {
    endpoint_url(base_url, HISTORY_PATH)
}

pub fn clear_session_url(base_url: &str) -> String {
    endpoint_url(base_url, CLEAR_SESSION_PATH)
}
