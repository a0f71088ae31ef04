use std::collections::BTreeMap;

use crate::config::ChatApiConfig;
use crate::error::ChatApiError;

pub const HEADER_ACCEPT: &str = "accept";
pub const HEADER_COOKIE: &str = "cookie";
pub const HEADER_USER_AGENT: &str = "user-agent";
pub const HEADER_CACHE_CONTROL: &str = "cache-control";

pub const ACCEPT_EVENT_STREAM: &str = "text/event-stream";
pub const ACCEPT_JSON: &str = "application/json";

/// Which endpoint family the headers are built for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    /// `POST /api/chat/send` returning an event stream.
    Stream,
    /// History and clear-session calls returning JSON.
    Json,
}

/// Build a deterministic header map for chat transport requests.
pub fn build_headers(
    config: &ChatApiConfig,
    kind: RequestKind,
) -> Result<BTreeMap<String, String>, ChatApiError> {
    let mut headers = BTreeMap::new();

    let accept = match kind {
        RequestKind::Stream => ACCEPT_EVENT_STREAM,
        RequestKind::Json => ACCEPT_JSON,
    };
    headers.insert(HEADER_ACCEPT.to_owned(), accept.to_owned());
    if kind == RequestKind::Stream {
        headers.insert(HEADER_CACHE_CONTROL.to_owned(), "no-cache".to_owned());
    }

    let ua = config
        .user_agent
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(ToOwned::to_owned)
        .unwrap_or_else(default_user_agent);
    headers.insert(HEADER_USER_AGENT.to_owned(), ua);

    for (key, value) in &config.extra_headers {
        let key = key.trim().to_ascii_lowercase();
        if key.is_empty() {
            return Err(ChatApiError::InvalidHeader("empty header name".to_owned()));
        }
        headers.insert(key, value.trim().to_owned());
    }

    // Credentials always win over an extra header with the same name.
    if let Some(cookie) = config
        .auth_cookie
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
    {
        headers.insert(HEADER_COOKIE.to_owned(), cookie.to_owned());
    }

    Ok(headers)
}

pub fn default_user_agent() -> String {
    format!(
        "healthmate-chat/{} ({}; {})",
        env!("CARGO_PKG_VERSION"),
        std::env::consts::OS,
        normalize_arch(std::env::consts::ARCH)
    )
}

fn normalize_arch(arch: &str) -> String {
    match arch.to_ascii_lowercase().as_str() {
        "x86_64" | "amd64" => "x64".to_owned(),
        "x86" | "i386" | "i686" => "ia32".to_owned(),
        "aarch64" => "arm64".to_owned(),
        normalized => normalized.to_owned(),
    }
}
