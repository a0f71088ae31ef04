use serde::{Deserialize, Serialize};

pub const DEFAULT_TIMEZONE: &str = "Asia/Tokyo";
pub const DEFAULT_LANGUAGE: &str = "ja";
pub const DEFAULT_HISTORY_LIMIT: u32 = 50;

/// Form body of `POST /api/chat/send`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendMessageForm {
    pub message: String,
    pub timezone: String,
    pub language: String,
    /// Default: true. The client only consumes the streaming variant.
    #[serde(default = "default_true")]
    pub stream: bool,
    pub session_id: String,
}

fn default_true() -> bool {
    true
}

impl SendMessageForm {
    pub fn new(message: impl Into<String>, session_id: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            timezone: DEFAULT_TIMEZONE.to_string(),
            language: DEFAULT_LANGUAGE.to_string(),
            stream: true,
            session_id: session_id.into(),
        }
    }

    pub fn with_timezone(mut self, timezone: impl Into<String>) -> Self {
        self.timezone = timezone.into();
        self
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }
}

/// Form body of `POST /api/chat/clear-session`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClearSessionForm {
    pub session_id: String,
}

/// Query string of `GET /api/chat/history`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HistoryQuery {
    pub session_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
}

impl HistoryQuery {
    pub fn new(session_id: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            limit: None,
        }
    }

    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// JSON body returned by the history endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HistoryResponse {
    #[serde(default = "default_true")]
    pub success: bool,
    #[serde(default)]
    pub messages: Vec<HistoryMessage>,
    #[serde(default)]
    pub total_count: Option<usize>,
    #[serde(default)]
    pub has_more: bool,
}

/// One server-held message. `role` stays a string so unknown roles can be
/// skipped by the caller instead of failing the whole snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HistoryMessage {
    #[serde(default)]
    pub id: Option<String>,
    pub role: String,
    pub content: String,
    #[serde(default)]
    pub timestamp: Option<String>,
}
