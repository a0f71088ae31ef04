use chat_api::HistoryMessage;
use time::format_description::well_known::{Iso8601, Rfc3339};
use time::{OffsetDateTime, PrimitiveDateTime};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Assistant,
    Error,
}

impl Role {
    /// Maps a role name from server history. Roles the transcript does not
    /// display (`system`, anything unknown) map to `None`.
    pub fn from_wire(role: &str) -> Option<Self> {
        match role.trim().to_ascii_lowercase().as_str() {
            "user" => Some(Self::User),
            "assistant" | "ai" => Some(Self::Assistant),
            _ => None,
        }
    }

    /// User actions and failures always pull the viewport to the newest entry.
    pub fn always_snaps(self) -> bool {
        matches!(self, Self::User | Self::Error)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub role: Role,
    pub content: String,
    pub timestamp: OffsetDateTime,
}

impl Message {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            timestamp: OffsetDateTime::now_utc(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }

    pub fn error(content: impl Into<String>) -> Self {
        Self::new(Role::Error, content)
    }

    /// Converts one history entry, skipping roles that are not displayed.
    /// Missing or unparseable timestamps fall back to now.
    pub fn from_history(entry: HistoryMessage) -> Option<Self> {
        let Some(role) = Role::from_wire(&entry.role) else {
            tracing::debug!(role = %entry.role, "skipping history entry with undisplayed role");
            return None;
        };

        let timestamp = entry
            .timestamp
            .as_deref()
            .and_then(parse_timestamp)
            .unwrap_or_else(OffsetDateTime::now_utc);

        Some(Self {
            role,
            content: entry.content,
            timestamp,
        })
    }
}

/// Accepts RFC 3339 and ISO 8601 with or without an offset. Values without
/// an offset are taken as UTC.
pub fn parse_timestamp(value: &str) -> Option<OffsetDateTime> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    OffsetDateTime::parse(value, &Rfc3339)
        .or_else(|_| OffsetDateTime::parse(value, &Iso8601::DEFAULT))
        .ok()
        .or_else(|| {
            PrimitiveDateTime::parse(value, &Iso8601::DEFAULT)
                .ok()
                .map(PrimitiveDateTime::assume_utc)
        })
}
