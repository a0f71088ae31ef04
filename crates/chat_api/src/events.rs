use serde_json::Value;

/// Fallback text for `error` events that carry neither `error` nor `message`.
pub const GENERIC_STREAM_ERROR: &str = "The assistant reported an error";

/// Protocol event decoded from one `data:` line of the send stream.
#[derive(Debug, Clone, PartialEq)]
pub enum ProtocolEvent {
    Connected {
        connection_id: Option<String>,
    },
    /// Server echo of the user message it recorded for this send.
    UserEcho {
        message_id: Option<String>,
        content: Option<String>,
    },
    Thinking {
        message: Option<String>,
    },
    Chunk {
        text: String,
    },
    /// The server committed the assistant reply to its own history.
    MessageComplete {
        message_id: Option<String>,
        content: Option<String>,
    },
    Complete,
    Error {
        message: String,
    },
    Disconnected,
    /// Unrecognised discriminator or unparseable payload, kept verbatim.
    Unknown {
        event_type: Option<String>,
        raw: String,
    },
}

impl ProtocolEvent {
    /// Returns true for `complete` and `error`, the events that end a send.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Complete | Self::Error { .. })
    }

    /// Wire discriminator used for logging.
    #[must_use]
    pub fn kind(&self) -> &str {
        match self {
            Self::Connected { .. } => "connected",
            Self::UserEcho { .. } => "user_echo",
            Self::Thinking { .. } => "thinking",
            Self::Chunk { .. } => "chunk",
            Self::MessageComplete { .. } => "message_complete",
            Self::Complete => "complete",
            Self::Error { .. } => "error",
            Self::Disconnected => "disconnected",
            Self::Unknown { event_type, .. } => event_type.as_deref().unwrap_or("unknown"),
        }
    }

    /// Maps a parsed payload object onto an event, keyed by `event_type`.
    pub fn from_payload(value: &Value, raw: &str) -> Self {
        let Some(event_type) = value.get("event_type").and_then(Value::as_str) else {
            return Self::Unknown {
                event_type: None,
                raw: raw.to_owned(),
            };
        };

        match event_type {
            "connected" => Self::Connected {
                connection_id: string_field(value, "connection_id"),
            },
            "user_message" | "user_echo" => Self::UserEcho {
                message_id: string_field(value, "message_id"),
                content: string_field(value, "content"),
            },
            "ai_thinking" | "thinking" | "start" => Self::Thinking {
                message: string_field(value, "message"),
            },
            "chunk" | "ai_chunk" => Self::Chunk {
                text: string_field(value, "text").unwrap_or_default(),
            },
            "ai_message_complete" | "message_complete" => Self::MessageComplete {
                message_id: string_field(value, "message_id"),
                content: string_field(value, "content"),
            },
            "complete" => Self::Complete,
            "error" => Self::Error {
                message: string_field(value, "error")
                    .or_else(|| string_field(value, "message"))
                    .filter(|message| !message.trim().is_empty())
                    .unwrap_or_else(|| GENERIC_STREAM_ERROR.to_owned()),
            },
            "disconnected" => Self::Disconnected,
            other => Self::Unknown {
                event_type: Some(other.to_owned()),
                raw: raw.to_owned(),
            },
        }
    }
}

fn string_field(value: &Value, key: &str) -> Option<String> {
    value.get(key).and_then(Value::as_str).map(ToString::to_string)
}
