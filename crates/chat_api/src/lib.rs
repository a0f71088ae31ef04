//! Transport-only primitives for the chat service's HTTP API.
//!
//! This crate owns request building, the incremental event-line decoder and
//! the wire error taxonomy. It holds no transcript or session state and no
//! UI coupling.
//!
//! Event stream framing: every logical event is one `data: {json}` line whose
//! payload carries an `event_type` discriminator. Legacy server aliases
//! (`ai_chunk`, `user_message`, ...) are normalized in [`ProtocolEvent`].

pub mod client;
pub mod config;
pub mod error;
pub mod events;
pub mod headers;
pub mod payload;
pub mod sse;
pub mod url;

pub use client::{ByteStream, ChatApiClient};
pub use config::ChatApiConfig;
pub use error::ChatApiError;
pub use events::ProtocolEvent;
pub use payload::{
    ClearSessionForm, HistoryMessage, HistoryQuery, HistoryResponse, SendMessageForm,
};
pub use reqwest::StatusCode;
pub use sse::{decode_stream, StreamDecoder};
pub use url::normalize_base_url;
