//! Streaming chat client core.
//!
//! [`ChatOrchestrator`] composes a [`session_identity::SessionIdentity`], a
//! [`ChatTransport`] and a [`Transcript`]. Each send is driven through a
//! [`StreamingStateMachine`] fed by the incremental event decoder in
//! `chat_api`. Rendering adapters observe changes through [`ChatObserver`].

pub mod config;
pub mod message;
pub mod orchestrator;
pub mod retry;
pub mod scroll;
pub mod stream_state;
pub mod transcript;
pub mod transport;

pub use config::{ClientConfig, ConfigError};
pub use message::{Message, Role};
pub use orchestrator::{
    ChatObserver, ChatOrchestrator, NoopObserver, OrchestratorSettings, SendOutcome,
    StartupOutcome, UiState,
};
pub use retry::RetryPolicy;
pub use scroll::{ScrollAction, ScrollState};
pub use stream_state::{Outcome, StreamSignal, StreamState, StreamingStateMachine, Transition};
pub use transcript::{PendingEntry, PendingView, Transcript};
pub use transport::{ChatTransport, EventStream, HttpTransport, TransportNotifier};
