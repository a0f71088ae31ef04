use std::ops::{Deref, DerefMut};

use chat_api::{ChatApiError, SendMessageForm};
use futures_util::StreamExt;
use session_identity::{SessionIdentity, SessionStorage};

use crate::config::{ClientConfig, DEFAULT_WELCOME_MESSAGE};
use crate::message::Message;
use crate::retry::{retry_with_delay, RetryPolicy};
use crate::scroll::ScrollAction;
use crate::stream_state::{Outcome, StreamSignal, StreamingStateMachine, Transition};
use crate::transcript::Transcript;
use crate::transport::{ChatTransport, TransportNotifier};

pub const TRANSPORT_FAILURE_MESSAGE: &str =
    "Could not reach the chat service. Please try again.";
pub const STREAM_INTERRUPTED_MESSAGE: &str =
    "The response ended before it completed. Please try again.";
pub const SESSION_NOT_READY_MESSAGE: &str =
    "The chat session is not ready yet. Please try again in a moment.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiState {
    Ready,
    /// Recovery needs a new login, not a retry.
    AuthenticationRequired,
}

/// Receives every UI-visible change. All methods default to no-ops.
pub trait ChatObserver {
    fn transcript_changed(&mut self, _transcript: &Transcript, _scroll: ScrollAction) {}

    fn stream_signal(
        &mut self,
        _signal: &StreamSignal,
        _transcript: &Transcript,
        _scroll: ScrollAction,
    ) {
    }

    fn input_enabled_changed(&mut self, _enabled: bool) {}

    fn ui_state_changed(&mut self, _state: UiState) {}
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl ChatObserver for NoopObserver {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartupOutcome {
    /// Identity was created in this run; history was not requested.
    FreshSession,
    HistoryLoaded { messages: usize },
    /// Empty or unavailable history; the welcome message is shown.
    Welcome,
    AuthenticationRequired,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    /// Blank input or a send already in flight; nothing was sent.
    Rejected,
    Completed { committed: bool },
    Failed,
    AuthenticationRequired,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrchestratorSettings {
    pub timezone: String,
    pub language: String,
    pub welcome_message: String,
    pub scroll_threshold_px: u32,
    pub session_ready: RetryPolicy,
}

impl Default for OrchestratorSettings {
    fn default() -> Self {
        Self::from_config(&ClientConfig::default())
    }
}

impl OrchestratorSettings {
    pub fn from_config(config: &ClientConfig) -> Self {
        let welcome = if config.welcome_message.trim().is_empty() {
            DEFAULT_WELCOME_MESSAGE.to_string()
        } else {
            config.welcome_message.clone()
        };

        Self {
            timezone: config.timezone.clone(),
            language: config.language.clone(),
            welcome_message: welcome,
            scroll_threshold_px: config.scroll_threshold_px,
            session_ready: config.retry_policy(),
        }
    }
}

/// Composes identity, transport, transcript and observer on one task.
///
/// Sends take `&mut self`, so at most one is in flight. Input is disabled
/// for the duration of a send and re-enabled when it ends, including when
/// the send future is dropped part way.
///
/// There is no timeout on a streamed reply.
pub struct ChatOrchestrator<S, T, O> {
    identity: SessionIdentity<S>,
    transport: T,
    observer: O,
    transcript: Transcript,
    settings: OrchestratorSettings,
    ui_state: UiState,
    input_enabled: bool,
}

impl<S, T, O> ChatOrchestrator<S, T, O>
where
    S: SessionStorage,
    T: ChatTransport,
    O: ChatObserver,
{
    pub fn new(
        identity: SessionIdentity<S>,
        transport: T,
        observer: O,
        settings: OrchestratorSettings,
    ) -> Self {
        Self {
            identity,
            transport,
            observer,
            transcript: Transcript::new(settings.scroll_threshold_px),
            settings,
            ui_state: UiState::Ready,
            input_enabled: true,
        }
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn identity(&self) -> &SessionIdentity<S> {
        &self.identity
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn observer(&self) -> &O {
        &self.observer
    }

    pub fn observer_mut(&mut self) -> &mut O {
        &mut self.observer
    }

    pub fn ui_state(&self) -> UiState {
        self.ui_state
    }

    pub fn input_enabled(&self) -> bool {
        self.input_enabled
    }

    pub fn update_viewport(&mut self, offset: u32, max_offset: u32) {
        self.transcript.update_viewport(offset, max_offset);
    }

    /// One-shot startup reconciliation: resolve identity, then either skip
    /// history for a freshly created session or load it from the server.
    pub async fn start(&mut self) -> StartupOutcome {
        let Some(session_id) = self.ready_session_id().await else {
            self.show_welcome();
            return StartupOutcome::Welcome;
        };

        if self.identity.is_freshly_created() {
            self.identity.clear_fresh_flag();
            tracing::info!(%session_id, "fresh session; skipping history load");
            self.show_welcome();
            return StartupOutcome::FreshSession;
        }

        match self.transport.fetch_history(&session_id).await {
            Ok(history) if history.success => {
                let messages: Vec<Message> = history
                    .messages
                    .into_iter()
                    .filter_map(Message::from_history)
                    .collect();

                if messages.is_empty() {
                    self.show_welcome();
                    return StartupOutcome::Welcome;
                }

                let count = messages.len();
                let scroll = self.transcript.replace_all(messages);
                self.observer.transcript_changed(&self.transcript, scroll);
                tracing::info!(%session_id, messages = count, "history loaded");
                StartupOutcome::HistoryLoaded { messages: count }
            }
            Ok(_) => {
                tracing::warn!(%session_id, "history request reported failure");
                self.show_welcome();
                StartupOutcome::Welcome
            }
            Err(error) if error.is_unauthorized() => {
                tracing::warn!(%error, "history requires authentication");
                self.set_ui_state(UiState::AuthenticationRequired);
                StartupOutcome::AuthenticationRequired
            }
            Err(error) => {
                tracing::warn!(%error, "history load failed; showing welcome");
                self.show_welcome();
                StartupOutcome::Welcome
            }
        }
    }

    pub async fn send(&mut self, input: &str) -> SendOutcome {
        let text = input.trim();
        if text.is_empty() {
            tracing::debug!("blank input rejected");
            return SendOutcome::Rejected;
        }
        if !self.input_enabled {
            tracing::warn!("send rejected while input is disabled");
            return SendOutcome::Rejected;
        }

        let mut chat = InputGuard::engage(self);
        let outcome = chat.run_send(text.to_owned()).await;
        drop(chat);
        outcome
    }

    /// Discards the current session locally and on the server, clears the
    /// transcript and marks the new identity fresh.
    pub async fn start_new_session(&mut self) -> Option<String> {
        let notifier = TransportNotifier::new(&self.transport);
        let started = match self.identity.start_new_and_notify(&notifier).await {
            Ok(id) => Some(id),
            Err(error) => {
                tracing::error!(%error, "failed to start a new session");
                None
            }
        };

        self.reset_view();
        started
    }

    /// Like [`Self::start_new_session`] but leaves the next id to be created
    /// lazily, without the fresh flag.
    pub async fn clear_session(&mut self) -> Option<String> {
        let notifier = TransportNotifier::new(&self.transport);
        let discarded = match self.identity.reset_and_notify(&notifier).await {
            Ok(previous) => previous,
            Err(error) => {
                tracing::error!(%error, "failed to clear session");
                None
            }
        };

        self.reset_view();
        discarded
    }

    async fn run_send(&mut self, text: String) -> SendOutcome {
        let scroll = self.transcript.append(Message::user(text.clone()));
        self.observer.transcript_changed(&self.transcript, scroll);

        let Some(session_id) = self.ready_session_id().await else {
            let scroll = self
                .transcript
                .append(Message::error(SESSION_NOT_READY_MESSAGE));
            self.observer.transcript_changed(&self.transcript, scroll);
            return SendOutcome::Failed;
        };

        let mut machine = StreamingStateMachine::new();
        let step = machine.begin(&mut self.transcript);
        self.emit(step);

        let form = SendMessageForm::new(text, session_id)
            .with_timezone(self.settings.timezone.clone())
            .with_language(self.settings.language.clone());

        let mut events = match self.transport.send(form).await {
            Ok(events) => events,
            Err(error) if error.is_unauthorized() => {
                tracing::warn!(%error, "send requires authentication");
                self.transcript.discard_pending();
                self.observer
                    .transcript_changed(&self.transcript, ScrollAction::Preserve);
                self.set_ui_state(UiState::AuthenticationRequired);
                return SendOutcome::AuthenticationRequired;
            }
            Err(error) => {
                self.fail_transport(&mut machine, &error, TRANSPORT_FAILURE_MESSAGE);
                return SendOutcome::Failed;
            }
        };

        let mut committed = false;
        while let Some(item) = events.next().await {
            match item {
                Ok(event) => {
                    let step = machine.apply(&event, &mut self.transcript);
                    committed |= step.signal == StreamSignal::Committed;
                    self.emit(step);
                }
                Err(error) => {
                    self.fail_transport(&mut machine, &error, TRANSPORT_FAILURE_MESSAGE);
                    break;
                }
            }

            if machine.is_settled() {
                break;
            }
        }

        if !machine.is_settled() {
            tracing::warn!("stream ended without a terminal event");
            let step = machine.fail_transport(STREAM_INTERRUPTED_MESSAGE, &mut self.transcript);
            self.emit(step);
        }

        if self.ui_state != UiState::Ready {
            self.set_ui_state(UiState::Ready);
        }

        match machine.outcome() {
            Some(Outcome::Completed) => SendOutcome::Completed { committed },
            _ => SendOutcome::Failed,
        }
    }

    fn fail_transport(
        &mut self,
        machine: &mut StreamingStateMachine,
        error: &ChatApiError,
        description: &str,
    ) {
        tracing::warn!(%error, "chat transport failed");
        let step = machine.fail_transport(description, &mut self.transcript);
        self.emit(step);
    }

    async fn ready_session_id(&self) -> Option<String> {
        retry_with_delay(self.settings.session_ready, "session identity", || {
            self.identity.resolve()
        })
        .await
        .ok()
    }

    fn emit(&mut self, step: Transition) {
        self.observer
            .stream_signal(&step.signal, &self.transcript, step.scroll);
    }

    fn show_welcome(&mut self) {
        let welcome = Message::assistant(self.settings.welcome_message.clone());
        let scroll = self.transcript.replace_all(vec![welcome]);
        self.observer.transcript_changed(&self.transcript, scroll);
    }

    fn reset_view(&mut self) {
        self.transcript.clear();
        self.show_welcome();
        self.set_ui_state(UiState::Ready);
    }

    fn set_ui_state(&mut self, state: UiState) {
        if self.ui_state == state {
            return;
        }
        self.ui_state = state;
        self.observer.ui_state_changed(state);
    }

    fn set_input_enabled(&mut self, enabled: bool) {
        if self.input_enabled == enabled {
            return;
        }
        self.input_enabled = enabled;
        self.observer.input_enabled_changed(enabled);
    }
}

/// Disables input on creation and re-enables it on drop. A pending entry
/// still open at drop time belongs to an abandoned send and is discarded.
struct InputGuard<'a, S, T, O>
where
    S: SessionStorage,
    T: ChatTransport,
    O: ChatObserver,
{
    chat: &'a mut ChatOrchestrator<S, T, O>,
}

impl<'a, S, T, O> InputGuard<'a, S, T, O>
where
    S: SessionStorage,
    T: ChatTransport,
    O: ChatObserver,
{
    fn engage(chat: &'a mut ChatOrchestrator<S, T, O>) -> Self {
        chat.set_input_enabled(false);
        Self { chat }
    }
}

impl<S, T, O> Deref for InputGuard<'_, S, T, O>
where
    S: SessionStorage,
    T: ChatTransport,
    O: ChatObserver,
{
    type Target = ChatOrchestrator<S, T, O>;

    fn deref(&self) -> &Self::Target {
        self.chat
    }
}

impl<S, T, O> DerefMut for InputGuard<'_, S, T, O>
where
    S: SessionStorage,
    T: ChatTransport,
    O: ChatObserver,
{
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.chat
    }
}

impl<S, T, O> Drop for InputGuard<'_, S, T, O>
where
    S: SessionStorage,
    T: ChatTransport,
    O: ChatObserver,
{
    fn drop(&mut self) {
        if self.chat.transcript.discard_pending().is_some() {
            tracing::debug!("send abandoned; pending entry discarded");
            self.chat
                .observer
                .transcript_changed(&self.chat.transcript, ScrollAction::Preserve);
        }
        self.chat.set_input_enabled(true);
    }
}
