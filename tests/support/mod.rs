#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::io;

use chat_api::{
    decode_stream, ChatApiError, HistoryMessage, HistoryResponse, ProtocolEvent, SendMessageForm,
    StatusCode,
};
use futures_util::stream;
use healthmate_chat::{
    ChatObserver, ChatTransport, EventStream, ScrollAction, StreamSignal, Transcript, UiState,
};
use session_identity::{SessionIdentityError, SessionStorage};

pub enum ScriptedSend {
    /// Raw body chunks, decoded by the real event decoder.
    Bytes(Vec<Vec<u8>>),
    /// Already decoded items, including read failures.
    Events(Vec<Result<ProtocolEvent, ChatApiError>>),
    /// The request itself fails.
    Fail(ChatApiError),
    /// Headers arrive but the body never yields.
    Hang,
}

#[derive(Default)]
pub struct FakeTransport {
    histories: RefCell<VecDeque<Result<HistoryResponse, ChatApiError>>>,
    sends: RefCell<VecDeque<ScriptedSend>>,
    pub fail_clear: bool,
    pub history_requests: RefCell<Vec<String>>,
    pub sent_forms: RefCell<Vec<SendMessageForm>>,
    pub cleared: RefCell<Vec<String>>,
}

impl FakeTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_history(self, history: Result<HistoryResponse, ChatApiError>) -> Self {
        self.histories.borrow_mut().push_back(history);
        self
    }

    pub fn with_send(self, send: ScriptedSend) -> Self {
        self.sends.borrow_mut().push_back(send);
        self
    }

    pub fn failing_clear(mut self) -> Self {
        self.fail_clear = true;
        self
    }
}

impl ChatTransport for FakeTransport {
    async fn fetch_history(&self, session_id: &str) -> Result<HistoryResponse, ChatApiError> {
        self.history_requests
            .borrow_mut()
            .push(session_id.to_owned());
        self.histories
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| Ok(history(Vec::new())))
    }

    async fn send(&self, form: SendMessageForm) -> Result<EventStream, ChatApiError> {
        self.sent_forms.borrow_mut().push(form);
        let script = self
            .sends
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| ScriptedSend::Fail(ChatApiError::Unknown("unscripted send".into())));

        match script {
            ScriptedSend::Bytes(chunks) => {
                let bytes = stream::iter(chunks.into_iter().map(Ok::<_, ChatApiError>));
                Ok(Box::pin(decode_stream(bytes)))
            }
            ScriptedSend::Events(items) => Ok(Box::pin(stream::iter(items))),
            ScriptedSend::Fail(error) => Err(error),
            ScriptedSend::Hang => Ok(Box::pin(stream::pending::<
                Result<ProtocolEvent, ChatApiError>,
            >())),
        }
    }

    async fn clear_session(&self, session_id: &str) -> Result<(), ChatApiError> {
        self.cleared.borrow_mut().push(session_id.to_owned());
        if self.fail_clear {
            Err(ChatApiError::Status(
                StatusCode::SERVICE_UNAVAILABLE,
                "clear unavailable".to_owned(),
            ))
        } else {
            Ok(())
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Observed {
    Transcript { len: usize, scroll: ScrollAction },
    Signal(StreamSignal),
    Input(bool),
    Ui(UiState),
}

#[derive(Default)]
pub struct ObserverSpy {
    pub events: Vec<Observed>,
}

impl ObserverSpy {
    pub fn signals(&self) -> Vec<StreamSignal> {
        self.events
            .iter()
            .filter_map(|event| match event {
                Observed::Signal(signal)
                    if !matches!(signal, StreamSignal::Acknowledged | StreamSignal::Ignored) =>
                {
                    Some(signal.clone())
                }
                _ => None,
            })
            .collect()
    }

    pub fn input_changes(&self) -> Vec<bool> {
        self.events
            .iter()
            .filter_map(|event| match event {
                Observed::Input(enabled) => Some(*enabled),
                _ => None,
            })
            .collect()
    }

    pub fn ui_changes(&self) -> Vec<UiState> {
        self.events
            .iter()
            .filter_map(|event| match event {
                Observed::Ui(state) => Some(*state),
                _ => None,
            })
            .collect()
    }
}

impl ChatObserver for ObserverSpy {
    fn transcript_changed(&mut self, transcript: &Transcript, scroll: ScrollAction) {
        self.events.push(Observed::Transcript {
            len: transcript.len(),
            scroll,
        });
    }

    fn stream_signal(
        &mut self,
        signal: &StreamSignal,
        _transcript: &Transcript,
        _scroll: ScrollAction,
    ) {
        self.events.push(Observed::Signal(signal.clone()));
    }

    fn input_enabled_changed(&mut self, enabled: bool) {
        self.events.push(Observed::Input(enabled));
    }

    fn ui_state_changed(&mut self, state: UiState) {
        self.events.push(Observed::Ui(state));
    }
}

/// Storage whose reads fail a fixed number of times before delegating.
pub struct FlakyStorage<S> {
    inner: S,
    failures_left: Cell<u32>,
    pub reads: Cell<u32>,
}

impl<S> FlakyStorage<S> {
    pub fn new(inner: S, failures: u32) -> Self {
        Self {
            inner,
            failures_left: Cell::new(failures),
            reads: Cell::new(0),
        }
    }
}

impl<S: SessionStorage> SessionStorage for FlakyStorage<S> {
    fn read(&self, key: &str) -> Result<Option<String>, SessionIdentityError> {
        self.reads.set(self.reads.get() + 1);
        if self.failures_left.get() > 0 {
            self.failures_left.set(self.failures_left.get() - 1);
            return Err(SessionIdentityError::io(
                "reading session record",
                "/origin",
                io::Error::other("origin locked"),
            ));
        }
        self.inner.read(key)
    }

    fn write(&self, key: &str, value: &str) -> Result<(), SessionIdentityError> {
        self.inner.write(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), SessionIdentityError> {
        self.inner.remove(key)
    }
}

pub fn history(messages: Vec<HistoryMessage>) -> HistoryResponse {
    HistoryResponse {
        success: true,
        total_count: Some(messages.len()),
        messages,
        has_more: false,
    }
}

pub fn history_message(role: &str, content: &str) -> HistoryMessage {
    HistoryMessage {
        id: None,
        role: role.to_owned(),
        content: content.to_owned(),
        timestamp: Some("2026-03-01T09:00:00Z".to_owned()),
    }
}

pub fn event_line(payload: &str) -> Vec<u8> {
    format!("data: {payload}\n\n").into_bytes()
}

pub fn unauthorized() -> ChatApiError {
    ChatApiError::Status(StatusCode::UNAUTHORIZED, "Authentication required".to_owned())
}
