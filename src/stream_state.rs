use chat_api::ProtocolEvent;

use crate::message::Message;
use crate::scroll::ScrollAction;
use crate::transcript::Transcript;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Completed,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamState {
    Idle,
    AwaitingFirstChunk,
    Streaming,
    Settled(Outcome),
}

/// UI-visible effect of one step of the machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamSignal {
    ThinkingShown,
    /// First chunk: the placeholder was replaced by live text.
    LiveTextShown,
    TextAppended,
    Committed,
    /// Completed without any text; nothing was committed.
    CompletedEmpty,
    Failed { description: String },
    /// Observability-only event; no state or transcript change.
    Acknowledged,
    /// Event arrived in a state where it has no meaning.
    Ignored,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub signal: StreamSignal,
    pub scroll: ScrollAction,
}

impl Transition {
    fn new(signal: StreamSignal, scroll: ScrollAction) -> Self {
        Self { signal, scroll }
    }

    fn quiet(signal: StreamSignal) -> Self {
        Self::new(signal, ScrollAction::Preserve)
    }
}

/// Drives one send from the thinking placeholder to a settled outcome.
///
/// One instance per send. `Settled` is absorbing: every later event is
/// ignored, so chunks after `complete` or `error` never reach the transcript.
#[derive(Debug, Clone)]
pub struct StreamingStateMachine {
    state: StreamState,
}

impl Default for StreamingStateMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl StreamingStateMachine {
    pub fn new() -> Self {
        Self {
            state: StreamState::Idle,
        }
    }

    pub fn state(&self) -> StreamState {
        self.state
    }

    pub fn is_settled(&self) -> bool {
        matches!(self.state, StreamState::Settled(_))
    }

    pub fn outcome(&self) -> Option<Outcome> {
        match self.state {
            StreamState::Settled(outcome) => Some(outcome),
            _ => None,
        }
    }

    /// Send initiated: open the pending entry with its thinking placeholder.
    pub fn begin(&mut self, transcript: &mut Transcript) -> Transition {
        if self.state != StreamState::Idle {
            tracing::warn!(state = ?self.state, "send already started on this stream");
            return Transition::quiet(StreamSignal::Ignored);
        }

        self.state = StreamState::AwaitingFirstChunk;
        let scroll = transcript.begin_pending();
        Transition::new(StreamSignal::ThinkingShown, scroll)
    }

    pub fn apply(&mut self, event: &ProtocolEvent, transcript: &mut Transcript) -> Transition {
        if self.is_settled() {
            tracing::debug!(kind = event.kind(), "event after settlement ignored");
            return Transition::quiet(StreamSignal::Ignored);
        }

        match event {
            ProtocolEvent::Chunk { text } => self.on_chunk(text, transcript),
            ProtocolEvent::Complete => self.on_complete(transcript),
            ProtocolEvent::Error { message } => self.settle_failed(message.clone(), transcript),
            ProtocolEvent::Unknown { event_type, .. } => {
                tracing::debug!(?event_type, "unrecognised event acknowledged");
                Transition::quiet(StreamSignal::Acknowledged)
            }
            other => {
                tracing::debug!(kind = other.kind(), "event acknowledged");
                Transition::quiet(StreamSignal::Acknowledged)
            }
        }
    }

    /// Settles the machine as failed from outside the event stream: network
    /// or decoder failure, or a stream that ended without a terminal event.
    pub fn fail_transport(
        &mut self,
        description: impl Into<String>,
        transcript: &mut Transcript,
    ) -> Transition {
        if self.is_settled() {
            return Transition::quiet(StreamSignal::Ignored);
        }
        self.settle_failed(description.into(), transcript)
    }

    fn on_chunk(&mut self, text: &str, transcript: &mut Transcript) -> Transition {
        match self.state {
            StreamState::AwaitingFirstChunk => {
                self.state = StreamState::Streaming;
                transcript.show_live_text();
                let scroll = transcript.append_pending_text(text);
                Transition::new(StreamSignal::LiveTextShown, scroll)
            }
            StreamState::Streaming => {
                let scroll = transcript.append_pending_text(text);
                Transition::new(StreamSignal::TextAppended, scroll)
            }
            StreamState::Idle | StreamState::Settled(_) => {
                tracing::warn!(state = ?self.state, "chunk outside of a send ignored");
                Transition::quiet(StreamSignal::Ignored)
            }
        }
    }

    fn on_complete(&mut self, transcript: &mut Transcript) -> Transition {
        if self.state == StreamState::Idle {
            tracing::warn!("complete before send ignored");
            return Transition::quiet(StreamSignal::Ignored);
        }

        self.state = StreamState::Settled(Outcome::Completed);
        match transcript.commit_pending() {
            Some(scroll) => Transition::new(StreamSignal::Committed, scroll),
            None => {
                tracing::debug!("stream completed without content");
                Transition::quiet(StreamSignal::CompletedEmpty)
            }
        }
    }

    fn settle_failed(&mut self, description: String, transcript: &mut Transcript) -> Transition {
        self.state = StreamState::Settled(Outcome::Failed);
        if let Some(partial) = transcript.discard_pending() {
            tracing::debug!(discarded = partial.len(), "pending text discarded");
        }
        let scroll = transcript.append(Message::error(description.clone()));
        Transition::new(StreamSignal::Failed { description }, scroll)
    }
}
