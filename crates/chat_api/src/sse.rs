use std::collections::VecDeque;

use futures_util::stream::{self, Stream, StreamExt};
use serde_json::Value;

use crate::error::ChatApiError;
use crate::events::ProtocolEvent;

/// Prefix marking an event line in the send stream.
pub const EVENT_LINE_PREFIX: &str = "data:";

/// Incremental decoder for `data:` event lines.
///
/// Bytes may arrive split at any position, including inside a multi-byte
/// UTF-8 sequence or inside a line. Incomplete trailing bytes and the
/// unterminated last line are held until more input arrives.
#[derive(Debug, Default)]
pub struct StreamDecoder {
    buffer: String,
    pending_bytes: Vec<u8>,
}

impl StreamDecoder {
    /// Feed arbitrary bytes into the decoder and drain complete events.
    pub fn feed(&mut self, bytes: &[u8]) -> Vec<ProtocolEvent> {
        self.push_utf8(bytes);
        let mut events = Vec::new();

        while let Some(newline) = self.buffer.find('\n') {
            let line: String = self.buffer.drain(..=newline).collect();
            if let Some(event) = parse_line(line.trim_end_matches(['\n', '\r'])) {
                events.push(event);
            }
        }

        events
    }

    /// Ends the input. Residual bytes that never formed a complete line are
    /// dropped; the number of dropped bytes is returned.
    pub fn finish(&mut self) -> usize {
        let discarded = self.buffer.len() + self.pending_bytes.len();
        if discarded > 0 {
            tracing::debug!(discarded, "discarding unterminated trailing stream content");
        }
        self.buffer.clear();
        self.pending_bytes.clear();
        discarded
    }

    /// Decode a complete payload string in one shot.
    pub fn decode_all(input: &[u8]) -> Vec<ProtocolEvent> {
        let mut decoder = Self::default();
        let events = decoder.feed(input);
        decoder.finish();
        events
    }

    pub fn is_empty_buffer(&self) -> bool {
        self.buffer.is_empty() && self.pending_bytes.is_empty()
    }

    fn push_utf8(&mut self, bytes: &[u8]) {
        self.pending_bytes.extend_from_slice(bytes);

        loop {
            match std::str::from_utf8(&self.pending_bytes) {
                Ok(text) => {
                    self.buffer.push_str(text);
                    self.pending_bytes.clear();
                    return;
                }
                Err(error) => {
                    let valid = error.valid_up_to();
                    self.buffer
                        .push_str(&String::from_utf8_lossy(&self.pending_bytes[..valid]));
                    match error.error_len() {
                        // Incomplete sequence at the end: wait for more bytes.
                        None => {
                            self.pending_bytes.drain(..valid);
                            return;
                        }
                        Some(invalid) => {
                            self.buffer.push(char::REPLACEMENT_CHARACTER);
                            self.pending_bytes.drain(..valid + invalid);
                        }
                    }
                }
            }
        }
    }
}

fn parse_line(line: &str) -> Option<ProtocolEvent> {
    let payload = line.strip_prefix(EVENT_LINE_PREFIX)?.trim();
    if payload.is_empty() || payload == "[DONE]" {
        return None;
    }

    match serde_json::from_str::<Value>(payload) {
        Ok(value) => {
            let event = ProtocolEvent::from_payload(&value, payload);
            if let ProtocolEvent::Unknown { event_type, .. } = &event {
                tracing::debug!(?event_type, "ignoring unrecognised stream event");
            }
            Some(event)
        }
        Err(error) => {
            tracing::warn!(%error, payload, "malformed stream event payload");
            Some(ProtocolEvent::Unknown {
                event_type: None,
                raw: payload.to_owned(),
            })
        }
    }
}

struct DecodeState<S> {
    bytes: S,
    decoder: StreamDecoder,
    ready: VecDeque<ProtocolEvent>,
    done: bool,
}

/// Adapts a chunked byte stream into a lazy stream of protocol events.
///
/// A read failure is yielded once as `Err` after any events decoded before
/// it, and then the stream ends.
pub fn decode_stream<S>(bytes: S) -> impl Stream<Item = Result<ProtocolEvent, ChatApiError>>
where
    S: Stream<Item = Result<Vec<u8>, ChatApiError>> + Unpin,
{
    let state = DecodeState {
        bytes,
        decoder: StreamDecoder::default(),
        ready: VecDeque::new(),
        done: false,
    };

    stream::unfold(state, |mut state| async move {
        loop {
            if let Some(event) = state.ready.pop_front() {
                return Some((Ok(event), state));
            }
            if state.done {
                return None;
            }

            match state.bytes.next().await {
                Some(Ok(chunk)) => {
                    let events = state.decoder.feed(&chunk);
                    state.ready.extend(events);
                }
                Some(Err(error)) => {
                    state.done = true;
                    state.decoder.finish();
                    return Some((Err(error), state));
                }
                None => {
                    state.done = true;
                    state.decoder.finish();
                }
            }
        }
    })
}
