use std::pin::Pin;

use chat_api::{
    decode_stream, ChatApiClient, ChatApiError, ClearSessionForm, HistoryQuery, HistoryResponse,
    ProtocolEvent, SendMessageForm,
};
use futures_util::Stream;
use session_identity::ClearNotifier;

/// Decoded events of one send, in arrival order. A read failure is yielded
/// once as `Err` and ends the stream.
pub type EventStream = Pin<Box<dyn Stream<Item = Result<ProtocolEvent, ChatApiError>>>>;

/// Network seam of the orchestrator.
#[allow(async_fn_in_trait)]
pub trait ChatTransport {
    async fn fetch_history(&self, session_id: &str) -> Result<HistoryResponse, ChatApiError>;

    /// Resolves once response headers arrive. Non-success statuses fail here,
    /// before any event is produced.
    async fn send(&self, form: SendMessageForm) -> Result<EventStream, ChatApiError>;

    async fn clear_session(&self, session_id: &str) -> Result<(), ChatApiError>;
}

/// [`ChatTransport`] over the HTTP client.
#[derive(Debug)]
pub struct HttpTransport {
    client: ChatApiClient,
    history_limit: Option<u32>,
}

impl HttpTransport {
    pub fn new(client: ChatApiClient) -> Self {
        Self {
            client,
            history_limit: None,
        }
    }

    pub fn with_history_limit(mut self, limit: u32) -> Self {
        self.history_limit = Some(limit);
        self
    }

    pub fn client(&self) -> &ChatApiClient {
        &self.client
    }
}

impl ChatTransport for HttpTransport {
    async fn fetch_history(&self, session_id: &str) -> Result<HistoryResponse, ChatApiError> {
        let mut query = HistoryQuery::new(session_id);
        if let Some(limit) = self.history_limit {
            query = query.with_limit(limit);
        }

        let history = self.client.fetch_history(&query).await?;
        if history.has_more {
            tracing::info!(
                shown = history.messages.len(),
                total = ?history.total_count,
                "history truncated to the most recent messages"
            );
        }
        Ok(history)
    }

    async fn send(&self, form: SendMessageForm) -> Result<EventStream, ChatApiError> {
        let bytes = self.client.open_stream(&form).await?;
        Ok(Box::pin(decode_stream(bytes)))
    }

    async fn clear_session(&self, session_id: &str) -> Result<(), ChatApiError> {
        self.client
            .clear_session(&ClearSessionForm {
                session_id: session_id.to_owned(),
            })
            .await
    }
}

/// Lets identity resets notify the server through any transport.
#[derive(Debug)]
pub struct TransportNotifier<'a, T> {
    transport: &'a T,
}

impl<'a, T: ChatTransport> TransportNotifier<'a, T> {
    pub fn new(transport: &'a T) -> Self {
        Self { transport }
    }
}

impl<T: ChatTransport> ClearNotifier for TransportNotifier<'_, T> {
    type Error = ChatApiError;

    async fn clear_session(&self, session_id: &str) -> Result<(), Self::Error> {
        self.transport.clear_session(session_id).await
    }
}
