use std::pin::Pin;

use futures_util::{Stream, StreamExt};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, RequestBuilder, Response};

use crate::config::ChatApiConfig;
use crate::error::{parse_error_message, ChatApiError};
use crate::headers::{build_headers, RequestKind};
use crate::payload::{ClearSessionForm, HistoryQuery, HistoryResponse, SendMessageForm};
use crate::url::{clear_session_url, history_url, normalize_base_url, send_url};

/// Raw response body of a send request, delivered in arbitrary chunks.
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Vec<u8>, ChatApiError>> + Send>>;

#[derive(Debug)]
pub struct ChatApiClient {
    http: Client,
    config: ChatApiConfig,
}

impl ChatApiClient {
    pub fn new(config: ChatApiConfig) -> Result<Self, ChatApiError> {
        let base = normalize_base_url(&config.base_url);
        reqwest::Url::parse(&base).map_err(|_| ChatApiError::InvalidBaseUrl(base.clone()))?;

        let mut builder = Client::builder();
        if let Some(timeout) = config.connect_timeout {
            builder = builder.connect_timeout(timeout);
        }
        let http = builder.build().map_err(ChatApiError::from)?;
        Ok(Self { http, config })
    }

    pub fn config(&self) -> &ChatApiConfig {
        &self.config
    }

    pub fn build_headers(&self, kind: RequestKind) -> Result<HeaderMap, ChatApiError> {
        let headers = build_headers(&self.config, kind)?;
        let mut out = HeaderMap::new();
        for (key, value) in headers {
            out.insert(
                HeaderName::from_bytes(key.as_bytes()).map_err(|_| {
                    ChatApiError::InvalidHeader(format!("invalid header key: {key}"))
                })?,
                HeaderValue::from_str(&value).map_err(|_| {
                    ChatApiError::InvalidHeader(format!("invalid header value for {key}"))
                })?,
            );
        }
        Ok(out)
    }

    pub fn build_send_request(
        &self,
        form: &SendMessageForm,
    ) -> Result<RequestBuilder, ChatApiError> {
        validate_send_form(form)?;

        let mut payload = form.clone();
        payload.stream = true;
        Ok(self
            .http
            .post(send_url(&self.config.base_url))
            .headers(self.build_headers(RequestKind::Stream)?)
            .form(&payload))
    }

    pub fn build_history_request(
        &self,
        query: &HistoryQuery,
    ) -> Result<RequestBuilder, ChatApiError> {
        require_session_id(&query.session_id)?;

        Ok(self
            .http
            .get(history_url(&self.config.base_url))
            .headers(self.build_headers(RequestKind::Json)?)
            .query(query))
    }

    pub fn build_clear_session_request(
        &self,
        form: &ClearSessionForm,
    ) -> Result<RequestBuilder, ChatApiError> {
        require_session_id(&form.session_id)?;

        Ok(self
            .http
            .post(clear_session_url(&self.config.base_url))
            .headers(self.build_headers(RequestKind::Json)?)
            .form(form))
    }

    /// Sends a message and returns the response body as a chunk stream once
    /// a success status arrives. No read timeout is applied to the body.
    pub async fn open_stream(&self, form: &SendMessageForm) -> Result<ByteStream, ChatApiError> {
        let response = self.build_send_request(form)?.send().await?;
        let response = ensure_success(response).await?;
        tracing::debug!(status = %response.status(), "send stream opened");

        let bytes = response.bytes_stream().map(|chunk| {
            chunk
                .map(|bytes| bytes.to_vec())
                .map_err(|error| ChatApiError::StreamRead(error.to_string()))
        });
        Ok(Box::pin(bytes))
    }

    pub async fn fetch_history(
        &self,
        query: &HistoryQuery,
    ) -> Result<HistoryResponse, ChatApiError> {
        let response = self.build_history_request(query)?.send().await?;
        let response = ensure_success(response).await?;
        let body = response.text().await?;
        let history = serde_json::from_str::<HistoryResponse>(&body)?;
        tracing::debug!(
            messages = history.messages.len(),
            has_more = history.has_more,
            "history fetched"
        );
        Ok(history)
    }

    pub async fn clear_session(&self, form: &ClearSessionForm) -> Result<(), ChatApiError> {
        let response = self.build_clear_session_request(form)?.send().await?;
        ensure_success(response).await?;
        Ok(())
    }
}

async fn ensure_success(response: Response) -> Result<Response, ChatApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(ChatApiError::Status(status, parse_error_message(status, &body)))
}

fn validate_send_form(form: &SendMessageForm) -> Result<(), ChatApiError> {
    if form.message.trim().is_empty() {
        return Err(ChatApiError::InvalidRequest(
            "'message' must not be blank".to_owned(),
        ));
    }
    require_session_id(&form.session_id)
}

fn require_session_id(session_id: &str) -> Result<(), ChatApiError> {
    if session_id.trim().is_empty() {
        return Err(ChatApiError::InvalidRequest(
            "'session_id' must not be blank".to_owned(),
        ));
    }
    Ok(())
}
