use std::fmt;

use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::Error as JsonError;

#[derive(Debug)]
pub enum ChatApiError {
    InvalidBaseUrl(String),
    InvalidHeader(String),
    InvalidRequest(String),
    /// Request could not be sent or the response headers never arrived.
    Request(reqwest::Error),
    /// Non-success HTTP status with a human-readable message.
    Status(StatusCode, String),
    /// The response body failed while chunks were being read.
    StreamRead(String),
    Serde(JsonError),
    Unknown(String),
}

impl ChatApiError {
    /// Authentication failures need re-login rather than retry.
    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Status(status, _) if *status == StatusCode::UNAUTHORIZED)
    }

    #[must_use]
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Status(status, _) => Some(*status),
            Self::Request(error) => error.status(),
            _ => None,
        }
    }
}

/// FastAPI-style error body: `{"detail": "..."}` or `{"error": {"message": "..."}}`.
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorPayload {
    pub detail: Option<String>,
    pub error: Option<ErrorPayloadField>,
    pub message: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum ErrorPayloadField {
    Text(String),
    Object { message: Option<String> },
}

impl ErrorPayload {
    fn message(self) -> Option<String> {
        let nested = self.error.and_then(|error| match error {
            ErrorPayloadField::Text(text) => Some(text),
            ErrorPayloadField::Object { message } => message,
        });

        self.detail
            .or(nested)
            .or(self.message)
            .filter(|message| !message.trim().is_empty())
    }
}

impl fmt::Display for ChatApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidBaseUrl(value) => write!(f, "invalid base URL: {value}"),
            Self::InvalidHeader(message) => write!(f, "invalid header: {message}"),
            Self::InvalidRequest(message) => write!(f, "invalid request: {message}"),
            Self::Request(error) => write!(f, "request error: {error}"),
            Self::Status(status, message) => write!(f, "HTTP {status} {message}"),
            Self::StreamRead(message) => write!(f, "stream read failure: {message}"),
            Self::Serde(error) => write!(f, "serialization error: {error}"),
            Self::Unknown(message) => write!(f, "{message}"),
        }
    }
}

impl std::error::Error for ChatApiError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Request(error) => Some(error),
            Self::Serde(error) => Some(error),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ChatApiError {
    fn from(error: reqwest::Error) -> Self {
        Self::Request(error)
    }
}

impl From<JsonError> for ChatApiError {
    fn from(error: JsonError) -> Self {
        Self::Serde(error)
    }
}

pub fn parse_error_message(status: StatusCode, body: &str) -> String {
    if let Some(message) = serde_json::from_str::<ErrorPayload>(body)
        .ok()
        .and_then(ErrorPayload::message)
    {
        return message;
    }

    if body.trim().is_empty() {
        status
            .canonical_reason()
            .unwrap_or("request failed")
            .to_string()
    } else {
        body.trim().to_string()
    }
}
