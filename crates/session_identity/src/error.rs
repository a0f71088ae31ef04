use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SessionIdentityError {
    #[error("I/O error while {operation} at {path}: {source}")]
    Io {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse session record at {path}: {source}")]
    RecordParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("session record at {path} has unsupported version {found}; expected 1")]
    UnsupportedVersion { path: PathBuf, found: u32 },

    #[error("failed to serialize session record for {path}: {source}")]
    RecordSerialize {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("storage key must not be blank")]
    BlankKey,

    #[error("failed to format current UTC timestamp as RFC3339: {0}")]
    ClockFormat(#[source] time::error::Format),
}

impl SessionIdentityError {
    /// The stored record exists but cannot be used. Callers may overwrite it.
    #[must_use]
    pub fn is_unreadable_record(&self) -> bool {
        matches!(
            self,
            Self::RecordParse { .. } | Self::UnsupportedVersion { .. }
        )
    }

    #[must_use]
    pub fn io(operation: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            operation,
            path: path.into(),
            source,
        }
    }

    #[must_use]
    pub fn record_parse(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        Self::RecordParse {
            path: path.into(),
            source,
        }
    }

    #[must_use]
    pub fn record_serialize(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        Self::RecordSerialize {
            path: path.into(),
            source,
        }
    }
}
