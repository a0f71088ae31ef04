use serde::{Deserialize, Serialize};

pub const RECORD_VERSION: u32 = 1;

/// On-disk form of one persisted value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StoredRecord {
    pub version: u32,
    pub key: String,
    pub value: String,
    pub updated_at: String,
}

impl StoredRecord {
    #[must_use]
    pub fn v1(
        key: impl Into<String>,
        value: impl Into<String>,
        updated_at: impl Into<String>,
    ) -> Self {
        Self {
            version: RECORD_VERSION,
            key: key.into(),
            value: value.into(),
            updated_at: updated_at.into(),
        }
    }
}
