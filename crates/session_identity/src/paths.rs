use std::path::{Path, PathBuf};

/// Key under which the active session id is persisted.
pub const STORAGE_KEY: &str = "healthmate_chat_session_id";

#[must_use]
pub fn sanitize_key_for_filename(key: &str) -> String {
    key.trim()
        .chars()
        .map(|c| match c {
            ':' | '/' | '\\' | ' ' | '.' => '-',
            _ => c,
        })
        .collect()
}

#[must_use]
pub fn record_file_name(key: &str) -> String {
    format!("{}.json", sanitize_key_for_filename(key))
}

#[must_use]
pub fn record_path(dir: &Path, key: &str) -> PathBuf {
    dir.join(record_file_name(key))
}

pub(crate) fn temp_record_path(dir: &Path, key: &str) -> PathBuf {
    dir.join(format!(
        ".{}.{}.tmp",
        sanitize_key_for_filename(key),
        uuid::Uuid::new_v4().simple()
    ))
}
