use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

use crate::error::SessionIdentityError;
use crate::paths::{record_path, temp_record_path};
use crate::schema::{StoredRecord, RECORD_VERSION};

/// A storage origin: one string value per key, shared by every client
/// context opened over the same origin.
pub trait SessionStorage {
    fn read(&self, key: &str) -> Result<Option<String>, SessionIdentityError>;
    fn write(&self, key: &str, value: &str) -> Result<(), SessionIdentityError>;
    fn remove(&self, key: &str) -> Result<(), SessionIdentityError>;
}

impl<T: SessionStorage + ?Sized> SessionStorage for &T {
    fn read(&self, key: &str) -> Result<Option<String>, SessionIdentityError> {
        (**self).read(key)
    }

    fn write(&self, key: &str, value: &str) -> Result<(), SessionIdentityError> {
        (**self).write(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), SessionIdentityError> {
        (**self).remove(key)
    }
}

/// Directory-backed origin. Each key is a small JSON record replaced
/// atomically through a temp file and a rename.
#[derive(Debug, Clone)]
pub struct FileSessionStorage {
    dir: PathBuf,
}

impl FileSessionStorage {
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl SessionStorage for FileSessionStorage {
    fn read(&self, key: &str) -> Result<Option<String>, SessionIdentityError> {
        require_key(key)?;
        let path = record_path(&self.dir, key);
        let text = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(error) if error.kind() == ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(SessionIdentityError::io("reading session record", path, source))
            }
        };

        let record: StoredRecord = serde_json::from_str(&text)
            .map_err(|source| SessionIdentityError::record_parse(&path, source))?;
        if record.version != RECORD_VERSION {
            return Err(SessionIdentityError::UnsupportedVersion {
                path,
                found: record.version,
            });
        }

        Ok(Some(record.value))
    }

    fn write(&self, key: &str, value: &str) -> Result<(), SessionIdentityError> {
        require_key(key)?;
        fs::create_dir_all(&self.dir).map_err(|source| {
            SessionIdentityError::io("creating storage directory", &self.dir, source)
        })?;

        let path = record_path(&self.dir, key);
        let record = StoredRecord::v1(key, value, now_rfc3339()?);
        let body = serde_json::to_string(&record)
            .map_err(|source| SessionIdentityError::record_serialize(&path, source))?;

        let temp = temp_record_path(&self.dir, key);
        fs::write(&temp, body)
            .map_err(|source| SessionIdentityError::io("writing session record", &temp, source))?;
        if let Err(source) = fs::rename(&temp, &path) {
            let _ = fs::remove_file(&temp);
            return Err(SessionIdentityError::io(
                "replacing session record",
                path,
                source,
            ));
        }

        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), SessionIdentityError> {
        require_key(key)?;
        let path = record_path(&self.dir, key);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(error) if error.kind() == ErrorKind::NotFound => Ok(()),
            Err(source) => Err(SessionIdentityError::io(
                "removing session record",
                path,
                source,
            )),
        }
    }
}

/// In-memory origin. Clones share the same map, so several identities built
/// from clones behave like contexts over one origin.
#[derive(Debug, Clone, Default)]
pub struct MemorySessionStorage {
    entries: Arc<Mutex<HashMap<String, String>>>,
}

impl MemorySessionStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        lock_unpoisoned(&self.entries).len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl SessionStorage for MemorySessionStorage {
    fn read(&self, key: &str) -> Result<Option<String>, SessionIdentityError> {
        require_key(key)?;
        Ok(lock_unpoisoned(&self.entries).get(key).cloned())
    }

    fn write(&self, key: &str, value: &str) -> Result<(), SessionIdentityError> {
        require_key(key)?;
        lock_unpoisoned(&self.entries).insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), SessionIdentityError> {
        require_key(key)?;
        lock_unpoisoned(&self.entries).remove(key);
        Ok(())
    }
}

fn require_key(key: &str) -> Result<(), SessionIdentityError> {
    if key.trim().is_empty() {
        return Err(SessionIdentityError::BlankKey);
    }
    Ok(())
}

fn now_rfc3339() -> Result<String, SessionIdentityError> {
    OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .map_err(SessionIdentityError::ClockFormat)
}

fn lock_unpoisoned<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}
