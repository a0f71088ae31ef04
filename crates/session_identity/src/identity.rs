use std::fmt::Display;

use time::OffsetDateTime;
use uuid::Uuid;

use crate::error::SessionIdentityError;
use crate::paths::STORAGE_KEY;
use crate::storage::SessionStorage;

/// Shortest id accepted from storage; shorter values are regenerated.
pub const MIN_SESSION_ID_LEN: usize = 33;

const ID_PREFIX: &str = "chat";
const SEGMENT_LEN: usize = 9;

/// Server-side counterpart of a local reset.
#[allow(async_fn_in_trait)]
pub trait ClearNotifier {
    type Error: Display;

    async fn clear_session(&self, session_id: &str) -> Result<(), Self::Error>;
}

/// One client context's view of the conversation id held by a storage
/// origin.
///
/// The id itself always lives in storage so that every context over the
/// same origin converges on it. The freshly-created flag is local to this
/// context.
#[derive(Debug)]
pub struct SessionIdentity<S> {
    storage: S,
    freshly_created: bool,
}

impl<S: SessionStorage> SessionIdentity<S> {
    #[must_use]
    pub fn new(storage: S) -> Self {
        Self {
            storage,
            freshly_created: false,
        }
    }

    #[must_use]
    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Persisted id, if one is present and well-formed. Never generates.
    pub fn current(&self) -> Result<Option<String>, SessionIdentityError> {
        Ok(self
            .storage
            .read(STORAGE_KEY)?
            .filter(|id| is_well_formed(id)))
    }

    /// Returns the persisted id, generating and persisting one when the
    /// stored value is missing or malformed.
    ///
    /// Two contexts may race to generate. Whatever storage holds after our
    /// write wins, so both converge on the last writer's id.
    ///
    /// A corrupt or unsupported record counts as missing and is overwritten.
    pub fn resolve(&self) -> Result<String, SessionIdentityError> {
        match self.current() {
            Ok(Some(id)) => return Ok(id),
            Ok(None) => {}
            Err(error) if error.is_unreadable_record() => {
                tracing::warn!(%error, "replacing unreadable session record");
            }
            Err(error) => return Err(error),
        }

        let generated = generate_session_id();
        self.storage.write(STORAGE_KEY, &generated)?;
        tracing::debug!(session_id = %generated, "generated session id");

        Ok(self.current()?.unwrap_or(generated))
    }

    /// Clears the persisted id locally and returns the discarded value.
    /// The record is removed even when it could not be read.
    pub fn reset(&mut self) -> Result<Option<String>, SessionIdentityError> {
        let previous = self.current().unwrap_or_else(|error| {
            tracing::warn!(%error, "discarding unreadable session record");
            None
        });
        self.storage.remove(STORAGE_KEY)?;
        self.freshly_created = false;
        Ok(previous)
    }

    /// [`Self::reset`], then tells the server to forget the discarded id.
    /// Notification failure is logged and does not undo the local reset.
    pub async fn reset_and_notify<N: ClearNotifier>(
        &mut self,
        notifier: &N,
    ) -> Result<Option<String>, SessionIdentityError> {
        let previous = self.reset()?;

        if let Some(id) = previous.as_deref() {
            match notifier.clear_session(id).await {
                Ok(()) => tracing::debug!(session_id = %id, "server session cleared"),
                Err(error) => {
                    tracing::warn!(session_id = %id, %error, "failed to clear server session")
                }
            }
        }

        Ok(previous)
    }

    /// Replaces the current id with a new one and marks it freshly created.
    pub fn start_new(&mut self) -> Result<String, SessionIdentityError> {
        self.reset()?;
        self.mark_fresh()
    }

    /// [`Self::start_new`] with best-effort server notification for the
    /// discarded id.
    pub async fn start_new_and_notify<N: ClearNotifier>(
        &mut self,
        notifier: &N,
    ) -> Result<String, SessionIdentityError> {
        self.reset_and_notify(notifier).await?;
        self.mark_fresh()
    }

    #[must_use]
    pub fn is_freshly_created(&self) -> bool {
        self.freshly_created
    }

    pub fn clear_fresh_flag(&mut self) {
        self.freshly_created = false;
    }

    fn mark_fresh(&mut self) -> Result<String, SessionIdentityError> {
        let id = self.resolve()?;
        self.freshly_created = true;
        tracing::info!(session_id = %id, "started new session");
        Ok(id)
    }
}

#[must_use]
pub fn is_well_formed(id: &str) -> bool {
    !id.trim().is_empty() && id.chars().count() >= MIN_SESSION_ID_LEN
}

/// `chat-<unix-ms>-<seg>-<seg>` with two independent random hex segments,
/// padded with random hex up to [`MIN_SESSION_ID_LEN`].
#[must_use]
pub fn generate_session_id() -> String {
    let millis = OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000;
    let mut id = format!(
        "{ID_PREFIX}-{millis}-{}-{}",
        random_hex(SEGMENT_LEN),
        random_hex(SEGMENT_LEN)
    );

    while id.len() < MIN_SESSION_ID_LEN {
        id.push_str(&random_hex(MIN_SESSION_ID_LEN - id.len()));
    }

    id
}

fn random_hex(len: usize) -> String {
    let mut out = String::with_capacity(len);
    while out.len() < len {
        let simple = Uuid::new_v4().simple().to_string();
        let take = (len - out.len()).min(simple.len());
        out.push_str(&simple[..take]);
    }
    out
}
