mod error;
mod identity;
mod paths;
mod schema;
mod storage;

pub use error::SessionIdentityError;
pub use identity::{
    generate_session_id, is_well_formed, ClearNotifier, SessionIdentity, MIN_SESSION_ID_LEN,
};
pub use paths::{record_file_name, record_path, STORAGE_KEY};
pub use schema::{StoredRecord, RECORD_VERSION};
pub use storage::{FileSessionStorage, MemorySessionStorage, SessionStorage};
