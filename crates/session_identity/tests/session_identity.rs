use std::cell::RefCell;
use std::fs;

use session_identity::{
    record_path, ClearNotifier, FileSessionStorage, MemorySessionStorage, SessionIdentity,
    SessionIdentityError, SessionStorage, StoredRecord, MIN_SESSION_ID_LEN, STORAGE_KEY,
};
use tempfile::TempDir;

#[derive(Default)]
struct RecordingNotifier {
    fail: bool,
    cleared: RefCell<Vec<String>>,
}

impl ClearNotifier for RecordingNotifier {
    type Error = String;

    async fn clear_session(&self, session_id: &str) -> Result<(), Self::Error> {
        self.cleared.borrow_mut().push(session_id.to_owned());
        if self.fail {
            Err("server unavailable".to_owned())
        } else {
            Ok(())
        }
    }
}

fn file_storage() -> (TempDir, FileSessionStorage) {
    let dir = tempfile::tempdir().expect("tempdir should be created");
    let storage = FileSessionStorage::new(dir.path().join("origin"));
    (dir, storage)
}

#[test]
fn resolve_is_idempotent_and_meets_minimum_length() {
    let identity = SessionIdentity::new(MemorySessionStorage::new());

    let first = identity.resolve().expect("resolve");
    let second = identity.resolve().expect("resolve again");

    assert_eq!(first, second);
    assert!(first.len() >= MIN_SESSION_ID_LEN);
    assert!(!identity.is_freshly_created());
}

#[test]
fn contexts_over_one_origin_observe_the_same_id() {
    let origin = MemorySessionStorage::new();
    let first_context = SessionIdentity::new(origin.clone());
    let second_context = SessionIdentity::new(origin.clone());

    let id = first_context.resolve().expect("resolve");
    assert_eq!(second_context.resolve().expect("resolve"), id);
}

#[test]
fn malformed_stored_value_is_replaced() {
    let origin = MemorySessionStorage::new();
    origin.write(STORAGE_KEY, "too-short").expect("seed");

    let identity = SessionIdentity::new(origin.clone());
    assert_eq!(identity.current().expect("current"), None);

    let id = identity.resolve().expect("resolve");
    assert_ne!(id, "too-short");
    assert_eq!(origin.read(STORAGE_KEY).expect("read"), Some(id));
}

#[test]
fn server_generated_id_is_accepted_as_is() {
    let origin = MemorySessionStorage::new();
    let server_id = "healthmate-chat-0123456789abcdef0123456789abcdef";
    origin.write(STORAGE_KEY, server_id).expect("seed");

    let identity = SessionIdentity::new(origin);
    assert_eq!(identity.resolve().expect("resolve"), server_id);
}

#[test]
fn reset_returns_discarded_id_and_next_resolve_differs() {
    let mut identity = SessionIdentity::new(MemorySessionStorage::new());
    let original = identity.resolve().expect("resolve");

    let discarded = identity.reset().expect("reset");
    assert_eq!(discarded.as_deref(), Some(original.as_str()));
    assert_eq!(identity.current().expect("current"), None);

    let next = identity.resolve().expect("resolve");
    assert_ne!(next, original);
}

#[test]
fn start_new_sets_one_shot_fresh_flag() {
    let mut identity = SessionIdentity::new(MemorySessionStorage::new());
    let original = identity.resolve().expect("resolve");

    let fresh = identity.start_new().expect("start new");
    assert_ne!(fresh, original);
    assert!(identity.is_freshly_created());
    assert_eq!(identity.resolve().expect("resolve"), fresh);

    identity.clear_fresh_flag();
    assert!(!identity.is_freshly_created());
}

#[test]
fn fresh_flag_is_local_to_one_context() {
    let origin = MemorySessionStorage::new();
    let mut first_context = SessionIdentity::new(origin.clone());
    let second_context = SessionIdentity::new(origin);

    let fresh = first_context.start_new().expect("start new");

    assert!(first_context.is_freshly_created());
    assert!(!second_context.is_freshly_created());
    assert_eq!(second_context.resolve().expect("resolve"), fresh);
}

#[tokio::test]
async fn reset_and_notify_clears_discarded_id_on_server() {
    let mut identity = SessionIdentity::new(MemorySessionStorage::new());
    let original = identity.resolve().expect("resolve");
    let notifier = RecordingNotifier::default();

    let discarded = identity
        .reset_and_notify(&notifier)
        .await
        .expect("reset");

    assert_eq!(discarded, Some(original.clone()));
    assert_eq!(*notifier.cleared.borrow(), vec![original]);
}

#[tokio::test]
async fn notification_failure_does_not_block_local_reset() {
    let mut identity = SessionIdentity::new(MemorySessionStorage::new());
    let original = identity.resolve().expect("resolve");
    let notifier = RecordingNotifier {
        fail: true,
        ..RecordingNotifier::default()
    };

    let fresh = identity
        .start_new_and_notify(&notifier)
        .await
        .expect("start new despite notifier failure");

    assert_ne!(fresh, original);
    assert!(identity.is_freshly_created());
    assert_eq!(notifier.cleared.borrow().len(), 1);
}

#[tokio::test]
async fn nothing_is_notified_when_no_id_was_persisted() {
    let mut identity = SessionIdentity::new(MemorySessionStorage::new());
    let notifier = RecordingNotifier::default();

    let discarded = identity
        .reset_and_notify(&notifier)
        .await
        .expect("reset");

    assert_eq!(discarded, None);
    assert!(notifier.cleared.borrow().is_empty());
}

#[test]
fn file_storage_persists_across_identity_instances() {
    let (_dir, storage) = file_storage();

    let id = SessionIdentity::new(storage.clone())
        .resolve()
        .expect("resolve");
    let reopened = SessionIdentity::new(storage.clone())
        .resolve()
        .expect("resolve after reopen");
    assert_eq!(reopened, id);

    let path = record_path(storage.dir(), STORAGE_KEY);
    let record: StoredRecord =
        serde_json::from_str(&fs::read_to_string(&path).expect("record file")).expect("record");
    assert_eq!(record.version, 1);
    assert_eq!(record.key, STORAGE_KEY);
    assert_eq!(record.value, id);
}

#[test]
fn file_storage_leaves_no_temp_files_behind() {
    let (_dir, storage) = file_storage();
    let mut identity = SessionIdentity::new(storage.clone());

    identity.resolve().expect("resolve");
    identity.start_new().expect("start new");

    let names: Vec<String> = fs::read_dir(storage.dir())
        .expect("origin dir")
        .map(|entry| {
            entry
                .expect("dir entry")
                .file_name()
                .to_string_lossy()
                .into_owned()
        })
        .collect();
    assert_eq!(names, vec![format!("{STORAGE_KEY}.json")]);
}

#[test]
fn file_storage_remove_is_idempotent() {
    let (_dir, storage) = file_storage();
    storage.remove(STORAGE_KEY).expect("remove missing");

    storage.write(STORAGE_KEY, "value").expect("write");
    storage.remove(STORAGE_KEY).expect("remove");
    storage.remove(STORAGE_KEY).expect("remove again");
    assert_eq!(storage.read(STORAGE_KEY).expect("read"), None);
}

fn seed_corrupt_record(storage: &FileSessionStorage) {
    fs::create_dir_all(storage.dir()).expect("origin dir");
    fs::write(record_path(storage.dir(), STORAGE_KEY), "not json").expect("seed");
}

#[test]
fn corrupt_record_is_replaced_on_resolve() {
    let (_dir, storage) = file_storage();
    seed_corrupt_record(&storage);
    assert!(matches!(
        storage.read(STORAGE_KEY),
        Err(SessionIdentityError::RecordParse { .. })
    ));

    let identity = SessionIdentity::new(storage.clone());
    let id = identity.resolve().expect("resolve replaces corrupt record");

    assert!(id.len() >= MIN_SESSION_ID_LEN);
    assert_eq!(storage.read(STORAGE_KEY).expect("read").as_deref(), Some(id.as_str()));
    assert_eq!(identity.resolve().expect("resolve again"), id);
}

#[test]
fn corrupt_record_does_not_block_reset_or_start_new() {
    let (_dir, storage) = file_storage();
    seed_corrupt_record(&storage);
    let mut identity = SessionIdentity::new(storage.clone());

    assert_eq!(identity.reset().expect("reset succeeds locally"), None);
    assert_eq!(storage.read(STORAGE_KEY).expect("read"), None);

    seed_corrupt_record(&storage);
    let id = identity.start_new().expect("start new");
    assert!(identity.is_freshly_created());
    assert_eq!(storage.read(STORAGE_KEY).expect("read").as_deref(), Some(id.as_str()));
}

#[tokio::test]
async fn corrupt_record_reset_skips_server_notification() {
    let (_dir, storage) = file_storage();
    seed_corrupt_record(&storage);
    let mut identity = SessionIdentity::new(storage.clone());
    let notifier = RecordingNotifier::default();

    let id = identity
        .start_new_and_notify(&notifier)
        .await
        .expect("start new");

    assert!(notifier.cleared.borrow().is_empty());
    assert_eq!(identity.resolve().expect("resolve"), id);
}

#[test]
fn unsupported_record_version_is_rejected_then_replaced() {
    let (_dir, storage) = file_storage();
    fs::create_dir_all(storage.dir()).expect("origin dir");
    fs::write(
        record_path(storage.dir(), STORAGE_KEY),
        r#"{"version":2,"key":"healthmate_chat_session_id","value":"x","updated_at":"2026-01-01T00:00:00Z"}"#,
    )
    .expect("seed");

    let error = storage.read(STORAGE_KEY).expect_err("v2 must fail");
    assert!(matches!(
        error,
        SessionIdentityError::UnsupportedVersion { found: 2, .. }
    ));

    let id = SessionIdentity::new(storage.clone())
        .resolve()
        .expect("resolve overwrites v2 record");
    assert_eq!(storage.read(STORAGE_KEY).expect("read").as_deref(), Some(id.as_str()));
}
