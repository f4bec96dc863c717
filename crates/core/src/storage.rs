//! Persistence for the session token and user name.
//!
//! [`KeyValueStore`] implementations report failures; [`SessionStorage`] sits on top and
//! downgrades every failure to a logged "nothing stored" outcome so callers never see them.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, error};

use crate::session::Session;

pub const TOKEN_KEY: &str = "authToken";
pub const USER_NAME_KEY: &str = "userName";

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("storage is unavailable")]
    Unavailable,
    #[error("storage I/O failed at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("storage contents are malformed: {0}")]
    Malformed(#[from] serde_json::Error),
}

pub trait KeyValueStore: Send + Sync {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove_item(&self, key: &str) -> Result<(), StorageError>;
    fn clear(&self) -> Result<(), StorageError>;
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for Arc<T> {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get_item(key)
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set_item(key, value)
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        (**self).remove_item(key)
    }

    fn clear(&self) -> Result<(), StorageError> {
        (**self).clear()
    }
}

/// Flat string map persisted as a JSON object in a single file.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: io::Error) -> StorageError {
        StorageError::Io {
            path: self.path.clone(),
            source,
        }
    }

    fn read_map(&self) -> Result<BTreeMap<String, String>, StorageError> {
        match fs::read_to_string(&self.path) {
            Ok(contents) if contents.trim().is_empty() => Ok(BTreeMap::new()),
            Ok(contents) => Ok(serde_json::from_str(&contents)?),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(err) => Err(self.io_error(err)),
        }
    }

    fn write_map(&self, map: &BTreeMap<String, String>) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|err| self.io_error(err))?;
        }
        let contents = serde_json::to_string_pretty(map)?;
        fs::write(&self.path, contents).map_err(|err| self.io_error(err))
    }
}

impl KeyValueStore for FileStore {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.read_map()?.remove(key))
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut map = self.read_map()?;
        map.insert(key.to_string(), value.to_string());
        self.write_map(&map)
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        let mut map = self.read_map()?;
        if map.remove(key).is_some() {
            self.write_map(&map)?;
        }
        Ok(())
    }

    fn clear(&self) -> Result<(), StorageError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(self.io_error(err)),
        }
    }
}

/// In-process store. Can be switched into a failing mode to simulate unavailable storage.
#[derive(Debug, Default)]
pub struct MemoryStore {
    items: Mutex<BTreeMap<String, String>>,
    failing: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn is_empty(&self) -> bool {
        self.items.lock().is_empty()
    }

    fn check(&self) -> Result<(), StorageError> {
        if self.failing.load(Ordering::SeqCst) {
            Err(StorageError::Unavailable)
        } else {
            Ok(())
        }
    }
}

impl KeyValueStore for MemoryStore {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.check()?;
        Ok(self.items.lock().get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.check()?;
        self.items.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        self.check()?;
        self.items.lock().remove(key);
        Ok(())
    }

    fn clear(&self) -> Result<(), StorageError> {
        self.check()?;
        self.items.lock().clear();
        Ok(())
    }
}

/// Session persistence boundary. Failures are logged and never propagated.
pub struct SessionStorage {
    store: Box<dyn KeyValueStore>,
}

impl SessionStorage {
    pub fn new(store: impl KeyValueStore + 'static) -> Self {
        Self {
            store: Box::new(store),
        }
    }

    pub fn save_token(&self, token: &str) -> bool {
        match self.store.set_item(TOKEN_KEY, token) {
            Ok(()) => true,
            Err(err) => {
                error!(error = %err, "failed to save token");
                false
            }
        }
    }

    pub fn get_token(&self) -> Option<String> {
        match self.store.get_item(TOKEN_KEY) {
            Ok(token) => token.filter(|t| !t.is_empty()),
            Err(err) => {
                error!(error = %err, "failed to get token");
                None
            }
        }
    }

    pub fn remove_token(&self) -> bool {
        match self.store.remove_item(TOKEN_KEY) {
            Ok(()) => true,
            Err(err) => {
                error!(error = %err, "failed to remove token");
                false
            }
        }
    }

    /// Stored JSON-encoded, matching how the web client persisted it.
    pub fn save_user_name(&self, name: &str) -> bool {
        let encoded = match serde_json::to_string(name) {
            Ok(encoded) => encoded,
            Err(err) => {
                error!(error = %err, "failed to encode user name");
                return false;
            }
        };
        match self.store.set_item(USER_NAME_KEY, &encoded) {
            Ok(()) => true,
            Err(err) => {
                error!(error = %err, "failed to save user name");
                false
            }
        }
    }

    pub fn get_user_name(&self) -> Option<String> {
        let raw = match self.store.get_item(USER_NAME_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(err) => {
                error!(error = %err, "failed to get user name");
                return None;
            }
        };
        match serde_json::from_str::<String>(&raw) {
            Ok(name) if !name.is_empty() => Some(name),
            Ok(_) => None,
            Err(err) => {
                error!(error = %err, "stored user name is malformed");
                None
            }
        }
    }

    pub fn remove_user_name(&self) -> bool {
        match self.store.remove_item(USER_NAME_KEY) {
            Ok(()) => true,
            Err(err) => {
                error!(error = %err, "failed to remove user name");
                false
            }
        }
    }

    pub fn clear_all(&self) -> bool {
        match self.store.clear() {
            Ok(()) => true,
            Err(err) => {
                error!(error = %err, "failed to clear storage");
                false
            }
        }
    }

    /// A persisted session exists only when both the token and the user name are present.
    pub fn load_session(&self) -> Option<Session> {
        let token = self.get_token()?;
        let user_name = self.get_user_name()?;
        debug!("restored persisted session");
        Some(Session { token, user_name })
    }

    pub fn save_session(&self, session: &Session) -> bool {
        let saved_token = self.save_token(&session.token);
        let saved_name = self.save_user_name(&session.user_name);
        saved_token && saved_name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn file_storage() -> (SessionStorage, PathBuf, TempDir) {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("nested").join("session.json");
        (SessionStorage::new(FileStore::new(&path)), path, dir)
    }

    #[test]
    fn file_store_round_trips_session() {
        let (storage, path, _guard) = file_storage();
        assert_eq!(storage.load_session(), None);

        let session = Session {
            token: "tok-1".into(),
            user_name: "Ada".into(),
        };
        assert!(storage.save_session(&session));
        assert!(path.exists());
        assert_eq!(storage.load_session(), Some(session));

        let raw = fs::read_to_string(&path).unwrap();
        assert!(raw.contains("\"userName\": \"\\\"Ada\\\"\""));
    }

    #[test]
    fn session_requires_both_values() {
        let (storage, _path, _guard) = file_storage();
        assert!(storage.save_token("tok"));
        assert_eq!(storage.load_session(), None);
        assert!(storage.remove_token());
        assert!(storage.save_user_name("Ada"));
        assert_eq!(storage.load_session(), None);
    }

    #[test]
    fn clear_all_removes_everything() {
        let (storage, path, _guard) = file_storage();
        storage.save_token("tok");
        storage.save_user_name("Ada");
        assert!(storage.clear_all());
        assert!(!path.exists());
        assert_eq!(storage.get_token(), None);
        assert!(storage.clear_all());
    }

    #[test]
    fn malformed_file_degrades_to_nothing_stored() {
        let (storage, path, _guard) = file_storage();
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "{not json").unwrap();
        assert_eq!(storage.get_token(), None);
        assert_eq!(storage.load_session(), None);
        assert!(!storage.save_token("tok"));
    }

    #[test]
    fn unavailable_store_never_panics() {
        let store = Arc::new(MemoryStore::new());
        let storage = SessionStorage::new(store.clone());
        assert!(storage.save_token("tok"));
        assert!(storage.save_user_name("Ada"));

        store.set_failing(true);
        assert_eq!(storage.load_session(), None);
        assert!(!storage.save_token("other"));
        assert!(!storage.clear_all());

        store.set_failing(false);
        assert_eq!(storage.get_token().as_deref(), Some("tok"));
    }

    #[test]
    fn removing_one_value_leaves_the_other() {
        let (storage, _path, _guard) = file_storage();
        storage.save_session(&Session {
            token: "tok".into(),
            user_name: "Ada".into(),
        });

        assert!(storage.remove_user_name());
        assert_eq!(storage.get_user_name(), None);
        assert_eq!(storage.get_token().as_deref(), Some("tok"));
        assert_eq!(storage.load_session(), None);
        assert!(storage.remove_user_name());
    }

    #[test]
    fn user_name_with_bad_encoding_is_ignored() {
        let store = Arc::new(MemoryStore::new());
        store.set_item(USER_NAME_KEY, "Ada").unwrap();
        let storage = SessionStorage::new(store);
        assert_eq!(storage.get_user_name(), None);
    }
}
