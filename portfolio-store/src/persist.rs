//! Key-value blob storage standing in for browser local storage.

use serde::{Serialize, de::DeserializeOwned};
use std::{
    collections::HashMap,
    fmt::Debug,
    fs, io,
    path::PathBuf,
    sync::{Mutex, PoisonError},
};
use thiserror::Error;
use tracing::debug;

pub type Result<T, E = PersistError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("Invalid storage key: {0:?}")]
    InvalidKey(String),
    #[error("Storage I/O failed: {0}")]
    Io(#[from] io::Error),
    #[error("Stored value could not be (de)serialized: {0}")]
    Json(#[from] serde_json::Error),
}

pub trait KeyValueStore: Send + Sync + Debug {
    fn get(&self, key: &str) -> Result<Option<String>>;

    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Removing a missing key is not an error.
    fn remove(&self, key: &str) -> Result<()>;
}

pub fn load<T: DeserializeOwned>(store: &dyn KeyValueStore, key: &str) -> Result<Option<T>> {
    store
        .get(key)?
        .map(|raw| serde_json::from_str(&raw))
        .transpose()
        .map_err(PersistError::from)
}

pub fn save<T: Serialize>(store: &dyn KeyValueStore, key: &str, value: &T) -> Result<()> {
    store.set(key, &serde_json::to_string(value)?)
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.entries().insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.entries().remove(key);
        Ok(())
    }
}

/// One `<key>.json` file per key inside a directory.
#[derive(Clone, Eq, PartialEq, Debug, Hash)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        debug!(dir = %dir.display(), "Opened file store");
        Ok(Self { dir })
    }

    fn path(&self, key: &str) -> Result<PathBuf> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(PersistError::InvalidKey(key.to_owned()));
        }

        Ok(self.dir.join(format!("{key}.json")))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        match fs::read_to_string(self.path(key)?) {
            Ok(value) => Ok(Some(value)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let path = self.path(key)?;
        let staging = path.with_extension("json.tmp");
        fs::write(&staging, value)?;
        fs::rename(&staging, &path)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        match fs::remove_file(self.path(key)?) {
            Err(err) if err.kind() != io::ErrorKind::NotFound => Err(err.into()),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use crate::persist::{FileStore, KeyValueStore, MemoryStore, PersistError, Result, load, save};
    use portfolio_common::model::user::Credentials;
    use std::{
        io,
        sync::atomic::{AtomicBool, Ordering},
    };

    /// A [`MemoryStore`] whose writes fail while `read_only` is set.
    #[derive(Debug, Default)]
    pub(crate) struct ReadOnlyStore {
        inner: MemoryStore,
        read_only: AtomicBool,
    }

    impl ReadOnlyStore {
        pub(crate) fn set_read_only(&self, read_only: bool) {
            self.read_only.store(read_only, Ordering::SeqCst);
        }

        fn check(&self) -> Result<()> {
            if self.read_only.load(Ordering::SeqCst) {
                Err(io::Error::other("storage is read-only").into())
            } else {
                Ok(())
            }
        }
    }

    impl KeyValueStore for ReadOnlyStore {
        fn get(&self, key: &str) -> Result<Option<String>> {
            self.inner.get(key)
        }

        fn set(&self, key: &str, value: &str) -> Result<()> {
            self.check()?;
            self.inner.set(key, value)
        }

        fn remove(&self, key: &str) -> Result<()> {
            self.check()?;
            self.inner.remove(key)
        }
    }

    fn exercise(store: &dyn KeyValueStore) {
        assert_eq!(store.get("auth-store").unwrap(), None);

        store.set("auth-store", "{}").unwrap();
        assert_eq!(store.get("auth-store").unwrap().as_deref(), Some("{}"));

        store.set("auth-store", "[]").unwrap();
        assert_eq!(store.get("auth-store").unwrap().as_deref(), Some("[]"));

        store.remove("auth-store").unwrap();
        store.remove("auth-store").unwrap();
        assert_eq!(store.get("auth-store").unwrap(), None);
    }

    #[test]
    fn memory_store() {
        exercise(&MemoryStore::new());
    }

    #[test]
    fn read_only_store_rejects_writes() {
        let store = ReadOnlyStore::default();
        exercise(&store);

        store.set("auth-store", "{}").unwrap();
        store.set_read_only(true);
        assert!(matches!(store.set("auth-store", "[]"), Err(PersistError::Io(_))));
        assert!(matches!(store.remove("auth-store"), Err(PersistError::Io(_))));
        assert_eq!(store.get("auth-store").unwrap().as_deref(), Some("{}"));
    }

    #[test]
    fn file_store() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path().join("nested")).unwrap();

        exercise(&store);
    }

    #[test]
    fn file_store_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let credentials = Credentials {
            email: "teacher@school.com".to_owned(),
            password: "password123".to_owned(),
        };

        save(&FileStore::open(dir.path()).unwrap(), "rememberedCredentials", &credentials).unwrap();

        let reopened = FileStore::open(dir.path()).unwrap();
        assert_eq!(
            load::<Credentials>(&reopened, "rememberedCredentials").unwrap(),
            Some(credentials)
        );
    }

    #[test]
    fn file_store_rejects_path_like_keys() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path()).unwrap();

        assert!(matches!(
            store.set("../escape", "x"),
            Err(PersistError::InvalidKey(_))
        ));
        assert!(matches!(store.get(""), Err(PersistError::InvalidKey(_))));
    }

    #[test]
    fn load_reports_corrupt_values() {
        let store = MemoryStore::new();
        store.set("rememberedCredentials", "not json").unwrap();

        assert!(matches!(
            load::<Credentials>(&store, "rememberedCredentials"),
            Err(PersistError::Json(_))
        ));
    }
}
