// src/storage/mod.rs
pub mod history;
pub mod projects;
pub mod requests;
pub mod settings;
pub mod transcript;

use std::{
    collections::HashMap,
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
    sync::Mutex,
    time::{SystemTime, UNIX_EPOCH},
};

use rand::Rng;
use serde::{Serialize, de::DeserializeOwned};
use thiserror::Error;
use tracing::error;

pub const CHAT_MESSAGES_KEY: &str = "chatMessages";
pub const REQUESTS_KEY: &str = "aiRequests";
pub const API_KEY_KEY: &str = "openaiApiKey";
pub const CHAT_HISTORY_KEY: &str = "chatHistory";
pub const PROJECTS_KEY: &str = "digitalServicesProjects";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage io error on {key}: {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid storage key: {0}")]
    InvalidKey(String),

    #[error("storage lock poisoned")]
    Poisoned,

    #[error("failed to (de)serialize {key}: {source}")]
    Serde {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Durable string key-value store, the same contract as browser local storage.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let guard = self.inner.lock().map_err(|_| StorageError::Poisoned)?;
        Ok(guard.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut guard = self.inner.lock().map_err(|_| StorageError::Poisoned)?;
        guard.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut guard = self.inner.lock().map_err(|_| StorageError::Poisoned)?;
        guard.remove(key);
        Ok(())
    }
}

/// One `<key>.json` file per key under a data directory.
#[derive(Debug)]
pub struct FileStore {
    dir: PathBuf,
    // serializes read-modify-write from concurrent handlers in this process
    lock: Mutex<()>,
}

impl FileStore {
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|source| StorageError::Io {
            key: dir.display().to_string(),
            source,
        })?;
        Ok(Self { dir, lock: Mutex::new(()) })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StorageError> {
        let valid = !key.is_empty()
            && key.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(StorageError::InvalidKey(key.to_string()));
        }
        Ok(self.dir.join(format!("{key}.json")))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.path_for(key)?;
        let _guard = self.lock.lock().map_err(|_| StorageError::Poisoned)?;
        match fs::read_to_string(&path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StorageError::Io { key: key.to_string(), source }),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        let _guard = self.lock.lock().map_err(|_| StorageError::Poisoned)?;
        // write-then-rename so a crash never leaves half a list behind
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, value)
            .and_then(|_| fs::rename(&tmp, &path))
            .map_err(|source| StorageError::Io { key: key.to_string(), source })
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        let _guard = self.lock.lock().map_err(|_| StorageError::Poisoned)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(source) => Err(StorageError::Io { key: key.to_string(), source }),
        }
    }
}

pub fn read_list<T: DeserializeOwned>(
    store: &dyn KeyValueStore,
    key: &str,
) -> Result<Vec<T>, StorageError> {
    match store.get(key)? {
        Some(raw) if !raw.trim().is_empty() => serde_json::from_str(&raw)
            .map_err(|source| StorageError::Serde { key: key.to_string(), source }),
        _ => Ok(Vec::new()),
    }
}

pub fn write_list<T: Serialize>(
    store: &dyn KeyValueStore,
    key: &str,
    items: &[T],
) -> Result<(), StorageError> {
    let raw = serde_json::to_string(items)
        .map_err(|source| StorageError::Serde { key: key.to_string(), source })?;
    store.set(key, &raw)
}

/// Per-session variant of a base key, e.g. `chatHistory-<session id>`.
pub fn session_key(base: &str, session_id: &str) -> String {
    format!("{base}-{session_id}")
}

/// Reads a list for display, degrading to an empty one on any failure.
/// Mutations go through `read_list` instead so an unreadable list is never overwritten.
pub fn load_list_or_default<T: DeserializeOwned>(store: &dyn KeyValueStore, key: &str) -> Vec<T> {
    read_list(store, key).unwrap_or_else(|e| {
        error!(key, error = %e, "failed to read list from storage");
        Vec::new()
    })
}

/// Writes a list, logging and returning `false` on failure.
pub fn save_list_logged<T: Serialize>(store: &dyn KeyValueStore, key: &str, items: &[T]) -> bool {
    match write_list(store, key, items) {
        Ok(()) => true,
        Err(e) => {
            error!(key, error = %e, "failed to write list to storage");
            false
        }
    }
}

/// Time + random identifier: base36 epoch millis followed by base36 random digits.
/// Not guaranteed collision-free.
pub fn generate_id() -> String {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default();
    let random: u64 = rand::thread_rng().r#gen();
    format!("{}{}", to_base36(millis), to_base36(random as u128))
}

fn to_base36(mut n: u128) -> String {
    const DIGITS: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if n == 0 {
        return "0".to_string();
    }
    let mut out = Vec::new();
    while n > 0 {
        out.push(DIGITS[(n % 36) as usize]);
        n /= 36;
    }
    out.reverse();
    String::from_utf8(out).unwrap_or_default()
}
