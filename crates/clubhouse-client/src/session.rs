//! Client-side session persistence and revalidation.
//!
//! The cached user is a convenience only; the server decides whether the
//! session is still good.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Mutex, PoisonError};

use serde_json::{Map, Value};
use tracing::{debug, warn};

use clubhouse_types::models::User;

use crate::api::ApiClient;
use crate::error::{ClientError, Result};

/// Storage key holding the serialized current user.
pub const SESSION_KEY: &str = "currentUser";

/// String key/value storage with local-storage semantics.
pub trait SessionStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
    fn remove(&self, key: &str) -> Result<()>;
}

/// Keeps everything in one JSON object on disk.
pub struct FileStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    fn read(&self) -> Result<Map<String, Value>> {
        match std::fs::read_to_string(&self.path) {
            Ok(text) if text.trim().is_empty() => Ok(Map::new()),
            Ok(text) => serde_json::from_str(&text)
                .map_err(|e| ClientError::Storage(format!("{}: {}", self.path.display(), e))),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Map::new()),
            Err(e) => Err(e.into()),
        }
    }

    fn write(&self, map: &Map<String, Value>) -> Result<()> {
        let text = serde_json::to_string_pretty(map)
            .map_err(|e| ClientError::Storage(e.to_string()))?;
        std::fs::write(&self.path, text)?;
        Ok(())
    }
}

impl SessionStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(self
            .read()?
            .get(key)
            .and_then(Value::as_str)
            .map(str::to_string))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut map = self.read()?;
        map.insert(key.to_string(), Value::String(value.to_string()));
        self.write(&map)
    }

    fn remove(&self, key: &str) -> Result<()> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut map = self.read()?;
        if map.remove(key).is_some() {
            self.write(&map)?;
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryStore {
    items: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let items = self.items.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(items.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut items = self.items.lock().unwrap_or_else(PoisonError::into_inner);
        items.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let mut items = self.items.lock().unwrap_or_else(PoisonError::into_inner);
        items.remove(key);
        Ok(())
    }
}

/// Typed view of the cached user on top of a [`SessionStore`].
pub struct SessionCache<S> {
    store: S,
}

impl<S: SessionStore> SessionCache<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// A corrupt entry is dropped and treated as logged out.
    pub fn load(&self) -> Option<User> {
        let raw = match self.store.get(SESSION_KEY) {
            Ok(raw) => raw?,
            Err(e) => {
                warn!("Failed to read cached session: {}", e);
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(user) => Some(user),
            Err(e) => {
                warn!("Discarding corrupt cached session: {}", e);
                self.clear();
                None
            }
        }
    }

    pub fn save(&self, user: &User) {
        let result = serde_json::to_string(user)
            .map_err(|e| ClientError::Storage(e.to_string()))
            .and_then(|raw| self.store.set(SESSION_KEY, &raw));
        if let Err(e) = result {
            warn!("Failed to persist session for {}: {}", user.username, e);
        }
    }

    pub fn clear(&self) {
        if let Err(e) = self.store.remove(SESSION_KEY) {
            warn!("Failed to clear cached session: {}", e);
        }
    }
}

/// Result of asking the server whether a cached session is still valid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Revalidation {
    /// The server knows the user; carries its current record.
    Confirmed(User),
    /// Any non-2xx answer.
    Rejected,
    /// No usable answer (network failure or an unreadable body). The
    /// cached session is kept as is.
    Unreachable,
}

pub async fn revalidate(api: &ApiClient, username: &str) -> Revalidation {
    match api.check_session(username).await {
        Ok(user) => {
            debug!("Session for {} confirmed", username);
            Revalidation::Confirmed(user)
        }
        Err(ClientError::Status { status, .. }) => {
            debug!("Session for {} rejected with {}", username, status);
            Revalidation::Rejected
        }
        Err(e) => {
            warn!("Could not revalidate session for {}: {}", username, e);
            Revalidation::Unreachable
        }
    }
}
