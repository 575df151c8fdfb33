use std::collections::HashMap;
use std::io;
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard, PoisonError};

use serde::{Deserialize, Serialize};
use tracing::warn;

/// Keys in the persistent session area, one entry per value.
pub const ACCESS_KEY: &str = "tn_jwt_access";
pub const REFRESH_KEY: &str = "tn_jwt_refresh";
pub const EMAIL_KEY: &str = "tn_user_email";

/// The signed-in user's credentials as held in the session area.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub access: String,
    pub refresh: String,
    pub email: Option<String>,
}

/// Persistent key/value area backing a [`SessionStore`].
pub trait SessionBackend: Send + Sync {
    fn get(&self, key: &str) -> io::Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> io::Result<()>;
    fn remove(&self, key: &str) -> io::Result<()>;
}

/// Owns the persisted credentials.
///
/// Storage failure never panics and never fails a request: reads degrade to
/// "signed out" and writes are logged and dropped. The store must stay
/// callable even when the backing area is unavailable.
pub struct SessionStore {
    backend: Box<dyn SessionBackend>,
}

impl SessionStore {
    pub fn new(backend: impl SessionBackend + 'static) -> Self {
        Self {
            backend: Box::new(backend),
        }
    }

    /// The full credential set, or `None` unless both tokens are on record.
    pub fn get(&self) -> Option<Credentials> {
        let access = self.read(ACCESS_KEY)?;
        let refresh = self.read(REFRESH_KEY)?;
        Some(Credentials {
            access,
            refresh,
            email: self.read(EMAIL_KEY),
        })
    }

    pub fn access_token(&self) -> Option<String> {
        self.read(ACCESS_KEY)
    }

    pub fn refresh_token(&self) -> Option<String> {
        self.read(REFRESH_KEY)
    }

    pub fn email(&self) -> Option<String> {
        self.read(EMAIL_KEY)
    }

    /// Store a fresh token pair, optionally recording the signed-in email.
    pub fn set(&self, access: &str, refresh: &str, email: Option<&str>) {
        self.write(ACCESS_KEY, access);
        self.write(REFRESH_KEY, refresh);
        if let Some(email) = email {
            self.write(EMAIL_KEY, email);
        }
    }

    /// Replace only the access token; the refresh token stays as-is.
    pub fn set_access(&self, access: &str) {
        self.write(ACCESS_KEY, access);
    }

    /// Remove all three entries.
    pub fn clear(&self) {
        for key in [ACCESS_KEY, REFRESH_KEY, EMAIL_KEY] {
            if let Err(err) = self.backend.remove(key) {
                warn!(key, %err, "session store: remove failed");
            }
        }
    }

    fn read(&self, key: &str) -> Option<String> {
        self.backend.get(key).ok().flatten()
    }

    fn write(&self, key: &str, value: &str) {
        if let Err(err) = self.backend.set(key, value) {
            warn!(key, %err, "session store: write failed");
        }
    }
}

/// In-memory backend for tests and ephemeral sessions.
#[derive(Default)]
pub struct MemoryBackend {
    entries: Mutex<HashMap<String, String>>,
}

impl SessionBackend for MemoryBackend {
    fn get(&self, key: &str) -> io::Result<Option<String>> {
        Ok(lock(&self.entries).get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> io::Result<()> {
        lock(&self.entries).insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove(&self, key: &str) -> io::Result<()> {
        lock(&self.entries).remove(key);
        Ok(())
    }
}

/// File-backed backend: a single small JSON document holding the key/value
/// entries. Each operation reads and rewrites the whole document — the store
/// only ever holds three entries.
pub struct FileBackend {
    path: PathBuf,
    guard: Mutex<()>,
}

impl FileBackend {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            guard: Mutex::new(()),
        }
    }

    fn load(&self) -> HashMap<String, String> {
        match std::fs::read(&self.path) {
            Ok(bytes) => serde_json::from_slice(&bytes).unwrap_or_default(),
            Err(_) => HashMap::new(),
        }
    }

    fn save(&self, entries: &HashMap<String, String>) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let bytes = serde_json::to_vec_pretty(entries).map_err(io::Error::other)?;
        std::fs::write(&self.path, bytes)
    }
}

impl SessionBackend for FileBackend {
    fn get(&self, key: &str) -> io::Result<Option<String>> {
        let _guard = lock(&self.guard);
        Ok(self.load().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> io::Result<()> {
        let _guard = lock(&self.guard);
        let mut entries = self.load();
        entries.insert(key.to_owned(), value.to_owned());
        self.save(&entries)
    }

    fn remove(&self, key: &str) -> io::Result<()> {
        let _guard = lock(&self.guard);
        let mut entries = self.load();
        if entries.remove(key).is_some() {
            self.save(&entries)?;
        }
        Ok(())
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
