//! Client session: the bearer token, kept in memory and persisted.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError, RwLock};

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("session storage I/O failed: {0}")]
    Io(#[from] io::Error),

    #[error("session file is not valid JSON: {0}")]
    Format(#[from] serde_json::Error),

    #[error("could not resolve a configuration directory")]
    NoConfigDir,
}

/// Where the token survives between runs.
pub trait TokenStore: Send + Sync {
    fn load(&self) -> Result<Option<String>, SessionError>;
    fn save(&self, token: &str) -> Result<(), SessionError>;
    fn clear(&self) -> Result<(), SessionError>;
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct SessionFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    token: Option<String>,
}

/// JSON file holding `{"token": "..."}`.
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `<config_dir>/stockroom/session.json`.
    pub fn default_path() -> Result<PathBuf, SessionError> {
        let mut dir = dirs::config_dir()
            .or_else(|| {
                dirs::home_dir().map(|mut h| {
                    h.push(".config");
                    h
                })
            })
            .ok_or(SessionError::NoConfigDir)?;
        dir.push("stockroom");
        dir.push("session.json");
        Ok(dir)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TokenStore for FileTokenStore {
    fn load(&self) -> Result<Option<String>, SessionError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let file: SessionFile = serde_json::from_str(&raw)?;
        Ok(file.token)
    }

    fn save(&self, token: &str) -> Result<(), SessionError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let file = SessionFile {
            token: Some(token.to_string()),
        };
        fs::write(&self.path, serde_json::to_vec_pretty(&file)?)?;
        Ok(())
    }

    fn clear(&self) -> Result<(), SessionError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    token: Mutex<Option<String>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TokenStore for MemoryTokenStore {
    fn load(&self) -> Result<Option<String>, SessionError> {
        Ok(self.token.lock().unwrap_or_else(PoisonError::into_inner).clone())
    }

    fn save(&self, token: &str) -> Result<(), SessionError> {
        *self.token.lock().unwrap_or_else(PoisonError::into_inner) = Some(token.to_string());
        Ok(())
    }

    fn clear(&self) -> Result<(), SessionError> {
        *self.token.lock().unwrap_or_else(PoisonError::into_inner) = None;
        Ok(())
    }
}

/// The current bearer token, shared by `Arc` with every component that needs it.
///
/// No validation or expiry tracking: a token is trusted until the backend
/// rejects it or the user logs out.
pub struct Session {
    token: RwLock<Option<String>>,
    store: Box<dyn TokenStore>,
}

impl Session {
    /// Start empty, ignoring whatever the store holds.
    pub fn new(store: impl TokenStore + 'static) -> Self {
        Self {
            token: RwLock::new(None),
            store: Box::new(store),
        }
    }

    /// Start with the token persisted by a previous run, if any.
    pub fn restore(store: impl TokenStore + 'static) -> Result<Self, SessionError> {
        let token = store.load()?;
        Ok(Self {
            token: RwLock::new(token),
            store: Box::new(store),
        })
    }

    /// Like [`Session::restore`], but an unreadable session file is cleared
    /// and the session starts anonymous.
    pub fn restore_or_reset(store: impl TokenStore + 'static) -> Result<Self, SessionError> {
        match store.load() {
            Ok(token) => Ok(Self {
                token: RwLock::new(token),
                store: Box::new(store),
            }),
            Err(SessionError::Format(err)) => {
                tracing::warn!(error = %err, "discarding corrupt session file");
                store.clear()?;
                Ok(Self::new(store))
            }
            Err(err) => Err(err),
        }
    }

    pub fn in_memory() -> Self {
        Self::new(MemoryTokenStore::new())
    }

    pub fn token(&self) -> Option<String> {
        self.token.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.read().unwrap_or_else(PoisonError::into_inner).is_some()
    }

    /// Persist `token`, then make it current.
    pub fn login(&self, token: impl Into<String>) -> Result<(), SessionError> {
        let token = token.into();
        self.store.save(&token)?;
        *self.token.write().unwrap_or_else(PoisonError::into_inner) = Some(token);
        Ok(())
    }

    /// Forget the token in memory and in storage.
    pub fn logout(&self) -> Result<(), SessionError> {
        *self.token.write().unwrap_or_else(PoisonError::into_inner) = None;
        self.store.clear()
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("authenticated", &self.is_authenticated())
            .finish_non_exhaustive()
    }
}
