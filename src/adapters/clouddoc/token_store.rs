//! OAuth token cache
//!
//! Tokens are keyed by destination name (`clouddoc`). The file-backed store
//! keeps all destinations in one JSON document written with owner-only
//! permissions.

use crate::config::{secret_string, SecretString};
use crate::domain::errors::Md2NoteError;
use crate::domain::Result;
use chrono::{DateTime, Duration, Utc};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Tokens expiring within this many seconds count as expired
pub const EXPIRY_MARGIN_SECS: i64 = 60;

/// Whether `expires_at` has passed or falls within [`EXPIRY_MARGIN_SECS`]
/// of `now`; `None` never expires
pub fn expires_within_margin(expires_at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> bool {
    match expires_at {
        Some(expires_at) => expires_at - now < Duration::seconds(EXPIRY_MARGIN_SECS),
        None => false,
    }
}

/// Cached OAuth token for one destination
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredToken {
    pub access_token: SecretString,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<SecretString>,

    /// Absolute expiry; `None` means the token does not expire
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
}

impl StoredToken {
    pub fn new(access_token: String, expires_at: Option<DateTime<Utc>>) -> Self {
        Self {
            access_token: secret_string(access_token),
            refresh_token: None,
            expires_at,
            scope: None,
        }
    }

    pub fn with_refresh_token(mut self, refresh_token: String) -> Self {
        self.refresh_token = Some(secret_string(refresh_token));
        self
    }

    /// Whether the token is expired or expires within [`EXPIRY_MARGIN_SECS`]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        expires_within_margin(self.expires_at, now)
    }

    pub fn access_token(&self) -> &str {
        self.access_token.expose_secret().as_ref()
    }

    pub fn refresh_token(&self) -> Option<&str> {
        self.refresh_token
            .as_ref()
            .map(|t| t.expose_secret().as_ref())
            .filter(|t| !t.is_empty())
    }
}

/// Token cache keyed by destination
pub trait TokenStore: Send + Sync {
    /// # Errors
    ///
    /// Returns an error when the store exists but cannot be read.
    fn load(&self, destination: &str) -> Result<Option<StoredToken>>;

    /// # Errors
    ///
    /// Returns an error when the store cannot be written.
    fn save(&self, destination: &str, token: &StoredToken) -> Result<()>;
}

/// JSON file token store
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<BTreeMap<String, StoredToken>> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        let content = fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        serde_json::from_str(&content).map_err(|e| {
            Md2NoteError::Authentication(format!(
                "Token store {} is corrupt: {e}",
                self.path.display()
            ))
        })
    }

    fn write_all(&self, tokens: &BTreeMap<String, StoredToken>) -> Result<()> {
        let content = serde_json::to_vec_pretty(tokens)?;
        let parent = self
            .path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        fs::create_dir_all(parent)?;

        let tmp_path = parent.join(format!(".tokens-{}.part", uuid::Uuid::new_v4().simple()));
        fs::write(&tmp_path, content)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&tmp_path, fs::Permissions::from_mode(0o600))?;
        }

        fs::rename(&tmp_path, &self.path)?;
        Ok(())
    }
}

impl TokenStore for FileTokenStore {
    fn load(&self, destination: &str) -> Result<Option<StoredToken>> {
        Ok(self.read_all()?.remove(destination))
    }

    fn save(&self, destination: &str, token: &StoredToken) -> Result<()> {
        // A corrupt store is replaced
        let mut tokens = self.read_all().unwrap_or_default();
        tokens.insert(destination.to_string(), token.clone());
        self.write_all(&tokens)?;
        tracing::debug!(path = %self.path.display(), destination, "Saved token");
        Ok(())
    }
}

/// In-memory token store
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    tokens: Mutex<BTreeMap<String, StoredToken>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-populated with one token
    pub fn with_token(destination: &str, token: StoredToken) -> Self {
        let store = Self::new();
        if let Ok(mut tokens) = store.tokens.lock() {
            tokens.insert(destination.to_string(), token);
        }
        store
    }
}

impl TokenStore for MemoryTokenStore {
    fn load(&self, destination: &str) -> Result<Option<StoredToken>> {
        let tokens = self
            .tokens
            .lock()
            .map_err(|_| Md2NoteError::Authentication("Token store lock poisoned".to_string()))?;
        Ok(tokens.get(destination).cloned())
    }

    fn save(&self, destination: &str, token: &StoredToken) -> Result<()> {
        let mut tokens = self
            .tokens
            .lock()
            .map_err(|_| Md2NoteError::Authentication("Token store lock poisoned".to_string()))?;
        tokens.insert(destination.to_string(), token.clone());
        Ok(())
    }
}
