use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use campus_core::Session;

use crate::error::AuthError;

const KEYRING_USER: &str = "supabase-session";
const SESSION_FILE_NAME: &str = "session.json";

/// Persists the serialized session between process runs.
///
/// Keyring first, `~/.campus/session.json` as fallback. A file-only store
/// skips the keyring entirely.
#[derive(Debug, Clone)]
pub struct SessionStore {
    keyring_service: Option<String>,
    file_path: PathBuf,
}

impl SessionStore {
    /// Keyring-backed store with the default file fallback.
    ///
    /// `CAMPUS_KEYRING_SERVICE` overrides `keyring_service` so tests can avoid
    /// touching real credentials.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::SessionStoreError` if the home directory cannot be
    /// resolved.
    pub fn new(keyring_service: &str) -> Result<Self, AuthError> {
        let service = std::env::var("CAMPUS_KEYRING_SERVICE")
            .ok()
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| keyring_service.to_string());
        Ok(Self {
            keyring_service: Some(service),
            file_path: default_session_path()?,
        })
    }

    /// Store that only reads and writes `path`.
    #[must_use]
    pub fn file_only(path: impl Into<PathBuf>) -> Self {
        Self {
            keyring_service: None,
            file_path: path.into(),
        }
    }

    /// Build the store described by the session config section.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::SessionStoreError` if the home directory cannot be
    /// resolved.
    pub fn from_config(config: &campus_config::SessionConfig) -> Result<Self, AuthError> {
        if config.file_only {
            Ok(Self::file_only(default_session_path()?))
        } else {
            Self::new(&config.keyring_service)
        }
    }

    #[must_use]
    pub fn file_path(&self) -> &Path {
        &self.file_path
    }

    /// Persist a session. Falls back to file if the keyring is unavailable.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::SessionStoreError` if serialization or file storage
    /// fails.
    pub fn store(&self, session: &Session) -> Result<(), AuthError> {
        let json = serde_json::to_string(session)
            .map_err(|e| AuthError::SessionStoreError(format!("serialize session: {e}")))?;

        let Some(service) = &self.keyring_service else {
            return self.store_file(&json);
        };
        match keyring::Entry::new(service, KEYRING_USER) {
            Ok(entry) => match entry.set_password(&json) {
                Ok(()) => Ok(()),
                Err(error) => {
                    tracing::warn!(%error, "keyring store failed; falling back to file");
                    self.store_file(&json)
                }
            },
            Err(error) => {
                tracing::warn!(%error, "keyring unavailable; falling back to file");
                self.store_file(&json)
            }
        }
    }

    /// Load the stored session. Priority: keyring → file.
    ///
    /// An unreadable or corrupt entry is treated as absent.
    #[must_use]
    pub fn load(&self) -> Option<Session> {
        let raw = self.load_keyring().or_else(|| self.load_file())?;
        match serde_json::from_str(&raw) {
            Ok(session) => Some(session),
            Err(error) => {
                tracing::warn!(%error, "stored session is corrupt; ignoring it");
                None
            }
        }
    }

    /// Delete the stored session from keyring and file.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::SessionStoreError` if the session file cannot be
    /// removed.
    pub fn delete(&self) -> Result<(), AuthError> {
        // May not exist
        if let Some(service) = &self.keyring_service
            && let Ok(entry) = keyring::Entry::new(service, KEYRING_USER)
        {
            let _ = entry.delete_credential();
        }

        if self.file_path.exists() {
            fs::remove_file(&self.file_path).map_err(|e| {
                AuthError::SessionStoreError(format!(
                    "failed to delete {}: {e}",
                    self.file_path.display()
                ))
            })?;
        }

        Ok(())
    }

    /// Detect which tier the current session came from (for status display).
    #[must_use]
    pub fn detect_source(&self) -> Option<&'static str> {
        if self.load_keyring().is_some() {
            return Some("keyring");
        }
        if self.load_file().is_some() {
            return Some("file");
        }
        None
    }

    // --- Private helpers ---

    fn load_keyring(&self) -> Option<String> {
        let service = self.keyring_service.as_deref()?;
        keyring::Entry::new(service, KEYRING_USER)
            .ok()?
            .get_password()
            .ok()
            .filter(|s| !s.is_empty())
    }

    fn store_file(&self, json: &str) -> Result<(), AuthError> {
        let path = &self.file_path;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                AuthError::SessionStoreError(format!("mkdir {}: {e}", parent.display()))
            })?;
            #[cfg(unix)]
            {
                use std::os::unix::fs::PermissionsExt;
                if let Err(e) = fs::set_permissions(parent, fs::Permissions::from_mode(0o700)) {
                    tracing::warn!("failed to chmod 0700 {}: {e}", parent.display());
                }
            }
        }
        let mut options = fs::OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }
        let mut file = options
            .open(path)
            .map_err(|e| AuthError::SessionStoreError(format!("open {}: {e}", path.display())))?;

        // The creation mode does not apply to a file left by an older run
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            file.set_permissions(fs::Permissions::from_mode(0o600))
                .map_err(|e| {
                    AuthError::SessionStoreError(format!("chmod {}: {e}", path.display()))
                })?;
        }

        file.write_all(json.as_bytes())
            .map_err(|e| AuthError::SessionStoreError(format!("write {}: {e}", path.display())))?;

        Ok(())
    }

    fn load_file(&self) -> Option<String> {
        fs::read_to_string(&self.file_path)
            .ok()
            .filter(|s| !s.trim().is_empty())
    }
}

fn default_session_path() -> Result<PathBuf, AuthError> {
    dirs::home_dir()
        .map(|h| h.join(".campus").join(SESSION_FILE_NAME))
        .ok_or_else(|| {
            AuthError::SessionStoreError("home directory not found; cannot store session".into())
        })
}
