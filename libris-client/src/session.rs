//! Explicit authentication state and its durable storage.
//!
//! A [`Session`] is passed to every operation that needs a bearer token;
//! nothing reads it from ambient global state. [`SessionStore`] persists it
//! between runs with explicit `load`, `save` and `clear`.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use libris_core::{LoginResponse, User};
use serde::{Deserialize, Serialize};

use crate::ClientError;

/// The signed-in user, if any, and their bearer token.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub token: Option<String>,
    pub user: Option<User>,
}

impl Session {
    /// A session holding a freshly issued token.
    #[must_use]
    pub fn from_login(login: LoginResponse) -> Self {
        Self { token: Some(login.token), user: Some(login.user) }
    }

    #[must_use]
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    #[must_use]
    pub fn is_signed_in(&self) -> bool {
        self.token.is_some()
    }

    /// `true` only once the backend has confirmed an `ADMIN` role.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.user.as_ref().is_some_and(User::is_admin)
    }

    /// Forget the token and the user.
    pub fn clear(&mut self) {
        self.token = None;
        self.user = None;
    }
}

/// File-backed storage for a [`Session`].
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `$HOME/.libris/session.json`, if `HOME` is set.
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        std::env::var_os("HOME").map(|home| PathBuf::from(home).join(".libris").join("session.json"))
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the stored session; a missing file is an empty session.
    ///
    /// # Errors
    /// Returns [`ClientError::SessionIo`] if the file cannot be read and
    /// [`ClientError::SessionFormat`] if it does not hold a session.
    pub fn load(&self) -> Result<Session, ClientError> {
        let raw = match fs::read(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Session::default()),
            Err(source) => return Err(ClientError::SessionIo { path: self.path.clone(), source }),
        };
        serde_json::from_slice(&raw)
            .map_err(|source| ClientError::SessionFormat { path: self.path.clone(), source })
    }

    /// Writes `session`, creating parent directories as needed.
    ///
    /// # Errors
    /// Returns [`ClientError::SessionIo`] if the file cannot be written.
    pub fn save(&self, session: &Session) -> Result<(), ClientError> {
        let io_err = |source| ClientError::SessionIo { path: self.path.clone(), source };
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(io_err)?;
        }
        let json = serde_json::to_vec_pretty(session)
            .map_err(|source| ClientError::SessionFormat { path: self.path.clone(), source })?;
        write_private(&self.path, &json).map_err(io_err)?;
        tracing::debug!(path = %self.path.display(), "session saved");
        Ok(())
    }

    /// Removes the stored session; removing a missing file succeeds.
    ///
    /// # Errors
    /// Returns [`ClientError::SessionIo`] if the file exists but cannot be removed.
    pub fn clear(&self) -> Result<(), ClientError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(source) => Err(ClientError::SessionIo { path: self.path.clone(), source }),
        }
    }
}

/// Writes `contents` to a file readable by the owner only.
///
/// A new file is created `0600`. An existing file is narrowed to `0600`
/// before it is truncated, so the token is never written to a wider file.
#[cfg(unix)]
fn write_private(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    use std::io::Write;
    use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};

    let mut file = fs::OpenOptions::new().write(true).create(true).truncate(false).mode(0o600).open(path)?;
    file.set_permissions(fs::Permissions::from_mode(0o600))?;
    file.set_len(0)?;
    file.write_all(contents)?;
    file.sync_all()
}

#[cfg(not(unix))]
fn write_private(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    fs::write(path, contents)
}
