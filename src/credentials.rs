//! Durable storage for the session credential.
//!
//! The store holds at most one opaque token in a file under the per-user
//! configuration directory. Presence of a token is what the session
//! controller's startup probe inspects; the transport reads the same file to
//! attach the bearer credential to each request. Only the session controller
//! writes here.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Directory under the platform configuration root.
const CONFIG_DIR: &str = "kbase";

/// Filename holding the token.
const TOKEN_FILE: &str = "token";

/// File-backed store for the single opaque session token.
///
/// Clones share the same backing file, so a store handed to the transport
/// observes writes made through the session controller's handle.
#[derive(Debug, Clone)]
pub struct CredentialStore {
    path: PathBuf,
}

impl CredentialStore {
    /// Opens the store at its fixed per-user location.
    pub fn open_default() -> Result<Self> {
        let base = dirs::config_dir().ok_or_else(|| {
            Error::validation("could not determine a configuration directory", None)
        })?;
        Ok(Self {
            path: base.join(CONFIG_DIR).join(TOKEN_FILE),
        })
    }

    /// Opens a store backed by an explicit file path.
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the backing file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Persists the token, replacing any previous value.
    pub fn set(&self, token: &str) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .map_err(|err| Error::io("failed to create credential directory", err))?;
        }
        fs::write(&self.path, token)
            .map_err(|err| Error::io("failed to write credential file", err))?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&self.path, fs::Permissions::from_mode(0o600))
                .map_err(|err| Error::io("failed to restrict credential file", err))?;
        }
        Ok(())
    }

    /// Removes the token. Succeeds when no token is stored.
    pub fn clear(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(Error::io("failed to remove credential file", err)),
        }
    }

    /// Returns the stored token, if a non-empty one is present.
    pub fn get(&self) -> Option<String> {
        let token = fs::read_to_string(&self.path).ok()?;
        let token = token.trim();
        if token.is_empty() {
            None
        } else {
            Some(token.to_string())
        }
    }

    /// Returns true if a token is stored.
    pub fn is_present(&self) -> bool {
        self.get().is_some()
    }
}
