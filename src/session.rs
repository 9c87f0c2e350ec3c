//! Authentication state and session lifecycle.
//!
//! The [`SessionController`] owns the four-state authentication machine and
//! is the only component that writes the credential store. Everything that
//! talks to the service while authenticated checks
//! [`SessionController::require_authenticated`] first and fails fast when the
//! gate is closed.

use std::fmt;
use std::sync::Arc;

use crate::client::Transport;
use crate::credentials::CredentialStore;
use crate::error::{Error, Result};
use crate::observability;

/// Authentication state of the client.
///
/// `Unknown` is the only legal initial value; the startup probe resolves it
/// exactly once, after which login and logout toggle between the two resolved
/// states. `Authenticating` is only ever observed while a login call is in
/// flight.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum AuthState {
    /// Startup state, before the probe has run.
    Unknown,

    /// A credential exchange is in flight.
    Authenticating,

    /// A credential is held and presumed valid.
    Authenticated,

    /// No credential is held.
    Unauthenticated,
}

impl fmt::Display for AuthState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthState::Unknown => write!(f, "unknown"),
            AuthState::Authenticating => write!(f, "authenticating"),
            AuthState::Authenticated => write!(f, "authenticated"),
            AuthState::Unauthenticated => write!(f, "unauthenticated"),
        }
    }
}

/// A failed login, reduced to the categories the login surface presents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginError {
    /// The service rejected the username/password pair.
    InvalidCredentials,

    /// The service is up but failing.
    ServerUnavailable,

    /// The service could not be reached.
    Connectivity,

    /// Anything else, carrying whatever detail is available.
    Rejected(String),
}

impl fmt::Display for LoginError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoginError::InvalidCredentials => write!(f, "Invalid username or password"),
            LoginError::ServerUnavailable => write!(f, "Server error. Please try again later."),
            LoginError::Connectivity => write!(f, "Network error. Please check your connection."),
            LoginError::Rejected(detail) => write!(f, "Login failed: {detail}"),
        }
    }
}

impl std::error::Error for LoginError {}

impl From<Error> for LoginError {
    fn from(err: Error) -> Self {
        if err.is_unauthorized() {
            LoginError::InvalidCredentials
        } else if err.is_server() {
            LoginError::ServerUnavailable
        } else if err.is_network() {
            LoginError::Connectivity
        } else {
            let detail = err
                .detail()
                .map(String::from)
                .unwrap_or_else(|| err.to_string());
            LoginError::Rejected(detail)
        }
    }
}

/// Owner of the authentication state machine and the credential store.
pub struct SessionController {
    transport: Arc<dyn Transport>,
    credentials: CredentialStore,
    state: AuthState,
}

impl SessionController {
    /// Creates a new controller in the `Unknown` state.
    pub fn new(transport: Arc<dyn Transport>, credentials: CredentialStore) -> Self {
        Self {
            transport,
            credentials,
            state: AuthState::Unknown,
        }
    }

    /// Resolve the startup state from local token presence.
    ///
    /// No network traffic: a stored token is treated as sufficient evidence,
    /// and staleness surfaces as `Unauthorized` on the first authenticated
    /// call.
    pub fn probe(&mut self) {
        self.state = if self.credentials.is_present() {
            AuthState::Authenticated
        } else {
            AuthState::Unauthenticated
        };
    }

    /// Exchange a username and password for a session credential.
    ///
    /// On success the token is persisted and the state becomes
    /// `Authenticated`. On any failure the store is cleared and the state
    /// becomes `Unauthenticated`; the state never rests in `Authenticating`.
    pub async fn login(&mut self, username: &str, password: &str) -> std::result::Result<(), LoginError> {
        self.state = AuthState::Authenticating;

        let outcome = self.transport.exchange_credentials(username, password).await;
        let token = match outcome {
            Ok(token) => token,
            Err(err) => {
                self.state = AuthState::Unauthenticated;
                let _ = self.credentials.clear();
                observability::LOGIN_FAILURES.click();
                return Err(LoginError::from(err));
            }
        };

        if let Err(err) = self.credentials.set(&token.access_token) {
            self.state = AuthState::Unauthenticated;
            let _ = self.credentials.clear();
            observability::LOGIN_FAILURES.click();
            return Err(LoginError::Rejected(err.to_string()));
        }

        self.state = AuthState::Authenticated;
        observability::LOGINS.click();
        Ok(())
    }

    /// Drop the credential and leave the authenticated state.
    ///
    /// Idempotent; the state transition happens before the file removal is
    /// attempted.
    pub fn logout(&mut self) -> Result<()> {
        self.state = AuthState::Unauthenticated;
        self.credentials.clear()
    }

    /// React to an `Unauthorized` classification from an authenticated call:
    /// the stored token is stale, so drop it.
    pub fn invalidate(&mut self) {
        self.state = AuthState::Unauthenticated;
        let _ = self.credentials.clear();
    }

    /// The gate checked by the conversation engine and the attachment
    /// pipeline before touching the transport.
    pub fn require_authenticated(&self) -> Result<()> {
        if self.state == AuthState::Authenticated {
            Ok(())
        } else {
            Err(Error::not_authenticated())
        }
    }

    /// Returns the current authentication state.
    pub fn state(&self) -> AuthState {
        self.state
    }

    /// Returns true if the session is authenticated.
    pub fn is_authenticated(&self) -> bool {
        self.state == AuthState::Authenticated
    }
}
