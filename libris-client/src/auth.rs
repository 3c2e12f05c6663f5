//! Sign-in, sign-up and session restoration.

use libris_core::{Credentials, Registration};

use crate::{ClientError, LibraryClient, Session, SessionStore};

/// What a sign-in or sign-up attempt should tell the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthOutcome {
    pub success: bool,
    pub message: String,
}

impl AuthOutcome {
    fn ok(message: &str) -> Self {
        Self { success: true, message: message.to_owned() }
    }

    fn rejected(message: impl Into<String>) -> Self {
        Self { success: false, message: message.into() }
    }
}

/// Drives the auth endpoints and keeps the stored session in step.
#[derive(Debug, Clone, Copy)]
pub struct Authenticator<'a> {
    client: &'a LibraryClient,
    store: &'a SessionStore,
}

impl<'a> Authenticator<'a> {
    #[must_use]
    pub fn new(client: &'a LibraryClient, store: &'a SessionStore) -> Self {
        Self { client, store }
    }

    /// Re-checks a stored token with the backend.
    ///
    /// On success the confirmed user replaces the stored one. A rejected
    /// token, or any failure to reach the backend, clears the session.
    /// Without a token nothing is sent.
    ///
    /// # Errors
    /// Returns [`ClientError::SessionIo`] if the session file cannot be updated.
    pub async fn restore(&self, session: &mut Session) -> Result<(), ClientError> {
        if !session.is_signed_in() {
            return Ok(());
        }
        match self.client.validate(session).await {
            Ok(resp) if resp.success => {
                if let Some(user) = resp.data {
                    session.user = Some(user);
                    self.store.save(session)?;
                }
                Ok(())
            }
            Ok(resp) => {
                tracing::info!(message = %resp.message, "stored token rejected; signing out");
                self.forget(session)
            }
            Err(e) => {
                tracing::warn!(error = %e, "token validation failed; signing out");
                self.forget(session)
            }
        }
    }

    /// Signs in and stores the issued token.
    ///
    /// # Errors
    /// Returns [`ClientError::SessionIo`] if the new session cannot be saved.
    /// Backend rejections and transport failures are reported in the outcome.
    pub async fn sign_in(&self, session: &mut Session, credentials: &Credentials) -> Result<AuthOutcome, ClientError> {
        let resp = match self.client.login(credentials).await {
            Ok(resp) => resp,
            Err(e) => {
                tracing::warn!(error = %e, "login request failed");
                return Ok(AuthOutcome::rejected("Login failed. Please try again."));
            }
        };
        if !resp.success {
            return Ok(AuthOutcome::rejected(resp.message));
        }
        let Some(login) = resp.data else {
            return Ok(AuthOutcome::rejected("Login failed. Please try again."));
        };
        *session = Session::from_login(login);
        self.store.save(session)?;
        Ok(AuthOutcome::ok("Login successful"))
    }

    /// Registers a new account. The user must sign in afterwards.
    pub async fn sign_up(&self, registration: &Registration) -> AuthOutcome {
        match self.client.register(registration).await {
            Ok(resp) if resp.success => AuthOutcome::ok("Registration successful. Please login."),
            Ok(resp) => AuthOutcome::rejected(resp.message),
            Err(e) => {
                tracing::warn!(error = %e, "registration request failed");
                AuthOutcome::rejected("Registration failed. Please try again.")
            }
        }
    }

    /// Forgets the signed-in user locally. The backend is not contacted.
    ///
    /// # Errors
    /// Returns [`ClientError::SessionIo`] if the session file cannot be removed.
    pub fn sign_out(&self, session: &mut Session) -> Result<(), ClientError> {
        self.forget(session)
    }

    fn forget(&self, session: &mut Session) -> Result<(), ClientError> {
        session.clear();
        self.store.clear()
    }
}
