//! Authentication service.
//!
//! The storefront never issues or validates tokens. It exchanges a username
//! and password for a bearer token at the remote auth endpoint, keeps that
//! token in a durable slot, and attaches it to order requests.

mod error;

pub use error::AuthError;

use std::sync::Arc;

use secrecy::{ExposeSecret, SecretString};

use crate::api::{BlockflowClient, LoginResponse};
use crate::models::session::keys;
use crate::storage::KeyValueStore;

/// An externally issued bearer token.
///
/// Implements `Debug` manually to redact the secret.
#[derive(Clone)]
pub struct AuthToken(SecretString);

impl AuthToken {
    /// Wrap a token string. Blank strings are not tokens.
    #[must_use]
    pub fn new(token: impl Into<String>) -> Option<Self> {
        let token = token.into();
        if token.trim().is_empty() {
            return None;
        }
        Some(Self(SecretString::from(token)))
    }

    /// The raw token, for the `Authorization` header only.
    #[must_use]
    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }
}

impl std::fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("AuthToken([REDACTED])")
    }
}

// =============================================================================
// CredentialStore
// =============================================================================

/// Durable credential slots (`authToken`, `username`).
#[derive(Clone)]
pub struct CredentialStore {
    storage: Arc<dyn KeyValueStore>,
}

impl CredentialStore {
    /// Create a credential store over the given slots.
    #[must_use]
    pub fn new(storage: Arc<dyn KeyValueStore>) -> Self {
        Self { storage }
    }

    /// The stored bearer token, if any.
    ///
    /// An unreadable slot is logged and treated as "not logged in".
    #[must_use]
    pub fn token(&self) -> Option<AuthToken> {
        match self.storage.get(keys::AUTH_TOKEN) {
            Ok(value) => value.and_then(AuthToken::new),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read auth token slot");
                None
            }
        }
    }

    /// The username stored alongside the token, if any.
    #[must_use]
    pub fn username(&self) -> Option<String> {
        self.storage
            .get(keys::USERNAME)
            .inspect_err(|e| tracing::warn!(error = %e, "Failed to read username slot"))
            .ok()
            .flatten()
            .filter(|name| !name.is_empty())
    }

    /// Persist a login response.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::EmptyToken`] if the response carries a blank
    /// token, or a storage error if the slots cannot be written.
    pub fn save(&self, login: &LoginResponse) -> Result<AuthToken, AuthError> {
        let token = AuthToken::new(login.token.clone()).ok_or(AuthError::EmptyToken)?;

        self.storage.set(keys::AUTH_TOKEN, token.expose())?;
        match &login.username {
            Some(username) => self.storage.set(keys::USERNAME, username)?,
            None => self.storage.remove(keys::USERNAME)?,
        }

        Ok(token)
    }

    /// Forget the stored credentials.
    ///
    /// # Errors
    ///
    /// Returns a storage error if a slot cannot be removed.
    pub fn clear(&self) -> Result<(), AuthError> {
        self.storage.remove(keys::AUTH_TOKEN)?;
        self.storage.remove(keys::USERNAME)?;
        Ok(())
    }
}

impl std::fmt::Debug for CredentialStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialStore")
            .field("logged_in", &self.token().is_some())
            .finish_non_exhaustive()
    }
}

// =============================================================================
// AuthService
// =============================================================================

/// Login/logout against the remote auth endpoint.
pub struct AuthService<'a> {
    client: &'a BlockflowClient,
    credentials: &'a CredentialStore,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(client: &'a BlockflowClient, credentials: &'a CredentialStore) -> Self {
        Self {
            client,
            credentials,
        }
    }

    /// Log in and persist the issued token.
    ///
    /// Returns the username the API reported, falling back to the one
    /// supplied.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if the API rejects the login.
    /// Returns other variants if the request or the credential write fails.
    pub async fn login(&self, username: &str, password: &str) -> Result<String, AuthError> {
        let response = self.client.login(username, password).await?;
        self.credentials.save(&response)?;

        let username = response
            .username
            .unwrap_or_else(|| username.to_string());
        tracing::info!(username = %username, "Logged in");
        Ok(username)
    }

    /// Forget the stored token.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the credential slots cannot be cleared.
    pub fn logout(&self) -> Result<(), AuthError> {
        self.credentials.clear()?;
        tracing::info!("Logged out");
        Ok(())
    }
}
